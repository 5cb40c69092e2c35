//! Shared constants for the portal client.

/// Videos shorter than this are rejected before upload.
pub const MIN_VIDEO_DURATION_SECS: f64 = 10.0;

/// Chunk size used by the resumable uploader (5 MiB).
pub const UPLOAD_CHUNK_SIZE: usize = 5 * 1024 * 1024;

/// Protocol version sent in every resumable-upload request.
pub const TUS_VERSION: &str = "1.0.0";

/// Default page size for board listings.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound accepted by the backend for a single page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// MIME prefix every uploadable lecture video must carry.
pub const VIDEO_MIME_PREFIX: &str = "video/";
