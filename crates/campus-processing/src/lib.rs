//! Local media handling for lecture video uploads.
//!
//! - [`validator`]: declared-type checks and the extension/content-type map
//! - [`source`]: the selected local file handle
//! - [`probe`]: duration probing through ffprobe
//! - [`metadata`]: decoded metadata types

pub mod metadata;
pub mod probe;
pub mod source;
pub mod validator;

pub use metadata::VideoMetadata;
pub use probe::{sanitize_duration, DurationProbe, FfprobeDurationProbe, ProbeError};
pub use source::SourceFile;
pub use validator::{content_type_for_extension, is_video_content_type, ValidationError};
