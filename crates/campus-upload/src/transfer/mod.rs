//! Transfer layer: one resumable upload per [`TransferHandle`].
//!
//! A [`TransferClient`] spawns the transfer and reports back through
//! [`TransferEvent`]s tagged with the transfer id, so the owner can drop
//! events from transfers it has already abandoned.

mod chunk;
mod tus;

use std::time::Duration;

use campus_processing::SourceFile;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub use chunk::ChunkReader;
pub use tus::{encode_metadata, TusClient};

/// Errors raised inside a transfer task.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("missing or invalid {0} header")]
    MissingHeader(&'static str),

    #[error("invalid upload URL: {0}")]
    InvalidUrl(String),

    #[error("server offset {actual} does not advance past {expected}")]
    OffsetMismatch { expected: u64, actual: u64 },

    #[error("file ended at byte {offset}, expected {size}")]
    Truncated { offset: u64, size: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transfer cancelled")]
    Cancelled,
}

impl TransferError {
    /// Network failures, 5xx and lock/conflict responses may succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransferError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            TransferError::UnexpectedStatus { status, .. } => {
                *status >= 500 || *status == 409 || *status == 423
            }
            _ => false,
        }
    }
}

/// Event emitted by a running transfer.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    /// The server created the upload resource.
    Created { transfer_id: u64, upload_url: String },
    /// The server acknowledged `bytes_sent` of `bytes_total`.
    Progress {
        transfer_id: u64,
        bytes_sent: u64,
        bytes_total: u64,
    },
    Success { transfer_id: u64, upload_url: String },
    Error { transfer_id: u64, message: String },
}

impl TransferEvent {
    pub fn transfer_id(&self) -> u64 {
        match self {
            TransferEvent::Created { transfer_id, .. }
            | TransferEvent::Progress { transfer_id, .. }
            | TransferEvent::Success { transfer_id, .. }
            | TransferEvent::Error { transfer_id, .. } => *transfer_id,
        }
    }
}

/// Per-transfer options.
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Creation endpoint (tus collection URL).
    pub endpoint: String,
    pub chunk_size: usize,
    /// Delays between attempts. Empty disables retries.
    pub retry_delays: Vec<Duration>,
    /// `Upload-Metadata` pairs, in order.
    pub metadata: Vec<(String, String)>,
    /// Extra request headers (e.g. `Authorization`).
    pub headers: Vec<(String, String)>,
    /// Continue an upload the server already knows instead of creating one.
    pub resume_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub transfer_id: u64,
    pub source: SourceFile,
    pub options: TransferOptions,
}

/// Handle to one in-flight transfer.
///
/// Dropping the handle cancels the transfer; a cancelled transfer emits no
/// further events.
#[derive(Debug)]
pub struct TransferHandle {
    id: u64,
    cancel: CancellationToken,
}

impl TransferHandle {
    pub fn new(id: u64, cancel: CancellationToken) -> Self {
        Self { id, cancel }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop the transfer.
    pub fn abort(self) {
        tracing::debug!(transfer_id = self.id, "Aborting transfer");
        self.cancel.cancel();
    }
}

impl Drop for TransferHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Starts transfers. Implementations must spawn the work and return at once.
pub trait TransferClient: Send + Sync {
    fn start(
        &self,
        request: TransferRequest,
        events: mpsc::Sender<TransferEvent>,
    ) -> TransferHandle;
}
