//! Resumable lecture-video upload.
//!
//! The [`session::UploadSessionController`] owns all session state. It
//! validates and probes the selected file, starts one transfer at a time
//! through a [`transfer::TransferClient`], and applies the transfer's
//! progress/success/error events, which arrive over an mpsc channel.
//! [`surface::SurfaceView`] is the read-only projection a host renders.

pub mod error;
pub mod session;
pub mod surface;
pub mod transfer;

pub use error::UploadError;
pub use session::{
    NoopHooks, UploadHooks, UploadSession, UploadSessionController, UploadSettings, UploadStatus,
};
pub use surface::SurfaceView;
pub use transfer::{
    TransferClient, TransferError, TransferEvent, TransferHandle, TransferOptions,
    TransferRequest, TusClient,
};
