//! Upload-session controller.
//!
//! The controller is the single owner of [`UploadSession`]. Transfer events
//! are applied only through [`UploadSessionController::apply_event`], and
//! events from a transfer the controller no longer holds are dropped.

use std::sync::Arc;

use campus_core::models::LectureVideoMetadata;
use campus_core::{Config, DurationText};
use campus_processing::validator::validate_video_type;
use campus_processing::{DurationProbe, SourceFile};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::UploadError;
use crate::surface::SurfaceView;
use crate::transfer::{
    TransferClient, TransferEvent, TransferHandle, TransferOptions, TransferRequest,
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Idle,
    FileRejected,
    Ready,
    Uploading,
    Succeeded,
    Failed,
}

/// State of one upload attempt.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub file: Option<SourceFile>,
    pub title: String,
    /// Measured duration in seconds; `None` when unknown.
    pub duration_seconds: Option<f64>,
    /// Display form of the duration; empty when unknown.
    pub formatted_duration: DurationText,
    pub status: UploadStatus,
    /// 0..=100
    pub progress: u8,
    pub week_id: Option<i64>,
    /// Dismissible inline message.
    pub error: Option<String>,
    pub success: bool,
    /// Bumped on every reset so a host can rebind its file input.
    pub input_generation: u64,
    /// Upload URL the server created for this file, kept for retries.
    pub upload_url: Option<String>,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self {
            file: None,
            title: String::new(),
            duration_seconds: None,
            formatted_duration: DurationText::default(),
            status: UploadStatus::Idle,
            progress: 0,
            week_id: None,
            error: None,
            success: false,
            input_generation: 0,
            upload_url: None,
        }
    }
}

impl UploadSession {
    pub fn is_uploading(&self) -> bool {
        self.status == UploadStatus::Uploading
    }
}

/// Host callbacks.
pub trait UploadHooks: Send + Sync {
    /// An upload finished successfully.
    fn on_complete(&self) {}
    /// The widget was dismissed without a completed upload.
    fn on_dismiss(&self) {}
}

pub struct NoopHooks;

impl UploadHooks for NoopHooks {}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub endpoint: String,
    pub chunk_size: usize,
    pub access_token: Option<String>,
    pub min_duration_secs: f64,
}

impl UploadSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.upload_endpoint().to_string(),
            chunk_size: config.upload_chunk_size(),
            access_token: config.access_token().map(str::to_string),
            min_duration_secs: config.min_video_duration_secs(),
        }
    }
}

/// `round(100 * sent / total)`, clamped; an empty total counts as 0 %.
pub fn progress_percent(bytes_sent: u64, bytes_total: u64) -> u8 {
    if bytes_total == 0 {
        return 0;
    }
    let pct = (bytes_sent as f64 * 100.0 / bytes_total as f64).round();
    pct.clamp(0.0, 100.0) as u8
}

pub struct UploadSessionController {
    session: UploadSession,
    settings: UploadSettings,
    probe: Arc<dyn DurationProbe>,
    transfer: Arc<dyn TransferClient>,
    hooks: Arc<dyn UploadHooks>,
    handle: Option<TransferHandle>,
    events_tx: mpsc::Sender<TransferEvent>,
    events_rx: mpsc::Receiver<TransferEvent>,
    next_transfer_id: u64,
}

impl UploadSessionController {
    pub fn new(
        settings: UploadSettings,
        probe: Arc<dyn DurationProbe>,
        transfer: Arc<dyn TransferClient>,
        hooks: Arc<dyn UploadHooks>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            session: UploadSession::default(),
            settings,
            probe,
            transfer,
            hooks,
            handle: None,
            events_tx,
            events_rx,
            next_transfer_id: 0,
        }
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn status(&self) -> UploadStatus {
        self.session.status
    }

    pub fn view(&self) -> SurfaceView {
        SurfaceView::from(&self.session)
    }

    pub fn set_week(&mut self, week_id: i64) {
        self.session.week_id = Some(week_id);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.session.title = title.into();
    }

    /// Continue an upload URL from an earlier run on the next start.
    pub fn set_resume_url(&mut self, upload_url: impl Into<String>) {
        self.session.upload_url = Some(upload_url.into());
    }

    /// Clear the inline message. A rejected clip returns the session to Idle.
    pub fn dismiss_error(&mut self) {
        self.session.error = None;
        if self.session.status == UploadStatus::FileRejected {
            self.session.status = UploadStatus::Idle;
        }
    }

    /// Validate, probe and stage a file.
    ///
    /// A file of the wrong type leaves the session as it was; a clip shorter
    /// than the minimum is rejected and cleared; a clip whose duration
    /// cannot be read is accepted.
    pub async fn select_file(&mut self, file: SourceFile) -> Result<(), UploadError> {
        if self.session.is_uploading() {
            return Err(UploadError::UploadInProgress);
        }

        if validate_video_type(&file.declared_type).is_err() {
            let err = UploadError::InvalidFileType {
                content_type: file.declared_type.clone(),
            };
            warn!(file = %file.file_name, content_type = %file.declared_type, "Rejected non-video file");
            self.session.error = Some(err.to_string());
            return Err(err);
        }

        self.session.error = None;
        self.session.success = false;
        self.session.progress = 0;
        self.session.upload_url = None;

        let duration = match self.probe.probe(&file).await {
            Ok(duration) => duration,
            Err(e) => {
                let err = UploadError::ProbeFailed(e.to_string());
                warn!(file = %file.file_name, error = %err, "Accepting file with unknown duration");
                None
            }
        };

        if let Some(seconds) = duration {
            let minimum = self.settings.min_duration_secs;
            if seconds < minimum {
                let err = UploadError::DurationTooShort { seconds, minimum };
                info!(file = %file.file_name, seconds, minimum, "Rejected short clip");
                self.session.file = None;
                self.session.duration_seconds = None;
                self.session.formatted_duration = DurationText::default();
                self.session.status = UploadStatus::FileRejected;
                self.session.error = Some(err.to_string());
                return Err(err);
            }
        }

        if self.session.title.trim().is_empty() {
            self.session.title = file.title_stem();
        }
        self.session.duration_seconds = duration;
        self.session.formatted_duration = duration
            .map(DurationText::from_seconds)
            .unwrap_or_default();
        info!(
            file = %file.file_name,
            size = file.size,
            duration = %self.session.formatted_duration,
            "File ready for upload"
        );
        self.session.file = Some(file);
        self.session.status = UploadStatus::Ready;
        Ok(())
    }

    fn upload_title(&self, file: &SourceFile) -> String {
        let title = self.session.title.trim();
        if title.is_empty() {
            file.title_stem()
        } else {
            title.to_string()
        }
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        self.settings
            .access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .map(|token| vec![("Authorization".to_string(), format!("Bearer {}", token))])
            .unwrap_or_default()
    }

    /// Start transferring the staged file.
    pub fn start_upload(&mut self) -> Result<(), UploadError> {
        if self.session.is_uploading() {
            return Err(UploadError::UploadInProgress);
        }
        let file = match (&self.session.file, self.session.status) {
            (Some(file), UploadStatus::Ready) => file.clone(),
            _ => return Err(UploadError::NoFileSelected),
        };
        let week_id = self.session.week_id.ok_or(UploadError::NoTargetContext)?;
        if let Some(seconds) = self.session.duration_seconds {
            if seconds < self.settings.min_duration_secs {
                return Err(UploadError::DurationTooShort {
                    seconds,
                    minimum: self.settings.min_duration_secs,
                });
            }
        }

        let metadata = LectureVideoMetadata {
            week_id,
            title: self.upload_title(&file),
            duration: self.session.formatted_duration.to_string(),
            filename: file.file_name.clone(),
            filetype: file.declared_type.clone(),
        };

        self.next_transfer_id += 1;
        let transfer_id = self.next_transfer_id;
        let request = TransferRequest {
            transfer_id,
            source: file,
            options: TransferOptions {
                endpoint: self.settings.endpoint.clone(),
                chunk_size: self.settings.chunk_size,
                retry_delays: Vec::new(),
                metadata: metadata.to_pairs(),
                headers: self.auth_headers(),
                resume_url: self.session.upload_url.clone(),
            },
        };

        info!(
            transfer_id,
            week_id,
            title = %metadata.title,
            resume = request.options.resume_url.is_some(),
            "Starting upload"
        );
        self.handle = Some(self.transfer.start(request, self.events_tx.clone()));
        self.session.status = UploadStatus::Uploading;
        self.session.progress = 0;
        self.session.error = None;
        self.session.success = false;
        Ok(())
    }

    /// Restart a failed upload with the file that is still staged.
    pub fn retry_upload(&mut self) -> Result<(), UploadError> {
        match self.session.status {
            UploadStatus::Uploading => return Err(UploadError::UploadInProgress),
            UploadStatus::Failed if self.session.file.is_some() => {}
            _ => return Err(UploadError::NoFileSelected),
        }
        self.session.status = UploadStatus::Ready;
        self.session.error = None;
        self.start_upload()
    }

    pub fn on_progress(&mut self, bytes_sent: u64, bytes_total: u64) {
        if !self.session.is_uploading() {
            return;
        }
        self.session.progress = progress_percent(bytes_sent, bytes_total);
    }

    pub fn on_error(&mut self, message: &str) {
        if !self.session.is_uploading() {
            return;
        }
        self.handle = None;
        warn!(error = %message, "Upload failed");
        self.session.status = UploadStatus::Failed;
        self.session.error = Some(UploadError::TransferFailed(message.to_string()).to_string());
    }

    pub fn on_success(&mut self) {
        if !self.session.is_uploading() {
            return;
        }
        self.handle = None;
        self.session.status = UploadStatus::Succeeded;
        self.session.progress = 100;
        self.session.success = true;
        self.session.error = None;
        info!(title = %self.session.title, "Upload succeeded");
        self.hooks.on_complete();
    }

    /// Abort the running transfer and return to Ready. No-op otherwise.
    pub fn cancel_upload(&mut self) {
        if !self.session.is_uploading() {
            return;
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        info!("Upload cancelled");
        self.session.progress = 0;
        self.session.upload_url = None;
        self.session.status = UploadStatus::Ready;
    }

    /// Clear everything except the target week.
    pub fn reset(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.session = UploadSession {
            week_id: self.session.week_id,
            input_generation: self.session.input_generation + 1,
            ..UploadSession::default()
        };
        debug!(generation = self.session.input_generation, "Upload session reset");
    }

    /// Dismiss the widget.
    pub fn close(&mut self) {
        let completed = self.session.status == UploadStatus::Succeeded;
        if !completed {
            self.hooks.on_dismiss();
        }
        self.reset();
    }

    /// Apply one transfer event, ignoring events from abandoned transfers.
    pub fn apply_event(&mut self, event: TransferEvent) {
        let current = self.handle.as_ref().map(TransferHandle::id);
        if current != Some(event.transfer_id()) {
            debug!(transfer_id = event.transfer_id(), "Discarding stale transfer event");
            return;
        }
        match event {
            TransferEvent::Created { upload_url, .. } => {
                self.session.upload_url = Some(upload_url);
            }
            TransferEvent::Progress {
                bytes_sent,
                bytes_total,
                ..
            } => self.on_progress(bytes_sent, bytes_total),
            TransferEvent::Success { upload_url, .. } => {
                self.session.upload_url = Some(upload_url);
                self.on_success();
            }
            TransferEvent::Error { message, .. } => self.on_error(&message),
        }
    }

    /// Apply every event already queued. Returns how many were taken.
    pub fn pump_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next transfer event without applying it.
    pub async fn next_event(&mut self) -> Option<TransferEvent> {
        self.events_rx.recv().await
    }

    /// Apply events until the session leaves Uploading.
    pub async fn wait_until_settled(&mut self) -> UploadStatus {
        while self.session.is_uploading() {
            match self.events_rx.recv().await {
                Some(event) => self.apply_event(event),
                None => break,
            }
        }
        self.session.status
    }
}
