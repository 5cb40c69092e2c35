//! `campus upload`: drives one upload session from the terminal.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use campus_core::Config;
use campus_processing::{FfprobeDurationProbe, SourceFile};
use campus_upload::{
    SurfaceView, TusClient, UploadHooks, UploadSession, UploadSessionController, UploadSettings,
    UploadStatus,
};
use serde::Serialize;
use tracing::{info, warn};

const CANCELLED_MESSAGE: &str = "업로드를 취소했습니다.";

struct LogHooks;

impl UploadHooks for LogHooks {
    fn on_complete(&self) {
        info!("Lecture video uploaded");
    }

    fn on_dismiss(&self) {
        info!("Upload dismissed without completing");
    }
}

#[derive(Serialize)]
pub struct UploadSummary {
    pub status: UploadStatus,
    pub title: String,
    pub duration: String,
    pub upload_url: Option<String>,
    pub message: Option<String>,
}

impl UploadSummary {
    /// `upload_url` overrides the session's, which a cancel clears.
    fn from_session(session: &UploadSession, upload_url: Option<String>) -> Self {
        Self {
            status: session.status,
            title: session.title.clone(),
            duration: session.formatted_duration.to_string(),
            upload_url: upload_url.or_else(|| session.upload_url.clone()),
            message: session.error.clone(),
        }
    }

    /// Turn anything but a completed upload into an error.
    pub fn ensure_succeeded(&self) -> Result<()> {
        if self.status == UploadStatus::Succeeded {
            return Ok(());
        }
        let message = self.message.as_deref().unwrap_or(CANCELLED_MESSAGE);
        match &self.upload_url {
            Some(url) => bail!("{} (continue with --resume {})", message, url),
            None => bail!("{}", message),
        }
    }
}

fn render(view: &SurfaceView) {
    let mut stderr = std::io::stderr();
    match view {
        SurfaceView::Progress { .. } => {
            let _ = write!(stderr, "\r{}", view);
        }
        _ => {
            let _ = writeln!(stderr, "\r{}", view);
        }
    }
    let _ = stderr.flush();
}

pub async fn run(
    config: &Config,
    file: &Path,
    week_id: i64,
    title: Option<String>,
    resume: Option<String>,
) -> Result<UploadSummary> {
    let source = SourceFile::from_path(file)
        .await
        .with_context(|| format!("Failed to open {}", file.display()))?;

    let transfer = TusClient::new(Some(Duration::from_secs(config.http_timeout_secs())))
        .context("Failed to create upload client")?;
    let mut controller = UploadSessionController::new(
        UploadSettings::from_config(config),
        Arc::new(FfprobeDurationProbe::new(config.ffprobe_path().to_string())),
        Arc::new(transfer),
        Arc::new(LogHooks),
    );

    controller.set_week(week_id);
    if let Some(title) = title {
        controller.set_title(title);
    }
    controller.select_file(source).await?;
    render(&controller.view());

    if let Some(url) = resume {
        controller.set_resume_url(url);
    }
    controller.start_upload()?;
    render(&controller.view());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut interrupted_url = None;
    while controller.session().is_uploading() {
        tokio::select! {
            event = controller.next_event() => match event {
                Some(event) => controller.apply_event(event),
                None => break,
            },
            _ = &mut ctrl_c => {
                interrupted_url = controller.session().upload_url.clone();
                if let Some(url) = &interrupted_url {
                    warn!(upload_url = %url, "Upload interrupted; pass --resume to continue");
                }
                controller.cancel_upload();
                eprintln!();
                eprintln!("{}", CANCELLED_MESSAGE);
                break;
            }
        }
        render(&controller.view());
    }

    let summary = UploadSummary::from_session(controller.session(), interrupted_url);
    controller.close();
    Ok(summary)
}
