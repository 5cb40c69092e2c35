//! What the host shows for a given session state.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;

use crate::session::{UploadSession, UploadStatus};

const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum SurfaceView {
    DropTarget {
        error: Option<String>,
    },
    MetadataForm {
        file_name: String,
        title: String,
        duration: String,
        error: Option<String>,
    },
    Progress {
        percent: u8,
    },
    Success {
        title: String,
        duration: String,
    },
    Failed {
        message: String,
    },
}

impl From<&UploadSession> for SurfaceView {
    fn from(session: &UploadSession) -> Self {
        match session.status {
            UploadStatus::Idle | UploadStatus::FileRejected => SurfaceView::DropTarget {
                error: session.error.clone(),
            },
            UploadStatus::Ready => SurfaceView::MetadataForm {
                file_name: session
                    .file
                    .as_ref()
                    .map(|f| f.file_name.clone())
                    .unwrap_or_default(),
                title: session.title.clone(),
                duration: session.formatted_duration.to_string(),
                error: session.error.clone(),
            },
            UploadStatus::Uploading => SurfaceView::Progress {
                percent: session.progress,
            },
            UploadStatus::Succeeded => SurfaceView::Success {
                title: session.title.clone(),
                duration: session.formatted_duration.to_string(),
            },
            UploadStatus::Failed => SurfaceView::Failed {
                message: session.error.clone().unwrap_or_default(),
            },
        }
    }
}

/// `[#######-------]  50%`
pub fn render_progress_bar(percent: u8, width: usize) -> String {
    let percent = percent.min(100) as usize;
    let filled = width * percent / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        percent
    )
}

fn or_unknown(duration: &str) -> &str {
    if duration.is_empty() {
        "알 수 없음"
    } else {
        duration
    }
}

impl Display for SurfaceView {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SurfaceView::DropTarget { error } => {
                write!(f, "업로드할 동영상 파일을 선택하세요.")?;
                if let Some(error) = error {
                    write!(f, "\n{}", error)?;
                }
                Ok(())
            }
            SurfaceView::MetadataForm {
                file_name,
                title,
                duration,
                error,
            } => {
                write!(
                    f,
                    "파일: {}\n제목: {}\n길이: {}",
                    file_name,
                    title,
                    or_unknown(duration)
                )?;
                if let Some(error) = error {
                    write!(f, "\n{}", error)?;
                }
                Ok(())
            }
            SurfaceView::Progress { percent } => {
                write!(f, "업로드 중 {}", render_progress_bar(*percent, BAR_WIDTH))
            }
            SurfaceView::Success { title, duration } => {
                write!(f, "업로드 완료: {} ({})", title, or_unknown(duration))
            }
            SurfaceView::Failed { message } => {
                f.write_str(message)
            }
        }
    }
}
