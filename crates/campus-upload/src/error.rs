//! Upload error taxonomy.
//!
//! Display strings are the inline messages shown to the uploader.

use campus_core::format_duration;

fn whole_seconds(seconds: &f64) -> u64 {
    if seconds.is_finite() && *seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}

fn clock(seconds: &f64) -> String {
    format_duration(*seconds)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UploadError {
    #[error("동영상 파일만 업로드할 수 있습니다. (선택한 형식: {content_type})")]
    InvalidFileType { content_type: String },

    #[error(
        "영상 길이가 너무 짧습니다. 최소 {}초 이상의 영상만 업로드할 수 있습니다. (현재 길이: {}초, {})",
        whole_seconds(.minimum),
        whole_seconds(.seconds),
        clock(.seconds)
    )]
    DurationTooShort { seconds: f64, minimum: f64 },

    #[error("업로드할 동영상 파일을 선택해주세요.")]
    NoFileSelected,

    #[error("업로드할 주차 정보가 없습니다.")]
    NoTargetContext,

    #[error("이미 업로드가 진행 중입니다.")]
    UploadInProgress,

    #[error("영상 정보를 읽지 못했습니다: {0}")]
    ProbeFailed(String),

    #[error("업로드 중 오류가 발생했습니다: {0}. 잠시 후 다시 시도해주세요.")]
    TransferFailed(String),
}
