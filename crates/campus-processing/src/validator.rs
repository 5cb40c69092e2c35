use campus_core::constants::VIDEO_MIME_PREFIX;
use std::path::Path;

/// Validation errors for a selected media file
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Not a video file: {content_type}")]
    NotVideo { content_type: String },
}

/// Lowercased extension of `filename`, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Content type a file with this extension is declared as.
pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    let content_type = match extension.to_lowercase().as_str() {
        // Videos
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "m4v" => "video/x-m4v",
        "mpeg" | "mpg" => "video/mpeg",
        "ogv" => "video/ogg",
        "wmv" => "video/x-ms-wmv",
        "3gp" => "video/3gpp",
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        // Documents
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(content_type)
}

/// Content type for a filename, falling back to `application/octet-stream`.
pub fn declared_type_for(filename: &str) -> String {
    extension_of(filename)
        .and_then(|ext| content_type_for_extension(&ext))
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// True when the declared type is a `video/*` type.
pub fn is_video_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .to_lowercase()
        .starts_with(VIDEO_MIME_PREFIX)
}

/// Accept only declared video types.
pub fn validate_video_type(content_type: &str) -> Result<(), ValidationError> {
    if is_video_content_type(content_type) {
        Ok(())
    } else {
        Err(ValidationError::NotVideo {
            content_type: content_type.to_string(),
        })
    }
}
