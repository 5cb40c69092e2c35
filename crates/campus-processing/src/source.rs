//! The selected local file.

use std::path::{Path, PathBuf};

use crate::validator::declared_type_for;

/// A local file chosen for upload, with the media type it is declared as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_name: String,
    pub declared_type: String,
    pub size: u64,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, declared_type: impl Into<String>, size: u64) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Self {
            path,
            file_name,
            declared_type: declared_type.into(),
            size,
        }
    }

    /// Stat the file and derive its declared type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let declared = declared_type_for(&path.to_string_lossy());
        Ok(Self::new(path, declared, metadata.len()))
    }

    /// File name with the last extension stripped; used as the default title.
    pub fn title_stem(&self) -> String {
        match self.file_name.rfind('.') {
            Some(idx) if idx > 0 => self.file_name[..idx].to_string(),
            _ => self.file_name.clone(),
        }
    }
}
