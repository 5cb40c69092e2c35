//! Duration probe - reads a video's playback length without decoding it fully

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, error};

use crate::metadata::VideoMetadata;
use crate::source::SourceFile;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Failed to run ffprobe: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffprobe failed: {0}")]
    Failed(String),

    #[error("Failed to parse ffprobe output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-finite or negative readings mean "unknown".
pub fn sanitize_duration(raw: Option<f64>) -> Option<f64> {
    raw.filter(|d| d.is_finite() && *d >= 0.0)
}

/// Produces a file's duration in seconds, `Ok(None)` when it cannot be known.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    async fn probe(&self, file: &SourceFile) -> Result<Option<f64>, ProbeError>;
}

/// Probe backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeDurationProbe {
    ffprobe_path: String,
}

impl Default for FfprobeDurationProbe {
    fn default() -> Self {
        Self::new("ffprobe".to_string())
    }
}

impl FfprobeDurationProbe {
    pub fn new(ffprobe_path: String) -> Self {
        Self { ffprobe_path }
    }

    /// Extract video metadata from a file on disk.
    #[tracing::instrument(skip(self, path), fields(service = "probe"))]
    pub async fn metadata_from_path(&self, path: &Path) -> Result<VideoMetadata, ProbeError> {
        debug!("Probing media metadata: {}", path.display());

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-show_format", "-show_streams", "-of", "json"])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(ProbeError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("ffprobe failed: {}", stderr);
            return Err(ProbeError::Failed(stderr));
        }

        Ok(VideoMetadata::from_ffprobe_json(&output.stdout)?)
    }

    /// Probe in-memory data by binding it to a temporary file.
    ///
    /// The temporary file is removed when this returns, on success and on error.
    pub async fn metadata_from_bytes(&self, data: &[u8]) -> Result<VideoMetadata, ProbeError> {
        let temp_file = tempfile::NamedTempFile::new()?;
        tokio::fs::write(temp_file.path(), data).await?;
        self.metadata_from_path(temp_file.path()).await
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn probe(&self, file: &SourceFile) -> Result<Option<f64>, ProbeError> {
        let metadata = self.metadata_from_path(&file.path).await?;
        Ok(sanitize_duration(metadata.duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_duration() {
        assert_eq!(sanitize_duration(Some(12.5)), Some(12.5));
        assert_eq!(sanitize_duration(Some(0.0)), Some(0.0));
        assert_eq!(sanitize_duration(Some(-1.0)), None);
        assert_eq!(sanitize_duration(Some(f64::NAN)), None);
        assert_eq!(sanitize_duration(Some(f64::INFINITY)), None);
        assert_eq!(sanitize_duration(None), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let probe = FfprobeDurationProbe::new("/nonexistent/ffprobe-binary".to_string());
        let file = SourceFile::new("/tmp/whatever.mp4", "video/mp4", 1);
        let err = probe.probe(&file).await.unwrap_err();
        assert!(matches!(err, ProbeError::Spawn(_)));
    }

    #[cfg(unix)]
    fn fake_ffprobe(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("ffprobe");
        std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        script.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_reads_duration() {
        let dir = tempfile::tempdir().unwrap();
        let ffprobe = fake_ffprobe(
            dir.path(),
            r#"echo '{"format": {"duration": "125.2"}}'"#,
        );
        let probe = FfprobeDurationProbe::new(ffprobe);
        let file = SourceFile::new("/tmp/lecture.mp4", "video/mp4", 1);
        assert_eq!(probe.probe(&file).await.unwrap(), Some(125.2));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_unknown_duration() {
        let dir = tempfile::tempdir().unwrap();
        let ffprobe = fake_ffprobe(dir.path(), r#"echo '{"format": {"duration": "N/A"}}'"#);
        let probe = FfprobeDurationProbe::new(ffprobe);
        let file = SourceFile::new("/tmp/stream.mp4", "video/mp4", 1);
        assert_eq!(probe.probe(&file).await.unwrap(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_failure_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let ffprobe = fake_ffprobe(dir.path(), "echo 'moov atom not found' >&2; exit 1");
        let probe = FfprobeDurationProbe::new(ffprobe);
        let file = SourceFile::new("/tmp/broken.mp4", "video/mp4", 1);
        match probe.probe(&file).await {
            Err(ProbeError::Failed(msg)) => assert!(msg.contains("moov atom")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bytes_are_probed_through_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let seen = dir.path().join("seen");
        // Records the path it was given and reports a duration only if it exists.
        let ffprobe = fake_ffprobe(
            dir.path(),
            &format!(
                r#"for last; do :; done
echo "$last" > {}
if [ -f "$last" ]; then echo '{{"format": {{"duration": "30"}}}}'; else exit 1; fi"#,
                seen.display()
            ),
        );
        let probe = FfprobeDurationProbe::new(ffprobe);
        let meta = probe.metadata_from_bytes(b"fake video").await.unwrap();
        assert_eq!(meta.duration, Some(30.0));

        let temp_path = std::fs::read_to_string(&seen).unwrap();
        assert!(!Path::new(temp_path.trim()).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_temp_file_removed_when_ffprobe_fails() {
        let dir = tempfile::tempdir().unwrap();
        let seen = dir.path().join("seen");
        let ffprobe = fake_ffprobe(
            dir.path(),
            &format!(
                "for last; do :; done\necho \"$last\" > {}\necho 'invalid data' >&2; exit 1",
                seen.display()
            ),
        );
        let probe = FfprobeDurationProbe::new(ffprobe);
        let err = probe.metadata_from_bytes(b"not a video").await.unwrap_err();
        assert!(matches!(err, ProbeError::Failed(_)));

        let temp_path = std::fs::read_to_string(&seen).unwrap();
        assert!(!temp_path.trim().is_empty());
        assert!(!Path::new(temp_path.trim()).exists());
    }
}
