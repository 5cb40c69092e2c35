//! Decoded video metadata

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct FFprobeOutput {
    pub format: Option<FFprobeFormat>,
    pub streams: Option<Vec<FFprobeStream>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FFprobeFormat {
    pub duration: Option<String>,
    pub bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FFprobeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration: Option<String>,
}

/// Video metadata read back from the probe.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoMetadata {
    /// Raw duration in seconds as reported; may be non-finite or negative.
    pub duration: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub codec: Option<String>,
    pub bitrate: Option<u64>,
}

impl VideoMetadata {
    pub(crate) fn from_ffprobe(output: FFprobeOutput) -> Self {
        let video_stream = output.streams.and_then(|streams| {
            streams
                .into_iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
        });

        // Container duration first, then the video stream's own duration.
        let duration = output
            .format
            .as_ref()
            .and_then(|f| f.duration.as_ref())
            .and_then(|d| d.parse::<f64>().ok())
            .or_else(|| {
                video_stream
                    .as_ref()
                    .and_then(|s| s.duration.as_ref())
                    .and_then(|d| d.parse::<f64>().ok())
            });

        let bitrate = output
            .format
            .as_ref()
            .and_then(|f| f.bit_rate.as_ref())
            .and_then(|b| b.parse::<u64>().ok());

        VideoMetadata {
            duration,
            width: video_stream.as_ref().and_then(|s| s.width),
            height: video_stream.as_ref().and_then(|s| s.height),
            codec: video_stream.and_then(|s| s.codec_name),
            bitrate,
        }
    }

    /// Parse ffprobe's `-of json` output.
    pub fn from_ffprobe_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        let output: FFprobeOutput = serde_json::from_slice(data)?;
        Ok(Self::from_ffprobe(output))
    }
}
