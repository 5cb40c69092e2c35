//! Playback duration display.
//!
//! Durations are formatted once from seconds; the resulting [`DurationText`]
//! is carried around as-is and never parsed back or reformatted.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Formats seconds as `H:MM:SS` when at least an hour long, otherwise `M:SS`.
///
/// Fractional seconds are truncated. Non-finite or negative input formats as
/// `0:00`.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// A duration rendered for display, derived from a seconds value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct DurationText(String);

impl DurationText {
    pub fn from_seconds(seconds: f64) -> Self {
        DurationText(format_duration(seconds))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for DurationText {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
