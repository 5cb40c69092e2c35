use serde::{Deserialize, Serialize};

/// One week of a course; the destination of an instructor video upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LectureWeek {
    pub id: i64,
    pub course_id: i64,
    pub week_number: u32,
    #[serde(default)]
    pub title: Option<String>,
}

/// Metadata attached to a lecture video upload.
#[derive(Debug, Clone, PartialEq)]
pub struct LectureVideoMetadata {
    pub week_id: i64,
    pub title: String,
    /// Display duration, e.g. "2:05". Empty when the duration is unknown.
    pub duration: String,
    pub filename: String,
    pub filetype: String,
}

impl LectureVideoMetadata {
    /// Key/value pairs in the order they are sent to the upload server.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("weekId".to_string(), self.week_id.to_string()),
            ("title".to_string(), self.title.clone()),
            ("duration".to_string(), self.duration.clone()),
            ("filename".to_string(), self.filename.clone()),
            ("filetype".to_string(), self.filetype.clone()),
        ]
    }
}
