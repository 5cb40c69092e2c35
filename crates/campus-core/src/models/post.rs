use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::page::Page;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub liked: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn has_hashtag(&self, tag: &str) -> bool {
        let wanted = normalize_hashtag(tag);
        self.hashtags.iter().any(|t| normalize_hashtag(t) == wanted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashtags: Vec<String>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            hashtags: Vec::new(),
        }
    }

    pub fn with_hashtags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.hashtags = tags
            .into_iter()
            .map(|t| normalize_hashtag(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    pub fn validate(&self) -> Result<(), crate::AppError> {
        if self.title.trim().is_empty() {
            return Err(crate::AppError::InvalidInput(
                "제목을 입력해주세요.".to_string(),
            ));
        }
        if self.content.trim().is_empty() {
            return Err(crate::AppError::InvalidInput(
                "내용을 입력해주세요.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update; unset fields are left unchanged by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.hashtags.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: u64,
}

/// Canonical form of a topic label: no leading `#`, trimmed, lowercase.
pub fn normalize_hashtag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').trim().to_lowercase()
}

/// Narrows posts to those carrying `tag`.
///
/// `None`, an empty tag or the "전체" (all) label keep every post.
pub fn filter_by_hashtag(posts: Vec<Post>, tag: Option<&str>) -> Vec<Post> {
    match tag.map(normalize_hashtag) {
        Some(tag) if !tag.is_empty() && tag != "전체" => {
            posts.into_iter().filter(|p| p.has_hashtag(&tag)).collect()
        }
        _ => posts,
    }
}

impl Page<Post> {
    /// Applies [`filter_by_hashtag`] to this page's content.
    pub fn filter_hashtag(self, tag: Option<&str>) -> Page<Post> {
        self.map_content(|posts| filter_by_hashtag(posts, tag))
    }
}
