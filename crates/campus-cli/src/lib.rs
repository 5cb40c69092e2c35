use std::fmt;

use campus_api_client::app_error;
use campus_core::models::{Page, Post};
use campus_core::{AppError, ErrorMetadata, LogLevel};
use serde::Serialize;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render a page of posts as a plain-text table.
pub fn format_post_table(page: &Page<Post>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<8} {:<40} {:<16} {:>6} {:>6}  {}\n",
        "ID", "TITLE", "AUTHOR", "VIEWS", "LIKES", "CREATED"
    ));
    out.push_str(&"-".repeat(96));
    out.push('\n');

    if page.content.is_empty() {
        out.push_str("\nNo posts found.\n");
    }
    for post in &page.content {
        out.push_str(&format!(
            "{:<8} {:<40} {:<16} {:>6} {:>6}  {}\n",
            post.id,
            truncate_string(&post.title, 40),
            truncate_string(&post.author, 16),
            post.view_count,
            post.like_count,
            post.created_at.format("%Y-%m-%d"),
        ));
    }

    out.push_str(&format!(
        "\nPage {}/{} ({} total)\n",
        page.page + 1,
        page.total_pages.max(1),
        page.total_elements
    ));
    if !page.is_last() {
        out.push_str("... (more posts available, use --page to see more)\n");
    }
    out
}

/// What a failed command prints on stderr.
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorReport {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<&'static str>,
    pub recoverable: bool,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.error)?;
        if let Some(action) = self.suggested_action {
            write!(f, "\n{}", action)?;
        }
        Ok(())
    }
}

fn log_app_error(err: &AppError) {
    let variant = err.variant_name();
    let details = err.detailed_message();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(variant, "{}", details),
        LogLevel::Warn => tracing::warn!(variant, "{}", details),
        LogLevel::Error => tracing::error!(variant, "{}", details),
    }
}

/// Describe a command failure, using the backend error metadata when there is one.
pub fn error_report(err: &anyhow::Error) -> ErrorReport {
    match app_error(err) {
        Some(app) => {
            log_app_error(app);
            ErrorReport {
                error: app.error_code(),
                status: Some(app.http_status_code()),
                message: app.client_message(),
                suggested_action: app.suggested_action(),
                recoverable: app.is_recoverable(),
            }
        }
        None => ErrorReport {
            error: "COMMAND_FAILED",
            status: None,
            message: format!("{:#}", err),
            suggested_action: None,
            recoverable: false,
        },
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn truncate_string_counts_characters() {
        assert_eq!(truncate_string("수강신청 안내", 7), "수강신청 안내");
        assert_eq!(truncate_string("수강신청 일정 변경 안내", 7), "수강신청...");
    }

    #[test]
    fn error_report_uses_backend_metadata() {
        let err = anyhow::Error::new(AppError::from_status(403, "professors only"))
            .context("List posts failed");
        let report = error_report(&err);
        assert_eq!(report.error, "FORBIDDEN");
        assert_eq!(report.status, Some(403));
        assert_eq!(report.message, "접근 권한이 없습니다.");
        assert_eq!(
            report.suggested_action,
            Some("This board is not available for your role")
        );
        assert!(!report.recoverable);
        assert!(report.to_string().contains("(FORBIDDEN)"));

        let report = error_report(&anyhow::Error::new(AppError::from_status(503, "maintenance")));
        assert_eq!(report.error, "UPSTREAM_ERROR");
        assert!(report.recoverable);
    }

    #[test]
    fn error_report_falls_back_to_error_chain() {
        let err = anyhow::anyhow!("connection refused").context("Failed to probe a.mp4");
        let report = error_report(&err);
        assert_eq!(report.error, "COMMAND_FAILED");
        assert_eq!(report.status, None);
        assert_eq!(report.message, "Failed to probe a.mp4: connection refused");

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("status").is_none());
    }

    #[test]
    fn post_table_lists_rows_and_paging() {
        let page: Page<Post> = serde_json::from_value(serde_json::json!({
            "content": [{
                "id": 12,
                "title": "중간고사 일정 안내",
                "author": "학사팀",
                "viewCount": 31,
                "likeCount": 2,
                "createdAt": "2024-03-04T09:00:00Z"
            }],
            "number": 0,
            "size": 10,
            "totalElements": 11,
            "totalPages": 2
        }))
        .unwrap();

        let table = format_post_table(&page);
        assert!(table.contains("중간고사 일정 안내"));
        assert!(table.contains("2024-03-04"));
        assert!(table.contains("Page 1/2 (11 total)"));
        assert!(table.contains("--page"));
    }
}
