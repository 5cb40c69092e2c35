//! Domain methods for the portal API client.
//!
//! Every board type goes through the same handful of methods; the
//! [`BoardKind`] only selects the path segment.

use crate::ApiClient;
use anyhow::{Context, Result};
use campus_core::models::{
    BoardKind, Course, CourseFilter, LectureWeek, LikeResponse, NewPost, Page, PageQuery, Post,
    PostUpdate,
};

fn posts_path(kind: BoardKind) -> String {
    format!("/boards/{}/posts", kind.config().segment)
}

fn post_path(kind: BoardKind, post_id: i64) -> String {
    format!("{}/{}", posts_path(kind), post_id)
}

impl ApiClient {
    /// List posts of a board with pagination and optional search term.
    #[tracing::instrument(skip(self, query), fields(board = %kind))]
    pub async fn list_posts(&self, kind: BoardKind, query: &PageQuery) -> Result<Page<Post>> {
        self.get(&posts_path(kind), &query.to_query())
            .await
            .with_context(|| format!("Failed to list {} posts", kind))
    }

    /// List posts, then narrow the page to a hashtag on the client side.
    pub async fn list_posts_tagged(
        &self,
        kind: BoardKind,
        query: &PageQuery,
        hashtag: Option<&str>,
    ) -> Result<Page<Post>> {
        let page = self.list_posts(kind, query).await?;
        Ok(page.filter_hashtag(hashtag))
    }

    /// Get a single post by ID.
    pub async fn get_post(&self, kind: BoardKind, post_id: i64) -> Result<Post> {
        self.get(&post_path(kind, post_id), &[]).await
    }

    /// Create a post; the payload is validated before any request is sent.
    pub async fn create_post(&self, kind: BoardKind, post: &NewPost) -> Result<Post> {
        post.validate()?;
        self.post_json(&posts_path(kind), post).await
    }

    /// Update a post. An empty update is rejected locally.
    pub async fn update_post(
        &self,
        kind: BoardKind,
        post_id: i64,
        update: &PostUpdate,
    ) -> Result<Post> {
        if update.is_empty() {
            return Err(campus_core::AppError::InvalidInput(
                "수정할 내용이 없습니다.".to_string(),
            )
            .into());
        }
        self.put_json(&post_path(kind, post_id), update).await
    }

    /// Delete a post by ID.
    pub async fn delete_post(&self, kind: BoardKind, post_id: i64) -> Result<()> {
        self.delete(&post_path(kind, post_id)).await
    }

    /// Toggle the current user's like on a post.
    pub async fn like_post(&self, kind: BoardKind, post_id: i64) -> Result<LikeResponse> {
        self.post_empty(&format!("{}/like", post_path(kind, post_id)))
            .await
    }

    /// Search courses. The filter is sent to the backend and re-applied
    /// locally so a backend that ignores a parameter still yields a
    /// consistent list.
    #[tracing::instrument(skip(self))]
    pub async fn search_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>> {
        let courses: Vec<Course> = self
            .get("/courses", &filter.to_query())
            .await
            .context("Failed to search courses")?;
        Ok(filter.apply(courses))
    }

    /// List the lecture weeks of a course (upload destinations).
    pub async fn list_weeks(&self, course_id: i64) -> Result<Vec<LectureWeek>> {
        let mut weeks: Vec<LectureWeek> = self
            .get(&format!("/courses/{}/weeks", course_id), &[])
            .await?;
        weeks.sort_by_key(|w| w.week_number);
        Ok(weeks)
    }
}

#[cfg(test)]
mod tests {
    use crate::{app_error, ApiClient, Auth};
    use campus_core::models::{BoardKind, CourseFilter, NewPost, PageQuery, PostUpdate};
    use campus_core::AppError;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> ApiClient {
        ApiClient::new(server.url(), Auth::Bearer("secret".to_string())).unwrap()
    }

    const PAGE_BODY: &str = r#"{
        "content": [
            {"id": 1, "title": "장학금 안내", "author": "admin", "hashtags": ["장학"], "createdAt": "2024-03-01T09:00:00Z"},
            {"id": 2, "title": "축제 안내", "author": "admin", "hashtags": ["행사"], "createdAt": "2024-03-02T09:00:00Z"}
        ],
        "number": 0, "size": 10, "totalElements": 2, "totalPages": 1
    }"#;

    #[tokio::test]
    async fn test_list_posts_sends_paging_and_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/boards/notice/posts")
            .match_header("authorization", "Bearer secret")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "0".into()),
                Matcher::UrlEncoded("size".into(), "10".into()),
                Matcher::UrlEncoded("search".into(), "안내".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PAGE_BODY)
            .create_async()
            .await;

        let client = client_for(&server);
        let page = client
            .list_posts(BoardKind::Notice, &PageQuery::default().with_search("안내"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_list_posts_tagged_filters_locally() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/boards/notice/posts")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PAGE_BODY)
            .create_async()
            .await;

        let client = client_for(&server);
        let page = client
            .list_posts_tagged(BoardKind::Notice, &PageQuery::default(), Some("#행사"))
            .await
            .unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].id, 2);
    }

    #[tokio::test]
    async fn test_forbidden_and_not_found_are_distinguished() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/boards/professor/posts/5")
            .with_status(403)
            .with_body("professors only")
            .create_async()
            .await;
        server
            .mock("GET", "/api/v1/boards/notice/posts/99")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("DELETE", "/api/v1/boards/notice/posts/3")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = client_for(&server);

        let err = client.get_post(BoardKind::Professor, 5).await.unwrap_err();
        assert!(matches!(app_error(&err), Some(AppError::Forbidden(msg)) if msg == "professors only"));

        let err = client.get_post(BoardKind::Notice, 99).await.unwrap_err();
        assert!(matches!(app_error(&err), Some(AppError::NotFound(_))));

        let err = client.delete_post(BoardKind::Notice, 3).await.unwrap_err();
        assert!(matches!(
            app_error(&err),
            Some(AppError::Upstream { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_create_post_validates_before_sending() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/boards/student/posts")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .create_post(BoardKind::Student, &NewPost::new("", "body"))
            .await
            .unwrap_err();
        assert!(matches!(app_error(&err), Some(AppError::InvalidInput(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_update_and_like() {
        let mut server = mockito::Server::new_async().await;
        let post_body = r#"{"id": 10, "title": "스터디 모집", "content": "주 2회", "author": "s1", "hashtags": ["스터디"], "createdAt": "2024-03-01T09:00:00Z"}"#;
        let create = server
            .mock("POST", "/api/v1/boards/student/posts")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "title": "스터디 모집",
                "hashtags": ["스터디"]
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(post_body)
            .create_async()
            .await;
        let update = server
            .mock("PUT", "/api/v1/boards/student/posts/10")
            .match_body(Matcher::Json(serde_json::json!({ "content": "주 3회" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(post_body)
            .create_async()
            .await;
        let like = server
            .mock("POST", "/api/v1/boards/student/posts/10/like")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"liked": true, "likeCount": 4}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let created = client
            .create_post(
                BoardKind::Student,
                &NewPost::new("스터디 모집", "주 2회").with_hashtags(["#스터디"]),
            )
            .await
            .unwrap();
        assert_eq!(created.id, 10);

        let update_body = PostUpdate {
            content: Some("주 3회".to_string()),
            ..Default::default()
        };
        client
            .update_post(BoardKind::Student, 10, &update_body)
            .await
            .unwrap();

        let liked = client.like_post(BoardKind::Student, 10).await.unwrap();
        assert!(liked.liked);
        assert_eq!(liked.like_count, 4);

        create.assert_async().await;
        update.assert_async().await;
        like.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_courses_reapplies_filter() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/courses")
            .match_query(Matcher::UrlEncoded("credits".into(), "4".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                {"id": 1, "code": "CSE101", "name": "Programming", "professor": "Kim", "department": "CS", "credits": 3},
                {"id": 3, "code": "CSE301", "name": "Operating Systems", "professor": "Park", "department": "CS", "credits": 4}
            ]"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let filter = CourseFilter {
            credits: Some(4),
            ..Default::default()
        };
        let courses = client.search_courses(&filter).await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].code, "CSE301");
    }

    #[tokio::test]
    async fn test_list_weeks_sorted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/courses/3/weeks")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                {"id": 12, "courseId": 3, "weekNumber": 2},
                {"id": 11, "courseId": 3, "weekNumber": 1, "title": "OT"}
            ]"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let weeks = client.list_weeks(3).await.unwrap();
        assert_eq!(weeks[0].id, 11);
        assert_eq!(weeks[1].week_number, 2);
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let server = mockito::Server::new_async().await;
        let client = client_for(&server);
        let err = client
            .update_post(BoardKind::Notice, 1, &PostUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(app_error(&err), Some(AppError::InvalidInput(_))));
    }
}
