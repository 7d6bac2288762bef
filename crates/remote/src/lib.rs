use anyhow::{bail, Context};
use domain::{protocol::ErrorBody, Upload};
use reqwest::{multipart::Part, Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
mod repo;

/// HTTP client for the forum API. Cheap to clone.
#[derive(Clone)]
pub struct Api {
    pub(crate) http: Client,
    pub(crate) base: Url,
}

impl Api {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            bail!("API base URL must be an http(s) URL: {}", base_url);
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    // 每一段都会被转义，分类名里可能有空格
    pub(crate) fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

pub(crate) async fn expect_success(resp: Response) -> anyhow::Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(e) => e.error,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => body,
    };
    bail!("HTTP {}: {}", status.as_u16(), message)
}

pub(crate) async fn read_json<T: DeserializeOwned>(resp: Response) -> anyhow::Result<T> {
    let resp = expect_success(resp).await?;
    resp.json::<T>()
        .await
        .context("Malformed response body")
}

pub(crate) fn file_part(upload: &Upload) -> anyhow::Result<Part> {
    Part::bytes(upload.bytes.clone())
        .file_name(upload.file_name.clone())
        .mime_str(upload.mime())
        .context("Invalid upload MIME type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Multipart, Path, Query},
        http::StatusCode,
        routing::{delete, get, post},
        Json, Router,
    };
    use domain::{CommentId, NewPost, PostId, UserId};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn list_posts(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
        let liked = q.get("userId").map(|u| u == "7").unwrap_or(false);
        Json(json!([
            { "id": 2, "title": "Post 2", "content": "b", "likes": 5, "comments": 1,
              "img": null, "likedByUser": liked },
            { "id": 1, "title": "Post 1", "content": "a", "likes": 0, "comments": 0 }
        ]))
    }

    async fn toggle_like(
        Path(id): Path<String>,
        Query(q): Query<HashMap<String, String>>,
    ) -> Result<Json<Value>, StatusCode> {
        if q.get("userId").is_none() {
            return Err(StatusCode::BAD_REQUEST);
        }
        Ok(Json(json!({
            "id": id.parse::<i64>().unwrap(), "title": "t", "content": "c",
            "likes": 6, "comments": 0, "likedByUser": true
        })))
    }

    async fn list_comments(Path(_id): Path<String>) -> Json<Value> {
        Json(json!([
            { "id": 20, "content": "top", "createdAt": "2024-03-01T09:00:00",
              "parentId": null,
              "author": { "id": 7, "username": "ana" },
              "replies": [
                  { "id": 21, "content": "re", "createdAt": "2024-03-01T09:05", "parentId": 20,
                    "author": { "id": 8, "username": "bo" } }
              ] }
        ]))
    }

    async fn create_comment(Path(_id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
        Json(json!({
            "id": 30, "content": body["content"], "createdAt": "2024-03-02T10:00:00.5",
            "parentId": body.get("parentId").cloned().unwrap_or(Value::Null),
            "author": { "id": body["userId"], "username": "ana" }
        }))
    }

    async fn delete_comment() -> (StatusCode, Json<Value>) {
        (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "No puedes eliminar este comentario" })),
        )
    }

    async fn by_category(Path(category): Path<String>) -> Json<Value> {
        Json(json!([
            { "id": 1, "title": "t", "summary": "s", "category": category,
              "createdAt": "2024-01-01T00:00:00" }
        ]))
    }

    async fn create_post(mut form: Multipart) -> Json<Value> {
        let mut fields = HashMap::new();
        while let Some(field) = form.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file = field.file_name().map(str::to_string);
            let text = match file {
                Some(f) => f,
                None => field.text().await.unwrap(),
            };
            fields.insert(name, text);
        }
        Json(json!({
            "id": 99, "title": fields["title"], "content": fields["content"],
            "likes": 0, "comments": 0,
            "img": fields.get("image").map(|f| format!("http://localhost:8080/uploads/{}", f)),
            "likedByUser": false,
            "author": fields.get("userId").map(|u| json!({ "id": u.parse::<i64>().unwrap(), "username": "ana" }))
        }))
    }

    async fn liked_posts(Path(_id): Path<String>) -> Json<Value> {
        Json(json!([
            { "id": 5, "title": "Post 5", "content": "e", "likes": 3, "comments": 0 }
        ]))
    }

    async fn spawn_fake() -> Api {
        let app = Router::new()
            .route("/api/posts", get(list_posts).post(create_post))
            .route("/api/posts/:id/like", post(toggle_like))
            .route(
                "/api/posts/:id/comments",
                get(list_comments).post(create_comment),
            )
            .route("/api/posts/:id/comments/:cid", delete(delete_comment))
            .route("/api/users/:id/liked-posts", get(liked_posts))
            .route("/api/articles/category/:category", get(by_category));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Api::new(&format!("http://{}/api", addr), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(Api::new("ftp://example.org/api", Duration::from_secs(1)).is_err());
        assert!(Api::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn endpoint_escapes_segments() {
        let api = Api::new("http://localhost:8080/api/", Duration::from_secs(1)).unwrap();
        let url = api
            .endpoint(&["articles", "category", "Redes Sociales"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/articles/category/Redes%20Sociales"
        );
    }

    #[tokio::test]
    async fn feed_carries_viewer_like_flags() {
        let api = spawn_fake().await;
        let viewer = UserId::new("7").unwrap();
        let posts = api.list_posts(Some(&viewer)).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert!(posts[0].liked_by_viewer);
        assert_eq!(posts[0].comment_count, 1);
        assert!(!posts[1].liked_by_viewer);

        let anonymous = api.list_posts(None).await.unwrap();
        assert!(!anonymous[0].liked_by_viewer);
    }

    #[tokio::test]
    async fn like_and_comment_round_trip() {
        let api = spawn_fake().await;
        let post_id = PostId::new("1").unwrap();
        let user = UserId::new("7").unwrap();

        let state = api.toggle_like(&post_id, &user).await.unwrap();
        assert_eq!(state.likes, 6);
        assert!(state.liked_by_user);

        let tree = api.list_comments(&post_id).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].replies[0].parent_id.as_str(), "20");

        let parent = CommentId::new("20").unwrap();
        let created = api
            .create_comment(&post_id, &user, "hola", Some(&parent))
            .await
            .unwrap();
        assert!(matches!(created, domain::protocol::CommentRecord::Reply(r) if r.content == "hola"));
    }

    #[tokio::test]
    async fn service_error_message_is_surfaced() {
        let api = spawn_fake().await;
        let err = api
            .delete_comment(
                &PostId::new("1").unwrap(),
                &CommentId::new("20").unwrap(),
                &UserId::new("8").unwrap(),
            )
            .await
            .unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("403"), "{}", msg);
        assert!(msg.contains("No puedes eliminar"), "{}", msg);
    }

    #[tokio::test]
    async fn liked_flag_only_set_on_the_viewers_own_list() {
        let api = spawn_fake().await;
        let viewer = UserId::new("7").unwrap();
        let other = UserId::new("99").unwrap();

        let theirs = api.liked_posts(&other, Some(&viewer)).await.unwrap();
        assert_eq!(theirs.len(), 1);
        assert!(!theirs[0].liked_by_viewer);

        let anonymous = api.liked_posts(&other, None).await.unwrap();
        assert!(!anonymous[0].liked_by_viewer);

        let mine = api.liked_posts(&viewer, Some(&viewer)).await.unwrap();
        assert!(mine[0].liked_by_viewer);
    }

    #[tokio::test]
    async fn category_with_spaces_reaches_the_service_intact() {
        let api = spawn_fake().await;
        let list = api.list_articles(Some("Redes Sociales")).await.unwrap();
        assert_eq!(list[0].category, "Redes Sociales");
    }

    #[tokio::test]
    async fn create_post_sends_multipart_form() {
        let api = spawn_fake().await;
        let new_post = NewPost {
            title: "Hola".to_string(),
            content: "mundo".to_string(),
            image: Some(Upload {
                file_name: "cat.png".to_string(),
                bytes: vec![1, 2, 3],
            }),
        };
        let user = UserId::new("7").unwrap();
        let post = api.create_post(&new_post, Some(&user)).await.unwrap();
        assert_eq!(post.title, "Hola");
        assert_eq!(
            post.image_url.as_deref(),
            Some("http://localhost:8080/uploads/cat.png")
        );
        assert_eq!(post.author.unwrap().id, user);
    }
}
