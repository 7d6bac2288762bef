use crate::{file_part, read_json, Api};
use domain::{LikeState, NewPost, Post, PostId, UserId};
use reqwest::multipart::Form;
use tracing::debug;

impl Api {
    // userId 只用来让服务端填 likedByUser
    pub async fn list_posts(&self, viewer: Option<&UserId>) -> anyhow::Result<Vec<Post>> {
        let mut req = self.http.get(self.endpoint(&["posts"])?);
        if let Some(v) = viewer {
            req = req.query(&[("userId", v.as_str())]);
        }
        read_json(req.send().await?).await
    }

    pub async fn list_posts_by(
        &self,
        author: &UserId,
        viewer: Option<&UserId>,
    ) -> anyhow::Result<Vec<Post>> {
        let mut req = self
            .http
            .get(self.endpoint(&["posts", "user", author.as_str()])?);
        if let Some(v) = viewer {
            req = req.query(&[("userId", v.as_str())]);
        }
        read_json(req.send().await?).await
    }

    pub async fn create_post(
        &self,
        new_post: &NewPost,
        author: Option<&UserId>,
    ) -> anyhow::Result<Post> {
        let mut form = Form::new()
            .text("title", new_post.title.trim().to_string())
            .text("content", new_post.content.trim().to_string());
        if let Some(image) = &new_post.image {
            form = form.part("image", file_part(image)?);
        }
        if let Some(user) = author {
            form = form.text("userId", user.to_string());
        }

        let resp = self
            .http
            .post(self.endpoint(&["posts"])?)
            .multipart(form)
            .send()
            .await?;
        let post: Post = read_json(resp).await?;
        debug!("Created post {}", post.id);
        Ok(post)
    }

    /// Toggles the like and returns the confirmed count and flag.
    pub async fn toggle_like(&self, post_id: &PostId, user: &UserId) -> anyhow::Result<LikeState> {
        let resp = self
            .http
            .post(self.endpoint(&["posts", post_id.as_str(), "like"])?)
            .query(&[("userId", user.as_str())])
            .send()
            .await?;
        read_json(resp).await
    }
}
