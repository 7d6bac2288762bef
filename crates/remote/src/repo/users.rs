use crate::{file_part, read_json, Api};
use domain::protocol::{LoginBody, RegisterBody};
use domain::{Post, ProfileUpdate, Upload, UserComment, UserId, UserProfile};
use reqwest::multipart::Form;
use tracing::info;

impl Api {
    pub async fn login(&self, username: &str, password: &str) -> anyhow::Result<UserProfile> {
        let resp = self
            .http
            .post(self.endpoint(&["auth", "login"])?)
            .json(&LoginBody { username, password })
            .send()
            .await?;
        let profile: UserProfile = read_json(resp).await?;
        info!("Signed in as {} ({})", profile.username, profile.id);
        Ok(profile)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> anyhow::Result<UserProfile> {
        let resp = self
            .http
            .post(self.endpoint(&["auth", "register"])?)
            .json(&RegisterBody {
                username,
                email,
                password,
            })
            .send()
            .await?;
        read_json(resp).await
    }

    pub async fn get_user(&self, id: &UserId) -> anyhow::Result<UserProfile> {
        let resp = self
            .http
            .get(self.endpoint(&["auth", "user", id.as_str()])?)
            .send()
            .await?;
        read_json(resp).await
    }

    pub async fn update_user(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> anyhow::Result<UserProfile> {
        let resp = self
            .http
            .put(self.endpoint(&["auth", "user", id.as_str()])?)
            .json(update)
            .send()
            .await?;
        read_json(resp).await
    }

    pub async fn upload_avatar(&self, id: &UserId, avatar: &Upload) -> anyhow::Result<UserProfile> {
        let form = Form::new().part("avatar", file_part(avatar)?);
        let resp = self
            .http
            .post(self.endpoint(&["auth", "user", id.as_str(), "avatar"])?)
            .multipart(form)
            .send()
            .await?;
        read_json(resp).await
    }

    /// Posts `id` has liked. The flag is only filled in when `id` is the viewer;
    /// for anyone else's list it stays as the service sent it.
    pub async fn liked_posts(
        &self,
        id: &UserId,
        viewer: Option<&UserId>,
    ) -> anyhow::Result<Vec<Post>> {
        let resp = self
            .http
            .get(self.endpoint(&["users", id.as_str(), "liked-posts"])?)
            .send()
            .await?;
        let mut posts: Vec<Post> = read_json(resp).await?;
        if viewer == Some(id) {
            for p in &mut posts {
                p.liked_by_viewer = true;
            }
        }
        Ok(posts)
    }

    pub async fn user_comments(&self, id: &UserId) -> anyhow::Result<Vec<UserComment>> {
        let resp = self
            .http
            .get(self.endpoint(&["users", id.as_str(), "comments"])?)
            .send()
            .await?;
        read_json(resp).await
    }
}
