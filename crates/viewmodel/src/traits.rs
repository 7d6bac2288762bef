use anyhow::Result;
use async_trait::async_trait;
use domain::protocol::CommentRecord;
use domain::{CommentId, LikeState, NewPost, Post, PostId, TopLevelComment, UserId};
use remote::Api;

/// The remote source of truth the view state is reconciled against.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn list_posts(&self, viewer: Option<&UserId>) -> Result<Vec<Post>>;

    async fn list_posts_by(&self, author: &UserId, viewer: Option<&UserId>) -> Result<Vec<Post>>;

    async fn create_post(&self, new_post: &NewPost, author: &UserId) -> Result<Post>;

    async fn toggle_like(&self, post_id: &PostId, user: &UserId) -> Result<LikeState>;

    async fn list_comments(&self, post_id: &PostId) -> Result<Vec<TopLevelComment>>;

    async fn create_comment(
        &self,
        post_id: &PostId,
        user: &UserId,
        content: &str,
        parent_id: Option<&CommentId>,
    ) -> Result<CommentRecord>;

    async fn delete_comment(
        &self,
        post_id: &PostId,
        comment_id: &CommentId,
        user: &UserId,
    ) -> Result<()>;
}

#[async_trait]
impl PostStore for Api {
    async fn list_posts(&self, viewer: Option<&UserId>) -> Result<Vec<Post>> {
        Api::list_posts(self, viewer).await
    }

    async fn list_posts_by(&self, author: &UserId, viewer: Option<&UserId>) -> Result<Vec<Post>> {
        Api::list_posts_by(self, author, viewer).await
    }

    async fn create_post(&self, new_post: &NewPost, author: &UserId) -> Result<Post> {
        Api::create_post(self, new_post, Some(author)).await
    }

    async fn toggle_like(&self, post_id: &PostId, user: &UserId) -> Result<LikeState> {
        Api::toggle_like(self, post_id, user).await
    }

    async fn list_comments(&self, post_id: &PostId) -> Result<Vec<TopLevelComment>> {
        Api::list_comments(self, post_id).await
    }

    async fn create_comment(
        &self,
        post_id: &PostId,
        user: &UserId,
        content: &str,
        parent_id: Option<&CommentId>,
    ) -> Result<CommentRecord> {
        Api::create_comment(self, post_id, user, content, parent_id).await
    }

    async fn delete_comment(
        &self,
        post_id: &PostId,
        comment_id: &CommentId,
        user: &UserId,
    ) -> Result<()> {
        Api::delete_comment(self, post_id, comment_id, user).await
    }
}
