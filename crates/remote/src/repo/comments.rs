use crate::{expect_success, read_json, Api};
use domain::protocol::{CommentRecord, CreateCommentBody, WireComment};
use domain::{CommentId, PostId, TopLevelComment, UserId};

impl Api {
    pub async fn list_comments(&self, post_id: &PostId) -> anyhow::Result<Vec<TopLevelComment>> {
        let resp = self
            .http
            .get(self.endpoint(&["posts", post_id.as_str(), "comments"])?)
            .send()
            .await?;
        let wire: Vec<WireComment> = read_json(resp).await?;
        Ok(wire.into_iter().map(WireComment::into_top_level).collect())
    }

    pub async fn create_comment(
        &self,
        post_id: &PostId,
        user: &UserId,
        content: &str,
        parent_id: Option<&CommentId>,
    ) -> anyhow::Result<CommentRecord> {
        let body = CreateCommentBody {
            user_id: user,
            content,
            parent_id,
        };
        let resp = self
            .http
            .post(self.endpoint(&["posts", post_id.as_str(), "comments"])?)
            .json(&body)
            .send()
            .await?;
        let wire: WireComment = read_json(resp).await?;
        Ok(wire.into_record())
    }

    // 服务端会连同回复一起删除
    pub async fn delete_comment(
        &self,
        post_id: &PostId,
        comment_id: &CommentId,
        user: &UserId,
    ) -> anyhow::Result<()> {
        let resp = self
            .http
            .delete(self.endpoint(&[
                "posts",
                post_id.as_str(),
                "comments",
                comment_id.as_str(),
            ])?)
            .query(&[("userId", user.as_str())])
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }
}
