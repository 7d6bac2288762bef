use crate::models::{CommentId, PostId};
use serde::Serialize;

/// Emitted after a confirmed change has been applied to the view state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    FeedReplaced {
        count: usize,
    },
    PostPrepended {
        post_id: PostId,
    },
    PostPatched {
        post_id: PostId,
    },
    CommentsLoaded {
        post_id: PostId,
        count: u32,
    },
    CommentAdded {
        post_id: PostId,
        comment_id: CommentId,
        parent_id: Option<CommentId>,
    },
    CommentRemoved {
        post_id: PostId,
        comment_id: CommentId,
        removed: u32,
    },
}
