mod commands;
mod error;
mod events;
mod models;
pub mod protocol;

pub use commands::{NewArticle, NewPost, PostPatch, ProfileUpdate, Upload};
pub use error::{Outcome, SkipReason, SyncError, SyncResult};
pub use events::ViewEvent;
pub use models::{
    Article, ArticleId, ArticlePreview, Author, CommentId, LikeState, Post, PostId, Reply,
    TopLevelComment, UserComment, UserId, UserProfile, Viewer,
};
