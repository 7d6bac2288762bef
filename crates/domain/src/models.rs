use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::commands::PostPatch;
use crate::protocol::{local_datetime, wire_id};

// 服务端的 id 是数字，但客户端只把它当作不透明的字符串
macro_rules! opaque_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(#[serde(with = "wire_id")] String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Result<Self, String> {
                let s = s.into();
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(format!("{} cannot be empty.", $label));
                }
                if trimmed.contains(|c: char| c == '/' || c == '?' || c == '#' || c.is_whitespace()) {
                    return Err(format!("{} contains invalid characters.", $label));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

opaque_id!(PostId, "Post ID");
opaque_id!(CommentId, "Comment ID");
opaque_id!(UserId, "User ID");
opaque_id!(ArticleId, "Article ID");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "avatar")]
    pub avatar_url: Option<String>,
}

impl Author {
    pub fn display(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    #[serde(default, rename = "img")]
    pub image_url: Option<String>,
    #[serde(rename = "likes")]
    pub like_count: u32,
    // liked-posts 接口不返回这个字段
    #[serde(default, rename = "likedByUser")]
    pub liked_by_viewer: bool,
    #[serde(rename = "comments")]
    pub comment_count: u32,
    #[serde(default)]
    pub author: Option<Author>,
}

impl Post {
    /// Applies a field-level patch. Fields the patch does not name are left as they are.
    pub fn apply(&mut self, patch: &PostPatch) {
        match patch {
            PostPatch::Like(state) => {
                self.like_count = state.likes;
                self.liked_by_viewer = state.liked_by_user;
            }
            PostPatch::CommentCount(n) => self.comment_count = *n,
            PostPatch::CommentsAdded(n) => {
                self.comment_count = self.comment_count.saturating_add(*n)
            }
            PostPatch::CommentsRemoved(n) => {
                self.comment_count = self.comment_count.saturating_sub(*n)
            }
        }
    }
}

/// Confirmed like state, as returned by the like toggle endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    pub likes: u32,
    #[serde(default)]
    pub liked_by_user: bool,
}

/// A comment attached directly to a post. Only these carry replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopLevelComment {
    pub id: CommentId,
    pub author: Option<Author>,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub replies: Vec<Reply>,
}

/// A reply to a top-level comment. Replies cannot be replied to directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub id: CommentId,
    pub parent_id: CommentId,
    pub author: Option<Author>,
    pub content: String,
    pub created_at: NaiveDateTime,
}

impl TopLevelComment {
    pub fn is_authored_by(&self, user: &UserId) -> bool {
        self.author.as_ref().is_some_and(|a| &a.id == user)
    }

    /// This comment plus its replies.
    pub fn weight(&self) -> u32 {
        1 + self.replies.len() as u32
    }
}

impl Reply {
    pub fn is_authored_by(&self, user: &UserId) -> bool {
        self.author.as_ref().is_some_and(|a| &a.id == user)
    }
}

/// The signed-in user, passed explicitly into every operation that needs one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl From<&UserProfile> for Viewer {
    fn from(p: &UserProfile) -> Self {
        Self {
            id: p.id.clone(),
            username: p.username.clone(),
            display_name: p.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    #[serde(default)]
    pub post_count: u32,
}

/// A comment as listed on a user's activity page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserComment {
    pub id: CommentId,
    pub content: String,
    #[serde(with = "local_datetime")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub post_id: Option<PostId>,
    #[serde(default)]
    pub post_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePreview {
    pub id: ArticleId,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub category: String,
    #[serde(with = "local_datetime")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(flatten)]
    pub preview: ArticlePreview,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, likes: u32, comments: u32) -> Post {
        Post {
            id: PostId::new(id).unwrap(),
            title: format!("Post {}", id),
            content: "body".to_string(),
            image_url: None,
            like_count: likes,
            liked_by_viewer: false,
            comment_count: comments,
            author: None,
        }
    }

    #[test]
    fn ids_reject_blank_and_path_characters() {
        assert!(PostId::new("  ").is_err());
        assert!(PostId::new("1/2").is_err());
        assert_eq!(PostId::new(" 42 ").unwrap().as_str(), "42");
        assert_eq!("7".parse::<CommentId>().unwrap().to_string(), "7");
    }

    #[test]
    fn like_patch_replaces_count_and_flag_together() {
        let mut p = post("1", 5, 3);
        p.apply(&PostPatch::Like(LikeState {
            likes: 6,
            liked_by_user: true,
        }));
        assert_eq!(p.like_count, 6);
        assert!(p.liked_by_viewer);
        assert_eq!(p.comment_count, 3);
    }

    #[test]
    fn comment_patches_never_underflow() {
        let mut p = post("1", 0, 2);
        p.apply(&PostPatch::CommentsAdded(1));
        assert_eq!(p.comment_count, 3);
        p.apply(&PostPatch::CommentsRemoved(5));
        assert_eq!(p.comment_count, 0);
        p.apply(&PostPatch::CommentCount(9));
        assert_eq!(p.comment_count, 9);
        assert_eq!(p.like_count, 0);
    }

    #[test]
    fn author_display_falls_back_to_username() {
        let mut a = Author {
            id: UserId::new("3").unwrap(),
            username: "ferris".to_string(),
            display_name: Some(" ".to_string()),
            avatar_url: None,
        };
        assert_eq!(a.display(), "ferris");
        a.display_name = Some("Ferris Crab".to_string());
        assert_eq!(a.display(), "Ferris Crab");
    }
}
