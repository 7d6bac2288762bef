use crate::models::LikeState;
use serde::Serialize;

/// Field-level update applied to one post in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostPatch {
    Like(LikeState),
    CommentCount(u32),
    CommentsAdded(u32),
    CommentsRemoved(u32),
}

/// A file picked for upload, already read into memory.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn mime(&self) -> &'static str {
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, e)| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image: Option<Upload>,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub category: String,
    pub cover_image: Option<Upload>,
}

/// Partial profile edit. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.bio.is_none()
            && self.location.is_none()
            && self.occupation.is_none()
            && self.avatar.is_none()
    }
}
