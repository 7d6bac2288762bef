use crate::models::{Author, CommentId, Reply, TopLevelComment, UserId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Ids travel as JSON numbers; anything that is not an integer is sent back as a string.
pub mod wire_id {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    pub fn serialize<S: Serializer>(id: &str, s: S) -> Result<S::Ok, S::Error> {
        match id.parse::<i64>() {
            Ok(n) => s.serialize_i64(n),
            Err(_) => s.serialize_str(id),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match RawId::deserialize(d)? {
            RawId::Int(n) => n.to_string(),
            RawId::Str(s) => s,
        })
    }
}

/// ISO local date-time without offset. The service drops the seconds when they are zero.
pub mod local_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

/// Comment as it appears on the wire. Listings nest `replies`; creation responses omit them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireComment {
    pub id: CommentId,
    pub content: String,
    #[serde(with = "local_datetime")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub replies: Vec<WireComment>,
}

/// A freshly created comment, classified by where it belongs in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentRecord {
    TopLevel(TopLevelComment),
    Reply(Reply),
}

impl WireComment {
    /// Builds a top-level comment from a listing entry. Anything nested below
    /// the replies is dropped, the tree is two levels deep.
    pub fn into_top_level(self) -> TopLevelComment {
        let parent = self.id.clone();
        TopLevelComment {
            id: self.id,
            author: self.author,
            content: self.content,
            created_at: self.created_at,
            replies: self
                .replies
                .into_iter()
                .map(|r| r.into_reply(parent.clone()))
                .collect(),
        }
    }

    pub fn into_reply(self, parent_id: CommentId) -> Reply {
        Reply {
            id: self.id,
            parent_id,
            author: self.author,
            content: self.content,
            created_at: self.created_at,
        }
    }

    pub fn into_record(self) -> CommentRecord {
        match self.parent_id.clone() {
            Some(parent) => CommentRecord::Reply(self.into_reply(parent)),
            None => {
                // 新建的评论不可能带回复
                let mut top = self.into_top_level();
                top.replies.clear();
                CommentRecord::TopLevel(top)
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentBody<'a> {
    pub user_id: &'a UserId,
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<&'a CommentId>,
}

#[derive(Debug, Serialize)]
pub struct LoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterBody<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Error payload returned by the service on rejected requests.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostId;

    #[test]
    fn listing_entry_nests_replies_under_its_id() {
        let raw = serde_json::json!({
            "id": 10,
            "content": "first",
            "createdAt": "2024-05-01T10:20:30.123456",
            "parentId": null,
            "author": { "id": 1, "username": "ana", "displayName": null, "avatar": null },
            "replies": [
                { "id": 11, "content": "re", "createdAt": "2024-05-01T10:21", "parentId": 10 }
            ]
        });
        let wire: WireComment = serde_json::from_value(raw).unwrap();
        let top = wire.into_top_level();
        assert_eq!(top.id.as_str(), "10");
        assert_eq!(top.replies.len(), 1);
        assert_eq!(top.replies[0].parent_id, top.id);
        assert!(top.replies[0].author.is_none());
        assert!(top.is_authored_by(&UserId::new("1").unwrap()));
    }

    #[test]
    fn created_comment_is_classified_by_parent() {
        let reply: WireComment = serde_json::from_value(serde_json::json!({
            "id": 5, "content": "x", "createdAt": "2024-01-02T03:04:05", "parentId": 2
        }))
        .unwrap();
        assert!(matches!(reply.into_record(), CommentRecord::Reply(r) if r.parent_id.as_str() == "2"));

        let top: WireComment = serde_json::from_value(serde_json::json!({
            "id": 6, "content": "y", "createdAt": "2024-01-02T03:04:05"
        }))
        .unwrap();
        match top.into_record() {
            CommentRecord::TopLevel(c) => assert!(c.replies.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn numeric_ids_go_back_out_as_numbers() {
        let user = UserId::new("9").unwrap();
        let parent = CommentId::new("abc").unwrap();
        let body = CreateCommentBody {
            user_id: &user,
            content: "hi",
            parent_id: Some(&parent),
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["userId"], serde_json::json!(9));
        assert_eq!(v["parentId"], serde_json::json!("abc"));

        let none = CreateCommentBody {
            user_id: &user,
            content: "hi",
            parent_id: None,
        };
        assert!(serde_json::to_value(&none).unwrap().get("parentId").is_none());

        let id: PostId = serde_json::from_value(serde_json::json!(12)).unwrap();
        assert_eq!(id.as_str(), "12");
    }

    #[test]
    fn rejects_unparseable_timestamps() {
        assert!(local_datetime::parse("yesterday").is_none());
        assert!(local_datetime::parse("2024-05-01T10:20").is_some());
    }
}
