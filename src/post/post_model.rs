use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// One version of a post's content. `draft` holds these fields while
/// editing; `published` additionally carries `summary`, `version` and
/// `publishedAt`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime>,
}

/// A post is live iff `published` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub created_at: DateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<PostContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<PostContent>,
}

impl Post {
    pub fn new() -> Self {
        Post {
            id: ObjectId::new(),
            created_at: DateTime::now(),
            updated_at: None,
            draft: Some(PostContent::default()),
            published: None,
        }
    }
}

/// Draft edits. Unknown keys are rejected at deserialization, which is
/// what turns a disallowed field into a 400.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
    pub image: Option<String>,
    pub tags: Option<Vec<String>>,
}
