use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    /// base64-wrapped bcrypt hash
    pub password: String,
    /// Current session token, overwritten on each login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub created_at: DateTime,
}

impl User {
    pub fn new(username: String, password: String) -> Self {
        User {
            id: None,
            username,
            password,
            token: None,
            created_at: DateTime::now(),
        }
    }
}
