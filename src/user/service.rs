use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::database::blog_database;
use crate::middleware::auth::create_token;
use crate::user::model::User;
use crate::utils::error::CustomError;
use crate::utils::hashing;

pub struct UserService {
    collection: Collection<User>,
}

/// A new password also revokes the stored session token, so existing
/// bearer tokens stop validating immediately.
fn password_update(hashed: &str) -> Document {
    doc! {
        "$set": { "password": hashed },
        "$unset": { "token": 1 },
    }
}

impl UserService {
    pub fn new(client: &Client) -> Self {
        let collection = blog_database(client).collection::<User>("users");
        UserService { collection }
    }

    /// Validates credentials, mints a fresh token and stores it on the
    /// user document. Only the latest token is accepted by the auth
    /// middleware, so logging in invalidates older sessions.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), CustomError> {
        let user = self
            .collection
            .find_one(doc! { "username": username })
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to query user: {}", e)))?
            .ok_or_else(|| CustomError::BadRequestError("User not found".to_string()))?;

        if !hashing::verify_password(password, &user.password)? {
            return Err(CustomError::BadRequestError(
                "Incorrect login credentials".to_string(),
            ));
        }

        let user_id = user
            .id
            .ok_or_else(|| CustomError::InternalServerError("User ID missing".to_string()))?;

        let token = create_token(&user_id.to_hex())?;
        self.collection
            .update_one(
                doc! { "_id": user_id },
                doc! { "$set": { "token": &token } },
            )
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to store token: {}", e)))?;

        Ok((user, token))
    }

    /// Looks up the user owning `token`. Used by the auth middleware:
    /// a decoded JWT is only valid while it is the stored session token.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<User>, CustomError> {
        self.collection
            .find_one(doc! { "token": token })
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to query user: {}", e)))
    }

    pub async fn change_password(&self, user_id: &str, password: &str) -> Result<(), CustomError> {
        let object_id = ObjectId::parse_str(user_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        let hashed = hashing::hash_password(password)?;
        let result = self
            .collection
            .update_one(doc! { "_id": object_id }, password_update(&hashed))
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to update password: {}", e)))?;

        if result.matched_count == 0 {
            return Err(CustomError::NotFoundError("User does not exist".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_change_revokes_the_session_token() {
        let update = password_update("new-hash");
        assert_eq!(
            update.get_document("$set").unwrap().get_str("password").unwrap(),
            "new-hash"
        );
        assert!(update.get_document("$unset").unwrap().get("token").is_some());
    }
}
