use std::env;

use actix_web::{Error, HttpMessage, dev::ServiceRequest, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::user::service::UserService;
use crate::utils::error::CustomError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub exp: usize,
}

const TOKEN_LIFETIME_HOURS: i64 = 24;

fn jwt_secret() -> String {
    env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string())
}

/// Bearer validator for protected scopes. The JWT must decode and must
/// still be the token stored on the user document, so a later login or
/// password change invalidates it.
pub async fn verify_token(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let token = credentials.token().to_string();

    let token_data = match decode::<Claims>(
        &token,
        &DecodingKey::from_secret(jwt_secret().as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => data,
        Err(_) => {
            return Err((
                CustomError::UnauthorizedError("Invalid token".to_string()).into(),
                req,
            ));
        }
    };

    let user_service = match req.app_data::<web::Data<UserService>>() {
        Some(service) => service,
        None => {
            return Err((
                CustomError::InternalServerError("User service unavailable".to_string()).into(),
                req,
            ));
        }
    };

    match user_service.find_by_token(&token).await {
        Ok(Some(user)) => {
            let user_id = user.id.map(|id| id.to_hex()).unwrap_or_default();
            if user_id == token_data.claims.id {
                req.extensions_mut().insert(token_data.claims);
                Ok(req)
            } else {
                Err((
                    CustomError::UnauthorizedError("Session mismatch".to_string()).into(),
                    req,
                ))
            }
        }
        Ok(None) => Err((
            CustomError::UnauthorizedError("Session expired or invalid".to_string()).into(),
            req,
        )),
        Err(_) => Err((
            CustomError::InternalServerError("Failed to validate session".to_string()).into(),
            req,
        )),
    }
}

pub fn create_token(user_id: &str) -> Result<String, CustomError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(TOKEN_LIFETIME_HOURS))
        .ok_or_else(|| CustomError::InternalServerError("Invalid expiry timestamp".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        id: user_id.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
    .map_err(|_| CustomError::InternalServerError("Token generation failed".to_string()))
}

/// Get user ID from request extensions (use after auth middleware)
pub fn get_user_id_from_request(req: &actix_web::HttpRequest) -> Option<String> {
    req.extensions().get::<Claims>().map(|claims| claims.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_decode_with_matching_id() {
        let token = create_token("64f000000000000000000001").unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(jwt_secret().as_bytes()),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.id, "64f000000000000000000001");
        assert!(data.claims.exp > chrono::Utc::now().timestamp() as usize);
    }
}
