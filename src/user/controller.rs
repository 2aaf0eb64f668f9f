use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::middleware::auth::get_user_id_from_request;
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use crate::utils::model::{ChangePasswordRequest, LoginRequest};

pub async fn login(
    user_service: web::Data<UserService>,
    login_info: web::Json<LoginRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    if req.headers().get("Authorization").is_some() {
        return Err(CustomError::BadRequestError("Already logged in".to_string()));
    }
    if login_info.username.is_empty() || login_info.password.is_empty() {
        return Err(CustomError::BadRequestError(
            "Username and password are required".to_string(),
        ));
    }

    let (user, token) = user_service
        .login(&login_info.username, &login_info.password)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Login successful",
        "httpStatusCode": 200,
        "user": {
            "_id": user.id,
            "username": user.username,
        },
        "token": token
    })))
}

pub async fn change_password(
    user_service: web::Data<UserService>,
    body: web::Json<ChangePasswordRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let user_id = get_user_id_from_request(&req)
        .ok_or_else(|| CustomError::ForbiddenError("No access".to_string()))?;

    if body.password.is_empty() {
        return Err(CustomError::BadRequestError("Password is required".to_string()));
    }

    user_service.change_password(&user_id, &body.password).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password updated",
        "httpStatusCode": 200,
    })))
}
