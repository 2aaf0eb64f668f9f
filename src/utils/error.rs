use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Unauthorized: {0}")]
    UnauthorizedError(String),

    #[error("Forbidden: {0}")]
    ForbiddenError(String),

    #[error("Bad Request: {0}")]
    BadRequestError(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Not Found: {0}")]
    NotFoundError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::UnauthorizedError(..) => StatusCode::UNAUTHORIZED,
            CustomError::ForbiddenError(..) => StatusCode::FORBIDDEN,
            CustomError::BadRequestError(..) => StatusCode::BAD_REQUEST,
            CustomError::InternalServerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = json!({
            "success": false,
            "message": self.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": match *self {
                CustomError::UnauthorizedError(..) => "UNAUTHORIZED_ERROR",
                CustomError::ForbiddenError(..) => "FORBIDDEN_ERROR",
                CustomError::BadRequestError(..) => "BAD_REQUEST_ERROR",
                CustomError::InternalServerError(..) => "INTERNAL_SERVER_ERROR",
                CustomError::NotFoundError(..) => "NOT_FOUND_ERROR",
                CustomError::ValidationError(..) => "VALIDATION_ERROR",
            },
            "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "blog-api".to_string()),
        });

        HttpResponse::build(self.status_code()).json(error_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_their_status_codes() {
        assert_eq!(
            CustomError::UnauthorizedError("no".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            CustomError::ForbiddenError("no".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            CustomError::BadRequestError("no".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CustomError::NotFoundError("no".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CustomError::ValidationError("no".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CustomError::InternalServerError("no".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthorized_renders_the_json_envelope() {
        let response =
            CustomError::UnauthorizedError("Session expired or invalid".to_string()).error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }
}
