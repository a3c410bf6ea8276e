use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    #[error("post not found: {0}")]
    PostNotFound(i64),
    #[error("group not found: {0}")]
    GroupNotFound(String),
    #[error("{user} does not follow {author}")]
    FollowNotFound { user: String, author: String },
    #[error("forbidden")]
    Forbidden,
    #[error("unauthorized")]
    Unauthorized,
    #[error("validation failed: {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::UserNotFound(_)
            | DomainError::PostNotFound(_)
            | DomainError::GroupNotFound(_)
            | DomainError::FollowNotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden => StatusCode::FORBIDDEN,
            DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
            DomainError::UserAlreadyExists(_) => StatusCode::CONFLICT,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // внутренние детали наружу не отдаём
        let message = match self {
            DomainError::Internal(_) => "internal server error".to_string(),
            DomainError::Validation { .. } => "validation failed".to_string(),
            other => other.to_string(),
        };
        let details = match self {
            DomainError::PostNotFound(id) => Some(json!({ "resource": id })),
            DomainError::UserNotFound(resource) | DomainError::GroupNotFound(resource) => {
                Some(json!({ "resource": resource }))
            }
            DomainError::Forbidden => {
                Some(json!({ "message": "you do not have permission to modify this resource" }))
            }
            DomainError::Validation { field, message } => Some(json!({ *field: [message] })),
            _ => None,
        };
        let body = ErrorBody {
            error: message.as_str(),
            details,
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn validation_error_carries_field_details() {
        let err = DomainError::validation("following", "You can't follow yourself");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "validation failed");
        assert_eq!(value["details"]["following"][0], "You can't follow yourself");
    }

    #[actix_web::test]
    async fn internal_error_hides_cause() {
        let err = DomainError::Internal("connection reset by peer".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("connection reset"));
    }

    #[test]
    fn not_found_variants_map_to_404() {
        let errors = [
            DomainError::UserNotFound("ghost".into()),
            DomainError::PostNotFound(7),
            DomainError::GroupNotFound("tech".into()),
            DomainError::FollowNotFound {
                user: "alice".into(),
                author: "bob".into(),
            },
        ];
        for err in errors {
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        }
        assert_eq!(DomainError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }
}
