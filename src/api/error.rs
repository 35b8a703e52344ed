//! Mapping of failures onto HTTP responses

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::Error;

/// Body used for 401/403/404/500 responses
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body used for 400 validation responses
#[derive(Debug, Serialize)]
pub struct ValidationBody {
    pub errors: Vec<String>,
}

/// Everything a handler can fail with
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid credentials
    Unauthenticated { realm: String },
    /// Authenticated, but not the owner of the resource
    Forbidden,
    NotFound(String),
    /// Field constraints failed; messages in schema order
    Validation(Vec<String>),
    /// Anything else; details are logged, never returned
    Unexpected(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::Unexpected(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthenticated { realm } => {
                let mut response =
                    (StatusCode::UNAUTHORIZED, Json(MessageBody::new("Access Denied")))
                        .into_response();
                if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm)) {
                    response.headers_mut().insert(WWW_AUTHENTICATE, value);
                }
                response
            }
            ApiError::Forbidden => {
                (StatusCode::FORBIDDEN, Json(MessageBody::new("Access denied."))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(MessageBody::new(message))).into_response()
            }
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(ValidationBody { errors })).into_response()
            }
            ApiError::Unexpected(err) => {
                tracing::error!("Unhandled error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(MessageBody::new("An unexpected error occurred.")),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_maps_to_bad_request() {
        let err = ApiError::from(Error::validation("Must provide a title"));
        assert!(matches!(err, ApiError::Validation(ref e) if e.len() == 1));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_other_errors_are_unexpected() {
        let err = ApiError::from(Error::Other("disk on fire".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unauthenticated_sets_challenge() {
        let response = ApiError::Unauthenticated {
            realm: "courses-api".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[WWW_AUTHENTICATE],
            "Basic realm=\"courses-api\""
        );
    }
}
