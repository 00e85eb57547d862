//! HTTP error responses

use crate::error::{ErrorKind, ScribeError};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

/// A [`ScribeError`] rendered as `{success: false, error, message}`
#[derive(Debug)]
pub struct ApiError(pub ScribeError);

/// HTTP status for an error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorKind::AuthenticationFailed => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ValidationRejected => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::ContentMalformed => StatusCode::BAD_GATEWAY,
        ErrorKind::RemoteUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        if status.is_server_error() {
            error!(status = status.as_u16(), kind = kind.as_str(), "Request failed: {}", self.0);
        } else {
            warn!(status = status.as_u16(), kind = kind.as_str(), "Request rejected: {}", self.0);
        }

        let body = json!({
            "success": false,
            "error": kind.as_str(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<ScribeError> for ApiError {
    fn from(err: ScribeError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(ScribeError::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(ScribeError::validation(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::ValidationFailed), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::AuthenticationFailed), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ErrorKind::ValidationRejected),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(ErrorKind::ContentMalformed), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(ErrorKind::RemoteUnavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_generator_unavailable_is_503() {
        let response = ApiError(ScribeError::GeneratorUnavailable).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
