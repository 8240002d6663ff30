/// Error handling for the API server
///
/// Handlers return [`ApiResult`]; service and auth errors convert into
/// [`ApiError`] with `?`, and [`ApiError`] renders as a JSON body:
///
/// ```json
/// { "error": "not_found", "message": "Task not found" }
/// ```
///
/// | Source | Status |
/// |---|---|
/// | field validation, bad status label | 422 |
/// | duplicate email | 409 |
/// | invalid credentials, token problems | 401 |
/// | task absent or owned by someone else | 404 |
/// | store / hashing failures | 500 (details only in logs) |

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskboard_shared::auth::jwt::JwtError;
use taskboard_shared::auth::middleware::AuthError;
use taskboard_shared::services::auth::AuthServiceError;
use taskboard_shared::services::tasks::TaskServiceError;
use taskboard_shared::validation::FieldError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400), e.g. unparseable JSON
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - duplicate email
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<FieldError>),

    /// Internal server error (500)
    InternalError(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "validation_error", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Per-field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    /// Login failure; never says which half of the pair was wrong
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("Invalid email or password".to_string())
    }

    pub fn task_not_found() -> Self {
        ApiError::NotFound("Task not found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_code, message, details) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!(error = %msg, "Internal error");
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::DuplicateEmail => {
                ApiError::Conflict("Email is already registered".to_string())
            }
            AuthServiceError::Validation(errors) => ApiError::ValidationError(errors),
            AuthServiceError::Token(err) => ApiError::from(err),
            AuthServiceError::Password(err) => {
                ApiError::InternalError(format!("Password operation failed: {}", err))
            }
            AuthServiceError::Store(err) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::NotFound => ApiError::task_not_found(),
            TaskServiceError::Validation(errors) => ApiError::ValidationError(errors),
            TaskServiceError::Store(err) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing authorization header".to_string())
            }
            AuthError::InvalidFormat => ApiError::Unauthorized("Expected Bearer token".to_string()),
            AuthError::Token(err) => ApiError::from(err),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidToken(_) => ApiError::Unauthorized("Invalid token".to_string()),
            JwtError::MissingSecret | JwtError::InvalidLifetime(_) | JwtError::CreateError(_) => {
                ApiError::InternalError(format!("Token operation failed: {}", err))
            }
        }
    }
}

/// Body that parsed as JSON but has the wrong shape is a validation failure;
/// anything else about the body is a bad request
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                ApiError::ValidationError(vec![FieldError::new("body", err.body_text())])
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_shared::store::StoreError;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::task_not_found();
        assert_eq!(err.to_string(), "Not found: Task not found");
    }

    #[test]
    fn test_service_error_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (AuthServiceError::DuplicateEmail.into(), StatusCode::CONFLICT),
            (
                AuthServiceError::Validation(vec![FieldError::new("email", "Invalid email format")]).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AuthServiceError::Store(StoreError::Backend("down".to_string())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (TaskServiceError::NotFound.into(), StatusCode::NOT_FOUND),
            (
                TaskServiceError::Store(StoreError::Backend("down".to_string())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AuthError::MissingCredentials.into(), StatusCode::UNAUTHORIZED),
            (AuthError::InvalidFormat.into(), StatusCode::UNAUTHORIZED),
            (JwtError::Expired.into(), StatusCode::UNAUTHORIZED),
            (
                JwtError::InvalidToken("InvalidSignature".to_string()).into(),
                StatusCode::UNAUTHORIZED,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{}", err);
        }
    }

    #[test]
    fn test_internal_error_hides_details() {
        let response = ApiError::InternalError("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![
            FieldError::new("title", "Title must be between 3 and 100 characters"),
            FieldError::new("description", "Description must be at most 500 characters"),
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }
}
