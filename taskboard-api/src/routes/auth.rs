/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register new user
/// - `POST /auth/login` - Exchange credentials for an access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use taskboard_shared::{
    models::user::{PublicUser, RegisterUser},
    services::auth::{AccessToken, Credentials},
};

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "password": "correct horse"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the user (no password hash):
///
/// ```json
/// {
///   "id": "uuid",
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "createdAt": "...",
///   "updatedAt": "..."
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    let Json(input) = payload?;
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "email": "ada@example.com",
///   "password": "correct horse"
/// }
/// ```
///
/// # Response
///
/// ```json
/// { "access_token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<AccessToken>> {
    let Json(credentials) = payload?;

    let user = state
        .auth
        .validate_credentials(&credentials.email, &credentials.password)
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    let token = state.auth.login(&user)?;
    Ok(Json(token))
}
