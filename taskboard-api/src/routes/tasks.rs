/// Task endpoints
///
/// All routes sit behind the bearer-token middleware; the owner is always the
/// authenticated user from [`AuthContext`], never a value from the body.
///
/// # Endpoints
///
/// - `POST /tasks` - Create a task
/// - `GET /tasks` - List the caller's tasks, newest first
/// - `PATCH /tasks/:id` - Update title, description and/or status
/// - `DELETE /tasks/:id` - Soft-delete a task
///
/// A path ID that is not a UUID is answered like an unknown task (404).

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::task::{NewTask, Task, UpdateTask},
};
use uuid::Uuid;

fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::task_not_found())
}

/// Create a task
///
/// ```text
/// POST /tasks
/// Authorization: Bearer <token>
///
/// { "title": "Buy milk", "description": "two liters" }
/// ```
///
/// Returns `201 Created` with the task; `status` starts as `pending`.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(input) = payload?;
    let task = state.tasks.create(auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// List the caller's live tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list_for_owner(auth.user_id).await?;
    Ok(Json(tasks))
}

/// Partially update a task
///
/// ```text
/// PATCH /tasks/:id
/// Authorization: Bearer <token>
///
/// { "status": "in-progress" }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No such task for this user
/// - `422 Unprocessable Entity`: Field constraints or unknown status label
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTask>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let task_id = parse_task_id(&id)?;
    let Json(patch) = payload?;
    let task = state.tasks.update(task_id, auth.user_id, patch).await?;
    Ok(Json(task))
}

/// Soft-delete a task; `204 No Content` on success
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let task_id = parse_task_id(&id)?;
    state.tasks.remove(task_id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_id_is_not_found() {
        let err = parse_task_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let id = Uuid::new_v4();
        assert_eq!(parse_task_id(&id.to_string()).unwrap(), id);
    }
}
