/// Task Service
///
/// Every operation takes the owner ID from the caller's verified identity.
/// A task owned by someone else is reported exactly like a task that does not
/// exist, so callers cannot probe for other accounts' task IDs.
///
/// Status changes are unrestricted: any of the three states may follow any
/// other.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::models::task::{NewTask, TaskStatus, UpdateTask};
/// use taskboard_shared::services::tasks::TaskService;
/// use taskboard_shared::store::memory::MemoryStore;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = TaskService::new(Arc::new(MemoryStore::new()));
/// let owner = Uuid::new_v4();
///
/// let task = service
///     .create(owner, NewTask { title: "Buy milk".to_string(), description: None })
///     .await?;
/// assert_eq!(task.status, TaskStatus::Pending);
///
/// let patch = UpdateTask { status: Some(TaskStatus::Done), ..Default::default() };
/// service.update(task.id, owner, patch).await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::task::{CreateTask, NewTask, Task, UpdateTask};
use crate::store::{StoreError, TaskStore};
use crate::validation::{self, FieldError};

/// Task Service failures
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// No live task with this ID belongs to the caller
    #[error("Task not found")]
    NotFound,

    /// Input failed field validation
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owner-scoped task operations
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskService").finish_non_exhaustive()
    }
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    /// Creates a pending task for `owner_id`
    pub async fn create(&self, owner_id: Uuid, input: NewTask) -> Result<Task, TaskServiceError> {
        validation::validate(&input).map_err(TaskServiceError::Validation)?;

        let task = self.tasks.insert(CreateTask::pending(owner_id, input)).await?;

        info!(task_id = %task.id, owner_id = %owner_id, "Task created");
        Ok(task)
    }

    /// Owner's live tasks, newest first
    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = self.tasks.find_all_by_owner(owner_id).await?;
        debug!(owner_id = %owner_id, count = tasks.len(), "Listed tasks");
        Ok(tasks)
    }

    /// Applies a partial update to one of the owner's tasks
    ///
    /// The patch is validated before any lookup, so an invalid patch is a
    /// validation error whether or not the task exists.
    pub async fn update(
        &self,
        task_id: Uuid,
        owner_id: Uuid,
        patch: UpdateTask,
    ) -> Result<Task, TaskServiceError> {
        validation::validate(&patch).map_err(TaskServiceError::Validation)?;

        let mut task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .filter(|t| t.owner_id == owner_id)
            .ok_or(TaskServiceError::NotFound)?;

        patch.apply_to(&mut task);

        // The row may have been removed since the lookup
        let task = self
            .tasks
            .save(task)
            .await?
            .ok_or(TaskServiceError::NotFound)?;

        info!(task_id = %task.id, status = %task.status, "Task updated");
        Ok(task)
    }

    /// Soft-deletes one of the owner's tasks
    pub async fn remove(&self, task_id: Uuid, owner_id: Uuid) -> Result<(), TaskServiceError> {
        let affected = self.tasks.soft_delete_where(task_id, owner_id).await?;
        if affected == 0 {
            debug!(task_id = %task_id, "Remove matched no live task for owner");
            return Err(TaskServiceError::NotFound);
        }

        info!(task_id = %task_id, "Task removed");
        Ok(())
    }
}
