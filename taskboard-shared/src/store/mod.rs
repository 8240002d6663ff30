/// Persistence seam for users and tasks
///
/// Services talk to storage only through [`UserStore`] and [`TaskStore`].
/// Every lookup excludes soft-deleted rows; write paths that act on behalf of
/// a user carry the owner so that a row belonging to someone else behaves
/// exactly like a missing one.
///
/// # Backends
///
/// - [`postgres::PgStore`]: sqlx over a `PgPool`
/// - [`memory::MemoryStore`]: process-local maps, used by tests and
///   `STORE_BACKEND=memory`
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::models::user::CreateUser;
/// use taskboard_shared::store::{memory::MemoryStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn UserStore> = Arc::new(MemoryStore::new());
/// let user = store
///     .insert(CreateUser {
///         name: "Ada".to_string(),
///         email: "ada@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     })
///     .await?;
///
/// assert!(store.find_by_email("ada@example.com").await?.is_some());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User};

pub mod memory;
pub mod postgres;

/// Name of the uniqueness rule on live user emails
pub const USERS_EMAIL_CONSTRAINT: &str = "users_email_active_key";

/// Storage failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// Connectivity or any other backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// True when the live-email uniqueness rule fired
    pub fn is_duplicate_email(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint } if constraint == USERS_EMAIL_CONSTRAINT)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or_default().to_string(),
                };
            }
        }
        StoreError::Backend(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Live user with exactly this email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Live user with this ID
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Inserts a user; a live duplicate email is a `UniqueViolation`
    async fn insert(&self, data: CreateUser) -> StoreResult<User>;

    /// Reachability probe for health reporting
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Task persistence
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Owner's live tasks, newest first
    async fn find_all_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Task>>;

    /// Live task with this ID, whoever owns it
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Task>>;

    async fn insert(&self, data: CreateTask) -> StoreResult<Task>;

    /// Persists title, description and status of a live row owned by
    /// `task.owner_id`; `None` when there is no such row
    async fn save(&self, task: Task) -> StoreResult<Option<Task>>;

    /// Soft-deletes the live row matching both keys; returns rows affected
    async fn soft_delete_where(&self, id: Uuid, owner_id: Uuid) -> StoreResult<u64>;
}
