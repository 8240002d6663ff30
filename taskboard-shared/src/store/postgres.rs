/// PostgreSQL store
///
/// Thin adapter from the store traits onto the SQL in `models`. sqlx errors
/// are mapped through `From<sqlx::Error> for StoreError`, which is where
/// unique violations are recognised.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreResult, TaskStore, UserStore};
use crate::db::pool::health_check;
use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User};

/// Store backed by a sqlx PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool (for migrations and shutdown)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn insert(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn find_all_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn insert(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn save(&self, task: Task) -> StoreResult<Option<Task>> {
        Ok(Task::save(&self.pool, &task).await?)
    }

    async fn soft_delete_where(&self, id: Uuid, owner_id: Uuid) -> StoreResult<u64> {
        Ok(Task::soft_delete(&self.pool, id, owner_id).await?)
    }
}
