/// In-memory store
///
/// Same predicates and uniqueness rule as the PostgreSQL schema, held in two
/// maps behind a single `tokio::sync::RwLock`. Timestamps handed out by one
/// store are strictly increasing, so newest-first ordering follows insertion
/// order even when inserts land within the same clock tick.
///
/// Data lives for the lifetime of the value; nothing is persisted.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore, UserStore, USERS_EMAIL_CONSTRAINT};
use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User};

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    tasks: HashMap<Uuid, Task>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }
}

/// Process-local store implementing both store traits
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a user as soft-deleted, freeing their email for re-registration
    ///
    /// Returns `false` if no live user has this ID.
    pub async fn soft_delete_user(&self, id: Uuid) -> bool {
        let mut state = self.state.write().await;
        let now = state.next_timestamp();
        match state.users.get_mut(&id) {
            Some(user) if user.deleted_at.is_none() => {
                user.deleted_at = Some(now);
                user.updated_at = now;
                true
            }
            _ => false,
        }
    }

    /// Task row by ID including soft-deleted ones
    pub async fn raw_task(&self, id: Uuid) -> Option<Task> {
        self.state.read().await.tasks.get(&id).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.deleted_at.is_none() && u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&id)
            .filter(|u| u.deleted_at.is_none())
            .cloned())
    }

    async fn insert(&self, data: CreateUser) -> StoreResult<User> {
        let mut state = self.state.write().await;

        let taken = state
            .users
            .values()
            .any(|u| u.deleted_at.is_none() && u.email == data.email);
        if taken {
            return Err(StoreError::UniqueViolation {
                constraint: USERS_EMAIL_CONSTRAINT.to_string(),
            });
        }

        let now = state.next_timestamp();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn find_all_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|t| t.owner_id == owner_id && t.deleted_at.is_none())
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .get(&id)
            .filter(|t| t.deleted_at.is_none())
            .cloned())
    }

    async fn insert(&self, data: CreateTask) -> StoreResult<Task> {
        let mut state = self.state.write().await;
        let now = state.next_timestamp();
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            title: data.title,
            description: data.description,
            status: data.status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn save(&self, task: Task) -> StoreResult<Option<Task>> {
        let mut state = self.state.write().await;
        let now = state.next_timestamp();
        let Some(stored) = state
            .tasks
            .get_mut(&task.id)
            .filter(|t| t.owner_id == task.owner_id && t.deleted_at.is_none())
        else {
            return Ok(None);
        };

        stored.title = task.title;
        stored.description = task.description;
        stored.status = task.status;
        stored.updated_at = now;
        Ok(Some(stored.clone()))
    }

    async fn soft_delete_where(&self, id: Uuid, owner_id: Uuid) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let now = state.next_timestamp();
        match state.tasks.get_mut(&id) {
            Some(task) if task.owner_id == owner_id && task.deleted_at.is_none() => {
                task.deleted_at = Some(now);
                task.updated_at = now;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}
