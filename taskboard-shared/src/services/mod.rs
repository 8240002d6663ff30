/// Application services
///
/// - [`auth::AuthService`]: registration, credential validation, token issuance
/// - [`tasks::TaskService`]: owner-scoped task lifecycle
///
/// Both hold their collaborators behind `Arc`s and are cheap to clone into
/// request handlers.

pub mod auth;
pub mod tasks;
