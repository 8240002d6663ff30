//! # Taskboard Shared Library
//!
//! Domain types, persistence seams and the authentication / task services used
//! by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, bearer tokens and request auth context
//! - `clock`: Time source used for token expiry
//! - `db`: PostgreSQL pool and migrations
//! - `models`: Users and tasks, with their SQL operations
//! - `services`: Auth Service and Task Service
//! - `store`: Persistence traits with PostgreSQL and in-memory backends
//! - `validation`: Field-level validation error reporting

pub mod auth;
pub mod clock;
pub mod db;
pub mod models;
pub mod services;
pub mod store;
pub mod validation;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
