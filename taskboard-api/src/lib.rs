//! # Taskboard API Server Library
//!
//! HTTP surface of the Taskboard service.
//!
//! ## Modules
//!
//! - `app`: Application state, router and bearer middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
