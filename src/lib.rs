//! Libris Library Catalog Server
//!
//! A Rust REST backend for a small library catalog: CRUD over books with
//! denormalized author/publisher names, soft deletes, paginated search,
//! CSV export, and JWT bearer authentication.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
