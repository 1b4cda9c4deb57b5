//! Shelfmark Library Management System
//!
//! A Rust implementation of a school library management server:
//! catalog maintenance, patron accounts, and a loan ledger enforcing
//! borrow limits, book availability, and fine policy over a JSON API.

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
