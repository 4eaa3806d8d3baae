//! regressd API Module
//!
//! The API module provides HTTP endpoints for training, querying, retraining
//! and deleting stored regressions.

pub mod handlers;
pub mod models;
pub mod server;

pub use handlers::*;
pub use models::*;
pub use server::*;
