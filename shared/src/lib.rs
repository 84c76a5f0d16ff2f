//! Shared types for the Mochila storefront
//!
//! Common types used across multiple crates including HTTP types,
//! error types, data models, and utility functions.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

// Error system re-exports (for convenient access)
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
