//! Data models
//!
//! Shared between store-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod customer;
pub mod order;
pub mod product;

// Re-exports
pub use customer::*;
pub use order::*;
pub use product::*;
