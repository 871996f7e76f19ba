//! Data models
//!
//! Shared between the order server and its clients (HTTP + WebSocket).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are UUID strings.

pub mod dining_table;
pub mod food;
pub mod order;

// Re-exports
pub use dining_table::*;
pub use food::*;
pub use order::*;
