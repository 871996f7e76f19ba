//! Shared types for the order server
//!
//! Domain models, the unified error system, the WebSocket frame format
//! and small utilities used by the server crate and its clients.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use message::{EventType, WsMessage};
