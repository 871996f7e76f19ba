//! WebSocket 连接层
//!
//! - [`ConnectionManager`] - 握手后的连接生命周期
//! - [`dispatcher`] - 入站帧处理

pub mod connection;
pub mod dispatcher;

pub use connection::ConnectionManager;
pub use dispatcher::Dispatch;
