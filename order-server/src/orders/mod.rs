//! 订单生命周期
//!
//! - [`OrderService`] - 事务性创建、查询
//! - [`OrderStateMachine`] - 领取 / 完成
//! - [`snapshot`] - 下单时冻结菜品信息

pub mod error;
pub mod service;
pub mod snapshot;
pub mod state_machine;

pub use error::{OrderError, OrderErrorKind, OrderResult};
pub use service::OrderService;
pub use snapshot::MenuSnapshot;
pub use state_machine::OrderStateMachine;
