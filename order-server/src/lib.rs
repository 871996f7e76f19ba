//! Order Server - 餐厅订单生命周期 + 实时通知
//!
//! # 架构概述
//!
//! - **订单** (`orders`): 菜单快照、事务性下单、领取/完成状态机
//! - **通知中心** (`hub`): 连接 / 房间表，按房间广播
//! - **WebSocket** (`ws`): 连接生命周期和入站帧转发
//! - **数据库** (`db`): SQLite (sqlx) 连接池和仓储函数
//! - **认证** (`auth`): 员工 JWT
//! - **HTTP API** (`api`): axum 路由
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层
//! ├── orders/        # 订单服务和状态机
//! ├── hub/           # 通知中心
//! ├── ws/            # WebSocket 连接
//! └── utils/         # 日志、错误类型
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod hub;
pub mod orders;
pub mod utils;
pub mod ws;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use hub::NotificationHub;
pub use orders::{OrderService, OrderStateMachine};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use ws::ConnectionManager;

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境: 加载 `.env`，初始化日志
pub fn setup_environment() -> anyhow::Result<()> {
    if let Err(e) = dotenv::dotenv() {
        // .env 不是必需的
        eprintln!("No .env loaded: {e}");
    }

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    let json = std::env::var("LOG_JSON").is_ok_and(|v| v == "true" || v == "1");

    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(log_level.as_deref(), json, log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
  ____          __
 / __ \_______/ /__ ____
/ /_/ / __/ _  / -_) __/
\____/_/  \_,_/\__/_/
    "#
    );
}
