use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::hub::NotificationHub;
use crate::orders::{OrderService, OrderStateMachine};
use crate::utils::AppError;
use crate::ws::ConnectionManager;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是廉价克隆 (Arc / 连接池句柄)，axum 每个请求克隆一次。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | SQLite 连接池 |
/// | hub | 实时通知房间表 |
/// | orders | 订单创建 / 查询 |
/// | state_machine | 领取 / 完成 |
/// | connections | WebSocket 连接管理 |
/// | jwt_service | 员工令牌校验 |
/// | shutdown | 关机信号，所有长连接监听它 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub hub: NotificationHub,
    pub orders: OrderService,
    pub state_machine: OrderStateMachine,
    pub connections: ConnectionManager,
    pub jwt_service: Arc<JwtService>,
    pub shutdown: CancellationToken,
    started_at: Instant,
}

impl ServerState {
    /// 打开数据库并组装所有服务
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            AppError::internal(format!(
                "Failed to create work dir {}: {e}",
                config.work_dir
            ))
        })?;
        let db = DbService::new(&config.database_url).await?;
        Ok(Self::with_db(config.clone(), db))
    }

    /// 使用已有数据库组装 (测试用内存库)
    pub fn with_db(config: Config, db: DbService) -> Self {
        let hub = NotificationHub::new();
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let shutdown = CancellationToken::new();

        let orders = OrderService::new(db.pool.clone(), hub.clone(), config.order_code_attempts);
        let state_machine = OrderStateMachine::new(db.pool.clone(), hub.clone());
        let connections = ConnectionManager::new(
            hub.clone(),
            jwt_service.clone(),
            config.ws_outbox_capacity,
            config.ws_ping_interval,
            shutdown.clone(),
        );

        Self {
            config,
            db,
            hub,
            orders,
            state_machine,
            connections,
            jwt_service,
            shutdown,
            started_at: Instant::now(),
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
