use std::time::Duration;

use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/order-server | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_URL | {WORK_DIR}/orders.db | SQLite 数据库文件 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (无) | 日志目录，设置后按天滚动写文件 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | WS_OUTBOX_CAPACITY | 64 | 每个 WebSocket 连接的发送队列长度 |
/// | WS_PING_INTERVAL_SECS | 30 | WebSocket ping 间隔(秒) |
/// | ORDER_CODE_ATTEMPTS | 5 | 订单号冲突时的最大生成次数 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/orders HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 数据库路径
    pub database_url: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    /// 每个连接的发送队列长度，满了就丢弃该连接的新消息
    pub ws_outbox_capacity: usize,
    pub ws_ping_interval: Duration,
    pub order_code_attempts: u32,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir =
            std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/order-server".into());
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| format!("{work_dir}/orders.db"));

        Self {
            http_port: env_or("HTTP_PORT", 3000),
            database_url,
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            log_json: env_or("LOG_JSON", false),
            ws_outbox_capacity: env_or("WS_OUTBOX_CAPACITY", 64usize).max(1),
            ws_ping_interval: Duration::from_secs(env_or("WS_PING_INTERVAL_SECS", 30u64).max(1)),
            order_code_attempts: env_or("ORDER_CODE_ATTEMPTS", 5u32).max(1),
            work_dir,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_url = format!("{}/orders.db", config.work_dir);
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_move_database_into_work_dir() {
        let config = Config::with_overrides("/tmp/orders-test", 18080);
        assert_eq!(config.http_port, 18080);
        assert_eq!(config.database_url, "/tmp/orders-test/orders.db");
        assert!(config.ws_outbox_capacity >= 1);
        assert!(config.order_code_attempts >= 1);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        assert_eq!(env_or("ORDER_SERVER_TEST_UNSET_KEY", 7u32), 7);
    }
}
