//! ConnectionManager - 单个 WebSocket 连接的生命周期
//!
//! 握手 → 身份绑定 → 注册到 hub → 读循环 → 从 hub 注销 → 关闭 socket
//!
//! 每个连接两个任务：
//! - 读循环 (当前任务)：解析入站帧，交给 [`dispatcher`](super::dispatcher)
//! - 写任务：把 outbox 里的帧写进 socket，并定时发送 ping
//!
//! outbox 的唯一强引用 `Sender` 由读循环持有，hub 只有弱引用。
//! 读循环退出时先从 hub 注销，再丢弃 `Sender`，写任务随之结束并关闭 socket。

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::dispatcher;
use crate::auth::JwtService;
use crate::hub::{ConnId, Frame, Identity, NotificationHub};
use crate::security_log;

#[derive(Clone)]
pub struct ConnectionManager {
    hub: NotificationHub,
    jwt: Arc<JwtService>,
    outbox_capacity: usize,
    ping_interval: Duration,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("outbox_capacity", &self.outbox_capacity)
            .field("ping_interval", &self.ping_interval)
            .finish_non_exhaustive()
    }
}

impl ConnectionManager {
    pub fn new(
        hub: NotificationHub,
        jwt: Arc<JwtService>,
        outbox_capacity: usize,
        ping_interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            hub,
            jwt,
            outbox_capacity: outbox_capacity.max(1),
            ping_interval,
            shutdown,
        }
    }

    /// 推导连接身份
    ///
    /// 有效的员工令牌优先；令牌缺失或无效时退回到 `table_id` 对应的匿名桌台会话。
    pub fn identify(&self, token: Option<&str>, table_id: Option<&str>) -> Identity {
        if let Some(token) = token.map(JwtService::strip_bearer).filter(|t| !t.is_empty()) {
            match self.jwt.validate_token(token) {
                Ok(claims) => return Identity::Staff(claims.sub),
                Err(e) => {
                    security_log!("WARN", "ws_auth_failed", error = format!("{}", e));
                }
            }
        }

        match table_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Identity::Table(id.to_string()),
            None => Identity::Anonymous,
        }
    }

    /// 运行一个已完成握手的连接，直到对端关闭、读失败或服务器关机
    pub async fn serve(&self, socket: WebSocket, identity: Identity) {
        let (outbox_tx, outbox_rx) = mpsc::channel::<Frame>(self.outbox_capacity);
        let conn = self.hub.register(identity.clone(), &outbox_tx);
        let own_room = identity.personal_room(conn);

        tracing::info!(conn = %conn, identity = %identity, room = %own_room, "WebSocket connected");

        let (sink, mut stream) = socket.split();
        let writer = tokio::spawn(write_loop(sink, outbox_rx, self.ping_interval, conn));

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::debug!(conn = %conn, "Server shutting down, closing connection");
                    break;
                }
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            dispatcher::dispatch(&self.hub, conn, &own_room, text.as_str());
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::debug!(conn = %conn, error = %e, "WebSocket read failed");
                            break;
                        }
                    }
                }
            }
        }

        // 先注销，再释放 socket
        self.hub.remove(conn);
        drop(outbox_tx);
        if let Err(e) = writer.await {
            tracing::warn!(conn = %conn, error = %e, "WebSocket writer task failed");
        }

        tracing::info!(conn = %conn, identity = %identity, "WebSocket disconnected");
    }
}

async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbox: mpsc::Receiver<Frame>,
    ping_every: Duration,
    conn: ConnId,
) {
    let mut ping = tokio::time::interval(ping_every);
    ping.tick().await; // skip immediate

    loop {
        tokio::select! {
            frame = outbox.recv() => {
                let Some(frame) = frame else {
                    break;
                };
                if let Err(e) = sink.send(Message::Text(frame.to_string().into())).await {
                    tracing::debug!(conn = %conn, error = %e, "WebSocket write failed");
                    break;
                }
            }
            _ = ping.tick() => {
                if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    if let Err(e) = sink.close().await {
        tracing::debug!(conn = %conn, error = %e, "WebSocket close failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, jwt::generate_printable_secret};

    fn manager() -> ConnectionManager {
        let jwt = JwtService::with_config(JwtConfig::with_secret(generate_printable_secret()));
        ConnectionManager::new(
            NotificationHub::new(),
            Arc::new(jwt),
            8,
            Duration::from_secs(30),
            CancellationToken::new(),
        )
    }

    #[test]
    fn test_valid_token_binds_staff() {
        let manager = manager();
        let token = manager.jwt.generate_token("staff-1", "aziz", "waiter").unwrap();

        assert_eq!(
            manager.identify(Some(&token), Some("t1")),
            Identity::Staff("staff-1".into())
        );
        let bearer = format!("Bearer {token}");
        assert_eq!(
            manager.identify(Some(&bearer), None),
            Identity::Staff("staff-1".into())
        );
    }

    #[test]
    fn test_invalid_token_falls_back_to_table() {
        let manager = manager();
        assert_eq!(
            manager.identify(Some("garbage"), Some("t1")),
            Identity::Table("t1".into())
        );
        assert_eq!(manager.identify(None, Some(" t2 ")), Identity::Table("t2".into()));
    }

    #[test]
    fn test_nothing_presented_is_anonymous() {
        let manager = manager();
        assert_eq!(manager.identify(None, None), Identity::Anonymous);
        assert_eq!(manager.identify(Some(""), Some("")), Identity::Anonymous);
    }
}
