//! WebSocket endpoint
//!
//! GET /ws?token=<JWT>&table_id=<id>
//!
//! 浏览器 WebSocket 不支持自定义 header，员工令牌走 query parameter，
//! 也接受 `Authorization` header。两者都没有或校验失败时按桌台会话处理。

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use serde::Deserialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(handle_ws))
}

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
    pub table_id: Option<String>,
}

/// GET /ws
pub async fn handle_ws(
    State(state): State<ServerState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let token = query.token.as_deref().or_else(|| {
        headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
    });
    let identity = state
        .connections
        .identify(token, query.table_id.as_deref());

    let connections = state.connections.clone();
    ws.on_upgrade(move |socket| async move { connections.serve(socket, identity).await })
}
