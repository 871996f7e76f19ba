//! Order API Handlers
//!
//! 业务规则全部在 [`OrderService`](crate::orders::OrderService) 和
//! [`OrderStateMachine`](crate::orders::OrderStateMachine) 里，这里只做提取和转换。

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::models::{CreateOrderRequest, Locale, Order};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// POST /v1/order - 创建订单
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = state.orders.create_order(payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /v1/order - 获取所有订单
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders.list_orders().await?;
    Ok(Json(orders))
}

/// GET /v1/order/{id}?lang=uz|ru|en - 获取单个订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<LangQuery>,
) -> AppResult<Json<Order>> {
    let locale = Locale::from_query(query.lang.as_deref());
    let order = state.orders.get_order(&id, locale).await?;
    Ok(Json(order))
}

/// GET /v1/order_staff - 当前员工的待办订单
pub async fn list_for_staff(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders.list_for_staff(&user.id).await?;
    Ok(Json(orders))
}

/// PUT /v1/order/receive/{id} - 领取订单
pub async fn receive(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.state_machine.claim(&id, &user.id).await?;
    Ok(Json(order))
}

/// PUT /v1/order/{id} - 完成订单
pub async fn complete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.state_machine.complete(&id, &user.id).await?;
    Ok(Json(order))
}
