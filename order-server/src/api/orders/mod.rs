//! Order API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /v1/order | POST | 创建订单 | 无 (桌台扫码) |
//! | /v1/order | GET | 全部订单，新的在前 | 无 |
//! | /v1/order/{id}?lang= | GET | 单个订单，按语言填充菜品名 | 无 |
//! | /v1/order_staff | GET | 当前员工可处理的订单 | 员工 |
//! | /v1/order/receive/{id} | PUT | 领取订单 | 员工 |
//! | /v1/order/{id} | PUT | 完成订单 | 员工 (领取人) |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/v1", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/order", get(handler::list).post(handler::create))
        .route("/order/{id}", get(handler::get_by_id).put(handler::complete))
        .route("/order/receive/{id}", put(handler::receive))
        .route("/order_staff", get(handler::list_for_staff))
}
