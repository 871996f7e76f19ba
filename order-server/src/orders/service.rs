//! OrderService - 订单创建与查询
//!
//! 创建在单个事务内完成：订单头、逐项快照、明细、合计，全部成功才提交。
//! 提交后向所有连接广播 `new_order`。

use shared::message::WsMessage;
use shared::models::{CreateOrderRequest, Locale, Order};
use sqlx::{SqliteConnection, SqlitePool};

use super::error::{OrderError, OrderResult};
use super::snapshot;
use crate::db::repository::{RepoError, dining_table, order as order_repo};
use crate::hub::NotificationHub;

#[derive(Clone, Debug)]
pub struct OrderService {
    pool: SqlitePool,
    hub: NotificationHub,
    code_attempts: u32,
}

impl OrderService {
    pub fn new(pool: SqlitePool, hub: NotificationHub, code_attempts: u32) -> Self {
        Self {
            pool,
            hub,
            code_attempts: code_attempts.max(1),
        }
    }

    /// 创建订单
    ///
    /// 任一步失败都会回滚整个事务，不会留下半个订单。
    pub async fn create_order(&self, request: CreateOrderRequest) -> OrderResult<Order> {
        validate(&request)?;

        // 事务内先读后写，必须一开始就持有写锁 (WAL 下 deferred 事务升级写锁不走 busy_timeout)
        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| OrderError::Transaction(e.to_string()))?;

        if dining_table::find_by_id(&mut *tx, &request.table_id)
            .await?
            .is_none()
        {
            return Err(OrderError::TableNotFound(request.table_id));
        }

        let order_id = shared::util::new_id();
        let now = shared::util::now_millis();
        let order_code = self
            .insert_with_fresh_code(&mut tx, &order_id, &request.table_id, now)
            .await?;

        let mut total: i64 = 0;
        for item in &request.foods {
            let line = snapshot::resolve(&mut *tx, &item.food_id)
                .await?
                .into_line(&order_id, item.quantity, now);

            total = line
                .price
                .checked_mul(line.quantity)
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or(OrderError::TotalOutOfRange)?;

            order_repo::insert_line(&mut tx, &line).await?;
        }

        order_repo::set_total(&mut tx, &order_id, total).await?;

        let order = order_repo::find_by_id(&mut tx, &order_id)
            .await?
            .ok_or_else(|| OrderError::Database(format!("Order {order_id} vanished before commit")))?;

        tx.commit()
            .await
            .map_err(|e| OrderError::Transaction(e.to_string()))?;

        tracing::info!(
            order_id = %order.id,
            order_code = %order_code,
            table_id = %order.table_id,
            lines = order.items.len(),
            total,
            "Order created"
        );

        match WsMessage::new_order(&order) {
            Ok(message) => {
                self.hub.broadcast_to_all(&message);
            }
            Err(e) => tracing::warn!(order_id = %order.id, error = %e, "Failed to encode new_order event"),
        }

        Ok(order)
    }

    /// 生成订单号并插入订单头；订单号撞上唯一索引时重新生成
    async fn insert_with_fresh_code(
        &self,
        conn: &mut SqliteConnection,
        order_id: &str,
        table_id: &str,
        now: i64,
    ) -> OrderResult<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let code = shared::util::order_code();
            match order_repo::insert(&mut *conn, order_id, &code, table_id, now).await {
                Ok(()) => return Ok(code),
                Err(RepoError::Duplicate(_)) if attempt < self.code_attempts => {
                    tracing::debug!(code = %code, attempt, "Order code collision, regenerating");
                }
                Err(RepoError::Duplicate(_)) => {
                    return Err(OrderError::Database(format!(
                        "Could not generate a unique order code after {attempt} attempts"
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// 单个订单 (含桌台和明细)，明细按语言填充 `name` / `description`
    pub async fn get_order(&self, order_id: &str, locale: Locale) -> OrderResult<Order> {
        let mut order = load_order(&self.pool, order_id).await?;
        order.localize(locale);
        Ok(order)
    }

    /// 全部订单，最新在前
    pub async fn list_orders(&self) -> OrderResult<Vec<Order>> {
        Ok(order_repo::find_all(&self.pool).await?)
    }

    /// 员工可处理的订单：未领取的，或自己领取且未完成的
    pub async fn list_for_staff(&self, staff_id: &str) -> OrderResult<Vec<Order>> {
        Ok(order_repo::find_open_for_staff(&self.pool, staff_id).await?)
    }
}

/// 读取完整订单，不存在时返回 `OrderNotFound`
pub(crate) async fn load_order(pool: &SqlitePool, order_id: &str) -> OrderResult<Order> {
    let mut conn = pool.acquire().await?;
    order_repo::find_by_id(&mut conn, order_id)
        .await?
        .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
}

fn validate(request: &CreateOrderRequest) -> OrderResult<()> {
    if request.table_id.trim().is_empty() {
        return Err(OrderError::MissingField("table_id"));
    }
    if request.foods.is_empty() {
        return Err(OrderError::EmptyOrder);
    }
    for item in &request.foods {
        if item.food_id.trim().is_empty() {
            return Err(OrderError::MissingField("food_id"));
        }
        if item.quantity <= 0 {
            return Err(OrderError::InvalidQuantity {
                food_id: item.food_id.clone(),
                quantity: item.quantity,
            });
        }
    }
    Ok(())
}
