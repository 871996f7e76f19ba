//! OrderStateMachine - `pending → in_process → done`
//!
//! Both transitions are conditional updates on the order row. The row is the
//! only lock, so two servers sharing the database still get one winner.

use shared::message::WsMessage;
use shared::models::{Order, OrderStatus};
use sqlx::SqlitePool;

use super::error::{OrderError, OrderResult};
use super::service::load_order;
use crate::db::repository::order as order_repo;
use crate::hub::{NotificationHub, RoomKey};

#[derive(Clone, Debug)]
pub struct OrderStateMachine {
    pool: SqlitePool,
    hub: NotificationHub,
}

impl OrderStateMachine {
    pub fn new(pool: SqlitePool, hub: NotificationHub) -> Self {
        Self { pool, hub }
    }

    /// Claim a pending order for `staff_id`
    ///
    /// Publishes `status_updated` to every connection.
    pub async fn claim(&self, order_id: &str, staff_id: &str) -> OrderResult<Order> {
        let now = shared::util::now_millis();
        if !order_repo::try_claim(&self.pool, order_id, staff_id, now).await? {
            let current = order_repo::find_header(&self.pool, order_id).await?;
            return Err(match current {
                None => OrderError::OrderNotFound(order_id.to_string()),
                Some(order) if order.status == OrderStatus::Done => {
                    OrderError::AlreadyCompleted(order_id.to_string())
                }
                Some(order) => {
                    tracing::info!(
                        order_id = %order_id,
                        staff_id = %staff_id,
                        claimed_by = ?order.claimed_by,
                        "Claim rejected, order already taken"
                    );
                    OrderError::AlreadyClaimed(order_id.to_string())
                }
            });
        }

        let order = load_order(&self.pool, order_id).await?;
        tracing::info!(order_id = %order_id, staff_id = %staff_id, "Order claimed");

        if let Some(message) = status_message(&order) {
            self.hub.broadcast_to_all(&message);
        }
        Ok(order)
    }

    /// Complete an in-process order; only its claimant may do this
    ///
    /// Publishes `status_updated` to the order's table room and the claimant's room.
    pub async fn complete(&self, order_id: &str, caller_id: &str) -> OrderResult<Order> {
        let current = order_repo::find_header(&self.pool, order_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        if !current.is_claimed_by(caller_id) {
            tracing::warn!(
                order_id = %order_id,
                caller_id = %caller_id,
                claimed_by = ?current.claimed_by,
                "Completion attempted by non-claimant"
            );
            return Err(OrderError::NotClaimant(order_id.to_string()));
        }
        if current.status == OrderStatus::Done {
            return Err(OrderError::AlreadyCompleted(order_id.to_string()));
        }

        let now = shared::util::now_millis();
        if !order_repo::try_complete(&self.pool, order_id, caller_id, now).await? {
            // lost a race with a concurrent completion
            let latest = order_repo::find_header(&self.pool, order_id)
                .await?
                .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
            return Err(match latest.status {
                OrderStatus::Done => OrderError::AlreadyCompleted(order_id.to_string()),
                from => OrderError::InvalidTransition {
                    order_id: order_id.to_string(),
                    from,
                    to: OrderStatus::Done,
                },
            });
        }

        let order = load_order(&self.pool, order_id).await?;
        tracing::info!(order_id = %order_id, staff_id = %caller_id, "Order completed");

        if let Some(message) = status_message(&order) {
            self.hub
                .broadcast_to_room(&RoomKey::table(&order.table_id), &message);
            self.hub.broadcast_to_room(&RoomKey::staff(caller_id), &message);
        }
        Ok(order)
    }
}

fn status_message(order: &Order) -> Option<WsMessage> {
    WsMessage::status_updated(order)
        .inspect_err(|e| {
            tracing::warn!(order_id = %order.id, error = %e, "Failed to encode status_updated event");
        })
        .ok()
}
