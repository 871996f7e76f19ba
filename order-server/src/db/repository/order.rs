//! Order Repository
//!
//! Orders and their frozen line items. Status changes are conditional updates:
//! the `WHERE` clause carries the expected current state and the caller
//! inspects `rows_affected()` to learn whether it won.

use std::collections::HashMap;

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, Order, OrderLineItem, OrderStatus};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};

const ORDER_SELECT: &str = "SELECT o.id, o.order_code, o.table_id, o.claimed_by, o.status, o.total, o.created_at, o.updated_at, t.number AS table_number, t.created_at AS table_created_at, t.updated_at AS table_updated_at FROM orders o LEFT JOIN dining_table t ON t.id = o.table_id";

const LINE_COLUMNS: &str = "id, order_id, food_id, quantity, name_uz, name_ru, name_en, description_uz, description_ru, description_en, price, image, weight, weight_type, created_at";

/// Order row joined with its table
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    order_code: String,
    table_id: String,
    claimed_by: Option<String>,
    status: String,
    total: i64,
    created_at: i64,
    updated_at: i64,
    table_number: Option<i64>,
    table_created_at: Option<i64>,
    table_updated_at: Option<i64>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row.status.parse().map_err(RepoError::Database)?;
        let table = match (row.table_number, row.table_created_at, row.table_updated_at) {
            (Some(number), Some(created_at), Some(updated_at)) => Some(DiningTable {
                id: row.table_id.clone(),
                number,
                created_at,
                updated_at,
            }),
            _ => None,
        };
        Ok(Order {
            id: row.id,
            order_code: row.order_code,
            table_id: row.table_id,
            table,
            claimed_by: row.claimed_by,
            status,
            total: row.total,
            items: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ── Writes (inside the creation transaction) ──────────────────────────

/// Insert a fresh `pending` order with no claimant and a zero total
///
/// A clashing `order_code` surfaces as [`RepoError::Duplicate`].
pub async fn insert(
    conn: &mut SqliteConnection,
    id: &str,
    order_code: &str,
    table_id: &str,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, order_code, table_id, claimed_by, status, total, created_at, updated_at) VALUES (?1, ?2, ?3, NULL, 'pending', 0, ?4, ?4)",
    )
    .bind(id)
    .bind(order_code)
    .bind(table_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_line(conn: &mut SqliteConnection, line: &OrderLineItem) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_line (id, order_id, food_id, quantity, name_uz, name_ru, name_en, description_uz, description_ru, description_en, price, image, weight, weight_type, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    )
    .bind(&line.id)
    .bind(&line.order_id)
    .bind(&line.food_id)
    .bind(line.quantity)
    .bind(&line.name_uz)
    .bind(&line.name_ru)
    .bind(&line.name_en)
    .bind(&line.description_uz)
    .bind(&line.description_ru)
    .bind(&line.description_en)
    .bind(line.price)
    .bind(&line.image)
    .bind(line.weight)
    .bind(&line.weight_type)
    .bind(line.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn set_total(conn: &mut SqliteConnection, id: &str, total: i64) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE orders SET total = ? WHERE id = ?")
        .bind(total)
        .bind(id)
        .execute(conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

// ── Status transitions (compare-and-set) ──────────────────────────────

/// `pending → in_process`, only if nobody has claimed it yet
///
/// Returns `false` when the row did not match (missing, claimed or done).
pub async fn try_claim(
    executor: impl SqliteExecutor<'_>,
    id: &str,
    staff_id: &str,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET claimed_by = ?1, status = 'in_process', updated_at = ?2 WHERE id = ?3 AND status = 'pending' AND claimed_by IS NULL",
    )
    .bind(staff_id)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// `in_process → done`, only for the recorded claimant
pub async fn try_complete(
    executor: impl SqliteExecutor<'_>,
    id: &str,
    staff_id: &str,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET status = 'done', updated_at = ?1 WHERE id = ?2 AND status = 'in_process' AND claimed_by = ?3",
    )
    .bind(now)
    .bind(id)
    .bind(staff_id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() == 1)
}

// ── Reads ─────────────────────────────────────────────────────────────

/// Order header with table, without line items
pub async fn find_header(executor: impl SqliteExecutor<'_>, id: &str) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE o.id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    row.map(Order::try_from).transpose()
}

pub async fn find_lines(
    executor: impl SqliteExecutor<'_>,
    order_id: &str,
) -> RepoResult<Vec<OrderLineItem>> {
    let lines = sqlx::query_as::<_, OrderLineItem>(&format!(
        "SELECT {LINE_COLUMNS} FROM order_line WHERE order_id = ? ORDER BY created_at, rowid"
    ))
    .bind(order_id)
    .fetch_all(executor)
    .await?;
    Ok(lines)
}

/// Fully materialized order: table and line items
pub async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> RepoResult<Option<Order>> {
    let Some(mut order) = find_header(&mut *conn, id).await? else {
        return Ok(None);
    };
    order.items = find_lines(&mut *conn, id).await?;
    Ok(Some(order))
}

/// All orders, newest first
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} ORDER BY o.created_at DESC, o.rowid DESC"
    ))
    .fetch_all(pool)
    .await?;
    with_lines(pool, rows).await
}

/// Open orders a staff member can act on: unclaimed, or claimed by them
pub async fn find_open_for_staff(pool: &SqlitePool, staff_id: &str) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} WHERE o.status IN ('pending', 'in_process') AND (o.claimed_by IS NULL OR o.claimed_by = ?) ORDER BY o.created_at DESC, o.rowid DESC"
    ))
    .bind(staff_id)
    .fetch_all(pool)
    .await?;
    with_lines(pool, rows).await
}

async fn with_lines(pool: &SqlitePool, rows: Vec<OrderRow>) -> RepoResult<Vec<Order>> {
    let mut orders = rows
        .into_iter()
        .map(Order::try_from)
        .collect::<RepoResult<Vec<_>>>()?;
    if orders.is_empty() {
        return Ok(orders);
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {LINE_COLUMNS} FROM order_line WHERE order_id IN ("
    ));
    let mut ids = qb.separated(", ");
    for order in &orders {
        ids.push_bind(order.id.clone());
    }
    ids.push_unseparated(") ORDER BY created_at, rowid");

    let lines = qb.build_query_as::<OrderLineItem>().fetch_all(pool).await?;

    let mut by_order: HashMap<String, Vec<OrderLineItem>> = HashMap::new();
    for line in lines {
        by_order.entry(line.order_id.clone()).or_default().push(line);
    }
    for order in &mut orders {
        order.items = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(orders)
}
