//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::time::Duration;

use order_server::db::DbService;
use order_server::db::repository::{dining_table, food};
use order_server::hub::Frame;
use order_server::{Config, ServerState};
use shared::message::WsMessage;
use shared::models::{
    CreateOrderRequest, DiningTable, DiningTableCreate, Food, FoodCreate, OrderItemRequest,
};
use tokio::sync::mpsc;

/// Server state over a private in-memory database
pub async fn memory_state() -> ServerState {
    let db = DbService::in_memory().await.expect("in-memory database");
    ServerState::with_db(Config::default(), db)
}

/// Server state over a database file inside `dir`
pub async fn file_state(dir: &tempfile::TempDir) -> ServerState {
    let path = dir.path().join("orders.db");
    let db = DbService::new(path.to_str().expect("utf-8 temp path"))
        .await
        .expect("file database");
    ServerState::with_db(Config::default(), db)
}

pub async fn seed_table(state: &ServerState, number: i64) -> DiningTable {
    dining_table::create(&state.db.pool, DiningTableCreate { number })
        .await
        .expect("seed table")
}

pub async fn seed_food(state: &ServerState, name_en: &str, price: i64) -> Food {
    let (name_uz, name_ru) = match name_en {
        "Soup" => ("Sho'rva", "Суп"),
        "Bread" => ("Non", "Хлеб"),
        other => (other, other),
    };
    food::create(
        &state.db.pool,
        FoodCreate {
            category_id: None,
            name_uz: name_uz.into(),
            name_ru: name_ru.into(),
            name_en: name_en.into(),
            description_uz: String::new(),
            description_ru: String::new(),
            description_en: format!("{name_en} of the day"),
            price,
            image_url: format!("{}.png", name_en.to_lowercase()),
            weight: 300.0,
            weight_type: "g".into(),
        },
    )
    .await
    .expect("seed food")
}

pub fn order_request(table_id: &str, items: &[(&str, i64)]) -> CreateOrderRequest {
    CreateOrderRequest {
        table_id: table_id.to_string(),
        foods: items
            .iter()
            .map(|(food_id, quantity)| OrderItemRequest {
                food_id: food_id.to_string(),
                quantity: *quantity,
            })
            .collect(),
    }
}

/// Everything currently waiting in an outbox, decoded
pub fn drain(rx: &mut mpsc::Receiver<Frame>) -> Vec<WsMessage> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(WsMessage::from_text(&frame).expect("server frames are valid envelopes"));
    }
    frames
}

pub async fn count(state: &ServerState, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&state.db.pool)
        .await
        .expect("count query")
}

/// Poll until `check` holds or two seconds pass
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
