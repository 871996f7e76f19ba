/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a resource ID (UUID v4, hyphenated).
///
/// Tables, menu items, orders and line items share this format so that
/// identifiers can be passed around as plain strings on the wire.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Generate a short display code for an order: `NNNN-NNNN`.
///
/// The code is for humans reading a kitchen screen, not an identity. It is
/// drawn independently of the order id, so collisions are possible and the
/// caller is expected to retry against the store's unique index.
pub fn order_code() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let first: u16 = rng.gen_range(0..10_000);
    let second: u16 = rng.gen_range(0..10_000);
    format!("{first:04}-{second:04}")
}
