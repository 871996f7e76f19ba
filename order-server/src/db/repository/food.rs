//! Menu Item Repository
//!
//! Only what ordering needs: create, look up, edit. The menu itself is managed elsewhere.

use super::{RepoError, RepoResult};
use shared::models::{Food, FoodCreate, FoodUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, category_id, name_uz, name_ru, name_en, description_uz, description_ru, description_en, price, image_url, weight, weight_type, available, created_at, updated_at";

fn validate_price(price: i64) -> RepoResult<()> {
    if price < 0 {
        return Err(RepoError::Validation(format!(
            "Price cannot be negative: {price}"
        )));
    }
    Ok(())
}

pub async fn find_by_id(executor: impl SqliteExecutor<'_>, id: &str) -> RepoResult<Option<Food>> {
    let food = sqlx::query_as::<_, Food>(&format!("SELECT {COLUMNS} FROM food WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(food)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Food>> {
    let foods = sqlx::query_as::<_, Food>(&format!("SELECT {COLUMNS} FROM food ORDER BY name_en"))
        .fetch_all(pool)
        .await?;
    Ok(foods)
}

pub async fn create(pool: &SqlitePool, data: FoodCreate) -> RepoResult<Food> {
    validate_price(data.price)?;

    let id = shared::util::new_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO food (id, category_id, name_uz, name_ru, name_en, description_uz, description_ru, description_en, price, image_url, weight, weight_type, available, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 1, ?13, ?13)",
    )
    .bind(&id)
    .bind(&data.category_id)
    .bind(&data.name_uz)
    .bind(&data.name_ru)
    .bind(&data.name_en)
    .bind(&data.description_uz)
    .bind(&data.description_ru)
    .bind(&data.description_en)
    .bind(data.price)
    .bind(&data.image_url)
    .bind(data.weight)
    .bind(&data.weight_type)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
}

pub async fn update(pool: &SqlitePool, id: &str, data: FoodUpdate) -> RepoResult<Food> {
    if let Some(price) = data.price {
        validate_price(price)?;
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE food SET name_uz = COALESCE(?1, name_uz), name_ru = COALESCE(?2, name_ru), name_en = COALESCE(?3, name_en), description_uz = COALESCE(?4, description_uz), description_ru = COALESCE(?5, description_ru), description_en = COALESCE(?6, description_en), price = COALESCE(?7, price), image_url = COALESCE(?8, image_url), weight = COALESCE(?9, weight), weight_type = COALESCE(?10, weight_type), available = COALESCE(?11, available), updated_at = ?12 WHERE id = ?13",
    )
    .bind(data.name_uz)
    .bind(data.name_ru)
    .bind(data.name_en)
    .bind(data.description_uz)
    .bind(data.description_ru)
    .bind(data.description_en)
    .bind(data.price)
    .bind(data.image_url)
    .bind(data.weight)
    .bind(data.weight_type)
    .bind(data.available)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu item {id} not found")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))
}
