//! Menu snapshot resolution
//!
//! Copies the live menu item into an immutable value at order time. Line items
//! are built from this copy only, so later menu edits never reach an existing order.

use shared::models::{Food, OrderLineItem};
use sqlx::SqliteExecutor;

use super::error::{OrderError, OrderResult};
use crate::db::repository::food;

/// Frozen view of a menu item
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSnapshot {
    pub food_id: String,
    pub name_uz: String,
    pub name_ru: String,
    pub name_en: String,
    pub description_uz: String,
    pub description_ru: String,
    pub description_en: String,
    pub price: i64,
    pub image: String,
    pub weight: f64,
    pub weight_type: String,
}

impl From<Food> for MenuSnapshot {
    fn from(food: Food) -> Self {
        Self {
            food_id: food.id,
            name_uz: food.name_uz,
            name_ru: food.name_ru,
            name_en: food.name_en,
            description_uz: food.description_uz,
            description_ru: food.description_ru,
            description_en: food.description_en,
            price: food.price,
            image: food.image_url,
            weight: food.weight,
            weight_type: food.weight_type,
        }
    }
}

impl MenuSnapshot {
    /// Build the persisted line for `quantity` units of this item
    pub fn into_line(self, order_id: &str, quantity: i64, now: i64) -> OrderLineItem {
        OrderLineItem {
            id: shared::util::new_id(),
            order_id: order_id.to_string(),
            food_id: self.food_id,
            quantity,
            name_uz: self.name_uz,
            name_ru: self.name_ru,
            name_en: self.name_en,
            description_uz: self.description_uz,
            description_ru: self.description_ru,
            description_en: self.description_en,
            price: self.price,
            image: self.image,
            weight: self.weight,
            weight_type: self.weight_type,
            created_at: now,
            name: None,
            description: None,
        }
    }
}

/// Resolve the current snapshot of a menu item
///
/// Unknown and unavailable items both resolve to [`OrderError::FoodNotFound`].
pub async fn resolve(executor: impl SqliteExecutor<'_>, food_id: &str) -> OrderResult<MenuSnapshot> {
    match food::find_by_id(executor, food_id).await? {
        Some(item) if item.available => Ok(MenuSnapshot::from(item)),
        Some(_) => {
            tracing::debug!(food_id = %food_id, "Menu item is not available");
            Err(OrderError::FoodNotFound(food_id.to_string()))
        }
        None => Err(OrderError::FoodNotFound(food_id.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{FoodCreate, FoodUpdate};

    fn bread() -> FoodCreate {
        FoodCreate {
            category_id: None,
            name_uz: "Non".into(),
            name_ru: "Хлеб".into(),
            name_en: "Bread".into(),
            description_uz: String::new(),
            description_ru: String::new(),
            description_en: String::new(),
            price: 5,
            image_url: "bread.png".into(),
            weight: 1.0,
            weight_type: "pcs".into(),
        }
    }

    #[tokio::test]
    async fn test_resolve_copies_menu_fields() {
        let db = DbService::in_memory().await.unwrap();
        let item = food::create(&db.pool, bread()).await.unwrap();

        let snap = resolve(&db.pool, &item.id).await.unwrap();
        assert_eq!(snap.price, 5);
        assert_eq!(snap.name_ru, "Хлеб");
        assert_eq!(snap.image, "bread.png");

        let line = snap.into_line("o1", 3, 42);
        assert_eq!(line.food_id, item.id);
        assert_eq!(line.line_total(), 15);
        assert_eq!(line.weight_type, "pcs");
    }

    #[tokio::test]
    async fn test_missing_and_unavailable_items() {
        let db = DbService::in_memory().await.unwrap();
        assert!(matches!(
            resolve(&db.pool, "nope").await,
            Err(OrderError::FoodNotFound(id)) if id == "nope"
        ));

        let item = food::create(&db.pool, bread()).await.unwrap();
        food::update(
            &db.pool,
            &item.id,
            FoodUpdate {
                available: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(matches!(
            resolve(&db.pool, &item.id).await,
            Err(OrderError::FoodNotFound(_))
        ));
    }
}
