//! Menu Item (Food) Model

use serde::{Deserialize, Serialize};

/// Menu item entity
///
/// Names and descriptions are stored per locale (uz / ru / en).
/// Price is an integer amount in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Food {
    pub id: String,
    pub category_id: Option<String>,
    pub name_uz: String,
    pub name_ru: String,
    pub name_en: String,
    pub description_uz: String,
    pub description_ru: String,
    pub description_en: String,
    pub price: i64,
    pub image_url: String,
    pub weight: f64,
    /// Unit for `weight`, e.g. "g", "ml", "pcs"
    pub weight_type: String,
    pub available: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodCreate {
    pub category_id: Option<String>,
    pub name_uz: String,
    pub name_ru: String,
    pub name_en: String,
    #[serde(default)]
    pub description_uz: String,
    #[serde(default)]
    pub description_ru: String,
    #[serde(default)]
    pub description_en: String,
    pub price: i64,
    #[serde(default)]
    pub image_url: String,
    pub weight: f64,
    pub weight_type: String,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodUpdate {
    pub name_uz: Option<String>,
    pub name_ru: Option<String>,
    pub name_en: Option<String>,
    pub description_uz: Option<String>,
    pub description_ru: Option<String>,
    pub description_en: Option<String>,
    pub price: Option<i64>,
    pub image_url: Option<String>,
    pub weight: Option<f64>,
    pub weight_type: Option<String>,
    pub available: Option<bool>,
}
