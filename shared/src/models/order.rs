//! Order Model
//!
//! An order is created once with a frozen copy of every menu item it
//! references, then moves through `pending → in_process → done`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DiningTable;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, nobody has claimed it yet
    Pending,
    /// Claimed by exactly one staff member
    InProcess,
    /// Terminal
    Done,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProcess => "in_process",
            Self::Done => "done",
        }
    }

    /// The only status this one may move to, if any
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::InProcess),
            Self::InProcess => Some(Self::Done),
            Self::Done => None,
        }
    }

    pub fn can_transition_to(&self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_process" => Ok(Self::InProcess),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Display locale for menu text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Uz,
    Ru,
    #[default]
    En,
}

impl Locale {
    /// Parse a `?lang=` value, falling back to English for anything unknown
    pub fn from_query(lang: Option<&str>) -> Self {
        match lang.map(str::to_ascii_lowercase).as_deref() {
            Some("uz") => Self::Uz,
            Some("ru") => Self::Ru,
            _ => Self::En,
        }
    }
}

/// Order entity with its line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Short human-readable code (`NNNN-NNNN`)
    pub order_code: String,
    pub table_id: String,
    /// Table context, materialized on reads and in broadcasts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<DiningTable>,
    /// Staff member who claimed the order
    pub claimed_by: Option<String>,
    pub status: OrderStatus,
    /// Sum of `price * quantity` over the line items, fixed at creation
    pub total: i64,
    #[serde(default)]
    pub items: Vec<OrderLineItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Recompute the total from line items (used to check the stored one)
    pub fn items_total(&self) -> i64 {
        self.items.iter().map(OrderLineItem::line_total).sum()
    }

    pub fn is_claimed_by(&self, staff_id: &str) -> bool {
        self.claimed_by.as_deref() == Some(staff_id)
    }

    /// Fill the display `name`/`description` of every line for a locale
    pub fn localize(&mut self, locale: Locale) {
        for item in &mut self.items {
            item.localize(locale);
        }
    }
}

/// Frozen snapshot of a menu item at the moment it was ordered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLineItem {
    pub id: String,
    pub order_id: String,
    pub food_id: String,
    pub quantity: i64,
    pub name_uz: String,
    pub name_ru: String,
    pub name_en: String,
    pub description_uz: String,
    pub description_ru: String,
    pub description_en: String,
    /// Unit price at order time
    pub price: i64,
    pub image: String,
    pub weight: f64,
    pub weight_type: String,
    pub created_at: i64,
    /// Localized name, only set on reads that ask for a locale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "db", sqlx(skip))]
    pub name: Option<String>,
    /// Localized description, only set on reads that ask for a locale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "db", sqlx(skip))]
    pub description: Option<String>,
}

impl OrderLineItem {
    pub fn line_total(&self) -> i64 {
        self.price * self.quantity
    }

    pub fn localize(&mut self, locale: Locale) {
        let (name, description) = match locale {
            Locale::Uz => (&self.name_uz, &self.description_uz),
            Locale::Ru => (&self.name_ru, &self.description_ru),
            Locale::En => (&self.name_en, &self.description_en),
        };
        self.name = Some(name.clone());
        self.description = Some(description.clone());
    }
}

/// One requested line of a new order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub food_id: String,
    pub quantity: i64,
}

/// Create order payload: `{ table_id, foods: [{ food_id, quantity }] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub table_id: String,
    #[serde(default)]
    pub foods: Vec<OrderItemRequest>,
}
