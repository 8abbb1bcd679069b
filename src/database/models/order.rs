use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub client_id: i32,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub observation: Option<String>,
    pub date_created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Association row linking an order to a product. At most one live row
/// exists per (order_id, product_id).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderProduct {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: Decimal,
    pub observation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Association row linking an order to a promotion. Same uniqueness rule
/// as `OrderProduct`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderPromotion {
    pub id: i32,
    pub order_id: i32,
    pub promotion_id: i32,
    pub quantity: i32,
    pub price: Decimal,
    pub observation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}
