//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity (商品)
///
/// `stock` is the single source of truth for availability. It is mutated
/// only by the checkout transaction and by direct stock adjustments.
/// `price` is integer cents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    /// Unit price in cents
    pub price: i64,
    /// Available units, never negative
    pub stock: i64,
    /// Reorder threshold, informational only
    pub min_stock: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub category: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub min_stock: i64,
}

/// Update product payload
///
/// `stock` is deliberately absent: stock changes go through the
/// stock-adjustment endpoint so the ledger history stays auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub min_stock: Option<i64>,
    pub is_active: Option<bool>,
}

/// Manager stock adjustment payload
///
/// Exactly one of `delta` (relative) or `set` (absolute, after a stocktake)
/// must be present. The resulting stock may not go below zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjust {
    pub delta: Option<i64>,
    pub set: Option<i64>,
}
