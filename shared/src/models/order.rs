//! Order Model

use serde::{Deserialize, Serialize};

/// Order status
///
/// `PROCESSING` is the entry state for a successfully placed order (payment
/// confirmation is out of scope, so orders never start as `PENDING`).
/// Transitions are administrator-driven and unconstrained; no transition
/// re-adjusts product stock.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Wire representation, as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Order entity (订单)
///
/// Buyer and student fields are denormalized at order time so later profile
/// edits don't rewrite history. `total_amount` is computed server-side at
/// order time and is immutable afterwards; only `status` ever changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Registered buyer account, None for guest checkout
    pub customer_id: Option<i64>,
    pub buyer_name: Option<String>,
    pub buyer_email: Option<String>,
    pub buyer_phone: Option<String>,
    /// Shipping target (school supplies are addressed to the student)
    pub student_name: Option<String>,
    pub student_grade: Option<String>,
    pub student_class: Option<String>,
    /// Total in cents, recomputed server-side at placement
    pub total_amount: i64,
    pub status: OrderStatus,
    /// Free-text label, no gateway integration
    pub payment_method: Option<String>,
    pub delivery_address: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line item
///
/// `product_name`, `price` and `category` are snapshots taken at the moment
/// of purchase and are never re-derived from the live product row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    /// Traceability reference only, nullable
    pub product_id: Option<i64>,
    pub product_name: String,
    pub category: Option<String>,
    /// Unit price snapshot in cents
    pub price: i64,
    pub quantity: i64,
}

/// One checkout cart line
///
/// `unit_price_claimed` is what the cart displayed when the item was added.
/// The server ignores it for money math and recomputes from the product row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_claimed: Option<i64>,
    pub category: Option<String>,
}

/// Place order payload (checkout request)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    /// Registered buyer account, None for guest checkout
    pub customer_id: Option<i64>,
    pub buyer_name: Option<String>,
    pub buyer_email: Option<String>,
    pub buyer_phone: Option<String>,
    pub student_name: Option<String>,
    pub student_grade: Option<String>,
    pub student_class: Option<String>,
    pub delivery_address: Option<String>,
    pub payment_method: Option<String>,
    pub lines: Vec<OrderLineInput>,
}

/// Update status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdateStatus {
    pub status: OrderStatus,
}

/// Bulk update status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBulkUpdateStatus {
    pub order_ids: Vec<i64>,
    pub status: OrderStatus,
}

/// Order with its line items (for detail views and checkout response)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialize() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"PROCESSING\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"CANCELLED\""
        );
    }

    #[test]
    fn test_status_deserialize() {
        let status: OrderStatus = serde_json::from_str("\"DELIVERED\"").unwrap();
        assert_eq!(status, OrderStatus::Delivered);

        let status: OrderStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(status, OrderStatus::Pending);
    }

    #[test]
    fn test_status_as_str_matches_serde() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_order_detail_flatten() {
        let detail = OrderDetail {
            order: Order {
                id: 1,
                customer_id: None,
                buyer_name: Some("Ana".to_string()),
                buyer_email: None,
                buyer_phone: None,
                student_name: Some("Luis".to_string()),
                student_grade: Some("3".to_string()),
                student_class: Some("B".to_string()),
                total_amount: 2500,
                status: OrderStatus::Processing,
                payment_method: None,
                delivery_address: None,
                created_at: 0,
                updated_at: 0,
            },
            items: vec![],
        };

        let json = serde_json::to_value(&detail).unwrap();
        // Flattened: order fields live at the top level next to items
        assert_eq!(json["id"], 1);
        assert_eq!(json["status"], "PROCESSING");
        assert!(json["items"].as_array().unwrap().is_empty());
    }
}
