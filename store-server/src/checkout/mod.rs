//! 下单事务与库存
//!
//! # 架构
//!
//! ```text
//! POST /api/orders
//!   └─ place_order() ── 单个 SQLite 事务
//!        ├─ 客户解析 (可选)
//!        ├─ inventory::reserve() 逐行守卫式扣减
//!        ├─ 服务端重算总价 (忽略客户端报价)
//!        └─ 写入 orders + order_item → commit
//! ```
//!
//! 任何一步失败即整体回滚：不会出现扣了库存没有订单、
//! 或有订单没扣库存的中间状态。

pub mod inventory;
pub mod place_order;
pub mod status;

pub use place_order::place_order;
pub use status::{bulk_update_status, update_status};

use shared::error::{AppError, ErrorCode};

/// 下单/库存操作的错误类型
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Customer {0} not found")]
    CustomerNotFound(i64),

    #[error("Product {0} not found")]
    ProductNotFound(i64),

    #[error("Order {0} not found")]
    OrderNotFound(i64),

    #[error("Insufficient stock for {product_name}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        product_name: String,
        requested: i64,
        available: i64,
    },

    #[error("Order must contain at least one line")]
    EmptyOrder,

    #[error("Quantity must be positive (product {product_id}, got {quantity})")]
    QuantityInvalid { product_id: i64, quantity: i64 },

    #[error("No orders selected")]
    EmptyBulkSelection,

    #[error("Stock out of range: {0}")]
    StockOutOfRange(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Checkout timed out after {0} ms")]
    Timeout(u64),

    #[error("Transaction aborted: {0}")]
    Aborted(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        // SQLITE_BUSY (5) / SQLITE_BUSY_SNAPSHOT (517): 写冲突，客户端可重试
        if let sqlx::Error::Database(ref db_err) = err
            && let Some(code) = db_err.code()
            && (code == "5" || code == "517")
        {
            return CheckoutError::Aborted(db_err.to_string());
        }
        CheckoutError::Database(err.to_string())
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::CustomerNotFound(id) => AppError::with_message(
                ErrorCode::CustomerNotFound,
                format!("Customer {id} not found"),
            )
            .with_detail("customer_id", id),
            CheckoutError::ProductNotFound(id) => AppError::with_message(
                ErrorCode::ProductNotFound,
                format!("Product {id} not found"),
            )
            .with_detail("product_id", id),
            CheckoutError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
                    .with_detail("order_id", id)
            }
            CheckoutError::InsufficientStock {
                product_id,
                product_name,
                requested,
                available,
            } => {
                let message = format!(
                    "Insufficient stock for {product_name}: requested {requested}, available {available}"
                );
                AppError::with_message(ErrorCode::InsufficientStock, message)
                    .with_detail("product_id", product_id)
                    .with_detail("product_name", product_name)
                    .with_detail("requested", requested)
                    .with_detail("available", available)
                    .with_detail("shortfall", requested - available)
            }
            CheckoutError::EmptyOrder => AppError::with_message(
                ErrorCode::OrderEmpty,
                "Order must contain at least one line",
            ),
            CheckoutError::QuantityInvalid {
                product_id,
                quantity,
            } => AppError::with_message(
                ErrorCode::OrderQuantityInvalid,
                format!("Quantity must be positive (product {product_id}, got {quantity})"),
            )
            .with_detail("product_id", product_id)
            .with_detail("quantity", quantity),
            CheckoutError::EmptyBulkSelection => {
                AppError::with_message(ErrorCode::BulkSelectionEmpty, "No orders selected")
            }
            CheckoutError::StockOutOfRange(msg) => {
                AppError::with_message(ErrorCode::StockOutOfRange, msg)
            }
            CheckoutError::Validation(msg) => AppError::validation(msg),
            // 超时对外归类为事务中止 (9006, 503)，客户端重试安全
            CheckoutError::Timeout(ms) => {
                AppError::transaction_aborted(format!("Checkout timed out after {ms} ms"))
                    .with_detail("timeout_ms", ms)
            }
            CheckoutError::Aborted(msg) => AppError::transaction_aborted(msg),
            CheckoutError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_timeout_maps_to_transaction_aborted() {
        // 超时和写冲突一样走 9006/503，客户端按可重试处理
        let err: AppError = CheckoutError::Timeout(5000).into();
        assert_eq!(err.code, ErrorCode::TransactionAborted);
        assert_eq!(err.http_status(), StatusCode::SERVICE_UNAVAILABLE);
        let details = err.details.unwrap();
        assert_eq!(details["timeout_ms"], 5000);
    }

    #[test]
    fn test_insufficient_stock_carries_shortfall() {
        let err: AppError = CheckoutError::InsufficientStock {
            product_id: 1,
            product_name: "Spiral Notebook A5".to_string(),
            requested: 3,
            available: 2,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        let details = err.details.unwrap();
        assert_eq!(details["shortfall"], 1);
        assert_eq!(details["product_name"], "Spiral Notebook A5");
    }
}
