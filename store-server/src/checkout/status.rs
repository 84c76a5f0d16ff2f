//! 订单状态流转
//!
//! 状态机刻意宽松：任意状态都可以流转到任意状态，误操作通过
//! 再次流转纠正，每一步都进审计日志。取消订单不回补库存，
//! 退货入库走人工盘点调整。

use shared::models::{Order, OrderStatus};
use sqlx::SqlitePool;

use super::{CheckoutError, CheckoutResult};
use crate::db::repository::order;

/// 单个订单状态流转
pub async fn update_status(
    pool: &SqlitePool,
    order_id: i64,
    status: OrderStatus,
) -> CheckoutResult<Order> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now)
        .bind(order_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(CheckoutError::OrderNotFound(order_id));
    }
    order::find_by_id(pool, order_id)
        .await
        .map_err(|e| CheckoutError::Database(e.to_string()))?
        .ok_or(CheckoutError::OrderNotFound(order_id))
}

/// 批量状态流转：全部成功或全部回滚
///
/// 遇到第一个不存在的订单号即中止，之前的更新一并回滚。
/// 成功时返回更新后的订单，顺序与传入的 id 列表一致。
pub async fn bulk_update_status(
    pool: &SqlitePool,
    order_ids: &[i64],
    status: OrderStatus,
) -> CheckoutResult<Vec<Order>> {
    if order_ids.is_empty() {
        return Err(CheckoutError::EmptyBulkSelection);
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let mut updated = Vec::with_capacity(order_ids.len());
    for &order_id in order_ids {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3 \
             RETURNING id, customer_id, buyer_name, buyer_email, buyer_phone, \
             student_name, student_grade, student_class, total_amount, status, \
             payment_method, delivery_address, created_at, updated_at",
        )
        .bind(status)
        .bind(now)
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;

        match order {
            Some(order) => updated.push(order),
            None => return Err(CheckoutError::OrderNotFound(order_id)),
        }
    }

    tx.commit().await?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    /// Create an in-memory SQLite pool with orders and a product for restock checks.
    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE orders (
                id INTEGER PRIMARY KEY,
                customer_id INTEGER,
                buyer_name TEXT,
                buyer_email TEXT,
                buyer_phone TEXT,
                student_name TEXT,
                student_grade TEXT,
                student_class TEXT,
                total_amount INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'PROCESSING',
                payment_method TEXT,
                delivery_address TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE TABLE product (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                category TEXT,
                price INTEGER NOT NULL,
                stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
                min_stock INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO orders (id, total_amount, status, created_at, updated_at) VALUES
                (1, 700, 'PROCESSING', 1000, 1000),
                (2, 350, 'PROCESSING', 2000, 2000),
                (3, 1200, 'DELIVERED', 3000, 3000)",
        )
        .execute(&pool)
        .await
        .unwrap();

        // 订单 1 下单时已经扣过库存 (5 → 3)
        sqlx::query(
            "INSERT INTO product (id, name, price, stock, created_at, updated_at) VALUES
                (1, 'Spiral Notebook A5', 350, 3, 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    async fn status_of(pool: &SqlitePool, id: i64) -> String {
        sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_update_status() {
        let pool = test_pool().await;
        let order = update_status(&pool, 1, OrderStatus::Delivered).await.unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(status_of(&pool, 1).await, "DELIVERED");
    }

    #[tokio::test]
    async fn test_update_status_any_transition_allowed() {
        let pool = test_pool().await;
        // DELIVERED → PENDING：宽松状态机允许回退
        let order = update_status(&pool, 3, OrderStatus::Pending).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);

        // CANCELLED → PROCESSING 同样允许
        update_status(&pool, 3, OrderStatus::Cancelled).await.unwrap();
        let order = update_status(&pool, 3, OrderStatus::Processing).await.unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_update_status_missing_order() {
        let pool = test_pool().await;
        let err = update_status(&pool, 999, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::OrderNotFound(999)));
    }

    #[tokio::test]
    async fn test_cancel_does_not_restock() {
        let pool = test_pool().await;
        update_status(&pool, 1, OrderStatus::Cancelled).await.unwrap();

        // 取消只改状态，库存保持扣减后的值
        let stock: i64 = sqlx::query_scalar("SELECT stock FROM product WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stock, 3);
    }

    #[tokio::test]
    async fn test_bulk_update_status() {
        let pool = test_pool().await;
        let updated = bulk_update_status(&pool, &[1, 2, 3], OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(updated.len(), 3);
        // 返回顺序与传入 id 顺序一致
        assert_eq!(updated[0].id, 1);
        assert_eq!(updated[1].id, 2);
        assert_eq!(updated[2].id, 3);
        assert!(updated.iter().all(|o| o.status == OrderStatus::Delivered));
        assert_eq!(status_of(&pool, 1).await, "DELIVERED");
        assert_eq!(status_of(&pool, 2).await, "DELIVERED");
        assert_eq!(status_of(&pool, 3).await, "DELIVERED");
    }

    #[tokio::test]
    async fn test_bulk_update_all_or_nothing() {
        let pool = test_pool().await;
        // 2 在 999 之前已更新，整体必须回滚
        let err = bulk_update_status(&pool, &[2, 999, 1], OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::OrderNotFound(999)));

        assert_eq!(status_of(&pool, 1).await, "PROCESSING");
        assert_eq!(status_of(&pool, 2).await, "PROCESSING");
        assert_eq!(status_of(&pool, 3).await, "DELIVERED");
    }

    #[tokio::test]
    async fn test_bulk_update_empty_selection() {
        let pool = test_pool().await;
        let err = bulk_update_status(&pool, &[], OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyBulkSelection));
    }
}
