//! 库存预占与调整
//!
//! `stock` 列是库存的唯一权威，schema 上有 CHECK (stock >= 0) 兜底。
//! 下单扣减使用守卫式条件 UPDATE：条件不满足时一行都不写，
//! 永远不会出现负库存。

use shared::models::{Product, StockAdjust};
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{CheckoutError, CheckoutResult};

/// 守卫式扣减命中后返回的商品快照 (事务内读取)
#[derive(Debug, sqlx::FromRow)]
pub struct ReservedLine {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub price: i64,
    pub stock: i64,
}

/// 在下单事务内为一行订单预占库存
///
/// `WHERE stock >= ?` 保证扣减与校验是同一个原子写入；
/// 未命中时再 SELECT 一次，区分「商品不存在」与「库存不足」。
pub async fn reserve(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: i64,
    quantity: i64,
) -> CheckoutResult<ReservedLine> {
    let reserved = sqlx::query_as::<_, ReservedLine>(
        "UPDATE product SET stock = stock - ?1, updated_at = ?2 WHERE id = ?3 AND is_active = 1 AND stock >= ?1 RETURNING id, name, category, price, stock",
    )
    .bind(quantity)
    .bind(shared::util::now_millis())
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(line) = reserved {
        return Ok(line);
    }

    // 扣减未命中：查明原因
    let current = sqlx::query_as::<_, (String, i64)>(
        "SELECT name, stock FROM product WHERE id = ? AND is_active = 1",
    )
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await?;

    match current {
        Some((product_name, available)) => Err(CheckoutError::InsufficientStock {
            product_id,
            product_name,
            requested: quantity,
            available,
        }),
        None => Err(CheckoutError::ProductNotFound(product_id)),
    }
}

/// 人工库存调整 (进货、盘点)
///
/// `delta` 与 `set` 二选一。结果不得为负：
/// 负向 delta 同样走守卫式 UPDATE。
pub async fn adjust_stock(
    pool: &SqlitePool,
    product_id: i64,
    adjust: StockAdjust,
) -> CheckoutResult<Product> {
    let now = shared::util::now_millis();

    let result = match (adjust.delta, adjust.set) {
        (Some(delta), None) => {
            sqlx::query(
                "UPDATE product SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3 AND is_active = 1 AND stock + ?1 >= 0",
            )
            .bind(delta)
            .bind(now)
            .bind(product_id)
            .execute(pool)
            .await?
        }
        (None, Some(set)) => {
            if set < 0 {
                return Err(CheckoutError::StockOutOfRange(format!(
                    "stock cannot be set below zero (got {set})"
                )));
            }
            sqlx::query(
                "UPDATE product SET stock = ?1, updated_at = ?2 WHERE id = ?3 AND is_active = 1",
            )
            .bind(set)
            .bind(now)
            .bind(product_id)
            .execute(pool)
            .await?
        }
        _ => {
            return Err(CheckoutError::Validation(
                "exactly one of delta or set is required".into(),
            ));
        }
    };

    if result.rows_affected() == 0 {
        // 区分「不存在」与「会变成负数」
        let current =
            sqlx::query_scalar::<_, i64>("SELECT stock FROM product WHERE id = ? AND is_active = 1")
                .bind(product_id)
                .fetch_optional(pool)
                .await?;
        return match current {
            Some(stock) => Err(CheckoutError::StockOutOfRange(format!(
                "adjustment would drop stock below zero (current {stock})"
            ))),
            None => Err(CheckoutError::ProductNotFound(product_id)),
        };
    }

    crate::db::repository::product::find_by_id(pool, product_id)
        .await
        .map_err(|e| CheckoutError::Database(e.to_string()))?
        .ok_or(CheckoutError::ProductNotFound(product_id))
}
