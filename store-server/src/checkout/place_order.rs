//! 原子下单
//!
//! 客户解析 → 逐行库存预占 → 服务端计价 → 写入订单和明细，
//! 全部在一个事务内完成，失败即整体回滚。

use shared::models::{OrderCreate, OrderDetail, OrderStatus};
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{CheckoutError, CheckoutResult, inventory};
use crate::db::repository::order;

/// 下单入口 (带超时保护)
///
/// 计时只覆盖提交前阶段：校验、扣减、写入超时即被丢弃，
/// 未提交的事务由连接归还时回滚。commit 在计时区之外执行，
/// 调用方收到超时错误时订单必然没有落库。
pub async fn place_order(
    pool: &SqlitePool,
    payload: OrderCreate,
    timeout_ms: u64,
) -> CheckoutResult<OrderDetail> {
    let (tx, order_id) = match tokio::time::timeout(
        std::time::Duration::from_millis(timeout_ms),
        prepare_order(pool, &payload),
    )
    .await
    {
        Ok(prepared) => prepared?,
        Err(_) => return Err(CheckoutError::Timeout(timeout_ms)),
    };

    tx.commit().await?;

    order::find_detail(pool, order_id)
        .await
        .map_err(|e| CheckoutError::Database(e.to_string()))?
        .ok_or_else(|| CheckoutError::Database("Failed to load created order".into()))
}

/// 载荷校验 (事务外，尽早失败)
fn validate(payload: &OrderCreate) -> CheckoutResult<()> {
    if payload.lines.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }
    for line in &payload.lines {
        if line.quantity <= 0 {
            return Err(CheckoutError::QuantityInvalid {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }
    }
    Ok(())
}

/// 提交前阶段：校验、客户解析、扣减、写入
///
/// 返回待提交的事务和订单号，commit 由调用方决定时机。
async fn prepare_order(
    pool: &SqlitePool,
    payload: &OrderCreate,
) -> CheckoutResult<(Transaction<'static, Sqlite>, i64)> {
    validate(payload)?;

    let now = shared::util::now_millis();
    let order_id = shared::util::snowflake_id();

    let mut tx = pool.begin().await?;

    // ── 客户解析 ─────────────────────────────────────────────
    if let Some(customer_id) = payload.customer_id {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM customer WHERE id = ? AND is_active = 1",
        )
        .bind(customer_id)
        .fetch_one(&mut *tx)
        .await?;
        if exists == 0 {
            return Err(CheckoutError::CustomerNotFound(customer_id));
        }
    }

    // ── 库存预占 + 服务端计价 ────────────────────────────────
    // 客户端报价仅用于日志比对，金额一律以数据库价格为准
    let mut total_amount: i64 = 0;
    let mut reserved = Vec::with_capacity(payload.lines.len());
    for line in &payload.lines {
        let snapshot = inventory::reserve(&mut tx, line.product_id, line.quantity).await?;
        if let Some(claimed) = line.unit_price_claimed
            && claimed != snapshot.price
        {
            tracing::warn!(
                product_id = line.product_id,
                claimed,
                actual = snapshot.price,
                "Client price mismatch ignored"
            );
        }
        total_amount += snapshot.price * line.quantity;
        reserved.push((line, snapshot));
    }

    // ── 写入订单 ─────────────────────────────────────────────
    sqlx::query(
        "INSERT INTO orders (id, customer_id, buyer_name, buyer_email, buyer_phone, student_name, student_grade, student_class, total_amount, status, payment_method, delivery_address, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
    )
    .bind(order_id)
    .bind(payload.customer_id)
    .bind(&payload.buyer_name)
    .bind(&payload.buyer_email)
    .bind(&payload.buyer_phone)
    .bind(&payload.student_name)
    .bind(&payload.student_grade)
    .bind(&payload.student_class)
    .bind(total_amount)
    .bind(OrderStatus::Processing)
    .bind(&payload.payment_method)
    .bind(&payload.delivery_address)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    // ── 写入明细 (下单时快照，创建后不可变) ──────────────────
    for (line, snapshot) in &reserved {
        let category = snapshot.category.clone().or_else(|| line.category.clone());
        sqlx::query(
            "INSERT INTO order_item (id, order_id, product_id, product_name, category, price, quantity) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(shared::util::snowflake_id())
        .bind(order_id)
        .bind(line.product_id)
        .bind(&snapshot.name)
        .bind(&category)
        .bind(snapshot.price)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;
    }

    Ok((tx, order_id))
}
