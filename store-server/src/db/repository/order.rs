//! Order Repository (read side)
//!
//! 订单的写入只发生在下单事务和状态流转里 (`crate::checkout`)，
//! 这里只提供查询。

use super::RepoResult;
use shared::models::{Order, OrderDetail, OrderItem, OrderStatus};
use sqlx::SqlitePool;

const ORDER_SELECT: &str = "SELECT id, customer_id, buyer_name, buyer_email, buyer_phone, student_name, student_grade, student_class, total_amount, status, payment_method, delivery_address, created_at, updated_at FROM orders";

const ORDER_ITEM_SELECT: &str =
    "SELECT id, order_id, product_id, product_name, category, price, quantity FROM order_item";

/// 分页查询订单，可按状态和客户过滤
///
/// 返回 (当前页, 过滤后的总数)
pub async fn find_page(
    pool: &SqlitePool,
    status: Option<OrderStatus>,
    customer_id: Option<i64>,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<Order>, i64)> {
    let mut sql = ORDER_SELECT.to_string();
    let mut count_sql = "SELECT COUNT(*) FROM orders".to_string();

    let mut conditions: Vec<&str> = Vec::new();
    if status.is_some() {
        conditions.push("status = ?");
    }
    if customer_id.is_some() {
        conditions.push("customer_id = ?");
    }
    if !conditions.is_empty() {
        let where_clause = format!(" WHERE {}", conditions.join(" AND "));
        sql.push_str(&where_clause);
        count_sql.push_str(&where_clause);
    }
    sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");

    let mut query = sqlx::query_as::<_, Order>(&sql);
    if let Some(s) = status {
        query = query.bind(s);
    }
    if let Some(c) = customer_id {
        query = query.bind(c);
    }
    let orders = query.bind(limit).bind(offset).fetch_all(pool).await?;

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(s) = status {
        count_query = count_query.bind(s);
    }
    if let Some(c) = customer_id {
        count_query = count_query.bind(c);
    }
    let total = count_query.fetch_one(pool).await?;

    Ok((orders, total))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{} WHERE id = ?", ORDER_SELECT);
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("{} WHERE order_id = ? ORDER BY id", ORDER_ITEM_SELECT);
    let rows = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// 订单 + 明细
pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderDetail>> {
    let Some(order) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let items = find_items(pool, id).await?;
    Ok(Some(OrderDetail { order, items }))
}
