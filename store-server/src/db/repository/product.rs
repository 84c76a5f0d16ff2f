//! Product Repository

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate, ProductUpdate};
use sqlx::SqlitePool;

const PRODUCT_SELECT: &str = "SELECT id, name, category, price, stock, min_stock, is_active, created_at, updated_at FROM product";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let sql = format!("{} WHERE is_active = 1 ORDER BY created_at DESC", PRODUCT_SELECT);
    let rows = sqlx::query_as::<_, Product>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("{} WHERE id = ?", PRODUCT_SELECT);
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn search(pool: &SqlitePool, query: &str) -> RepoResult<Vec<Product>> {
    let pattern = format!("%{query}%");
    let sql = format!(
        "{} WHERE is_active = 1 AND (name LIKE ?1 OR category LIKE ?1) ORDER BY created_at DESC",
        PRODUCT_SELECT
    );
    let rows = sqlx::query_as::<_, Product>(&sql)
        .bind(&pattern)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// 低库存商品 (stock <= min_stock)，用于补货提醒
pub async fn find_low_stock(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let sql = format!(
        "{} WHERE is_active = 1 AND stock <= min_stock ORDER BY stock ASC",
        PRODUCT_SELECT
    );
    let rows = sqlx::query_as::<_, Product>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO product (id, name, category, price, stock, min_stock, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.category)
    .bind(data.price)
    .bind(data.stock)
    .bind(data.min_stock)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

/// 更新商品基础字段
///
/// stock 不在此处更新，库存只经由下单事务和盘点调整变动
pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE product SET name = COALESCE(?1, name), category = COALESCE(?2, category), price = COALESCE(?3, price), min_stock = COALESCE(?4, min_stock), is_active = COALESCE(?5, is_active), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.name)
    .bind(&data.category)
    .bind(data.price)
    .bind(data.min_stock)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE product SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
