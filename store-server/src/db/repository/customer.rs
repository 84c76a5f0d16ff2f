//! Customer Repository

use super::{RepoError, RepoResult};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use sqlx::SqlitePool;

const CUSTOMER_SELECT: &str =
    "SELECT id, name, email, phone, is_active, created_at, updated_at FROM customer";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Customer>> {
    let sql = format!(
        "{} WHERE is_active = 1 ORDER BY created_at DESC",
        CUSTOMER_SELECT
    );
    let rows = sqlx::query_as::<_, Customer>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let sql = format!("{} WHERE id = ?", CUSTOMER_SELECT);
    let row = sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<Customer>> {
    let sql = format!("{} WHERE email = ?", CUSTOMER_SELECT);
    let row = sqlx::query_as::<_, Customer>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn search(pool: &SqlitePool, query: &str) -> RepoResult<Vec<Customer>> {
    let pattern = format!("%{query}%");
    let sql = format!(
        "{} WHERE is_active = 1 AND (name LIKE ?1 OR email LIKE ?1 OR phone LIKE ?1) ORDER BY created_at DESC",
        CUSTOMER_SELECT
    );
    let rows = sqlx::query_as::<_, Customer>(&sql)
        .bind(&pattern)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create(pool: &SqlitePool, data: CustomerCreate) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO customer (id, name, email, phone, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CustomerUpdate) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE customer SET name = COALESCE(?1, name), email = COALESCE(?2, email), phone = COALESCE(?3, phone), is_active = COALESCE(?4, is_active), updated_at = ?5 WHERE id = ?6",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows =
        sqlx::query("UPDATE customer SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?;
    Ok(rows.rows_affected() > 0)
}
