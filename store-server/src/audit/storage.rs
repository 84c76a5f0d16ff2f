//! 审计日志存储 (sqlx)
//!
//! Append-only：只有 INSERT 和 SELECT，没有 update/delete 接口。
//! 序列号由 SQLite AUTOINCREMENT 保证单调递增、删除不复用。

use sqlx::SqlitePool;

use super::types::{AuditAction, AuditEntry, AuditQuery};

const AUDIT_SELECT: &str = "SELECT id, timestamp, action, resource_type, resource_id, operator_id, operator_name, details FROM audit_log";

#[derive(Debug, thiserror::Error)]
pub enum AuditStorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuditStorageError> for shared::error::AppError {
    fn from(err: AuditStorageError) -> Self {
        shared::error::AppError::database(err.to_string())
    }
}

/// 审计日志存储
#[derive(Clone)]
pub struct AuditStorage {
    pool: SqlitePool,
}

impl AuditStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 追加一条审计记录，返回落库后的完整条目
    pub async fn append(
        &self,
        action: AuditAction,
        resource_type: String,
        resource_id: String,
        operator_id: Option<String>,
        operator_name: Option<String>,
        details: serde_json::Value,
    ) -> Result<AuditEntry, AuditStorageError> {
        let timestamp = shared::util::now_millis();
        let entry = sqlx::query_as::<_, AuditEntry>(
            "INSERT INTO audit_log (timestamp, action, resource_type, resource_id, operator_id, operator_name, details) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id, timestamp, action, resource_type, resource_id, operator_id, operator_name, details",
        )
        .bind(timestamp)
        .bind(action)
        .bind(&resource_type)
        .bind(&resource_id)
        .bind(&operator_id)
        .bind(&operator_name)
        .bind(details)
        .fetch_one(&self.pool)
        .await?;
        Ok(entry)
    }

    /// 条件查询 + 分页，返回 (items, total)
    ///
    /// 列表和计数使用同一组条件，绑定顺序必须一致。
    pub async fn query(
        &self,
        q: &AuditQuery,
    ) -> Result<(Vec<AuditEntry>, i64), AuditStorageError> {
        let mut sql = AUDIT_SELECT.to_string();
        let mut count_sql = "SELECT COUNT(*) FROM audit_log".to_string();

        let mut conditions: Vec<&str> = Vec::new();
        if q.from.is_some() {
            conditions.push("timestamp >= ?");
        }
        if q.to.is_some() {
            conditions.push("timestamp <= ?");
        }
        if q.action.is_some() {
            conditions.push("action = ?");
        }
        if q.operator_id.is_some() {
            conditions.push("operator_id = ?");
        }
        if q.resource_type.is_some() {
            conditions.push("resource_type = ?");
        }
        if !conditions.is_empty() {
            let where_clause = format!(" WHERE {}", conditions.join(" AND "));
            sql.push_str(&where_clause);
            count_sql.push_str(&where_clause);
        }
        sql.push_str(" ORDER BY id DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, AuditEntry>(&sql);
        if let Some(from) = q.from {
            query = query.bind(from);
        }
        if let Some(to) = q.to {
            query = query.bind(to);
        }
        if let Some(action) = q.action {
            query = query.bind(action);
        }
        if let Some(ref operator_id) = q.operator_id {
            query = query.bind(operator_id.clone());
        }
        if let Some(ref resource_type) = q.resource_type {
            query = query.bind(resource_type.clone());
        }
        let items = query
            .bind(q.limit)
            .bind(q.offset)
            .fetch_all(&self.pool)
            .await?;

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(from) = q.from {
            count_query = count_query.bind(from);
        }
        if let Some(to) = q.to {
            count_query = count_query.bind(to);
        }
        if let Some(action) = q.action {
            count_query = count_query.bind(action);
        }
        if let Some(ref operator_id) = q.operator_id {
            count_query = count_query.bind(operator_id.clone());
        }
        if let Some(ref resource_type) = q.resource_type {
            count_query = count_query.bind(resource_type.clone());
        }
        let total = count_query.fetch_one(&self.pool).await?;

        Ok((items, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    /// Create an in-memory SQLite pool with the audit_log schema.
    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp INTEGER NOT NULL,
                action TEXT NOT NULL,
                resource_type TEXT NOT NULL,
                resource_id TEXT NOT NULL,
                operator_id TEXT,
                operator_name TEXT,
                details TEXT NOT NULL DEFAULT '{}'
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    #[tokio::test]
    async fn test_append_assigns_sequence() {
        let pool = test_pool().await;
        let storage = AuditStorage::new(pool);

        let first = storage
            .append(
                AuditAction::OrderPlaced,
                "order".into(),
                "1".into(),
                None,
                None,
                json!({"total_amount": 700}),
            )
            .await
            .unwrap();
        let second = storage
            .append(
                AuditAction::OrderStatusChanged,
                "order".into(),
                "1".into(),
                None,
                None,
                json!({"from": "PROCESSING", "to": "DELIVERED"}),
            )
            .await
            .unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.action, AuditAction::OrderPlaced);
        assert_eq!(first.details["total_amount"], 700);
    }

    #[tokio::test]
    async fn test_query_filters_by_action() {
        let pool = test_pool().await;
        let storage = AuditStorage::new(pool);
        storage
            .append(AuditAction::OrderPlaced, "order".into(), "1".into(), None, None, json!({}))
            .await
            .unwrap();
        storage
            .append(AuditAction::StockAdjusted, "product".into(), "5".into(), None, None, json!({}))
            .await
            .unwrap();

        let q = AuditQuery {
            from: None,
            to: None,
            action: Some(AuditAction::StockAdjusted),
            operator_id: None,
            resource_type: None,
            offset: 0,
            limit: 50,
        };
        let (items, total) = storage.query(&q).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].resource_type, "product");
    }

    #[tokio::test]
    async fn test_query_filters_by_operator() {
        let pool = test_pool().await;
        let storage = AuditStorage::new(pool);
        storage
            .append(
                AuditAction::StockAdjusted,
                "product".into(),
                "5".into(),
                Some("mgr-1".into()),
                Some("Marta".into()),
                json!({"delta": -3}),
            )
            .await
            .unwrap();
        storage
            .append(AuditAction::StockAdjusted, "product".into(), "5".into(), None, None, json!({}))
            .await
            .unwrap();

        let q = AuditQuery {
            from: None,
            to: None,
            action: None,
            operator_id: Some("mgr-1".into()),
            resource_type: None,
            offset: 0,
            limit: 50,
        };
        let (items, total) = storage.query(&q).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].operator_name.as_deref(), Some("Marta"));
        assert_eq!(items[0].details["delta"], -3);
    }

    #[tokio::test]
    async fn test_query_pagination_newest_first() {
        let pool = test_pool().await;
        let storage = AuditStorage::new(pool);
        for i in 0..5 {
            storage
                .append(
                    AuditAction::OrderPlaced,
                    "order".into(),
                    i.to_string(),
                    None,
                    None,
                    json!({}),
                )
                .await
                .unwrap();
        }

        let q = AuditQuery {
            from: None,
            to: None,
            action: None,
            operator_id: None,
            resource_type: None,
            offset: 0,
            limit: 2,
        };
        let (items, total) = storage.query(&q).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(items.len(), 2);
        // 新的在前
        assert_eq!(items[0].resource_id, "4");

        let q = AuditQuery { offset: 4, ..q };
        let (items, _) = storage.query(&q).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].resource_id, "0");
    }

    #[tokio::test]
    async fn test_query_time_window() {
        let pool = test_pool().await;
        let storage = AuditStorage::new(pool.clone());
        storage
            .append(AuditAction::OrderPlaced, "order".into(), "1".into(), None, None, json!({}))
            .await
            .unwrap();

        // 时间窗之外查不到
        let q = AuditQuery {
            from: Some(shared::util::now_millis() + 60_000),
            to: None,
            action: None,
            operator_id: None,
            resource_type: None,
            offset: 0,
            limit: 50,
        };
        let (items, total) = storage.query(&q).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }
}
