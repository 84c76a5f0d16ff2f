//! 审计日志后台 worker
//!
//! 从队列消费 [`AuditLogRequest`] 并逐条写入存储。

use sqlx::SqlitePool;
use tokio::sync::mpsc;

use super::service::AuditLogRequest;
use super::storage::AuditStorage;

pub struct AuditWorker {
    storage: AuditStorage,
}

impl AuditWorker {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            storage: AuditStorage::new(pool),
        }
    }

    /// 消费队列直到发送端全部关闭
    pub async fn run(self, mut rx: mpsc::Receiver<AuditLogRequest>) {
        tracing::info!("📋 Audit log worker started");

        while let Some(request) = rx.recv().await {
            match self
                .storage
                .append(
                    request.action,
                    request.resource_type,
                    request.resource_id,
                    request.operator_id,
                    request.operator_name,
                    request.details,
                )
                .await
            {
                Ok(entry) => {
                    tracing::debug!(
                        audit_id = entry.id,
                        action = %entry.action,
                        resource = %entry.resource_id,
                        "Audit entry persisted"
                    );
                }
                Err(e) => {
                    tracing::error!("Failed to persist audit entry: {}", e);
                }
            }
        }

        tracing::info!("Audit log worker stopped, channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditAction, AuditQuery, AuditService};
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::time::Duration;

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
    async fn test_worker_persists_queued_entries() {
        let pool = test_pool().await;
        let service = AuditService::new(true);

        service.log(
            crate::audit::AuditLogRequest::new(AuditAction::OrderPlaced, "order", 7)
                .with_details(json!({"total_amount": 350})),
        );

        let rx = service.take_receiver().unwrap();
        let worker = AuditWorker::new(pool.clone());
        tokio::spawn(worker.run(rx));

        let storage = AuditStorage::new(pool);
        let q = AuditQuery {
            from: None,
            to: None,
            action: None,
            operator_id: None,
            resource_type: None,
            offset: 0,
            limit: 50,
        };

        // worker 异步落库，轮询等待
        let mut persisted = Vec::new();
        for _ in 0..50 {
            let (items, _) = storage.query(&q).await.unwrap();
            if !items.is_empty() {
                persisted = items;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].action, AuditAction::OrderPlaced);
        assert_eq!(persisted[0].resource_id, "7");
        assert_eq!(persisted[0].details["total_amount"], 350);
    }
}
