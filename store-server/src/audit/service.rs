//! 审计日志服务
//!
//! 业务侧只和 [`AuditService`] 打交道：构造一条 [`AuditLogRequest`]，
//! 调用 `log()` 投递到队列即返回，落库由后台 worker 完成。

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use super::types::AuditAction;

/// 审计队列容量
const AUDIT_QUEUE_CAPACITY: usize = 1024;

/// 一条待落库的审计记录
#[derive(Debug, Clone)]
pub struct AuditLogRequest {
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub operator_id: Option<String>,
    pub operator_name: Option<String>,
    pub details: serde_json::Value,
}

impl AuditLogRequest {
    pub fn new(
        action: AuditAction,
        resource_type: impl Into<String>,
        resource_id: impl ToString,
    ) -> Self {
        Self {
            action,
            resource_type: resource_type.into(),
            resource_id: resource_id.to_string(),
            operator_id: None,
            operator_name: None,
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// 审计日志服务 (写入侧)
///
/// 查询走 [`super::AuditStorage`]，这里只负责投递。
#[derive(Debug)]
pub struct AuditService {
    tx: mpsc::Sender<AuditLogRequest>,
    rx: Mutex<Option<mpsc::Receiver<AuditLogRequest>>>,
    enabled: bool,
}

impl AuditService {
    pub fn new(enabled: bool) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(AUDIT_QUEUE_CAPACITY);
        Arc::new(Self {
            tx,
            rx: Mutex::new(Some(rx)),
            enabled,
        })
    }

    /// 投递一条审计记录，不等待落库
    pub fn log(&self, request: AuditLogRequest) {
        if !self.enabled {
            return;
        }
        match self.tx.try_send(request) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(request)) => {
                // 队列满时转后台等待，审计日志不允许丢失
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    if tx.send(request).await.is_err() {
                        tracing::error!("Audit log channel closed — audit entry lost!");
                    }
                });
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::error!("Audit log channel closed — audit entry lost!");
            }
        }
    }

    /// 取出队列接收端，只有第一次调用返回 Some
    pub fn take_receiver(&self) -> Option<mpsc::Receiver<AuditLogRequest>> {
        self.rx.lock().ok().and_then(|mut guard| guard.take())
    }
}
