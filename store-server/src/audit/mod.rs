//! 审计日志模块 — append-only 操作审计
//!
//! # 架构
//!
//! ```text
//! 敏感操作触发 (下单、状态流转、库存调整 …)
//!   └─ audit_log! → AuditService::log() → mpsc → AuditWorker → audit_log 表
//! ```
//!
//! # 保证
//!
//! - **Append-only**: 存储层只有 INSERT 和 SELECT
//! - **序列号**: SQLite AUTOINCREMENT，单调递增不复用
//! - **非阻塞**: 业务路径只提交到队列，落库由后台 worker 完成
//! - **结构化 details**: 创建存快照，更新存字段级 diff

pub mod diff;
pub mod service;
pub mod storage;
pub mod types;
pub mod worker;

pub use diff::{FieldChange, create_delete_details, create_diff, create_snapshot};
pub use service::{AuditLogRequest, AuditService};
pub use storage::{AuditStorage, AuditStorageError};
pub use types::{AuditAction, AuditEntry, AuditListResponse, AuditQuery};
pub use worker::AuditWorker;
