use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::audit::{AuditService, AuditWorker};
use crate::core::Config;
use crate::db::DbService;
use crate::notify::{self, NotificationSink, OrderNotification};
use shared::models::OrderDetail;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是商城服务端的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 (sqlx) |
/// | audit_service | Arc<AuditService> | 审计日志服务 |
/// | notifier | Arc<dyn NotificationSink> | 下单通知 |
///
/// # 使用示例
///
/// ```ignore
/// // 获取连接池
/// let pool = &state.pool;
///
/// // 提交审计记录
/// audit_log!(state.audit_service, AuditAction::OrderPlaced, "order", &order_id);
/// ```
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 审计日志服务 (异步写入)
    pub audit_service: Arc<AuditService>,
    /// 下单通知 (Webhook 或日志)
    pub notifier: Arc<dyn NotificationSink>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize()`] 代替
    pub fn new(
        config: Config,
        pool: SqlitePool,
        audit_service: Arc<AuditService>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config,
            pool,
            audit_service,
            notifier,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/mochila.db，自动迁移)
    /// 3. 审计服务和通知服务
    ///
    /// # Panics
    ///
    /// 工作目录或数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize DB
        let db_path = config.database_dir().join("mochila.db");
        let db_path_str = db_path.to_string_lossy();

        let db_service = DbService::new(&db_path_str)
            .await
            .expect("Failed to initialize database");
        let pool = db_service.pool;

        // 2. Initialize services
        let audit_service = AuditService::new(config.enable_audit_log);
        let notifier = notify::from_config(config);

        Self::new(config.clone(), pool, audit_service, notifier)
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用
    ///
    /// 启动的任务：
    /// - 审计日志写入器 (AuditWorker)
    pub async fn start_background_tasks(&self) {
        if !self.config.enable_audit_log {
            tracing::info!("Audit log disabled, worker not started");
            return;
        }
        if let Some(rx) = self.audit_service.take_receiver() {
            let worker = AuditWorker::new(self.pool.clone());
            tokio::spawn(async move {
                worker.run(rx).await;
            });
        }
    }

    /// 下单成功后触发通知 (不阻塞响应)
    ///
    /// 订单事务已提交，通知失败只记录告警。
    pub fn notify_order_placed(&self, detail: &OrderDetail) {
        let notifier = self.notifier.clone();
        let notification = OrderNotification::from(detail);
        tokio::spawn(async move {
            if let Err(e) = notifier.order_placed(&notification).await {
                tracing::warn!(
                    order_id = notification.order_id,
                    "Order notification failed: {}",
                    e
                );
            }
        });
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }
}
