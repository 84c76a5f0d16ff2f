//! Mochila Store Server - 校园学习用品商城服务端
//!
//! # 架构概述
//!
//! 本模块是 Store Server 的主入口，提供以下核心功能：
//!
//! - **下单事务** (`checkout`): 原子下单、库存预占、状态流转
//! - **数据库** (`db`): 嵌入式 SQLite 存储 (sqlx)
//! - **审计日志** (`audit`): 异步追加式操作审计
//! - **HTTP API** (`api`): RESTful API 接口
//! - **通知** (`notify`): 下单后的 Webhook 通知
//!
//! # 模块结构
//!
//! ```text
//! store-server/src/
//! ├── core/          # 配置、状态、错误
//! ├── api/           # HTTP 路由和处理器
//! ├── checkout/      # 下单事务、库存、状态流转
//! ├── audit/         # 审计日志
//! ├── notify/        # 下单通知
//! ├── utils/         # 工具函数
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod audit;
pub mod checkout;
pub mod core;
pub mod db;
pub mod notify;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Audit logging macro - 非阻塞提交一条审计记录
//
// 用法:
//   audit_log!(state.audit_service, AuditAction::OrderPlaced, "order", &order_id);
//   audit_log!(
//       state.audit_service,
//       AuditAction::StockAdjusted,
//       "product",
//       &id,
//       details = json!({ "delta": 5 }),
//   );
#[macro_export]
macro_rules! audit_log {
    ($audit:expr, $action:expr, $resource_type:expr, $resource_id:expr $(, $key:ident = $value:expr)* $(,)?) => {{
        #[allow(unused_mut)]
        let mut request =
            $crate::audit::AuditLogRequest::new($action, $resource_type, $resource_id);
        $( request.$key = $value; )*
        $audit.log(request);
    }};
}

pub fn print_banner() {
    println!(
        r#"
    __  ___           __    _ __
   /  |/  /___  _____/ /_  (_) /___ _
  / /|_/ / __ \/ ___/ __ \/ / / __ `/
 / /  / / /_/ / /__/ / / / / / /_/ /
/_/  /_/\____/\___/_/ /_/_/_/\__,_/
    _____ __
   / ___// /_____  ________
   \__ \/ __/ __ \/ ___/ _ \
  ___/ / /_/ /_/ / /  /  __/
 /____/\__/\____/_/   \___/
    "#
    );
}

/// 设置运行环境
///
/// 1. 加载 .env 文件 (如果存在)
/// 2. 确保工作目录和日志目录存在
/// 3. 初始化日志 (LOG_TO_FILE=true 时输出到 work_dir/logs)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let work_dir =
        std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/mochila/store".to_string());
    std::fs::create_dir_all(&work_dir)?;

    let log_dir = std::path::Path::new(&work_dir).join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_to_file = std::env::var("LOG_TO_FILE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    if log_to_file {
        init_logger_with_file(log_level.as_deref(), None, log_dir.to_str());
    } else {
        init_logger_with_file(log_level.as_deref(), None, None);
    }

    Ok(())
}
