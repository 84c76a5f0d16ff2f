//! 统一错误处理
//!
//! 错误类型定义在 `shared::error`，这里统一 re-export 并提供响应辅助函数。
//!
//! # 错误码规范
//!
//! | 区间 | 分类 | 示例 |
//! |------|------|------|
//! | 0xxx | 通用错误 | 3 资源不存在 |
//! | 4xxx | 订单错误 | 4001 订单不存在 |
//! | 6xxx | 商品错误 | 6003 库存不足 |
//! | 8xxx | 客户错误 | 8002 邮箱已注册 |
//! | 9xxx | 系统错误 | 9006 事务中止 |
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Customer"))
//!
//! // 返回成功响应
//! Ok(ok(data))
//! ```

use axum::Json;
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success_with_message(message, data))
}
