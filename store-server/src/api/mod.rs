//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`products`] - 商品管理接口 (CRUD + 库存调整)
//! - [`customers`] - 客户管理接口 (CRUD + 搜索)
//! - [`orders`] - 订单接口 (下单、查询、状态流转)
//! - [`audit_log`] - 审计日志查询接口

pub mod health;

// Data models API
pub mod customers;
pub mod products;

// Checkout / orders API
pub mod orders;

// Audit trail API
pub mod audit_log;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};
