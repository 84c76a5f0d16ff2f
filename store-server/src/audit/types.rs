//! 审计日志类型定义
//!
//! 所有条目不可变、不可删除。序列号由数据库自增保证单调。

use serde::{Deserialize, Serialize};

/// 审计操作类型（枚举，非自由文本）
///
/// 按领域分组，确保每个敏感操作都有明确的类型标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AuditAction {
    // ═══ 订单（财务关键）═══
    /// 下单成功
    OrderPlaced,
    /// 订单状态流转
    OrderStatusChanged,
    /// 订单批量状态流转
    OrderBulkStatusChanged,

    // ═══ 商品 ═══
    /// 商品创建
    ProductCreated,
    /// 商品更新
    ProductUpdated,
    /// 商品删除
    ProductDeleted,
    /// 库存人工调整
    StockAdjusted,

    // ═══ 客户 ═══
    /// 客户创建
    CustomerCreated,
    /// 客户更新
    CustomerUpdated,
    /// 客户删除
    CustomerDeleted,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// 审计日志条目（不可变）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEntry {
    /// 全局递增序列号（数据库自增）
    pub id: i64,
    /// 时间戳（Unix 毫秒）
    pub timestamp: i64,
    /// 操作类型
    pub action: AuditAction,
    /// 资源类型（如 "order", "product", "customer"）
    pub resource_type: String,
    /// 资源 ID
    pub resource_id: String,
    /// 操作人 ID（无登录体系时为 None）
    pub operator_id: Option<String>,
    /// 操作人名称
    pub operator_name: Option<String>,
    /// 结构化详情（JSON）
    pub details: serde_json::Value,
}

/// 审计日志查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    /// 起始时间（Unix 毫秒，含）
    pub from: Option<i64>,
    /// 截止时间（Unix 毫秒，含）
    pub to: Option<i64>,
    /// 操作类型过滤
    pub action: Option<AuditAction>,
    /// 操作人 ID 过滤
    pub operator_id: Option<String>,
    /// 资源类型过滤
    pub resource_type: Option<String>,
    /// 分页偏移
    #[serde(default)]
    pub offset: i64,
    /// 分页大小（默认 50）
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// 审计日志列表响应
#[derive(Debug, Serialize)]
pub struct AuditListResponse {
    pub items: Vec<AuditEntry>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serializes_snake_case() {
        let json = serde_json::to_string(&AuditAction::OrderPlaced).unwrap();
        assert_eq!(json, "\"order_placed\"");
        let json = serde_json::to_string(&AuditAction::OrderBulkStatusChanged).unwrap();
        assert_eq!(json, "\"order_bulk_status_changed\"");
    }

    #[test]
    fn test_query_defaults() {
        let q: AuditQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.offset, 0);
        assert_eq!(q.limit, 50);
        assert!(q.action.is_none());
    }

    #[test]
    fn test_query_action_filter_parses() {
        let q: AuditQuery = serde_json::from_str("{\"action\":\"stock_adjusted\"}").unwrap();
        assert_eq!(q.action, Some(AuditAction::StockAdjusted));
    }
}
