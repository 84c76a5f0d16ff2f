//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::audit::{AuditAction, create_snapshot};
use crate::audit_log;
use crate::checkout;
use crate::core::ServerState;
use crate::db::repository::order;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok_with_message};
use shared::models::{
    Order, OrderBulkUpdateStatus, OrderCreate, OrderDetail, OrderStatus, OrderUpdateStatus,
};

const RESOURCE: &str = "order";

/// 订单列表查询参数
#[derive(Debug, serde::Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

/// 订单列表响应 (分页)
#[derive(Debug, serde::Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

/// GET /api/orders - 分页查询订单，可按状态和客户过滤
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<OrderListResponse>> {
    let limit = query.limit.clamp(1, 200);
    let offset = query.offset.max(0);

    let (orders, total) =
        order::find_page(&state.pool, query.status, query.customer_id, limit, offset).await?;

    Ok(Json(OrderListResponse {
        orders,
        total,
        offset,
        limit,
    }))
}

/// GET /api/orders/{id} - 获取订单详情 (含行项目快照)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = order::find_detail(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", id))
    })?;

    Ok(Json(detail))
}

/// POST /api/orders - 下单 (原子事务: 校验、扣库存、落单)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<OrderDetail>)> {
    let detail =
        checkout::place_order(&state.pool, payload, state.config.checkout_timeout_ms).await?;

    let id = detail.order.id.to_string();

    audit_log!(
        state.audit_service,
        AuditAction::OrderPlaced,
        RESOURCE, &id,
        details = create_snapshot(&detail.order, RESOURCE)
    );

    // 通知在事务提交之后触发，失败不影响订单
    state.notify_order_placed(&detail);

    Ok((StatusCode::CREATED, Json(detail)))
}

/// PATCH /api/orders/{id}/status - 订单状态流转
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderUpdateStatus>,
) -> AppResult<Json<Order>> {
    let old_order = order::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", id))
    })?;

    let order = checkout::update_status(&state.pool, id, payload.status).await?;

    let id_str = id.to_string();

    audit_log!(
        state.audit_service,
        AuditAction::OrderStatusChanged,
        RESOURCE, &id_str,
        details = serde_json::json!({
            "from": old_order.status,
            "to": order.status,
        })
    );

    Ok(Json(order))
}

/// POST /api/orders/bulk/update-status - 批量状态流转 (全部成功或全部失败)
pub async fn bulk_update_status(
    State(state): State<ServerState>,
    Json(payload): Json<OrderBulkUpdateStatus>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let updated =
        checkout::bulk_update_status(&state.pool, &payload.order_ids, payload.status).await?;

    audit_log!(
        state.audit_service,
        AuditAction::OrderBulkStatusChanged,
        RESOURCE, "bulk",
        details = serde_json::json!({
            "order_ids": payload.order_ids,
            "to": payload.status,
            "updated": updated.len(),
        })
    );

    let message = format!("{} orders updated", updated.len());
    Ok(ok_with_message(updated, message))
}
