//! Audit Log API Handlers

use axum::{
    Json,
    extract::{Query, State},
};

use crate::audit::{AuditListResponse, AuditQuery, AuditStorage};
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/audit-log - 查询审计日志 (时间窗、动作、资源类型过滤 + 分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<AuditListResponse>> {
    let storage = AuditStorage::new(state.pool.clone());
    let (items, total) = storage.query(&query).await?;
    Ok(Json(AuditListResponse { items, total }))
}
