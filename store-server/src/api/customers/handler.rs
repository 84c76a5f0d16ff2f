//! Customer API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::audit::{AuditAction, create_delete_details, create_diff, create_snapshot};
use crate::audit_log;
use crate::core::ServerState;
use crate::db::repository::{RepoError, customer};
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};

const RESOURCE: &str = "customer";

#[derive(serde::Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// UNIQUE 约束冲突映射为业务错误码 (邮箱已注册)
fn map_duplicate_email(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(_) => AppError::with_message(
            ErrorCode::CustomerEmailExists,
            "Email address already registered",
        ),
        other => other.into(),
    }
}

fn validate_create(payload: &CustomerCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

fn validate_update(payload: &CustomerUpdate) -> AppResult<()> {
    if let Some(ref name) = payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(ref email) = payload.email {
        validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

/// GET /api/customers - 获取所有客户
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Customer>>> {
    let customers = customer::find_all(&state.pool).await?;
    Ok(Json(customers))
}

/// GET /api/customers/search?q=xxx - 按姓名、邮箱或电话搜索
pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Customer>>> {
    let customers = customer::search(&state.pool, &query.q).await?;
    Ok(Json(customers))
}

/// GET /api/customers/{id} - 获取单个客户
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Customer>> {
    let customer = customer::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::CustomerNotFound,
            format!("Customer {} not found", id),
        )
    })?;
    Ok(Json(customer))
}

/// POST /api/customers - 创建客户
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<Json<Customer>> {
    validate_create(&payload)?;

    let customer = customer::create(&state.pool, payload)
        .await
        .map_err(map_duplicate_email)?;

    let id = customer.id.to_string();

    audit_log!(
        state.audit_service,
        AuditAction::CustomerCreated,
        RESOURCE, &id,
        details = create_snapshot(&customer, RESOURCE)
    );

    Ok(Json(customer))
}

/// PUT /api/customers/{id} - 更新客户
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerUpdate>,
) -> AppResult<Json<Customer>> {
    validate_update(&payload)?;

    let old_customer = customer::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::CustomerNotFound,
            format!("Customer {} not found", id),
        )
    })?;

    let customer = customer::update(&state.pool, id, payload)
        .await
        .map_err(map_duplicate_email)?;

    let id_str = id.to_string();

    audit_log!(
        state.audit_service,
        AuditAction::CustomerUpdated,
        RESOURCE, &id_str,
        details = create_diff(&old_customer, &customer, RESOURCE)
    );

    Ok(Json(customer))
}

/// DELETE /api/customers/{id} - 注销客户（软删除，订单保留买家快照）
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let name_for_audit = customer::find_by_id(&state.pool, id)
        .await
        .ok()
        .flatten()
        .map(|c| c.name.clone())
        .unwrap_or_default();

    let result = customer::delete(&state.pool, id).await?;

    let id_str = id.to_string();

    if result {
        audit_log!(
            state.audit_service,
            AuditAction::CustomerDeleted,
            RESOURCE, &id_str,
            details = create_delete_details(&name_for_audit)
        );
    }

    Ok(Json(result))
}
