//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::audit::{AuditAction, create_delete_details, create_diff, create_snapshot};
use crate::audit_log;
use crate::checkout::inventory;
use crate::core::ServerState;
use crate::db::repository::product;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Product, ProductCreate, ProductUpdate, StockAdjust};

const RESOURCE: &str = "product";

#[derive(serde::Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

fn validate_non_negative(value: i64, field: &str) -> AppResult<()> {
    if value < 0 {
        return Err(AppError::validation(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}

fn validate_create(payload: &ProductCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_non_negative(payload.price, "price")?;
    validate_non_negative(payload.stock, "stock")?;
    validate_non_negative(payload.min_stock, "min_stock")?;
    Ok(())
}

fn validate_update(payload: &ProductUpdate) -> AppResult<()> {
    if let Some(ref name) = payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    if let Some(price) = payload.price {
        validate_non_negative(price, "price")?;
    }
    if let Some(min_stock) = payload.min_stock {
        validate_non_negative(min_stock, "min_stock")?;
    }
    Ok(())
}

/// GET /api/products - 获取所有在售商品
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = product::find_all(&state.pool).await?;
    Ok(Json(products))
}

/// GET /api/products/search?q=xxx - 按名称或分类搜索
pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let products = product::search(&state.pool, &query.q).await?;
    Ok(Json(products))
}

/// GET /api/products/low-stock - 库存低于补货线的商品
pub async fn low_stock(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = product::find_low_stock(&state.pool).await?;
    Ok(Json(products))
}

/// GET /api/products/{id} - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let product = product::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::ProductNotFound,
            format!("Product {} not found", id),
        )
    })?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    validate_create(&payload)?;

    let product = product::create(&state.pool, payload).await?;

    let id = product.id.to_string();

    audit_log!(
        state.audit_service,
        AuditAction::ProductCreated,
        RESOURCE, &id,
        details = create_snapshot(&product, RESOURCE)
    );

    Ok(Json(product))
}

/// PUT /api/products/{id} - 更新商品 (不含库存)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    validate_update(&payload)?;

    let old_product = product::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::ProductNotFound,
            format!("Product {} not found", id),
        )
    })?;

    let product = product::update(&state.pool, id, payload).await?;

    let id_str = id.to_string();

    audit_log!(
        state.audit_service,
        AuditAction::ProductUpdated,
        RESOURCE, &id_str,
        details = create_diff(&old_product, &product, RESOURCE)
    );

    Ok(Json(product))
}

/// PATCH /api/products/{id}/stock - 人工库存调整 (进货、盘点)
pub async fn adjust_stock(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockAdjust>,
) -> AppResult<Json<Product>> {
    let stock_before = product::find_by_id(&state.pool, id)
        .await
        .ok()
        .flatten()
        .map(|p| p.stock);

    let (delta, set) = (payload.delta, payload.set);
    let product = inventory::adjust_stock(&state.pool, id, payload).await?;

    let id_str = id.to_string();

    audit_log!(
        state.audit_service,
        AuditAction::StockAdjusted,
        RESOURCE, &id_str,
        details = serde_json::json!({
            "delta": delta,
            "set": set,
            "from": stock_before,
            "to": product.stock,
        })
    );

    Ok(Json(product))
}

/// DELETE /api/products/{id} - 下架商品（软删除）
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let name_for_audit = product::find_by_id(&state.pool, id)
        .await
        .ok()
        .flatten()
        .map(|p| p.name.clone())
        .unwrap_or_default();

    let result = product::delete(&state.pool, id).await?;

    let id_str = id.to_string();

    if result {
        audit_log!(
            state.audit_service,
            AuditAction::ProductDeleted,
            RESOURCE, &id_str,
            details = create_delete_details(&name_for_audit)
        );
    }

    Ok(Json(result))
}
