use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use content_ops_core::catalog::{
    delete_statement, ProductFilter, ProductFilterParams, ProductForm, ProductRow, StatusChange,
};
use serde_json::{json, Value};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::middleware::session::CurrentSession;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(add_product))
        .route("/api/products/{product_id}", axum::routing::delete(delete_product))
        .route("/api/products/{product_id}/status", patch(update_status))
}

/// Validate before touching the database; the row starts out waiting for
/// content generation.
async fn add_product(
    Extension(current): Extension<CurrentSession>,
    Json(form): Json<ProductForm>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let product = form.validate()?;
    let mut session = current.handle.lock().await;
    session
        .gateway
        .execute(&product.insert_statement())
        .await
        .map_err(ApiError::gateway("Failed to add product"))?;

    info!(product_id = %product.product_id, "Product added");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "product_id": product.product_id,
            "status": "pending_content_generation",
        })),
    ))
}

async fn list_products(
    Extension(current): Extension<CurrentSession>,
    Query(params): Query<ProductFilterParams>,
) -> ApiResult<Json<Vec<ProductRow>>> {
    let filter = ProductFilter::try_from(params)?;
    let mut session = current.handle.lock().await;
    let products = session
        .gateway
        .fetch_all::<ProductRow>(&filter.to_statement())
        .await
        .map_err(ApiError::gateway("Failed to load products"))?;
    Ok(Json(products))
}

async fn update_status(
    Extension(current): Extension<CurrentSession>,
    Path(product_id): Path<String>,
    Json(change): Json<StatusChange>,
) -> ApiResult<Json<Value>> {
    let mut session = current.handle.lock().await;
    let updated = session
        .gateway
        .execute(&change.statement(&product_id))
        .await
        .map_err(ApiError::gateway("Failed to update product status"))?;
    if updated == 0 {
        return Err(ApiError::NotFound(format!("product {product_id} not found")));
    }
    Ok(Json(json!({ "product_id": product_id, "status": change.status })))
}

async fn delete_product(
    Extension(current): Extension<CurrentSession>,
    Path(product_id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut session = current.handle.lock().await;
    let deleted = session
        .gateway
        .execute(&delete_statement(&product_id))
        .await
        .map_err(ApiError::gateway("Failed to delete product"))?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("product {product_id} not found")));
    }
    info!(%product_id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
