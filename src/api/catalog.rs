//! Categories and products: the stock side of the kitchen.

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;

use super::record_event;
use crate::error::ApiResult;
use crate::services::categories::{self, CreateCategoryRequest};
use crate::services::inventory::{self, CreateProductRequest};

pub async fn create_category(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let category = categories::create(&db, payload).await?;
    record_event("categories", "create_category", "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    Extension(db): Extension<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(categories::find_all(&db).await?))
}

pub async fn create_product(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateProductRequest>,
) -> ApiResult<impl IntoResponse> {
    let product = inventory::create_product(&db, payload).await?;
    record_event("products", "create_product", "Product created");
    tracing::Span::current().record("product_id", product.id);
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    Extension(db): Extension<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(inventory::find_all_products(&db).await?))
}
