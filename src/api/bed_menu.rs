use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;

use super::record_event;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::services::bed_menu::{self, AssignMenuRequest, ConsumeBedMenuRequest};
use crate::services::inventory::Inventory;

pub async fn assign_menu(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<AssignMenuRequest>,
) -> ApiResult<impl IntoResponse> {
    let assignment = bed_menu::assign(&db, payload).await?;

    record_event("bed_menus", "assign_menu", "Menu assigned to bed");
    tracing::Span::current()
        .record("bed_id", assignment.bed_id)
        .record("bed_menu_id", assignment.id);
    metrics::menu_assigned();

    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn list_bed_menus(
    Extension(db): Extension<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(bed_menu::find_all(&db).await?))
}

pub async fn consume_menu(
    Extension(db): Extension<DatabaseConnection>,
    Extension(inventory): Extension<Arc<dyn Inventory>>,
    Json(payload): Json<ConsumeBedMenuRequest>,
) -> ApiResult<impl IntoResponse> {
    let bed_menu_id = payload.bed_menu_id;
    let servings = payload.quantity;
    tracing::Span::current()
        .record("bed_menu_id", bed_menu_id)
        .record("user_id", payload.user_id);

    match bed_menu::consume(&db, inventory.as_ref(), payload).await {
        Ok(consumed) => {
            record_event("bed_menus", "consume_menu", "Bed menu served and stock consumed");
            if let Some(bed_id) = consumed.bed_id {
                tracing::Span::current().record("bed_id", bed_id);
            }
            metrics::menu_consumed(servings);
            Ok(Json(consumed))
        }
        Err(err) => {
            tracing::Span::current()
                .record("table", "bed_menus")
                .record("action", "consume_menu_failed");
            metrics::consumption_failed(failure_reason(&err));
            tracing::warn!(bed_menu_id, "bed menu consumption rolled back: {}", err);
            Err(err)
        }
    }
}

pub async fn mark_consumed(
    Extension(db): Extension<DatabaseConnection>,
    Path(bed_menu_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let assignment = bed_menu::mark_consumed(&db, bed_menu_id).await?;
    record_event("bed_menus", "mark_consumed", "Bed menu marked as served");
    tracing::Span::current().record("bed_menu_id", bed_menu_id);
    Ok(Json(assignment))
}

fn failure_reason(err: &ApiError) -> &'static str {
    match err {
        ApiError::NotFound(_) => "not_found",
        ApiError::BadRequest(_) => "rejected",
        ApiError::Conflict(_) => "already_served",
        ApiError::Database(_) | ApiError::Internal(_) => "error",
    }
}
