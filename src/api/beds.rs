use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use super::record_event;
use crate::error::ApiResult;
use crate::metrics;
use crate::services::beds::{self, CreateBedRequest, UpdateBedRequest};

pub async fn create_bed(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateBedRequest>,
) -> ApiResult<impl IntoResponse> {
    let bed = beds::create(&db, payload).await?;

    record_event("beds", "create_bed", "Bed created");
    tracing::Span::current()
        .record("bed_id", bed.id)
        .record("room_id", bed.room_id);
    metrics::refresh_ward_gauges(&db).await;

    Ok((StatusCode::CREATED, Json(bed)))
}

pub async fn list_beds(
    Extension(db): Extension<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(beds::find_all(&db).await?))
}

pub async fn get_bed(
    Extension(db): Extension<DatabaseConnection>,
    Path(bed_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(beds::find_one(&db, bed_id).await?))
}

pub async fn update_bed(
    Extension(db): Extension<DatabaseConnection>,
    Path(bed_id): Path<i32>,
    Json(payload): Json<UpdateBedRequest>,
) -> ApiResult<impl IntoResponse> {
    let bed = beds::update(&db, bed_id, payload).await?;
    record_event("beds", "update_bed", "Bed updated");
    tracing::Span::current().record("bed_id", bed_id);
    metrics::refresh_ward_gauges(&db).await;
    Ok(Json(bed))
}

pub async fn delete_bed(
    Extension(db): Extension<DatabaseConnection>,
    Path(bed_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    beds::remove(&db, bed_id).await?;

    record_event("beds", "delete_bed", "Bed deleted");
    tracing::Span::current().record("bed_id", bed_id);
    metrics::refresh_ward_gauges(&db).await;

    Ok(Json(json!({ "deleted": true })))
}
