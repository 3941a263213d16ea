use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use super::record_event;
use crate::error::ApiResult;
use crate::metrics;
use crate::services::rooms::{self, CreateRoomRequest, RoomFilter, UpdateRoomRequest};

pub async fn create_room(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateRoomRequest>,
) -> ApiResult<impl IntoResponse> {
    let room = rooms::create(&db, payload).await?;

    record_event("rooms", "create_room", "Room created");
    tracing::Span::current().record("room_id", room.id);
    metrics::refresh_ward_gauges(&db).await;

    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn list_rooms(
    Extension(db): Extension<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(rooms::find_all(&db).await?))
}

pub async fn rooms_overview(
    Extension(db): Extension<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(rooms::overview(&db).await?))
}

pub async fn filter_rooms(
    Extension(db): Extension<DatabaseConnection>,
    Query(filter): Query<RoomFilter>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(rooms::find_with_filters(&db, &filter).await?))
}

pub async fn get_room(
    Extension(db): Extension<DatabaseConnection>,
    Path(room_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(rooms::find_one(&db, room_id).await?))
}

pub async fn update_room(
    Extension(db): Extension<DatabaseConnection>,
    Path(room_id): Path<i32>,
    Json(payload): Json<UpdateRoomRequest>,
) -> ApiResult<impl IntoResponse> {
    let room = rooms::update(&db, room_id, payload).await?;
    record_event("rooms", "update_room", "Room updated");
    tracing::Span::current().record("room_id", room_id);
    Ok(Json(room))
}

pub async fn delete_room(
    Extension(db): Extension<DatabaseConnection>,
    Path(room_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    rooms::remove(&db, room_id).await?;

    record_event("rooms", "delete_room", "Room deleted");
    tracing::Span::current().record("room_id", room_id);
    metrics::refresh_ward_gauges(&db).await;

    Ok(Json(json!({ "deleted": true })))
}
