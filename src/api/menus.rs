use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;

use super::record_event;
use crate::error::ApiResult;
use crate::services::menus::{self, CreateMenuRequest, CreateMenuTypeRequest};

pub async fn create_menu(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateMenuRequest>,
) -> ApiResult<impl IntoResponse> {
    let menu = menus::create(&db, payload).await?;
    record_event("menus", "create_menu", "Menu created");
    tracing::Span::current().record("menu_id", menu.menu.id);
    Ok((StatusCode::CREATED, Json(menu)))
}

pub async fn list_menus(
    Extension(db): Extension<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(menus::find_all(&db).await?))
}

pub async fn get_menu(
    Extension(db): Extension<DatabaseConnection>,
    Path(menu_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(menus::find_one(&db, menu_id).await?))
}

pub async fn change_status(
    Extension(db): Extension<DatabaseConnection>,
    Path(menu_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let menu = menus::change_status(&db, menu_id).await?;
    record_event(
        "menus",
        "change_status",
        if menu.active { "Menu activated" } else { "Menu deactivated" },
    );
    tracing::Span::current().record("menu_id", menu_id);
    Ok(Json(menu))
}

pub async fn create_menu_type(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateMenuTypeRequest>,
) -> ApiResult<impl IntoResponse> {
    let menu_type = menus::create_type(&db, payload).await?;
    record_event("menu_types", "create_menu_type", "Menu type created");
    Ok((StatusCode::CREATED, Json(menu_type)))
}

pub async fn list_menu_types(
    Extension(db): Extension<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(menus::find_all_types(&db).await?))
}
