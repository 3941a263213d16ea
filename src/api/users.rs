use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;

use super::record_event;
use crate::error::ApiResult;
use crate::metrics;
use crate::services::users::{self, CreateUserRequest};

pub async fn create_user(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = users::create(&db, payload).await?;

    record_event("users", "create_user", "User created");
    tracing::Span::current().record("user_id", user.id);
    metrics::user_created();

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(
    Extension(db): Extension<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(users::find_all(&db).await?))
}

pub async fn get_user(
    Extension(db): Extension<DatabaseConnection>,
    Path(user_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(users::find_one(&db, user_id).await?))
}
