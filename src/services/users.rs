use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use super::{now, required_text};
use crate::entities::{prelude::*, user};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

pub async fn create<C: ConnectionTrait>(db: &C, req: CreateUserRequest) -> ApiResult<user::Model> {
    let name = required_text("name", &req.name)?;
    let email = required_text("email", &req.email)?.to_lowercase();
    if !email.contains('@') {
        return Err(ApiError::bad_request(format!("{email} is not a valid email")));
    }

    if User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Email already exists"));
    }

    let ts = now();
    let user = user::ActiveModel {
        name: Set(name),
        email: Set(email),
        created_at: Set(ts),
        updated_at: Set(ts),
        ..Default::default()
    };
    Ok(user.insert(db).await?)
}

pub async fn find_all<C: ConnectionTrait>(db: &C) -> ApiResult<Vec<user::Model>> {
    Ok(User::find().order_by_asc(user::Column::Id).all(db).await?)
}

pub async fn find_one<C: ConnectionTrait>(db: &C, id: i32) -> ApiResult<user::Model> {
    User::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {id} not found")))
}
