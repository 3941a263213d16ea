use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use super::required_text;
use crate::entities::{category, prelude::*};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    req: CreateCategoryRequest,
) -> ApiResult<category::Model> {
    let name = required_text("name", &req.name)?;
    if Category::find()
        .filter(category::Column::Name.eq(name.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(format!(
            "Category \"{name}\" already exists"
        )));
    }

    let category = category::ActiveModel {
        name: Set(name),
        ..Default::default()
    };
    Ok(category.insert(db).await?)
}

pub async fn find_all<C: ConnectionTrait>(db: &C) -> ApiResult<Vec<category::Model>> {
    Ok(Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?)
}
