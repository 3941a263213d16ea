use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use super::{now, required_text};
use crate::entities::{menu, menu_product, menu_type, prelude::*, product};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuLineRequest {
    pub product_id: i32,
    pub quantity: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub quantity: i32,
    pub menu_type_id: i32,
    #[serde(default)]
    pub products: Vec<MenuLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMenuTypeRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuLine {
    #[serde(flatten)]
    pub line: menu_product::Model,
    pub product: Option<product::Model>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDetail {
    #[serde(flatten)]
    pub menu: menu::Model,
    pub menu_type: Option<menu_type::Model>,
    pub menu_products: Vec<MenuLine>,
}

pub async fn create<C>(db: &C, req: CreateMenuRequest) -> ApiResult<MenuDetail>
where
    C: ConnectionTrait + TransactionTrait,
{
    let name = required_text("name", &req.name)?;
    if req.quantity < 0 {
        return Err(ApiError::bad_request("quantity must not be negative"));
    }
    if let Some(line) = req
        .products
        .iter()
        .find(|l| !l.quantity.is_finite() || l.quantity <= 0.0)
    {
        return Err(ApiError::bad_request(format!(
            "quantity for product {} must be positive",
            line.product_id
        )));
    }

    let txn = db.begin().await?;

    if MenuType::find_by_id(req.menu_type_id).one(&txn).await?.is_none() {
        return Err(ApiError::not_found(format!(
            "Menu type {} not found",
            req.menu_type_id
        )));
    }

    let ts = now();
    let menu = menu::ActiveModel {
        name: Set(name),
        description: Set(req.description.trim().to_string()),
        quantity: Set(req.quantity),
        active: Set(true),
        menu_type_id: Set(req.menu_type_id),
        created_at: Set(ts),
        updated_at: Set(ts),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for line in &req.products {
        if Product::find_by_id(line.product_id).one(&txn).await?.is_none() {
            return Err(ApiError::not_found(format!(
                "Product {} not found",
                line.product_id
            )));
        }
        menu_product::ActiveModel {
            menu_id: Set(menu.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    find_one(db, menu.id).await
}

pub async fn find_all<C: ConnectionTrait>(db: &C) -> ApiResult<Vec<MenuDetail>> {
    let menus = Menu::find().order_by_asc(menu::Column::Id).all(db).await?;
    attach_lines(db, menus).await
}

pub async fn find_one<C: ConnectionTrait>(db: &C, id: i32) -> ApiResult<MenuDetail> {
    let menu = Menu::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Menu {id} not found")))?;
    let mut details = attach_lines(db, vec![menu]).await?;
    details
        .pop()
        .ok_or_else(|| ApiError::not_found(format!("Menu {id} not found")))
}

/// Flips a menu between active and inactive.
pub async fn change_status<C: ConnectionTrait>(db: &C, id: i32) -> ApiResult<menu::Model> {
    let menu = Menu::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Menu {id} not found")))?;

    let active = !menu.active;
    let mut model = menu.into_active_model();
    model.active = Set(active);
    model.updated_at = Set(now());
    Ok(model.update(db).await?)
}

pub async fn create_type<C: ConnectionTrait>(
    db: &C,
    req: CreateMenuTypeRequest,
) -> ApiResult<menu_type::Model> {
    let name = required_text("name", &req.name)?;
    if MenuType::find()
        .filter(menu_type::Column::Name.eq(name.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(format!(
            "Menu type \"{name}\" already exists"
        )));
    }
    let menu_type = menu_type::ActiveModel {
        name: Set(name),
        ..Default::default()
    };
    Ok(menu_type.insert(db).await?)
}

pub async fn find_all_types<C: ConnectionTrait>(db: &C) -> ApiResult<Vec<menu_type::Model>> {
    Ok(MenuType::find()
        .order_by_asc(menu_type::Column::Name)
        .all(db)
        .await?)
}

async fn attach_lines<C: ConnectionTrait>(
    db: &C,
    menus: Vec<menu::Model>,
) -> ApiResult<Vec<MenuDetail>> {
    if menus.is_empty() {
        return Ok(Vec::new());
    }

    let menu_ids: Vec<i32> = menus.iter().map(|m| m.id).collect();
    let type_ids: Vec<i32> = menus.iter().map(|m| m.menu_type_id).collect();

    let types: HashMap<i32, menu_type::Model> = MenuType::find()
        .filter(menu_type::Column::Id.is_in(type_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    let lines = MenuProduct::find()
        .filter(menu_product::Column::MenuId.is_in(menu_ids))
        .order_by_asc(menu_product::Column::Id)
        .all(db)
        .await?;

    let product_ids: Vec<i32> = lines.iter().map(|l| l.product_id).collect();
    let products: HashMap<i32, product::Model> = if product_ids.is_empty() {
        HashMap::new()
    } else {
        Product::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    let mut lines_by_menu: HashMap<i32, Vec<MenuLine>> = HashMap::new();
    for line in lines {
        let product = products.get(&line.product_id).cloned();
        lines_by_menu
            .entry(line.menu_id)
            .or_default()
            .push(MenuLine { line, product });
    }

    Ok(menus
        .into_iter()
        .map(|menu| MenuDetail {
            menu_type: types.get(&menu.menu_type_id).cloned(),
            menu_products: lines_by_menu.remove(&menu.id).unwrap_or_default(),
            menu,
        })
        .collect())
}
