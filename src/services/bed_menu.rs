use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use super::inventory::{consumption_lines, BedConsumption, Inventory};
use super::now;
use crate::entities::{bed, bed_menu, menu, menu_product, prelude::*, stock_movement};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignMenuRequest {
    pub bed_id: i32,
    pub menu_id: i32,
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeBedMenuRequest {
    pub bed_menu_id: i32,
    /// Cross-check against the assignment's bed when present.
    pub bed_id: Option<i32>,
    pub quantity: i32,
    pub user_id: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeResponse {
    pub success: bool,
    pub message: String,
    pub bed_menu_id: i32,
    pub bed_id: Option<i32>,
    pub consumed_at: chrono::NaiveDateTime,
    pub consumption_record: Vec<stock_movement::Model>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BedMenuDetail {
    #[serde(flatten)]
    pub bed_menu: bed_menu::Model,
    pub bed: Option<bed::Model>,
    pub menu: Option<menu::Model>,
}

pub async fn assign<C: ConnectionTrait>(db: &C, req: AssignMenuRequest) -> ApiResult<bed_menu::Model> {
    let quantity = req.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(ApiError::bad_request("quantity must be at least 1"));
    }
    if Bed::find_by_id(req.bed_id).one(db).await?.is_none() {
        return Err(ApiError::not_found(format!("Bed {} not found", req.bed_id)));
    }
    let menu = Menu::find_by_id(req.menu_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Menu {} not found", req.menu_id)))?;
    if !menu.active {
        return Err(ApiError::bad_request(format!(
            "Menu \"{}\" is not active",
            menu.name
        )));
    }

    let assignment = bed_menu::ActiveModel {
        bed_id: Set(req.bed_id),
        menu_id: Set(req.menu_id),
        quantity: Set(quantity),
        assigned_at: Set(now()),
        consumed: Set(false),
        consumed_at: Set(None),
        ..Default::default()
    };
    Ok(assignment.insert(db).await?)
}

pub async fn find_all<C: ConnectionTrait>(db: &C) -> ApiResult<Vec<BedMenuDetail>> {
    let assignments = BedMenu::find()
        .order_by_desc(bed_menu::Column::AssignedAt)
        .order_by_desc(bed_menu::Column::Id)
        .all(db)
        .await?;
    if assignments.is_empty() {
        return Ok(Vec::new());
    }

    let bed_ids: Vec<i32> = assignments.iter().map(|a| a.bed_id).collect();
    let menu_ids: Vec<i32> = assignments.iter().map(|a| a.menu_id).collect();
    let beds: HashMap<i32, bed::Model> = Bed::find()
        .filter(bed::Column::Id.is_in(bed_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|b| (b.id, b))
        .collect();
    let menus: HashMap<i32, menu::Model> = Menu::find()
        .filter(menu::Column::Id.is_in(menu_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    Ok(assignments
        .into_iter()
        .map(|bed_menu| BedMenuDetail {
            bed: beds.get(&bed_menu.bed_id).cloned(),
            menu: menus.get(&bed_menu.menu_id).cloned(),
            bed_menu,
        })
        .collect())
}

/// Marks an assignment as served without touching stock.
pub async fn mark_consumed<C: ConnectionTrait>(db: &C, id: i32) -> ApiResult<bed_menu::Model> {
    let assignment = BedMenu::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Assignment {id} not found")))?;
    if assignment.consumed {
        return Err(already_served());
    }

    flip_consumed(db, id, now()).await?;

    BedMenu::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Assignment {id} not found")))
}

/// Serves a bed menu: checks the assignment, takes the ingredients out of stock
/// and flips `consumed`, all in one transaction. Any error rolls everything back.
pub async fn consume<C>(
    db: &C,
    inventory: &dyn Inventory,
    req: ConsumeBedMenuRequest,
) -> ApiResult<ConsumeResponse>
where
    C: ConnectionTrait + TransactionTrait,
{
    if req.quantity < 1 {
        return Err(ApiError::bad_request("quantity must be at least 1"));
    }

    let txn = db.begin().await?;
    match consume_in(&txn, inventory, &req).await {
        Ok(response) => {
            txn.commit().await?;
            Ok(response)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!(
                    bed_menu_id = req.bed_menu_id,
                    "rollback after failed consumption also failed: {}",
                    rollback_err
                );
            }
            Err(err)
        }
    }
}

async fn consume_in(
    txn: &DatabaseTransaction,
    inventory: &dyn Inventory,
    req: &ConsumeBedMenuRequest,
) -> ApiResult<ConsumeResponse> {
    let assignment = BedMenu::find_by_id(req.bed_menu_id)
        .one(txn)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("BedMenu {} not found", req.bed_menu_id)))?;

    if let Some(bed_id) = req.bed_id {
        if bed_id != assignment.bed_id {
            return Err(ApiError::bad_request(format!(
                "BedMenu {} does not belong to bed {}",
                assignment.id, bed_id
            )));
        }
    }
    if assignment.consumed {
        return Err(already_served());
    }

    let ingredients = MenuProduct::find()
        .filter(menu_product::Column::MenuId.eq(assignment.menu_id))
        .order_by_asc(menu_product::Column::Id)
        .all(txn)
        .await?;

    let consumption = BedConsumption {
        user_id: req.user_id,
        bed_menu_id: assignment.id,
        lines: consumption_lines(&ingredients, req.quantity),
    };
    let record = inventory.record_bed_consumption(txn, &consumption).await?;

    let consumed_at = now();
    flip_consumed(txn, assignment.id, consumed_at).await?;

    Ok(ConsumeResponse {
        success: true,
        message: "Stock consumed".to_string(),
        bed_menu_id: assignment.id,
        bed_id: Some(assignment.bed_id),
        consumed_at,
        consumption_record: record,
    })
}

/// `consumed` only ever goes false -> true; the guard in the WHERE clause makes a
/// concurrent second attempt see zero affected rows.
async fn flip_consumed<C: ConnectionTrait>(
    db: &C,
    id: i32,
    consumed_at: chrono::NaiveDateTime,
) -> ApiResult<()> {
    let res = BedMenu::update_many()
        .col_expr(bed_menu::Column::Consumed, Expr::value(true))
        .col_expr(bed_menu::Column::ConsumedAt, Expr::value(consumed_at))
        .filter(bed_menu::Column::Id.eq(id))
        .filter(bed_menu::Column::Consumed.eq(false))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(already_served());
    }
    Ok(())
}

fn already_served() -> ApiError {
    ApiError::conflict("This menu has already been served for this bed")
}
