use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use super::required_text;
use crate::entities::sea_orm_active_enums::BedStatus;
use crate::entities::{bed, prelude::*, room};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBedRequest {
    pub name: String,
    pub room_id: i32,
    pub status: Option<BedStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBedRequest {
    pub name: Option<String>,
    pub room_id: Option<i32>,
    pub status: Option<BedStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BedWithRoom {
    #[serde(flatten)]
    pub bed: bed::Model,
    pub room: Option<room::Model>,
}

pub async fn create<C: ConnectionTrait>(db: &C, req: CreateBedRequest) -> ApiResult<bed::Model> {
    let name = required_text("name", &req.name)?;
    ensure_room_exists(db, req.room_id).await?;
    ensure_unique_name_in_room(db, &name, req.room_id, None).await?;

    let bed = bed::ActiveModel {
        name: Set(name),
        status: Set(req.status.unwrap_or_default()),
        room_id: Set(req.room_id),
        ..Default::default()
    };
    Ok(bed.insert(db).await?)
}

pub async fn find_all<C: ConnectionTrait>(db: &C) -> ApiResult<Vec<BedWithRoom>> {
    let rows = Bed::find()
        .find_also_related(Room)
        .order_by_asc(bed::Column::Id)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(bed, room)| BedWithRoom { bed, room })
        .collect())
}

pub async fn find_one<C: ConnectionTrait>(db: &C, id: i32) -> ApiResult<BedWithRoom> {
    let (bed, room) = Bed::find_by_id(id)
        .find_also_related(Room)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Bed {id} not found")))?;
    Ok(BedWithRoom { bed, room })
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    req: UpdateBedRequest,
) -> ApiResult<BedWithRoom> {
    let bed = Bed::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Bed {id} not found")))?;

    let name = match req.name {
        Some(name) => required_text("name", &name)?,
        None => bed.name.clone(),
    };
    let room_id = req.room_id.unwrap_or(bed.room_id);
    if room_id != bed.room_id {
        ensure_room_exists(db, room_id).await?;
    }
    if name != bed.name || room_id != bed.room_id {
        ensure_unique_name_in_room(db, &name, room_id, Some(id)).await?;
    }

    let mut active = bed.into_active_model();
    active.name = Set(name);
    active.room_id = Set(room_id);
    if let Some(status) = req.status {
        active.status = Set(status);
    }
    if active.is_changed() {
        active.update(db).await?;
    }

    find_one(db, id).await
}

pub async fn remove<C: ConnectionTrait>(db: &C, id: i32) -> ApiResult<()> {
    let res = Bed::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ApiError::not_found(format!("Bed {id} not found")));
    }
    Ok(())
}

async fn ensure_room_exists<C: ConnectionTrait>(db: &C, room_id: i32) -> ApiResult<()> {
    match Room::find_by_id(room_id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found(format!("Room {room_id} not found"))),
    }
}

async fn ensure_unique_name_in_room<C: ConnectionTrait>(
    db: &C,
    name: &str,
    room_id: i32,
    exclude_bed_id: Option<i32>,
) -> ApiResult<()> {
    let mut query = Bed::find()
        .filter(bed::Column::Name.eq(name))
        .filter(bed::Column::RoomId.eq(room_id));
    if let Some(id) = exclude_bed_id {
        query = query.filter(bed::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(ApiError::conflict(format!(
            "A bed named \"{name}\" already exists in this room"
        )));
    }
    Ok(())
}
