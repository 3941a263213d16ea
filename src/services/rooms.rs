use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use super::ward_view::{BedScope, MappedRoom, RoomOverview, WardSnapshot};
use super::{double_option, required_text};
use crate::entities::sea_orm_active_enums::{BedStatus, RoomStatus};
use crate::entities::{bed, prelude::*, room};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    pub floor: Option<i32>,
    pub status: Option<RoomStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    pub name: Option<String>,
    /// `null` clears the floor, an absent key leaves it.
    #[serde(default, deserialize_with = "double_option")]
    pub floor: Option<Option<i32>>,
    pub status: Option<RoomStatus>,
}

/// Query string of `GET /rooms/filters`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomFilter {
    pub room_status: Option<RoomStatus>,
    pub floor: Option<i32>,
    pub bed_status: Option<BedStatus>,
    pub menu_consumed: Option<bool>,
    pub menu_id: Option<i32>,
    pub name: Option<String>,
}

impl RoomFilter {
    fn room_condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(status) = self.room_status {
            cond = cond.add(room::Column::Status.eq(status));
        }
        if let Some(floor) = self.floor {
            cond = cond.add(room::Column::Floor.eq(floor));
        }
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            // Case-insensitive substring match that behaves the same on every backend
            let pattern = format!("%{}%", escape_like(&name.to_lowercase()));
            cond = cond.add(
                Expr::expr(Func::lower(Expr::col(room::Column::Name)))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }
        cond
    }

    fn bed_scope(&self) -> BedScope {
        BedScope {
            bed_status: self.bed_status,
            menu_consumed: self.menu_consumed,
            menu_id: self.menu_id,
        }
    }
}

/// Makes `%`, `_` and the escape character itself match literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomWithBeds {
    #[serde(flatten)]
    pub room: room::Model,
    pub beds: Vec<bed::Model>,
}

pub async fn create<C: ConnectionTrait>(db: &C, req: CreateRoomRequest) -> ApiResult<room::Model> {
    let name = required_text("name", &req.name)?;
    ensure_unique_name(db, &name, None).await?;

    let room = room::ActiveModel {
        name: Set(name),
        floor: Set(req.floor),
        status: Set(req.status.unwrap_or_default()),
        ..Default::default()
    };
    Ok(room.insert(db).await?)
}

pub async fn find_all<C: ConnectionTrait>(db: &C) -> ApiResult<Vec<MappedRoom>> {
    let rooms = Room::find().order_by_asc(room::Column::Id).all(db).await?;
    let snapshot = WardSnapshot::load(db, &rooms, BedScope::default()).await?;
    Ok(snapshot.into_mapped_rooms(rooms, false))
}

pub async fn overview<C: ConnectionTrait>(db: &C) -> ApiResult<Vec<RoomOverview>> {
    let rooms = Room::find().order_by_asc(room::Column::Id).all(db).await?;
    let snapshot = WardSnapshot::load(db, &rooms, BedScope::default()).await?;
    Ok(snapshot.into_overview(rooms))
}

/// Filters on bed or bed-menu fields behave like an inner join: rooms and beds
/// without a matching row underneath are left out of the result.
pub async fn find_with_filters<C: ConnectionTrait>(
    db: &C,
    filter: &RoomFilter,
) -> ApiResult<Vec<MappedRoom>> {
    let rooms = Room::find()
        .filter(filter.room_condition())
        .order_by_asc(room::Column::Id)
        .all(db)
        .await?;
    let scope = filter.bed_scope();
    let snapshot = WardSnapshot::load(db, &rooms, scope).await?;
    Ok(snapshot.into_mapped_rooms(rooms, scope.filters_beds()))
}

pub async fn find_one<C: ConnectionTrait>(db: &C, id: i32) -> ApiResult<RoomWithBeds> {
    let room = Room::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Room {id} not found")))?;
    let beds = room
        .find_related(Bed)
        .order_by_asc(bed::Column::Id)
        .all(db)
        .await?;
    Ok(RoomWithBeds { room, beds })
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    req: UpdateRoomRequest,
) -> ApiResult<RoomWithBeds> {
    let room = Room::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Room {id} not found")))?;

    let mut active = room.into_active_model();
    if let Some(name) = req.name {
        let name = required_text("name", &name)?;
        ensure_unique_name(db, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if let Some(floor) = req.floor {
        active.floor = Set(floor);
    }
    if let Some(status) = req.status {
        active.status = Set(status);
    }
    if active.is_changed() {
        active.update(db).await?;
    }

    find_one(db, id).await
}

pub async fn remove<C: ConnectionTrait>(db: &C, id: i32) -> ApiResult<()> {
    let res = Room::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ApiError::not_found(format!("Room {id} not found")));
    }
    Ok(())
}

async fn ensure_unique_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
    exclude_id: Option<i32>,
) -> ApiResult<()> {
    let mut query = Room::find().filter(room::Column::Name.eq(name));
    if let Some(id) = exclude_id {
        query = query.filter(room::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(ApiError::conflict(format!(
            "A room named \"{name}\" already exists"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("sala_1"), "sala\\_1");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("norte"), "norte");
    }

    #[test]
    fn null_floor_differs_from_missing_floor() {
        let cleared: UpdateRoomRequest = serde_json::from_str(r#"{"floor":null}"#).unwrap();
        assert_eq!(cleared.floor, Some(None));

        let untouched: UpdateRoomRequest = serde_json::from_str(r#"{"name":"UCI"}"#).unwrap();
        assert_eq!(untouched.floor, None);
    }
}
