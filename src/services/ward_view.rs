//! Read models for the ward dashboards.
//!
//! Rooms are loaded first, then every dependent table is fetched with one
//! `IN (...)` query and grouped in memory, so a listing costs a fixed number of
//! queries regardless of how many beds are on the floor.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::entities::sea_orm_active_enums::{BedStatus, DietType, RoomStatus};
use crate::entities::{bed, bed_menu, menu, patient, patient_status, prelude::*, room};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStatus {
    pub status_type: String,
    pub diet_type: Option<DietType>,
    pub notes: Option<String>,
}

impl From<&patient_status::Model> for CurrentStatus {
    fn from(status: &patient_status::Model) -> Self {
        Self {
            status_type: status.status_type.clone(),
            diet_type: status.diet_type,
            notes: status.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedPatient {
    pub id: i32,
    pub name: String,
    pub age: Option<i32>,
    pub diagnosis: Option<String>,
    pub needs_review: bool,
    pub current_status: Option<CurrentStatus>,
    pub document_number: Option<String>,
    pub active: bool,
    pub bed_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentBedMenu {
    pub id: i32,
    pub bed_id: i32,
    pub menu_id: i32,
    pub menu: Option<menu::Model>,
    pub quantity: i32,
    pub assigned_at: chrono::NaiveDateTime,
    pub consumed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedBed {
    pub id: i32,
    pub name: String,
    pub status: BedStatus,
    pub room_id: i32,
    pub current_bed_menu: Option<CurrentBedMenu>,
    pub patients: Vec<MappedPatient>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedRoom {
    pub id: i32,
    pub name: String,
    pub floor: Option<i32>,
    pub status: RoomStatus,
    pub beds: Vec<MappedBed>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewPatient {
    pub id: i32,
    pub name: String,
    pub age: Option<i32>,
    pub diagnosis: Option<String>,
    pub current_status: Option<CurrentStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BedMenuWithMenu {
    #[serde(flatten)]
    pub bed_menu: bed_menu::Model,
    pub menu: Option<menu::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewBed {
    pub id: i32,
    pub name: String,
    pub status: BedStatus,
    pub room_id: i32,
    pub bed_menus: Vec<BedMenuWithMenu>,
    pub patients: Vec<OverviewPatient>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOverview {
    pub id: i32,
    pub name: String,
    pub floor: Option<i32>,
    pub status: RoomStatus,
    pub beds: Vec<OverviewBed>,
}

/// The assignment a bed is currently "on": newest first, preferring one that has
/// not been served yet, falling back to the newest one.
pub fn pick_active_bed_menu(bed_menus: &[bed_menu::Model]) -> Option<&bed_menu::Model> {
    let mut sorted: Vec<&bed_menu::Model> = bed_menus.iter().collect();
    sorted.sort_by(|a, b| {
        b.assigned_at
            .cmp(&a.assigned_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    sorted
        .iter()
        .find(|bm| !bm.consumed)
        .or_else(|| sorted.first())
        .copied()
}

/// Latest status by creation time; ties go to the later insert.
pub fn pick_current_status(statuses: &[patient_status::Model]) -> Option<&patient_status::Model> {
    statuses.iter().max_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    })
}

/// Bed-level restrictions applied while loading a snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct BedScope {
    pub bed_status: Option<BedStatus>,
    pub menu_consumed: Option<bool>,
    pub menu_id: Option<i32>,
}

impl BedScope {
    pub fn filters_bed_menus(&self) -> bool {
        self.menu_consumed.is_some() || self.menu_id.is_some()
    }

    pub fn filters_beds(&self) -> bool {
        self.bed_status.is_some() || self.filters_bed_menus()
    }
}

#[derive(Debug, Default)]
pub struct WardSnapshot {
    beds_by_room: HashMap<i32, Vec<bed::Model>>,
    bed_menus_by_bed: HashMap<i32, Vec<bed_menu::Model>>,
    menus: HashMap<i32, menu::Model>,
    patients_by_bed: HashMap<i32, Vec<patient::Model>>,
    statuses_by_patient: HashMap<i32, Vec<patient_status::Model>>,
}

impl WardSnapshot {
    pub async fn load<C: ConnectionTrait>(
        db: &C,
        rooms: &[room::Model],
        scope: BedScope,
    ) -> Result<Self, DbErr> {
        let mut snapshot = Self::default();
        let room_ids: Vec<i32> = rooms.iter().map(|r| r.id).collect();
        if room_ids.is_empty() {
            return Ok(snapshot);
        }

        let mut bed_query = Bed::find()
            .filter(bed::Column::RoomId.is_in(room_ids))
            .order_by_asc(bed::Column::Id);
        if let Some(status) = scope.bed_status {
            bed_query = bed_query.filter(bed::Column::Status.eq(status));
        }
        let mut beds = bed_query.all(db).await?;

        let bed_ids: Vec<i32> = beds.iter().map(|b| b.id).collect();
        if !bed_ids.is_empty() {
            let mut menu_query = BedMenu::find()
                .filter(bed_menu::Column::BedId.is_in(bed_ids.clone()))
                .order_by_desc(bed_menu::Column::AssignedAt)
                .order_by_desc(bed_menu::Column::Id);
            if let Some(consumed) = scope.menu_consumed {
                menu_query = menu_query.filter(bed_menu::Column::Consumed.eq(consumed));
            }
            if let Some(menu_id) = scope.menu_id {
                menu_query = menu_query.filter(bed_menu::Column::MenuId.eq(menu_id));
            }
            for bm in menu_query.all(db).await? {
                snapshot.bed_menus_by_bed.entry(bm.bed_id).or_default().push(bm);
            }
        }

        // With a bed-menu filter, a bed only survives if one of its menus matched
        if scope.filters_bed_menus() {
            beds.retain(|b| snapshot.bed_menus_by_bed.contains_key(&b.id));
        }

        let menu_ids: Vec<i32> = snapshot
            .bed_menus_by_bed
            .values()
            .flatten()
            .map(|bm| bm.menu_id)
            .collect();
        if !menu_ids.is_empty() {
            snapshot.menus = Menu::find()
                .filter(menu::Column::Id.is_in(menu_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|m| (m.id, m))
                .collect();
        }

        let bed_ids: Vec<i32> = beds.iter().map(|b| b.id).collect();
        if !bed_ids.is_empty() {
            let patients = Patient::find()
                .filter(patient::Column::BedId.is_in(bed_ids))
                .order_by_asc(patient::Column::Id)
                .all(db)
                .await?;

            let patient_ids: Vec<i32> = patients.iter().map(|p| p.id).collect();
            if !patient_ids.is_empty() {
                let statuses = PatientStatus::find()
                    .filter(patient_status::Column::PatientId.is_in(patient_ids))
                    .order_by_asc(patient_status::Column::CreatedAt)
                    .order_by_asc(patient_status::Column::Id)
                    .all(db)
                    .await?;
                for status in statuses {
                    snapshot
                        .statuses_by_patient
                        .entry(status.patient_id)
                        .or_default()
                        .push(status);
                }
            }

            for p in patients {
                if let Some(bed_id) = p.bed_id {
                    snapshot.patients_by_bed.entry(bed_id).or_default().push(p);
                }
            }
        }

        for b in beds {
            snapshot.beds_by_room.entry(b.room_id).or_default().push(b);
        }

        Ok(snapshot)
    }

    /// Rooms for the main dashboard. With `drop_empty`, rooms whose beds were all
    /// filtered out are left out as well.
    pub fn into_mapped_rooms(mut self, rooms: Vec<room::Model>, drop_empty: bool) -> Vec<MappedRoom> {
        rooms
            .into_iter()
            .filter_map(|r| {
                let beds = self.beds_by_room.remove(&r.id).unwrap_or_default();
                if drop_empty && beds.is_empty() {
                    return None;
                }
                let beds = beds.into_iter().map(|b| self.map_bed(b)).collect();
                Some(MappedRoom {
                    id: r.id,
                    name: r.name,
                    floor: r.floor,
                    status: r.status,
                    beds,
                })
            })
            .collect()
    }

    pub fn into_overview(mut self, rooms: Vec<room::Model>) -> Vec<RoomOverview> {
        rooms
            .into_iter()
            .map(|r| {
                let beds = self
                    .beds_by_room
                    .remove(&r.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|b| self.overview_bed(b))
                    .collect();
                RoomOverview {
                    id: r.id,
                    name: r.name,
                    floor: r.floor,
                    status: r.status,
                    beds,
                }
            })
            .collect()
    }

    fn map_bed(&mut self, b: bed::Model) -> MappedBed {
        let bed_menus = self.bed_menus_by_bed.remove(&b.id).unwrap_or_default();
        let current_bed_menu = pick_active_bed_menu(&bed_menus).map(|active| CurrentBedMenu {
            id: active.id,
            bed_id: active.bed_id,
            menu_id: active.menu_id,
            menu: self.menus.get(&active.menu_id).cloned(),
            quantity: active.quantity,
            assigned_at: active.assigned_at,
            consumed: active.consumed,
        });

        let patients = self
            .patients_by_bed
            .remove(&b.id)
            .unwrap_or_default()
            .into_iter()
            .map(|p| {
                let statuses = self.statuses_by_patient.remove(&p.id).unwrap_or_default();
                MappedPatient {
                    id: p.id,
                    name: p.name,
                    age: p.age,
                    diagnosis: p.diagnosis,
                    needs_review: p.needs_review,
                    current_status: pick_current_status(&statuses).map(CurrentStatus::from),
                    document_number: p.document_number,
                    active: p.active,
                    bed_id: p.bed_id,
                }
            })
            .collect();

        MappedBed {
            id: b.id,
            name: b.name,
            status: b.status,
            room_id: b.room_id,
            current_bed_menu,
            patients,
        }
    }

    fn overview_bed(&mut self, b: bed::Model) -> OverviewBed {
        let bed_menus = self
            .bed_menus_by_bed
            .remove(&b.id)
            .unwrap_or_default()
            .into_iter()
            .map(|bm| BedMenuWithMenu {
                menu: self.menus.get(&bm.menu_id).cloned(),
                bed_menu: bm,
            })
            .collect();

        let patients = self
            .patients_by_bed
            .remove(&b.id)
            .unwrap_or_default()
            .into_iter()
            .map(|p| {
                let statuses = self.statuses_by_patient.remove(&p.id).unwrap_or_default();
                OverviewPatient {
                    id: p.id,
                    name: p.name,
                    age: p.age,
                    diagnosis: p.diagnosis,
                    current_status: pick_current_status(&statuses).map(CurrentStatus::from),
                }
            })
            .collect();

        OverviewBed {
            id: b.id,
            name: b.name,
            status: b.status,
            room_id: b.room_id,
            bed_menus,
            patients,
        }
    }
}
