use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use super::{double_option, now, required_text};
use crate::entities::sea_orm_active_enums::DietType;
use crate::entities::{bed, patient, patient_status, prelude::*, user};
use crate::error::{ApiError, ApiResult};

/// Status type that discharges a patient.
pub const DISCHARGE_STATUS: &str = "alta";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub name: String,
    pub document_number: Option<String>,
    pub age: Option<i32>,
    pub diagnosis: Option<String>,
    pub bed_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub document_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub age: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub diagnosis: Option<Option<String>>,
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub bed_id: Option<Option<i32>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBedRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub bed_id: Option<Option<i32>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStatusRequest {
    pub status_type: String,
    pub diet_type: Option<DietType>,
    pub user_id: i32,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    #[serde(flatten)]
    pub status: patient_status::Model,
    pub author: Option<user::Model>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: patient::Model,
    pub bed: Option<bed::Model>,
    pub statuses: Vec<StatusEntry>,
}

/// The inserted status plus the patient's review flag after it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusAdded {
    #[serde(flatten)]
    pub status: patient_status::Model,
    pub needs_review: bool,
    #[serde(skip)]
    pub review_changed: bool,
}

/// Review flag after a new status: a discharge clears it, a first status or a
/// change of status or diet raises it, anything else leaves it alone.
pub fn next_needs_review(
    current: bool,
    previous: Option<&patient_status::Model>,
    status_type: &str,
    diet_type: Option<DietType>,
) -> bool {
    if status_type == DISCHARGE_STATUS {
        return false;
    }
    match previous {
        None => true,
        Some(prev) if prev.status_type != status_type || prev.diet_type != diet_type => true,
        Some(_) => current,
    }
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    req: CreatePatientRequest,
) -> ApiResult<patient::Model> {
    let name = required_text("name", &req.name)?;
    validate_age(req.age)?;
    if let Some(bed_id) = req.bed_id {
        ensure_bed_exists(db, bed_id).await?;
    }

    let patient = patient::ActiveModel {
        name: Set(name),
        document_number: Set(req.document_number),
        age: Set(req.age),
        diagnosis: Set(req.diagnosis),
        active: Set(true),
        needs_review: Set(false),
        bed_id: Set(req.bed_id),
        ..Default::default()
    };
    Ok(patient.insert(db).await?)
}

pub async fn find_all<C: ConnectionTrait>(db: &C) -> ApiResult<Vec<PatientDetail>> {
    let patients = Patient::find()
        .order_by_asc(patient::Column::Id)
        .all(db)
        .await?;
    attach_details(db, patients).await
}

pub async fn find_one<C: ConnectionTrait>(db: &C, id: i32) -> ApiResult<PatientDetail> {
    let patient = find_patient(db, id).await?;
    let mut details = attach_details(db, vec![patient]).await?;
    details
        .pop()
        .ok_or_else(|| ApiError::not_found(format!("Patient {id} not found")))
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    req: UpdatePatientRequest,
) -> ApiResult<patient::Model> {
    let patient = find_patient(db, id).await?;
    let mut active = patient.into_active_model();

    if let Some(name) = req.name {
        active.name = Set(required_text("name", &name)?);
    }
    // Nullable columns: `null` clears, a missing key keeps the stored value
    if let Some(document_number) = req.document_number {
        active.document_number = Set(document_number);
    }
    if let Some(age) = req.age {
        validate_age(age)?;
        active.age = Set(age);
    }
    if let Some(diagnosis) = req.diagnosis {
        active.diagnosis = Set(diagnosis);
    }
    if let Some(flag) = req.active {
        active.active = Set(flag);
    }
    if let Some(bed_id) = req.bed_id {
        if let Some(bed_id) = bed_id {
            ensure_bed_exists(db, bed_id).await?;
        }
        active.bed_id = Set(bed_id);
    }

    if !active.is_changed() {
        return find_patient(db, id).await;
    }
    Ok(active.update(db).await?)
}

pub async fn remove<C: ConnectionTrait>(db: &C, id: i32) -> ApiResult<()> {
    let res = Patient::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ApiError::not_found(format!("Patient {id} not found")));
    }
    Ok(())
}

/// `bedId: null` frees the bed, a missing `bedId` leaves the assignment untouched.
pub async fn assign_bed<C: ConnectionTrait>(
    db: &C,
    id: i32,
    req: AssignBedRequest,
) -> ApiResult<patient::Model> {
    let patient = find_patient(db, id).await?;
    let Some(bed_id) = req.bed_id else {
        return Ok(patient);
    };
    if let Some(bed_id) = bed_id {
        ensure_bed_exists(db, bed_id).await?;
    }

    let mut active = patient.into_active_model();
    active.bed_id = Set(bed_id);
    Ok(active.update(db).await?)
}

/// Appends a status and recomputes the review flag in one transaction.
pub async fn add_status<C>(db: &C, patient_id: i32, req: AddStatusRequest) -> ApiResult<StatusAdded>
where
    C: ConnectionTrait + TransactionTrait,
{
    let status_type = required_text("statusType", &req.status_type)?;

    let txn = db.begin().await?;

    let patient = find_patient(&txn, patient_id).await?;
    if User::find_by_id(req.user_id).one(&txn).await?.is_none() {
        return Err(ApiError::not_found(format!("User {} not found", req.user_id)));
    }

    let previous = PatientStatus::find()
        .filter(patient_status::Column::PatientId.eq(patient_id))
        .order_by_desc(patient_status::Column::CreatedAt)
        .order_by_desc(patient_status::Column::Id)
        .one(&txn)
        .await?;

    let status = patient_status::ActiveModel {
        patient_id: Set(patient_id),
        status_type: Set(status_type.clone()),
        diet_type: Set(req.diet_type),
        notes: Set(req.description),
        created_at: Set(now()),
        updated_by: Set(Some(req.user_id)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let current = patient.needs_review;
    let needs_review = next_needs_review(current, previous.as_ref(), &status_type, req.diet_type);
    if needs_review != current {
        let mut active = patient.into_active_model();
        active.needs_review = Set(needs_review);
        active.update(&txn).await?;
    }

    txn.commit().await?;

    Ok(StatusAdded {
        status,
        needs_review,
        review_changed: needs_review != current,
    })
}

async fn find_patient<C: ConnectionTrait>(db: &C, id: i32) -> ApiResult<patient::Model> {
    Patient::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Patient {id} not found")))
}

async fn ensure_bed_exists<C: ConnectionTrait>(db: &C, bed_id: i32) -> ApiResult<()> {
    match Bed::find_by_id(bed_id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found(format!("Bed {bed_id} not found"))),
    }
}

fn validate_age(age: Option<i32>) -> ApiResult<()> {
    match age {
        Some(age) if age < 0 => Err(ApiError::bad_request("age must not be negative")),
        _ => Ok(()),
    }
}

async fn attach_details<C: ConnectionTrait>(
    db: &C,
    patients: Vec<patient::Model>,
) -> ApiResult<Vec<PatientDetail>> {
    if patients.is_empty() {
        return Ok(Vec::new());
    }

    let bed_ids: Vec<i32> = patients.iter().filter_map(|p| p.bed_id).collect();
    let beds: HashMap<i32, bed::Model> = if bed_ids.is_empty() {
        HashMap::new()
    } else {
        Bed::find()
            .filter(bed::Column::Id.is_in(bed_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect()
    };

    let patient_ids: Vec<i32> = patients.iter().map(|p| p.id).collect();
    let statuses = PatientStatus::find()
        .filter(patient_status::Column::PatientId.is_in(patient_ids))
        .order_by_asc(patient_status::Column::CreatedAt)
        .order_by_asc(patient_status::Column::Id)
        .all(db)
        .await?;

    let author_ids: Vec<i32> = statuses.iter().filter_map(|s| s.updated_by).collect();
    let authors: HashMap<i32, user::Model> = if author_ids.is_empty() {
        HashMap::new()
    } else {
        User::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect()
    };

    let mut statuses_by_patient: HashMap<i32, Vec<StatusEntry>> = HashMap::new();
    for status in statuses {
        let author = status.updated_by.and_then(|id| authors.get(&id).cloned());
        statuses_by_patient
            .entry(status.patient_id)
            .or_default()
            .push(StatusEntry { status, author });
    }

    Ok(patients
        .into_iter()
        .map(|patient| PatientDetail {
            bed: patient.bed_id.and_then(|id| beds.get(&id).cloned()),
            statuses: statuses_by_patient.remove(&patient.id).unwrap_or_default(),
            patient,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn previous(status_type: &str, diet_type: Option<DietType>) -> patient_status::Model {
        patient_status::Model {
            id: 1,
            patient_id: 1,
            status_type: status_type.to_string(),
            diet_type,
            notes: None,
            created_at: NaiveDate::from_ymd_opt(2026, 2, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            updated_by: None,
        }
    }

    #[test]
    fn discharge_clears_review() {
        let prev = previous("internacion", None);
        assert!(!next_needs_review(true, Some(&prev), DISCHARGE_STATUS, None));
        assert!(!next_needs_review(true, None, DISCHARGE_STATUS, None));
    }

    #[test]
    fn first_status_raises_review() {
        assert!(next_needs_review(false, None, "internacion", None));
    }

    #[test]
    fn changed_status_or_diet_raises_review() {
        let prev = previous("pre-op", Some(DietType::Liquida));
        assert!(next_needs_review(false, Some(&prev), "post-op", Some(DietType::Liquida)));
        assert!(next_needs_review(false, Some(&prev), "pre-op", Some(DietType::Blanda)));
        assert!(next_needs_review(false, Some(&prev), "pre-op", None));
    }

    #[test]
    fn unchanged_status_keeps_flag() {
        let prev = previous("pre-op", Some(DietType::Solida));
        assert!(!next_needs_review(false, Some(&prev), "pre-op", Some(DietType::Solida)));
        assert!(next_needs_review(true, Some(&prev), "pre-op", Some(DietType::Solida)));
    }
}
