use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use super::record_event;
use crate::error::ApiResult;
use crate::metrics;
use crate::services::patients::{
    self, AddStatusRequest, AssignBedRequest, CreatePatientRequest, UpdatePatientRequest,
};

pub async fn create_patient(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreatePatientRequest>,
) -> ApiResult<impl IntoResponse> {
    let patient = patients::create(&db, payload).await?;

    record_event("patients", "create_patient", "Patient admitted");
    tracing::Span::current().record("patient_id", patient.id);
    metrics::refresh_ward_gauges(&db).await;

    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn list_patients(
    Extension(db): Extension<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(patients::find_all(&db).await?))
}

pub async fn get_patient(
    Extension(db): Extension<DatabaseConnection>,
    Path(patient_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(patients::find_one(&db, patient_id).await?))
}

pub async fn update_patient(
    Extension(db): Extension<DatabaseConnection>,
    Path(patient_id): Path<i32>,
    Json(payload): Json<UpdatePatientRequest>,
) -> ApiResult<impl IntoResponse> {
    let patient = patients::update(&db, patient_id, payload).await?;
    record_event("patients", "update_patient", "Patient updated");
    tracing::Span::current().record("patient_id", patient_id);
    Ok(Json(patient))
}

pub async fn delete_patient(
    Extension(db): Extension<DatabaseConnection>,
    Path(patient_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    patients::remove(&db, patient_id).await?;

    record_event("patients", "delete_patient", "Patient deleted");
    tracing::Span::current().record("patient_id", patient_id);
    metrics::refresh_ward_gauges(&db).await;

    Ok(Json(json!({ "deleted": true })))
}

pub async fn assign_bed(
    Extension(db): Extension<DatabaseConnection>,
    Path(patient_id): Path<i32>,
    Json(payload): Json<AssignBedRequest>,
) -> ApiResult<impl IntoResponse> {
    let patient = patients::assign_bed(&db, patient_id, payload).await?;

    record_event("patients", "assign_bed", "Patient bed assignment changed");
    let span = tracing::Span::current();
    span.record("patient_id", patient_id);
    if let Some(bed_id) = patient.bed_id {
        span.record("bed_id", bed_id);
    }

    Ok(Json(patient))
}

pub async fn add_status(
    Extension(db): Extension<DatabaseConnection>,
    Path(patient_id): Path<i32>,
    Json(payload): Json<AddStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_id = payload.user_id;
    let added = patients::add_status(&db, patient_id, payload).await?;

    record_event("patient_statuses", "add_status", "Patient status recorded");
    tracing::Span::current()
        .record("patient_id", patient_id)
        .record("user_id", user_id);
    metrics::status_added(&added.status.status_type);
    if added.review_changed {
        tracing::info!(
            patient_id,
            needs_review = added.needs_review,
            "patient review flag changed"
        );
        if added.needs_review {
            metrics::review_flag_raised();
        }
        metrics::refresh_ward_gauges(&db).await;
    }

    Ok((StatusCode::CREATED, Json(added)))
}
