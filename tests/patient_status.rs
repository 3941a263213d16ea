mod common;

use sea_orm::{DatabaseConnection, EntityTrait};
use ward_server::entities::prelude::*;
use ward_server::entities::sea_orm_active_enums::DietType;
use ward_server::error::ApiError;
use ward_server::services::patients::{
    self, AddStatusRequest, AssignBedRequest, CreatePatientRequest, UpdatePatientRequest,
    DISCHARGE_STATUS,
};

use common::*;

async fn admit(db: &DatabaseConnection, bed_id: Option<i32>) -> i32 {
    patients::create(
        db,
        CreatePatientRequest {
            name: "Carlos".to_string(),
            document_number: None,
            age: Some(71),
            diagnosis: Some("Neumonia".to_string()),
            bed_id,
        },
    )
    .await
    .expect("patient should be admitted")
    .id
}

fn status(status_type: &str, diet_type: Option<DietType>, user_id: i32) -> AddStatusRequest {
    AddStatusRequest {
        status_type: status_type.to_string(),
        diet_type,
        user_id,
        description: None,
    }
}

async fn needs_review(db: &DatabaseConnection, patient_id: i32) -> bool {
    Patient::find_by_id(patient_id)
        .one(db)
        .await
        .unwrap()
        .expect("patient exists")
        .needs_review
}

#[tokio::test]
async fn review_flag_follows_status_history() {
    let db = setup_db().await;
    let nurse = seed_user(&db, "nurse@ward.test").await;
    let patient_id = admit(&db, None).await;
    assert!(!needs_review(&db, patient_id).await);

    let first = patients::add_status(&db, patient_id, status("internado", Some(DietType::Liquida), nurse.id))
        .await
        .unwrap();
    assert!(first.needs_review);
    assert!(first.review_changed);
    assert!(needs_review(&db, patient_id).await);

    let repeat = patients::add_status(&db, patient_id, status("internado", Some(DietType::Liquida), nurse.id))
        .await
        .unwrap();
    assert!(repeat.needs_review);
    assert!(!repeat.review_changed);

    let diet_change = patients::add_status(&db, patient_id, status("internado", Some(DietType::Blanda), nurse.id))
        .await
        .unwrap();
    assert!(diet_change.needs_review);

    let discharge = patients::add_status(&db, patient_id, status(DISCHARGE_STATUS, None, nurse.id))
        .await
        .unwrap();
    assert!(!discharge.needs_review);
    assert!(discharge.review_changed);
    assert!(!needs_review(&db, patient_id).await);

    let detail = patients::find_one(&db, patient_id).await.unwrap();
    assert_eq!(detail.statuses.len(), 4);
    assert_eq!(detail.statuses[3].status.status_type, DISCHARGE_STATUS);
    assert_eq!(
        detail.statuses[0].author.as_ref().map(|u| u.id),
        Some(nurse.id)
    );
}

#[tokio::test]
async fn unchanged_status_keeps_a_cleared_flag() {
    let db = setup_db().await;
    let nurse = seed_user(&db, "nurse@ward.test").await;
    let patient_id = admit(&db, None).await;

    patients::add_status(&db, patient_id, status("estable", Some(DietType::Solida), nurse.id))
        .await
        .unwrap();
    patients::add_status(&db, patient_id, status(DISCHARGE_STATUS, None, nurse.id))
        .await
        .unwrap();
    assert!(!needs_review(&db, patient_id).await);

    // A repeated discharge keeps the flag clear
    patients::add_status(&db, patient_id, status(DISCHARGE_STATUS, None, nurse.id))
        .await
        .unwrap();
    assert!(!needs_review(&db, patient_id).await);
}

#[tokio::test]
async fn status_for_unknown_user_is_not_recorded() {
    let db = setup_db().await;
    let patient_id = admit(&db, None).await;

    let err = patients::add_status(&db, patient_id, status("internado", None, 999))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert!(PatientStatus::find().all(&db).await.unwrap().is_empty());
    assert!(!needs_review(&db, patient_id).await);

    let err = patients::add_status(&db, 12345, status("internado", None, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn blank_status_type_is_rejected() {
    let db = setup_db().await;
    let nurse = seed_user(&db, "nurse@ward.test").await;
    let patient_id = admit(&db, None).await;

    let err = patients::add_status(&db, patient_id, status("  ", None, nurse.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn bed_assignment_can_be_moved_and_cleared() {
    let db = setup_db().await;
    let room = seed_room(&db, "301").await;
    let bed_a = seed_bed(&db, room.id, "A").await;
    let bed_b = seed_bed(&db, room.id, "B").await;
    let patient_id = admit(&db, Some(bed_a.id)).await;

    let moved = patients::assign_bed(
        &db,
        patient_id,
        AssignBedRequest {
            bed_id: Some(Some(bed_b.id)),
        },
    )
    .await
    .unwrap();
    assert_eq!(moved.bed_id, Some(bed_b.id));

    let untouched = patients::assign_bed(&db, patient_id, AssignBedRequest::default())
        .await
        .unwrap();
    assert_eq!(untouched.bed_id, Some(bed_b.id));

    let cleared = patients::assign_bed(&db, patient_id, AssignBedRequest { bed_id: Some(None) })
        .await
        .unwrap();
    assert_eq!(cleared.bed_id, None);

    let err = patients::assign_bed(
        &db,
        patient_id,
        AssignBedRequest {
            bed_id: Some(Some(404)),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn deleting_a_bed_frees_its_patients() {
    let db = setup_db().await;
    let room = seed_room(&db, "302").await;
    let bed = seed_bed(&db, room.id, "A").await;
    let patient_id = admit(&db, Some(bed.id)).await;

    ward_server::services::beds::remove(&db, bed.id).await.unwrap();

    let detail = patients::find_one(&db, patient_id).await.unwrap();
    assert_eq!(detail.patient.bed_id, None);
    assert!(detail.bed.is_none());
}

#[tokio::test]
async fn update_moves_and_frees_the_bed() {
    let db = setup_db().await;
    let room = seed_room(&db, "303").await;
    let bed_a = seed_bed(&db, room.id, "A").await;
    let bed_b = seed_bed(&db, room.id, "B").await;
    let patient_id = admit(&db, Some(bed_a.id)).await;

    let moved = patients::update(
        &db,
        patient_id,
        UpdatePatientRequest {
            bed_id: Some(Some(bed_b.id)),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(moved.bed_id, Some(bed_b.id));

    // Without a bedId key the assignment stays
    let renamed = patients::update(
        &db,
        patient_id,
        serde_json::from_str(r#"{"name":"Carlos M."}"#).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(renamed.name, "Carlos M.");
    assert_eq!(renamed.bed_id, Some(bed_b.id));

    let freed = patients::update(&db, patient_id, serde_json::from_str(r#"{"bedId":null}"#).unwrap())
        .await
        .unwrap();
    assert_eq!(freed.bed_id, None);

    let err = patients::update(
        &db,
        patient_id,
        UpdatePatientRequest {
            bed_id: Some(Some(404)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn update_clears_nullable_fields_on_null() {
    let db = setup_db().await;
    let patient_id = admit(&db, None).await;
    patients::update(
        &db,
        patient_id,
        serde_json::from_str(r#"{"documentNumber":"28999111"}"#).unwrap(),
    )
    .await
    .unwrap();

    let cleared = patients::update(
        &db,
        patient_id,
        serde_json::from_str(r#"{"age":null,"diagnosis":null,"documentNumber":null}"#).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(cleared.age, None);
    assert_eq!(cleared.diagnosis, None);
    assert_eq!(cleared.document_number, None);

    let err = patients::update(&db, patient_id, serde_json::from_str(r#"{"age":-3}"#).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}
