mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde_json::json;
use ward_server::api;
use ward_server::metrics::WardCounts;
use ward_server::services::inventory::ProductInventory;

use common::*;

fn gauge(handle: &PrometheusHandle, name: &str) -> f64 {
    handle
        .render()
        .lines()
        .find_map(|line| line.strip_prefix(name)?.strip_prefix(' ')?.trim().parse().ok())
        .unwrap_or_else(|| panic!("{name} was never published"))
}

// The only test in this binary: it owns the global recorder.
#[tokio::test]
async fn gauges_follow_cascading_deletes_and_status_changes() {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("recorder installs once per test binary");
    let db = setup_db().await;
    let nurse = seed_user(&db, "nurse@ward.test").await;
    let app = api::app(db.clone(), Arc::new(ProductInventory));

    let (_, room) = send(&app, Method::POST, "/rooms", Some(json!({ "name": "Guardia" }))).await;
    let room_id = room["id"].as_i64().unwrap();
    let (_, first) = send(&app, Method::POST, "/beds", Some(json!({ "name": "A", "roomId": room_id }))).await;
    send(&app, Method::POST, "/beds", Some(json!({ "name": "B", "roomId": room_id, "status": "ocupada" }))).await;
    assert_eq!(gauge(&handle, "ward_rooms_total"), 1.0);
    assert_eq!(gauge(&handle, "ward_beds_total"), 2.0);
    assert_eq!(gauge(&handle, "ward_beds_occupied"), 1.0);

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/beds/{}", first["id"]),
        Some(json!({ "status": "occupied" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gauge(&handle, "ward_beds_occupied"), 2.0);

    let (_, patient) = send(&app, Method::POST, "/patients", Some(json!({ "name": "Lucia" }))).await;
    let patient_id = patient["id"].as_i64().unwrap();
    send(
        &app,
        Method::POST,
        &format!("/patients/{patient_id}/add-status"),
        Some(json!({ "statusType": "internado", "dietType": "blanda", "userId": nurse.id })),
    )
    .await;
    assert_eq!(gauge(&handle, "ward_patients_total"), 1.0);
    assert_eq!(gauge(&handle, "ward_patients_needing_review"), 1.0);

    let (status, _) = send(&app, Method::DELETE, &format!("/patients/{patient_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gauge(&handle, "ward_patients_total"), 0.0);
    assert_eq!(gauge(&handle, "ward_patients_needing_review"), 0.0);

    let (status, _) = send(&app, Method::DELETE, &format!("/rooms/{room_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gauge(&handle, "ward_rooms_total"), 0.0);
    assert_eq!(gauge(&handle, "ward_beds_total"), 0.0);
    assert_eq!(gauge(&handle, "ward_beds_occupied"), 0.0);

    assert_eq!(WardCounts::load(&db).await.unwrap(), WardCounts::default());
}
