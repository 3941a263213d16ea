mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use ward_server::api;
use ward_server::services::inventory::ProductInventory;

use common::*;

#[tokio::test]
async fn health_check_responds() {
    let app = api::app(setup_db().await, Arc::new(ProductInventory));
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));
}

#[tokio::test]
async fn rooms_round_trip_over_http() {
    let app = api::app(setup_db().await, Arc::new(ProductInventory));

    let (status, room) = send(
        &app,
        Method::POST,
        "/rooms",
        Some(json!({ "name": "Guardia", "floor": 2, "status": "activa" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(room["name"], "Guardia");
    assert_eq!(room["status"], "active");
    let room_id = room["id"].as_i64().unwrap();

    let (status, bed) = send(
        &app,
        Method::POST,
        "/beds",
        Some(json!({ "name": "G-1", "roomId": room_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bed["status"], "available");

    let (status, duplicate) = send(
        &app,
        Method::POST,
        "/beds",
        Some(json!({ "name": "G-1", "roomId": room_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(duplicate["statusCode"], 409);

    let (status, rooms) = send(&app, Method::GET, "/rooms", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms[0]["beds"][0]["name"], "G-1");
    assert_eq!(rooms[0]["beds"][0]["currentBedMenu"], Value::Null);

    let (status, filtered) = send(&app, Method::GET, "/rooms/filters?bedStatus=occupied", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered, json!([]));

    let (status, deleted) = send(&app, Method::DELETE, &format!("/rooms/{room_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({ "deleted": true }));
}

#[tokio::test]
async fn missing_room_has_a_json_error_body() {
    let app = api::app(setup_db().await, Arc::new(ProductInventory));
    let (status, body) = send(&app, Method::GET, "/rooms/999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["message"], "Room 999 not found");
}

#[tokio::test]
async fn consume_endpoint_serves_once() {
    let db = setup_db().await;
    let room = seed_room(&db, "Pediatria").await;
    let bed = seed_bed(&db, room.id, "P-1").await;
    let nurse = seed_user(&db, "nurse@ward.test").await;
    let milk = seed_product(&db, "Milk", 2.0).await;
    let menu = seed_menu(&db, "Merienda", &[(milk.id, 0.5)]).await;
    let app = api::app(db.clone(), Arc::new(ProductInventory));

    let (status, assignment) = send(
        &app,
        Method::POST,
        "/bed-menu/assign",
        Some(json!({ "bedId": bed.id, "menuId": menu.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(assignment["consumed"], false);
    assert_eq!(assignment["quantity"], 1);

    let payload = json!({
        "bedMenuId": assignment["id"],
        "bedId": bed.id,
        "quantity": 1,
        "userId": nurse.id,
    });
    let (status, served) = send(&app, Method::POST, "/bed-menu/consume", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served["success"], true);
    assert_eq!(served["message"], "Stock consumed");
    assert_eq!(served["consumptionRecord"].as_array().map(Vec::len), Some(1));

    let (status, again) = send(&app, Method::POST, "/bed-menu/consume", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(again["message"], "This menu has already been served for this bed");

    assert_eq!(stock_of(&db, milk.id).await, 1.5);
}

#[tokio::test]
async fn add_status_reports_review_flag() {
    let db = setup_db().await;
    let nurse = seed_user(&db, "nurse@ward.test").await;
    let app = api::app(db, Arc::new(ProductInventory));

    let (status, patient) = send(&app, Method::POST, "/patients", Some(json!({ "name": "Lucia" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(patient["needsReview"], false);
    let patient_id = patient["id"].as_i64().unwrap();

    let (status, added) = send(
        &app,
        Method::POST,
        &format!("/patients/{patient_id}/add-status"),
        Some(json!({ "statusType": "internado", "dietType": "blanda", "userId": nurse.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added["needsReview"], true);
    assert_eq!(added["dietType"], "blanda");
    assert_eq!(added["statusType"], "internado");

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/patients/{patient_id}/add-status"),
        Some(json!({ "statusType": "internado", "dietType": "picante", "userId": nurse.id })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
