#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait};
use sea_orm_migration::MigratorTrait;
use ward_server::entities::{bed, bed_menu, menu, prelude::*, product, room, user};
use ward_server::migrator::Migrator;
use ward_server::services::menus::{CreateMenuRequest, CreateMenuTypeRequest, MenuLineRequest};
use ward_server::services::{bed_menu as bed_menu_service, beds, inventory, menus, rooms, users};

/// Fresh in-memory database with the full schema. A single pooled connection
/// keeps every query on the same SQLite database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("in-memory sqlite should connect");
    Migrator::up(&db, None)
        .await
        .expect("migrations should apply to sqlite");
    db
}

pub async fn seed_room(db: &DatabaseConnection, name: &str) -> room::Model {
    rooms::create(
        db,
        rooms::CreateRoomRequest {
            name: name.to_string(),
            floor: Some(1),
            status: None,
        },
    )
    .await
    .expect("room should be created")
}

pub async fn seed_bed(db: &DatabaseConnection, room_id: i32, name: &str) -> bed::Model {
    beds::create(
        db,
        beds::CreateBedRequest {
            name: name.to_string(),
            room_id,
            status: None,
        },
    )
    .await
    .expect("bed should be created")
}

pub async fn seed_user(db: &DatabaseConnection, email: &str) -> user::Model {
    users::create(
        db,
        users::CreateUserRequest {
            name: "Nurse Joy".to_string(),
            email: email.to_string(),
        },
    )
    .await
    .expect("user should be created")
}

pub async fn seed_product(db: &DatabaseConnection, name: &str, stock: f64) -> product::Model {
    inventory::create_product(
        db,
        inventory::CreateProductRequest {
            name: name.to_string(),
            unit: "kg".to_string(),
            stock: Some(stock),
            category_id: None,
        },
    )
    .await
    .expect("product should be created")
}

/// Creates a menu (and a menu type for it) with the given `(product_id, quantity)` lines.
pub async fn seed_menu(db: &DatabaseConnection, name: &str, lines: &[(i32, f64)]) -> menu::Model {
    let menu_type = match MenuType::find().one(db).await.expect("menu type lookup") {
        Some(existing) => existing,
        None => menus::create_type(
            db,
            CreateMenuTypeRequest {
                name: "Almuerzo".to_string(),
            },
        )
        .await
        .expect("menu type should be created"),
    };

    let detail = menus::create(
        db,
        CreateMenuRequest {
            name: name.to_string(),
            description: String::new(),
            quantity: 10,
            menu_type_id: menu_type.id,
            products: lines
                .iter()
                .map(|&(product_id, quantity)| MenuLineRequest {
                    product_id,
                    quantity,
                })
                .collect(),
        },
    )
    .await
    .expect("menu should be created");
    detail.menu
}

pub async fn seed_assignment(db: &DatabaseConnection, bed_id: i32, menu_id: i32) -> bed_menu::Model {
    bed_menu_service::assign(
        db,
        bed_menu_service::AssignMenuRequest {
            bed_id,
            menu_id,
            quantity: None,
        },
    )
    .await
    .expect("menu should be assigned")
}

pub async fn stock_of(db: &DatabaseConnection, product_id: i32) -> f64 {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .expect("product lookup")
        .expect("product exists")
        .stock
}

pub async fn reload_assignment(db: &DatabaseConnection, id: i32) -> bed_menu::Model {
    BedMenu::find_by_id(id)
        .one(db)
        .await
        .expect("assignment lookup")
        .expect("assignment exists")
}

/// Sends one request through the router and decodes the body as JSON,
/// falling back to a JSON string for plain-text responses.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}
