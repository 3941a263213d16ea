mod common;

use ward_server::error::ApiError;
use ward_server::services::categories::{self, CreateCategoryRequest};
use ward_server::services::inventory::{self, CreateProductRequest};
use ward_server::services::users::{self, CreateUserRequest};
use ward_server::services::menus;

use common::*;

fn category(name: &str) -> CreateCategoryRequest {
    CreateCategoryRequest {
        name: name.to_string(),
    }
}

#[tokio::test]
async fn category_names_are_required_and_unique() {
    let db = setup_db().await;
    let dairy = categories::create(&db, category(" Lacteos ")).await.unwrap();
    assert_eq!(dairy.name, "Lacteos");

    let err = categories::create(&db, category("   ")).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = categories::create(&db, category("Lacteos")).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    categories::create(&db, category("Carnes")).await.unwrap();
    let names: Vec<String> = categories::find_all(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Carnes", "Lacteos"]);
}

#[tokio::test]
async fn products_are_listed_with_their_category() {
    let db = setup_db().await;
    let dairy = categories::create(&db, category("Lacteos")).await.unwrap();
    inventory::create_product(
        &db,
        CreateProductRequest {
            name: "Yogur".to_string(),
            unit: "unidad".to_string(),
            stock: Some(12.0),
            category_id: Some(dairy.id),
        },
    )
    .await
    .unwrap();
    seed_product(&db, "Arroz", 5.0).await;

    let products = inventory::find_all_products(&db).await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].product.name, "Arroz");
    assert!(products[0].category.is_none());
    assert_eq!(products[1].product.name, "Yogur");
    assert_eq!(products[1].category.as_ref().map(|c| c.id), Some(dairy.id));

    let err = inventory::create_product(
        &db,
        CreateProductRequest {
            name: "Queso".to_string(),
            unit: "kg".to_string(),
            stock: None,
            category_id: Some(dairy.id + 50),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn user_emails_are_unique_ignoring_case() {
    let db = setup_db().await;
    let nurse = seed_user(&db, "nurse@ward.test").await;

    let err = users::create(
        &db,
        CreateUserRequest {
            name: "Other Nurse".to_string(),
            email: "NURSE@ward.test".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    assert_eq!(users::find_one(&db, nurse.id).await.unwrap().email, "nurse@ward.test");
    let err = users::find_one(&db, nurse.id + 1).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn menu_lookup_includes_lines_or_is_not_found() {
    let db = setup_db().await;
    let rice = seed_product(&db, "Arroz", 5.0).await;
    let menu = seed_menu(&db, "Almuerzo blando", &[(rice.id, 0.25)]).await;

    let detail = menus::find_one(&db, menu.id).await.unwrap();
    assert_eq!(detail.menu.name, "Almuerzo blando");
    assert!(detail.menu_type.is_some());
    assert_eq!(detail.menu_products.len(), 1);
    assert_eq!(detail.menu_products[0].line.product_id, rice.id);
    assert_eq!(
        detail.menu_products[0].product.as_ref().map(|p| p.name.as_str()),
        Some("Arroz")
    );

    let err = menus::find_one(&db, menu.id + 1).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
