use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Extension, Router,
};
use sea_orm::DatabaseConnection;

use crate::services::inventory::Inventory;

pub mod bed_menu;
pub mod beds;
pub mod catalog;
pub mod menus;
pub mod patients;
pub mod rooms;
pub mod users;

/// Fills the request span fields that every mutating handler reports.
pub(crate) fn record_event(table: &str, action: &str, business_event: &str) {
    tracing::Span::current()
        .record("table", table)
        .record("action", action)
        .record("business_event", business_event);
}

async fn health_check() -> &'static str {
    "OK"
}

/// All ward routes without shared state attached.
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route("/rooms/overview", get(rooms::rooms_overview))
        .route("/rooms/filters", get(rooms::filter_rooms))
        .route(
            "/rooms/:id",
            get(rooms::get_room)
                .patch(rooms::update_room)
                .delete(rooms::delete_room),
        )
        .route("/beds", get(beds::list_beds).post(beds::create_bed))
        .route(
            "/beds/:id",
            get(beds::get_bed)
                .patch(beds::update_bed)
                .delete(beds::delete_bed),
        )
        .route(
            "/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/patients/:id",
            get(patients::get_patient)
                .patch(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route("/patients/:id/assign-bed", patch(patients::assign_bed))
        .route("/patients/:id/add-status", post(patients::add_status))
        .route("/bed-menu", get(bed_menu::list_bed_menus))
        .route("/bed-menu/assign", post(bed_menu::assign_menu))
        .route("/bed-menu/consume", post(bed_menu::consume_menu))
        .route("/bed-menu/:id/consume", patch(bed_menu::mark_consumed))
        .route("/menu", get(menus::list_menus).post(menus::create_menu))
        .route("/menu/:id", get(menus::get_menu))
        .route("/menu/:id/changeStatus", patch(menus::change_status))
        .route(
            "/menu-types",
            get(menus::list_menu_types).post(menus::create_menu_type),
        )
        .route(
            "/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/:id", get(users::get_user))
}

/// Routes with the database pool and stock keeper attached.
pub fn app(db: DatabaseConnection, inventory: Arc<dyn Inventory>) -> Router {
    routes().layer(Extension(db)).layer(Extension(inventory))
}
