pub mod bed;
pub mod bed_menu;
pub mod category;
pub mod menu;
pub mod menu_product;
pub mod menu_type;
pub mod patient;
pub mod patient_status;
pub mod product;
pub mod room;
pub mod sea_orm_active_enums;
pub mod stock_movement;
pub mod user;

pub use bed::Entity as Bed;
pub use bed_menu::Entity as BedMenu;
pub use category::Entity as Category;
pub use menu::Entity as Menu;
pub use menu_product::Entity as MenuProduct;
pub use menu_type::Entity as MenuType;
pub use patient::Entity as Patient;
pub use patient_status::Entity as PatientStatus;
pub use product::Entity as Product;
pub use room::Entity as Room;
pub use stock_movement::Entity as StockMovement;
pub use user::Entity as User;

pub mod prelude;
