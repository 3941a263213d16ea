pub use super::bed::Entity as Bed;
pub use super::bed_menu::Entity as BedMenu;
pub use super::category::Entity as Category;
pub use super::menu::Entity as Menu;
pub use super::menu_product::Entity as MenuProduct;
pub use super::menu_type::Entity as MenuType;
pub use super::patient::Entity as Patient;
pub use super::patient_status::Entity as PatientStatus;
pub use super::product::Entity as Product;
pub use super::room::Entity as Room;
pub use super::stock_movement::Entity as StockMovement;
pub use super::user::Entity as User;
