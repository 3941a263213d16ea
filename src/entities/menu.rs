use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "menus")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub quantity: i32,
    pub active: bool,
    pub menu_type_id: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::menu_type::Entity",
        from = "Column::MenuTypeId",
        to = "super::menu_type::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    MenuType,
    #[sea_orm(has_many = "super::menu_product::Entity")]
    MenuProduct,
    #[sea_orm(has_many = "super::bed_menu::Entity")]
    BedMenu,
}

impl Related<super::menu_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuType.def()
    }
}

impl Related<super::menu_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuProduct.def()
    }
}

impl Related<super::bed_menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BedMenu.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
