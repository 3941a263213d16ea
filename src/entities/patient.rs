use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "patients")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub document_number: Option<String>,
    pub age: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub diagnosis: Option<String>,
    pub active: bool,
    pub needs_review: bool,
    pub bed_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bed::Entity",
        from = "Column::BedId",
        to = "super::bed::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Bed,
    #[sea_orm(has_many = "super::patient_status::Entity")]
    PatientStatus,
}

impl Related<super::bed::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bed.def()
    }
}

impl Related<super::patient_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PatientStatus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
