use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Deserialize, Serialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    #[sea_orm(string_value = "active")]
    #[serde(alias = "activa")]
    Active,
    #[sea_orm(string_value = "inactive")]
    #[serde(alias = "inactiva")]
    Inactive,
}

/// Stored in English; the dashboards still send the Spanish labels.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Deserialize, Serialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum BedStatus {
    #[default]
    #[sea_orm(string_value = "available")]
    #[serde(alias = "disponible")]
    Available,
    #[sea_orm(string_value = "occupied")]
    #[serde(alias = "ocupada")]
    Occupied,
    #[sea_orm(string_value = "maintenance")]
    #[serde(alias = "mantenimiento")]
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum DietType {
    #[sea_orm(string_value = "liquida")]
    Liquida,
    #[sea_orm(string_value = "solida")]
    Solida,
    #[sea_orm(string_value = "blanda")]
    Blanda,
    #[sea_orm(string_value = "enteral")]
    Enteral,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bed_status_accepts_spanish_labels() {
        let status: BedStatus = serde_json::from_str("\"mantenimiento\"").unwrap();
        assert_eq!(status, BedStatus::Maintenance);
        let status: BedStatus = serde_json::from_str("\"ocupada\"").unwrap();
        assert_eq!(status, BedStatus::Occupied);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"occupied\"");
    }

    #[test]
    fn room_status_defaults_to_active() {
        assert_eq!(RoomStatus::default(), RoomStatus::Active);
        let status: RoomStatus = serde_json::from_str("\"inactiva\"").unwrap();
        assert_eq!(status, RoomStatus::Inactive);
    }

    #[test]
    fn unknown_diet_is_rejected() {
        assert!(serde_json::from_str::<DietType>("\"keto\"").is_err());
    }
}
