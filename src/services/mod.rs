//! Business rules for each ward resource. Functions take any
//! `ConnectionTrait` so they run the same on the pool or inside a transaction.

pub mod bed_menu;
pub mod beds;
pub mod categories;
pub mod inventory;
pub mod menus;
pub mod patients;
pub mod rooms;
pub mod users;
pub mod ward_view;

use serde::{Deserialize, Deserializer};

use crate::error::{ApiError, ApiResult};

pub(crate) fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// Distinguishes a missing field (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn required_text(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
