//! Emission records as read from the emissions tables.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One emission line-item, denormalized with its product.
///
/// Owned by the emissions CRUD side of the backend; the bridge only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub id: i64,
    pub product_id: i64,
    pub organization_id: i64,
    pub type_id: Option<i64>,
    pub stage_id: i64,
    pub factor_id: i64,
    pub tag_id: Option<i64>,
    pub quantity: f64,
    pub created_by: i64,
    pub sort_order: i64,
    pub product_name: String,
    pub created_at: Option<NaiveDateTime>,
}
