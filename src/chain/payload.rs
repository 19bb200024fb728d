//! Canonical projection of an emission sent to the chain service.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::emissions::EmissionRecord;

const SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const MICROS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// ISO-8601 `YYYY-MM-DDTHH:MM:SS[.ffffff]`. The fraction is always six
/// digits and only present when the microsecond part is non-zero;
/// sub-microsecond precision is dropped.
fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() / 1_000 == 0 {
        ts.format(SECONDS_FORMAT).to_string()
    } else {
        ts.format(MICROS_FORMAT).to_string()
    }
}

/// The record anchored on chain. Field order is fixed, and `timestamp`
/// serializes as `null` rather than being omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainPayload {
    pub emission_id: i64,
    pub product_id: i64,
    pub organization_id: i64,
    pub stage_id: i64,
    pub factor_id: i64,
    pub tag_id: Option<i64>,
    pub quantity: f64,
    pub created_by: i64,
    pub sort_order: i64,
    pub product_name: String,
    pub timestamp: Option<String>,
}

impl ChainPayload {
    pub fn from_emission(em: &EmissionRecord) -> Self {
        Self {
            emission_id: em.id,
            product_id: em.product_id,
            organization_id: em.organization_id,
            stage_id: em.stage_id,
            factor_id: em.factor_id,
            tag_id: em.tag_id,
            quantity: em.quantity,
            created_by: em.created_by,
            sort_order: em.sort_order,
            product_name: em.product_name.clone(),
            timestamp: em.created_at.as_ref().map(format_timestamp),
        }
    }
}
