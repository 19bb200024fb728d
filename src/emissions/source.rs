//! Read access to emissions owned by the CRUD subsystem.

use rusqlite::{params, OptionalExtension, Row};

use crate::emissions::types::EmissionRecord;
use crate::ledger::types::StoreResult;
use crate::storage::{self, SharedConnection};

/// Lookup of a single emission by identifier.
pub trait EmissionSource: Send + Sync {
    /// Fetch the emission joined with its product, or `None` if unknown.
    fn fetch_emission(&self, emission_id: i64) -> StoreResult<Option<EmissionRecord>>;
}

/// [`EmissionSource`] over the `emissions` and `products` tables.
#[derive(Debug, Clone)]
pub struct SqliteEmissionSource {
    conn: SharedConnection,
}

impl SqliteEmissionSource {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<EmissionRecord> {
        Ok(EmissionRecord {
            id: row.get("id")?,
            product_id: row.get("product_id")?,
            stage_id: row.get("stage_id")?,
            factor_id: row.get("factor_id")?,
            tag_id: row.get("tag_id")?,
            quantity: row.get("quantity")?,
            created_by: row.get("created_by")?,
            sort_order: row.get("sort_order")?,
            created_at: row.get("created_at")?,
            organization_id: row.get("organization_id")?,
            type_id: row.get("type_id")?,
            product_name: row.get("product_name")?,
        })
    }
}

impl EmissionSource for SqliteEmissionSource {
    fn fetch_emission(&self, emission_id: i64) -> StoreResult<Option<EmissionRecord>> {
        let conn = storage::lock(&self.conn)?;
        let record = conn
            .query_row(
                "SELECT
                     e.id,
                     e.product_id,
                     e.stage_id,
                     e.factor_id,
                     e.tag_id,
                     e.quantity,
                     e.created_by,
                     e.sort_order,
                     e.created_at,
                     p.organization_id,
                     p.type_id,
                     p.name AS product_name
                 FROM emissions e
                 JOIN products p ON p.id = e.product_id
                 WHERE e.id = ?1
                 LIMIT 1",
                params![emission_id],
                Self::map_row,
            )
            .optional()?;
        Ok(record)
    }
}
