//! Lenient parsing of block record lists
//!
//! Hosts return records with either namespaced (`:block/uid`) or bare
//! (`uid`) attribute names, and ancestor chains under `:block/parents`,
//! `parents` or `ancestors`. Each record is parsed on its own; a malformed
//! one is logged and skipped without affecting the rest.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{BlockportError, Result};
use crate::model::{is_blank, AncestorEntry, BlockRecord, Order};

#[derive(Deserialize)]
struct RawAncestor {
    #[serde(alias = ":block/uid", alias = "id")]
    uid: String,
    #[serde(default, alias = ":block/string", alias = "content", alias = "title")]
    string: Option<String>,
    #[serde(default, alias = ":block/order")]
    order: Option<Order>,
}

#[derive(Deserialize)]
struct RawRecord {
    #[serde(alias = ":block/uid", alias = "id")]
    uid: String,
    #[serde(default, alias = ":block/string", alias = "content")]
    string: Option<String>,
    #[serde(default, alias = ":block/order")]
    order: Option<Order>,
    #[serde(default, alias = ":block/parents", alias = "ancestors")]
    parents: Vec<RawAncestor>,
}

impl From<RawRecord> for BlockRecord {
    fn from(raw: RawRecord) -> Self {
        BlockRecord {
            id: raw.uid,
            content: raw.string.unwrap_or_default(),
            order: raw.order.unwrap_or(0),
            ancestors: raw
                .parents
                .into_iter()
                .map(|a| AncestorEntry {
                    id: a.uid,
                    content: a.string.unwrap_or_default(),
                    order: a.order.unwrap_or(0),
                })
                .collect(),
        }
    }
}

/// Records parsed from a JSON value, and how many were skipped
#[derive(Debug, Default)]
pub struct ParsedRecords {
    pub records: Vec<BlockRecord>,
    pub skipped: usize,
}

/// Parse a JSON array of records, or an object holding one under `records`.
///
/// Query results that wrap each record in a one-element array are unwrapped.
pub fn parse_records(value: &Value) -> Result<ParsedRecords> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("records") {
            Some(Value::Array(items)) => items,
            _ => crate::bail_invalid!("records", "expected a `records` array"),
        },
        _ => crate::bail_invalid!("records", "expected a JSON array"),
    };

    let mut parsed = ParsedRecords::default();
    for (index, item) in items.iter().enumerate() {
        let item = match item {
            Value::Array(row) if row.len() == 1 => &row[0],
            other => other,
        };

        match serde_json::from_value::<RawRecord>(item.clone()) {
            Ok(raw) if !is_blank(&raw.uid) => parsed.records.push(raw.into()),
            Ok(_) => {
                warn!(index, "skipping record with blank id");
                parsed.skipped += 1;
            }
            Err(e) => {
                warn!(index, error = %e, "skipping malformed record");
                parsed.skipped += 1;
            }
        }
    }

    debug!(
        records = parsed.records.len(),
        skipped = parsed.skipped,
        "parsed records"
    );
    Ok(parsed)
}

/// Read and parse a records file
pub fn load_records(path: &Path) -> Result<ParsedRecords> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| BlockportError::io_operation("read records", path.display(), e))?;
    let value: Value = serde_json::from_str(&content)?;
    parse_records(&value)
}
