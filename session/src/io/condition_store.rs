//! Persistence collaborator for registered conditions.
//!
//! [`JsonConditionStore`] keeps one row per condition identifier in every
//! table named by a [`RegistrationRequest`], and persists to a JSON file
//! (`.session/conditions.json`).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::core::conditions::{ConditionSpec, RegistrationRequest};

/// Bytes of the SHA-256 digest kept in an identifier (24 hex chars).
const HASH_BYTES: usize = 12;

/// Turns registration requests into stable condition identifiers.
pub trait ConditionStore {
    /// Register every condition and return their identifiers, in order.
    ///
    /// Registering the same condition twice yields the same identifier.
    fn register(&mut self, request: RegistrationRequest) -> Result<Vec<String>>;
}

/// Stable identifier for an enriched condition.
///
/// Hashes the key-sorted JSON encoding, so field order does not matter.
pub fn condition_hash(condition: &ConditionSpec) -> Result<String> {
    let canonical = serde_json::to_vec(condition).context("serialize condition")?;
    let digest = Sha256::digest(&canonical);
    Ok(hex::encode(&digest[..HASH_BYTES]))
}

/// JSON-file condition store.
///
/// Tables are keyed as `schema.table`; rows within a table are keyed by
/// identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JsonConditionStore {
    tables: BTreeMap<String, BTreeMap<String, ConditionSpec>>,
}

impl JsonConditionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows stored in `schema.table`, keyed by identifier.
    pub fn rows(&self, schema: &str, table: &str) -> Option<&BTreeMap<String, ConditionSpec>> {
        self.tables.get(&table_key(schema, table))
    }
}

impl ConditionStore for JsonConditionStore {
    fn register(&mut self, request: RegistrationRequest) -> Result<Vec<String>> {
        let mut ids = Vec::with_capacity(request.conditions.len());
        for condition in request.conditions {
            let id = condition_hash(&condition)?;
            let mut row = condition;
            row.insert(request.hash_field.clone(), Value::String(id.clone()));

            for (position, table) in request.condition_tables.iter().enumerate() {
                let rows = self
                    .tables
                    .entry(table_key(&request.schema, table))
                    .or_default();
                if rows.contains_key(&id) {
                    continue;
                }
                // The root table only carries the identifier.
                let stored = if position == 0 {
                    let mut root = ConditionSpec::new();
                    root.insert(request.hash_field.clone(), Value::String(id.clone()));
                    root
                } else {
                    row.clone()
                };
                rows.insert(id.clone(), stored);
            }
            ids.push(id);
        }
        debug!(count = ids.len(), schema = %request.schema, "registered conditions");
        Ok(ids)
    }
}

fn table_key(schema: &str, table: &str) -> String {
    format!("{schema}.{table}")
}

/// Load a condition store from disk.
///
/// If the file is missing, returns an empty store.
pub fn load_store(path: &Path) -> Result<JsonConditionStore> {
    if !path.exists() {
        return Ok(JsonConditionStore::default());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read condition store {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parse condition store {}", path.display()))
}

/// Atomically write a condition store to disk (temp file + rename).
pub fn write_store(path: &Path, store: &JsonConditionStore) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(store)?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}
