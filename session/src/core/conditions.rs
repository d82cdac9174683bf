//! Condition registry: validates and enriches condition specifications.
//!
//! The registry does not hash or store anything. It produces a
//! [`RegistrationRequest`] that a persistence collaborator turns into stable
//! identifiers (see `io::condition_store`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Parameter name → value mapping describing one behavioral condition.
pub type ConditionSpec = Map<String, Value>;

/// Root table every behavior condition is registered under.
pub const ROOT_TABLE: &str = "BehCondition";
/// Logical schema the registry writes to.
pub const SCHEMA: &str = "behavior";
/// Field holding the per-condition identifier.
pub const HASH_FIELD: &str = "beh_hash";
/// Field recording which condition table a row belongs to.
pub const BEHAVIOR_CLASS_FIELD: &str = "behavior_class";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("condition {index} is missing required field '{field}'")]
    MissingField { index: usize, field: String },

    #[error("registry has no condition tables")]
    NoConditionTables,
}

/// Batch handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Enriched conditions, in input order.
    pub conditions: Vec<ConditionSpec>,
    /// Root table followed by the subclass tables.
    pub condition_tables: Vec<String>,
    pub schema: String,
    pub hash_field: String,
}

/// Required fields, defaults and subclass tables for a behavior's conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionRegistry {
    required_fields: Vec<String>,
    default_key: ConditionSpec,
    cond_tables: Vec<String>,
}

impl Default for ConditionRegistry {
    fn default() -> Self {
        let default_key = match json!({ "reward_type": "water", "conf_version": 1 }) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            required_fields: vec!["reward_amount".to_string(), "port_id".to_string()],
            default_key,
            cond_tables: vec!["Reward".to_string()],
        }
    }
}

impl ConditionRegistry {
    pub fn new(
        required_fields: Vec<String>,
        default_key: ConditionSpec,
        cond_tables: Vec<String>,
    ) -> Self {
        Self {
            required_fields,
            default_key,
            cond_tables,
        }
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    pub fn default_key(&self) -> &ConditionSpec {
        &self.default_key
    }

    pub fn cond_tables(&self) -> &[String] {
        &self.cond_tables
    }

    /// Consume a batch of conditions and return them enriched.
    ///
    /// Each condition gets the default key underneath its own fields (caller
    /// values win) and `behavior_class` set to the first condition table. The
    /// whole batch is rejected if any condition lacks a required field.
    pub fn make_conditions(
        &self,
        conditions: Vec<ConditionSpec>,
    ) -> Result<RegistrationRequest, ConditionError> {
        let behavior_class = self
            .cond_tables
            .first()
            .ok_or(ConditionError::NoConditionTables)?;

        for (index, cond) in conditions.iter().enumerate() {
            if let Some(field) = self.missing_field(cond) {
                return Err(ConditionError::MissingField {
                    index,
                    field: field.to_string(),
                });
            }
        }

        let conditions: Vec<ConditionSpec> = conditions
            .into_iter()
            .map(|cond| {
                let mut enriched = self.default_key.clone();
                enriched.extend(cond);
                enriched.insert(
                    BEHAVIOR_CLASS_FIELD.to_string(),
                    Value::String(behavior_class.clone()),
                );
                enriched
            })
            .collect();

        tracing::debug!(
            count = conditions.len(),
            behavior_class = %behavior_class,
            "prepared condition registration"
        );

        let mut condition_tables = Vec::with_capacity(self.cond_tables.len() + 1);
        condition_tables.push(ROOT_TABLE.to_string());
        condition_tables.extend(self.cond_tables.iter().cloned());

        Ok(RegistrationRequest {
            conditions,
            condition_tables,
            schema: SCHEMA.to_string(),
            hash_field: HASH_FIELD.to_string(),
        })
    }

    fn missing_field(&self, cond: &ConditionSpec) -> Option<&str> {
        self.required_fields
            .iter()
            .find(|field| !cond.contains_key(field.as_str()))
            .map(String::as_str)
    }
}

/// Build a condition from a JSON object literal.
///
/// Non-object values produce an empty condition.
pub fn condition(value: Value) -> ConditionSpec {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
