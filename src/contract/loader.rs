use std::path::Path;

use serde::Serialize;
use serde_yaml::Value;

use crate::contract::Scope;
use crate::error::{Error, Result};

/// Validated input contract, loaded from a YAML document.
///
/// The YAML layout mirrors the declarative contract consumed by the
/// serving layer: a `schema` mapping with `features` and `target`, plus
/// optional `id_columns` / `drop_columns`, and optional `name` / `version`
/// headers for traceability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractConfig {
    /// Logical contract name (falls back to the file stem)
    pub name: String,
    /// Contract version (defaults to 1)
    pub version: i64,
    /// Ordered input columns
    pub features: Vec<String>,
    /// Supervised target column
    pub target: String,
    /// Identifier columns, outside the model scope
    pub id_columns: Vec<String>,
    /// Columns declared for removal
    pub drop_columns: Vec<String>,
}

impl ContractConfig {
    /// Converts the contract into the pipeline's column scope.
    pub fn to_scope(&self) -> Result<Scope> {
        Scope::new(self.features.clone(), self.target.clone())
    }
}

/// Loads and validates a contract YAML file.
///
/// Validation is deliberately strict about the essentials and silent about
/// nothing: a missing or malformed required field fails with a message
/// naming the field; lists are deduplicated preserving first-occurrence
/// order; no field is ever repaired or defaulted beyond the documented
/// `name`/`version` fallbacks.
pub fn load_contract_yaml<P: AsRef<Path>>(path: P) -> Result<ContractConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let fallback_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("contract")
        .to_string();
    parse_contract_yaml(&text, &fallback_name)
}

/// Parses a contract from YAML text. `fallback_name` is used when the
/// document declares no `name`.
pub fn parse_contract_yaml(text: &str, fallback_name: &str) -> Result<ContractConfig> {
    let root: Value = serde_yaml::from_str(text)?;
    let root = match &root {
        Value::Null => {
            return Err(Error::Schema("contract YAML is empty".to_string()));
        }
        Value::Mapping(_) => &root,
        _ => {
            return Err(Error::Schema(
                "contract YAML root must be a mapping".to_string(),
            ));
        }
    };

    let name = match root.get("name") {
        None | Some(Value::Null) => fallback_name.to_string(),
        Some(v) => as_str(v, "name")?,
    };
    let version = match root.get("version") {
        None | Some(Value::Null) => 1,
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| Error::Schema("field 'version' must be an integer".to_string()))?,
        Some(_) => {
            return Err(Error::Schema("field 'version' must be an integer".to_string()));
        }
    };

    let schema = root
        .get("schema")
        .ok_or_else(|| Error::Schema("required field missing: 'schema'".to_string()))?;
    if !schema.is_mapping() {
        return Err(Error::Schema("field 'schema' must be a mapping".to_string()));
    }

    let target = as_str(
        schema
            .get("target")
            .ok_or_else(|| Error::Schema("required field missing: 'schema.target'".to_string()))?,
        "schema.target",
    )?;
    let features = as_str_list(
        schema.get("features").ok_or_else(|| {
            Error::Schema("required field missing: 'schema.features'".to_string())
        })?,
        "schema.features",
        false,
    )?;
    let id_columns = match schema.get("id_columns") {
        None | Some(Value::Null) => Vec::new(),
        Some(v) => as_str_list(v, "schema.id_columns", true)?,
    };
    let drop_columns = match schema.get("drop_columns") {
        None | Some(Value::Null) => Vec::new(),
        Some(v) => as_str_list(v, "schema.drop_columns", true)?,
    };

    let features = dedupe_preserve_order(features);
    let id_columns = dedupe_preserve_order(id_columns);
    let drop_columns = dedupe_preserve_order(drop_columns);

    if features.iter().any(|f| f == &target) {
        return Err(Error::Schema(format!(
            "target '{}' must not appear in schema.features",
            target
        )));
    }

    Ok(ContractConfig {
        name,
        version,
        features,
        target,
        id_columns,
        drop_columns,
    })
}

/// Validates a required non-empty string field.
fn as_str(value: &Value, field: &str) -> Result<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Value::Null => Err(Error::Schema(format!("required field missing: '{}'", field))),
        _ => Err(Error::Schema(format!(
            "field '{}' must be a non-empty string",
            field
        ))),
    }
}

/// Validates a list-of-strings field; `allow_empty` relaxes the non-empty
/// requirement for the optional lists.
fn as_str_list(value: &Value, field: &str, allow_empty: bool) -> Result<Vec<String>> {
    let seq = match value {
        Value::Sequence(seq) => seq,
        _ => {
            return Err(Error::Schema(format!("field '{}' must be a list", field)));
        }
    };
    let mut out = Vec::with_capacity(seq.len());
    for (i, item) in seq.iter().enumerate() {
        match item {
            Value::String(s) if !s.trim().is_empty() => out.push(s.trim().to_string()),
            _ => {
                return Err(Error::Schema(format!(
                    "field '{}[{}]' must be a non-empty string",
                    field, i
                )));
            }
        }
    }
    if !allow_empty && out.is_empty() {
        return Err(Error::Schema(format!("field '{}' must not be empty", field)));
    }
    Ok(out)
}

/// Removes duplicates preserving the order of first appearance.
fn dedupe_preserve_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
