//! JSON import and export of threat models
//!
//! Export writes the model as 2-space indented JSON with camelCase
//! collection keys and snake_case entity fields. Import is a shallow
//! validation: `name` and `version` must be present and truthy (a non-empty
//! string, a non-zero number or `true`; scalars are kept as their string
//! form). The three structural collections are optional. `dataAssets` is not carried by
//! import.

use std::path::{Path, PathBuf};

use anyhow::Context;
use oracle_types::{DataFlow, NewModel, TechnicalAsset, ThreatModel, TrustBoundary};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ImportError, InterchangeError};
use crate::store::ModelStore;

/// Serialize a model for download
pub fn export_json(model: &ThreatModel) -> Result<String, InterchangeError> {
    Ok(serde_json::to_string_pretty(model)?)
}

/// `<name, whitespace runs as hyphens, lowercased>-v<version>.json`
///
/// Runs at either end become hyphens too; the name is not trimmed.
pub fn export_file_name(model: &ThreatModel) -> String {
    let mut stem = String::with_capacity(model.name.len());
    let mut in_run = false;
    for ch in model.name.chars() {
        if ch.is_whitespace() {
            if !in_run {
                stem.push('-');
            }
            in_run = true;
        } else {
            stem.extend(ch.to_lowercase());
            in_run = false;
        }
    }
    format!("{stem}-v{}.json", model.version)
}

/// Write the export file into `dir` and return its path
pub fn write_export(dir: impl AsRef<Path>, model: &ThreatModel) -> anyhow::Result<PathBuf> {
    let dir = dir.as_ref();
    let json = export_json(model)?;
    let path = dir.join(export_file_name(model));
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write export to {}", path.display()))?;
    tracing::info!(model = %model.id, path = %path.display(), "model exported");
    Ok(path)
}

/// Validate an uploaded document and turn it into model fields
pub fn parse_import(json: &str) -> Result<NewModel, ImportError> {
    let value: Value = serde_json::from_str(json).map_err(ImportError::InvalidJson)?;
    let Value::Object(object) = value else {
        return Err(ImportError::missing("top level is not an object"));
    };

    let name = required_field(&object, "name")?;
    let version = required_field(&object, "version")?;
    let description = match object.get("description") {
        Some(Value::String(text)) => text.clone(),
        _ => String::new(),
    };

    Ok(NewModel {
        name,
        description: Some(description),
        version,
        technical_assets: collection::<TechnicalAsset>(&object, "technicalAssets")?,
        trust_boundaries: collection::<TrustBoundary>(&object, "trustBoundaries")?,
        data_flows: collection::<DataFlow>(&object, "dataFlows")?,
        data_assets: Vec::new(),
    })
}

/// Truthy scalar as text; absent, null, `""`, `0` and `false` are missing
fn required_field(object: &Map<String, Value>, key: &str) -> Result<String, ImportError> {
    match object.get(key) {
        Some(Value::String(text)) if !text.is_empty() => Ok(text.clone()),
        Some(Value::Number(number)) if number.as_f64() != Some(0.0) => Ok(number.to_string()),
        Some(Value::Bool(true)) => Ok("true".to_string()),
        _ => Err(ImportError::missing(format!("`{key}` is missing or empty"))),
    }
}

/// Absent or null collections become empty
fn collection<T: DeserializeOwned>(
    object: &Map<String, Value>,
    key: &str,
) -> Result<Vec<T>, ImportError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| ImportError::missing(format!("`{key}`: {e}"))),
    }
}

impl ModelStore {
    /// Parse and add as a new current model. On error the store is untouched.
    pub fn import_json(&mut self, json: &str) -> Result<String, ImportError> {
        let new = parse_import(json).map_err(|e| {
            match &e {
                ImportError::InvalidJson(source) => {
                    tracing::warn!(error = %source, "import rejected: invalid JSON")
                }
                ImportError::MissingRequiredFields { detail } => {
                    tracing::warn!(detail = %detail, "import rejected: missing required fields")
                }
            }
            e
        })?;
        let id = self.add_model(new);
        tracing::info!(model = %id, "model imported");
        Ok(id)
    }
}
