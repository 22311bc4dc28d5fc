use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{SchemaError, SchemaResult};

// =============================================================================
// SCHEMA DOCUMENT (wire format)
// =============================================================================

/// Declaration of a single permission in the schema document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSpec {
    /// Unique permission name, e.g. `deleteAppInstance`
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Context dimensions this permission can be scoped by, e.g. `workspace`
    #[serde(default)]
    pub context_dimensions: Vec<String>,
}

/// Declaration of a single role in the schema document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSpec {
    /// Unique role name, e.g. `workspaceAdmin`
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Directly granted permission names
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Parent roles whose resolved permissions this role inherits
    #[serde(default)]
    pub inherits_from: Vec<String>,
    /// Informational attributes; never consulted by decision logic
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

/// The raw, unvalidated schema document.
///
/// How the document is stored or fetched is the caller's concern; the engine
/// only cares that it parses into this shape and survives validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub permissions: Vec<PermissionSpec>,
    #[serde(default)]
    pub roles: Vec<RoleSpec>,
}

impl SchemaDocument {
    /// Parse a document from a JSON string, reporting the JSON path of the
    /// offending field on failure.
    pub fn from_json_str(raw: &str) -> SchemaResult<Self> {
        let mut de = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize(&mut de).map_err(|err| SchemaError::Parse {
            path: err.path().to_string(),
            message: err.inner().to_string(),
        })
    }

    pub fn from_json_value(value: Value) -> SchemaResult<Self> {
        serde_path_to_error::deserialize(value).map_err(|err| SchemaError::Parse {
            path: err.path().to_string(),
            message: err.inner().to_string(),
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|err| SchemaError::load(format!("{}: {err}", path.display())))?;
        Self::from_json_str(&raw)
    }
}
