use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Context value that satisfies any concrete requested value for its dimension.
pub const WILDCARD: &str = "*";

// =============================================================================
// CONTEXT
// =============================================================================

/// A concrete context: dimension name -> value.
///
/// Used both on the grant side (the scope a role binding was issued for) and
/// on the request side (the scope an authorization check asks about). The
/// ordered map keeps contexts comparable and hashable so binding sets can key
/// caches.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    entries: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, dimension: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(dimension.into(), value.into());
        self
    }

    /// Builder-style wildcard insert for a dimension.
    pub fn with_any(self, dimension: impl Into<String>) -> Self {
        self.with(dimension, WILDCARD)
    }

    pub fn get(&self, dimension: &str) -> Option<&str> {
        self.entries.get(dimension).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(d, v)| (d.as_str(), v.as_str()))
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, String)> for Context {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// ROLE BINDING
// =============================================================================

/// A principal's association with a role, scoped to a concrete context.
///
/// Bindings come from the identity/session layer and may change between
/// requests; a principal holds zero or more, possibly several of the same
/// role under different contexts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleBinding {
    pub role: String,
    #[serde(default)]
    pub context: Context,
}

impl RoleBinding {
    /// A binding with an empty context: the role's permissions are held
    /// without any recorded scope.
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            context: Context::new(),
        }
    }

    pub fn scoped(role: impl Into<String>, context: Context) -> Self {
        Self {
            role: role.into(),
            context,
        }
    }
}
