use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};

use super::context::{Context, WILDCARD};

// =============================================================================
// ALLOWED VALUES
// =============================================================================

/// The values a grant recorded for one context dimension.
///
/// `Any` is sticky: once a wildcard is merged in for a dimension, further
/// unions cannot narrow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedValues {
    /// Wildcard - satisfies any concrete requested value
    Any,
    Values(BTreeSet<String>),
}

impl AllowedValues {
    fn single(value: &str) -> Self {
        if value == WILDCARD {
            Self::Any
        } else {
            Self::Values(BTreeSet::from([value.to_string()]))
        }
    }

    /// Union one more value in, short-circuiting to `Any` on wildcard.
    fn allow(&mut self, value: &str) {
        match self {
            Self::Any => {}
            Self::Values(values) => {
                if value == WILDCARD {
                    *self = Self::Any;
                } else if !values.contains(value) {
                    values.insert(value.to_string());
                }
            }
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Values(values) => values.contains(value),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

// Renders `Any` as the literal `"*"` so a serialized effective set reads the
// same way the schema document does.
impl Serialize for AllowedValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Any => serializer.serialize_str(WILDCARD),
            Self::Values(values) => values.serialize(serializer),
        }
    }
}

// =============================================================================
// EFFECTIVE PERMISSION SET
// =============================================================================

/// The contexts under which one permission is held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GrantedContexts {
    dimensions: BTreeMap<String, AllowedValues>,
}

impl GrantedContexts {
    pub fn dimension(&self, name: &str) -> Option<&AllowedValues> {
        self.dimensions.get(name)
    }

    pub fn dimensions(&self) -> impl Iterator<Item = (&str, &AllowedValues)> {
        self.dimensions.iter().map(|(d, v)| (d.as_str(), v))
    }

    fn merge(&mut self, context: &Context) {
        for (dimension, value) in context.iter() {
            match self.dimensions.get_mut(dimension) {
                Some(allowed) => allowed.allow(value),
                None => {
                    self.dimensions
                        .insert(dimension.to_string(), AllowedValues::single(value));
                }
            }
        }
    }
}

/// Per-principal derived view: permission name -> dimension -> allowed values,
/// aggregated across every binding the principal holds.
///
/// Pure derived value - recomputed from the current binding set, never
/// mutated in place once handed out, safe to share across any number of
/// concurrent readers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EffectivePermissionSet {
    grants: BTreeMap<String, GrantedContexts>,
}

impl EffectivePermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the permission is held at all, in any context.
    pub fn holds(&self, permission: &str) -> bool {
        self.grants.contains_key(permission)
    }

    pub fn get(&self, permission: &str) -> Option<&GrantedContexts> {
        self.grants.get(permission)
    }

    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.grants.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Record that `permission` is granted under `context`, unioning with any
    /// contexts recorded so far.
    pub(crate) fn grant(&mut self, permission: &str, context: &Context) {
        self.grants
            .entry(permission.to_string())
            .or_default()
            .merge(context);
    }
}
