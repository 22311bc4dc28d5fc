use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::errors::{SchemaError, SchemaResult};

use super::document::SchemaDocument;

// =============================================================================
// VALIDATED SCHEMA
// =============================================================================

/// A permission after validation. Immutable for the lifetime of the schema.
#[derive(Debug, Clone, Serialize)]
pub struct Permission {
    pub name: String,
    pub description: String,
    /// Context dimensions this permission recognizes
    pub dimensions: BTreeSet<String>,
}

/// A role after validation: direct grants plus the names of its parents.
#[derive(Debug, Clone, Serialize)]
pub struct Role {
    pub name: String,
    pub description: String,
    pub permissions: BTreeSet<String>,
    pub inherits_from: Vec<String>,
    /// Informational only; never consulted by decision logic
    pub attributes: BTreeMap<String, Value>,
}

/// The validated, indexed schema. Built once per process/session start and
/// immutable thereafter; a hot reload builds a fresh instance.
#[derive(Debug)]
pub struct ValidatedSchema {
    permissions: HashMap<String, Permission>,
    roles: HashMap<String, Role>,
    /// Union of every permission's declared dimensions
    dimensions: BTreeSet<String>,
}

impl ValidatedSchema {
    /// Validate a parsed document and build the name indices.
    ///
    /// Checks, in order: duplicate permission names, duplicate role names,
    /// roles granting permissions absent from the catalog, roles inheriting
    /// unknown roles, and inheritance cycles. The first violation found is
    /// returned; a cycle error names the ordered list of roles forming the
    /// loop.
    pub fn load(document: SchemaDocument) -> SchemaResult<Self> {
        let mut permissions = HashMap::with_capacity(document.permissions.len());
        let mut dimensions = BTreeSet::new();

        for spec in document.permissions {
            dimensions.extend(spec.context_dimensions.iter().cloned());
            let permission = Permission {
                name: spec.name.clone(),
                description: spec.description,
                dimensions: spec.context_dimensions.into_iter().collect(),
            };
            if permissions.insert(spec.name.clone(), permission).is_some() {
                return Err(SchemaError::DuplicatePermission(spec.name));
            }
        }

        let mut roles = HashMap::with_capacity(document.roles.len());
        for spec in document.roles {
            let role = Role {
                name: spec.name.clone(),
                description: spec.description,
                permissions: spec.permissions.into_iter().collect(),
                inherits_from: spec.inherits_from,
                attributes: spec.attributes,
            };
            if roles.insert(spec.name.clone(), role).is_some() {
                return Err(SchemaError::DuplicateRole(spec.name));
            }
        }

        for role in roles.values() {
            for permission in &role.permissions {
                if !permissions.contains_key(permission) {
                    return Err(SchemaError::unknown_permission(&role.name, permission));
                }
            }
            for parent in &role.inherits_from {
                if !roles.contains_key(parent) {
                    return Err(SchemaError::unknown_parent(&role.name, parent));
                }
            }
        }

        if let Some(cycle) = find_cycle(&roles) {
            return Err(SchemaError::InheritanceCycle { cycle });
        }

        Ok(Self {
            permissions,
            roles,
            dimensions,
        })
    }

    pub fn permission(&self, name: &str) -> Option<&Permission> {
        self.permissions.get(name)
    }

    pub fn role(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    pub fn permissions(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.values()
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    /// Sorted role names, for stable display
    pub fn role_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.roles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether any permission in the catalog declares this context dimension.
    pub fn has_dimension(&self, dimension: &str) -> bool {
        self.dimensions.contains(dimension)
    }

    pub fn dimensions(&self) -> &BTreeSet<String> {
        &self.dimensions
    }
}

/// Find one inheritance cycle, if any, as the ordered list of roles forming
/// the loop. Roots are visited in sorted order so the same schema always
/// reports the same cycle.
fn find_cycle(roles: &HashMap<String, Role>) -> Option<Vec<String>> {
    let mut names: Vec<&str> = roles.keys().map(String::as_str).collect();
    names.sort_unstable();

    let mut done: HashSet<&str> = HashSet::new();
    let mut path: Vec<&str> = Vec::new();
    for name in names {
        if let Some(cycle) = walk(name, roles, &mut done, &mut path) {
            return Some(cycle);
        }
        debug_assert!(path.is_empty());
    }
    None
}

fn walk<'a>(
    name: &'a str,
    roles: &'a HashMap<String, Role>,
    done: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    if done.contains(name) {
        return None;
    }
    if let Some(start) = path.iter().position(|n| *n == name) {
        return Some(path[start..].iter().map(|n| n.to_string()).collect());
    }
    path.push(name);
    // unknown parents were already rejected; an absent entry just ends the walk
    if let Some(role) = roles.get(name) {
        for parent in &role.inherits_from {
            if let Some(cycle) = walk(parent, roles, done, path) {
                return Some(cycle);
            }
        }
    }
    path.pop();
    done.insert(name);
    None
}
