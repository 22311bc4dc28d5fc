use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::{SchemaError, SchemaResult};
use crate::schema::ValidatedSchema;

/// Flattens each role's transitive permission set over the inheritance graph.
///
/// Resolution is a pure function of the immutable schema, memoized per role
/// name: repeated lookups are O(1) after the first computation, and resolving
/// every role touches each role and inheritance edge once.
///
/// The loader already rejected cyclic schemas, but the resolver does not
/// assume that - a visiting set guards the walk and surfaces
/// `SchemaError::InheritanceCycle` if a cycle ever slips through.
#[derive(Debug)]
pub struct InheritanceResolver {
    schema: Arc<ValidatedSchema>,
    resolved: RwLock<HashMap<String, Arc<BTreeSet<String>>>>,
}

impl InheritanceResolver {
    pub fn new(schema: Arc<ValidatedSchema>) -> Self {
        Self {
            schema,
            resolved: RwLock::new(HashMap::new()),
        }
    }

    pub fn schema(&self) -> &Arc<ValidatedSchema> {
        &self.schema
    }

    /// The role's direct permissions unioned with the resolved permissions of
    /// every role it inherits from, recursively.
    pub fn resolve(&self, role: &str) -> SchemaResult<Arc<BTreeSet<String>>> {
        let mut visiting = Vec::new();
        self.resolve_inner(role, &mut visiting)
    }

    fn resolve_inner(
        &self,
        role: &str,
        visiting: &mut Vec<String>,
    ) -> SchemaResult<Arc<BTreeSet<String>>> {
        if let Some(hit) = self.resolved.read().get(role) {
            return Ok(Arc::clone(hit));
        }

        if let Some(start) = visiting.iter().position(|name| name == role) {
            return Err(SchemaError::InheritanceCycle {
                cycle: visiting[start..].to_vec(),
            });
        }

        let def = self
            .schema
            .role(role)
            .ok_or_else(|| SchemaError::UnknownRole(role.to_string()))?;

        visiting.push(role.to_string());
        let mut permissions = def.permissions.clone();
        for parent in &def.inherits_from {
            let inherited = self.resolve_inner(parent, visiting)?;
            permissions.extend(inherited.iter().cloned());
        }
        visiting.pop();

        let resolved = Arc::new(permissions);
        self.resolved
            .write()
            .insert(role.to_string(), Arc::clone(&resolved));
        Ok(resolved)
    }
}
