use std::sync::Arc;

use crate::schema::ValidatedSchema;

use super::context::RoleBinding;
use super::effective::EffectivePermissionSet;
use super::resolver::InheritanceResolver;

/// Combines a principal's role bindings into one effective permission set.
///
/// Aggregation is a pure union: more bindings can only widen access, never
/// revoke it. The aggregator holds no per-principal state - callers cache the
/// result keyed by the exact binding set and recompute when that set changes.
#[derive(Debug)]
pub struct PermissionAggregator {
    resolver: InheritanceResolver,
}

impl PermissionAggregator {
    pub fn new(schema: Arc<ValidatedSchema>) -> Self {
        Self {
            resolver: InheritanceResolver::new(schema),
        }
    }

    pub fn resolver(&self) -> &InheritanceResolver {
        &self.resolver
    }

    /// For each binding, every permission the bound role resolves to is
    /// granted under the binding's context; contexts for the same permission
    /// union across bindings.
    ///
    /// A binding whose role is absent from the schema grants nothing - the
    /// identity layer may lag a schema reload, and deny-by-default is the
    /// safe reading.
    pub fn aggregate(&self, bindings: &[RoleBinding]) -> EffectivePermissionSet {
        let mut effective = EffectivePermissionSet::new();
        for binding in bindings {
            let resolved = match self.resolver.resolve(&binding.role) {
                Ok(permissions) => permissions,
                Err(err) => {
                    tracing::warn!(
                        role = %binding.role,
                        error = %err,
                        "skipping binding for unresolvable role"
                    );
                    continue;
                }
            };
            for permission in resolved.iter() {
                effective.grant(permission, &binding.context);
            }
        }
        effective
    }
}
