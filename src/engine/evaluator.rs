use async_trait::async_trait;

use super::context::{Context, RoleBinding};
use super::effective::EffectivePermissionSet;

/// Boundary trait for pluggable authorization logic.
///
/// The in-process `PolicyService` implements it directly; a remote or
/// separately loaded evaluator can stand in behind the same contract.
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    /// Is the holder of `bindings` allowed `permission` within `context`?
    async fn is_allowed(&self, bindings: &[RoleBinding], permission: &str, context: &Context)
        -> bool;

    /// The aggregated permission set for `bindings`, for introspection
    /// (e.g. rendering a permission matrix).
    async fn effective_permissions(&self, bindings: &[RoleBinding]) -> EffectivePermissionSet;
}

/// Evaluate one permission against one requested context.
///
/// Decision order:
/// 1. permission not held at all -> deny
/// 2. empty requested context -> allow (possession alone satisfies a
///    dimension-free check)
/// 3. otherwise every requested dimension must have been recorded by some
///    grant and its value must be listed or covered by `*` (AND across
///    dimensions)
///
/// Absence of data is always `false`, never an error: a dimension the grants
/// never recorded is "not proven", not "unrestricted". Pure function, no
/// shared state, safe under unlimited read concurrency.
pub fn can(effective: &EffectivePermissionSet, permission: &str, context: &Context) -> bool {
    let Some(granted) = effective.get(permission) else {
        tracing::debug!(permission, "deny: permission not held");
        return false;
    };

    if context.is_empty() {
        return true;
    }

    for (dimension, value) in context.iter() {
        let Some(allowed) = granted.dimension(dimension) else {
            tracing::debug!(permission, dimension, "deny: dimension never recorded");
            return false;
        };
        if !allowed.contains(value) {
            tracing::debug!(permission, dimension, value, "deny: value not granted");
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effective(grants: &[(&str, Context)]) -> EffectivePermissionSet {
        let mut set = EffectivePermissionSet::new();
        for (permission, context) in grants {
            set.grant(permission, context);
        }
        set
    }

    #[test]
    fn absent_permission_denies() {
        let set = effective(&[("read", Context::new())]);
        assert!(!can(&set, "write", &Context::new()));
    }

    #[test]
    fn empty_context_passes_on_possession() {
        let set = effective(&[("read", Context::new().with("workspace", "7"))]);
        assert!(can(&set, "read", &Context::new()));
    }

    #[test]
    fn matching_value_allows() {
        let set = effective(&[("read", Context::new().with("workspace", "7"))]);
        assert!(can(&set, "read", &Context::new().with("workspace", "7")));
        assert!(!can(&set, "read", &Context::new().with("workspace", "8")));
    }

    #[test]
    fn unrecorded_dimension_denies_even_when_held() {
        let set = effective(&[("read", Context::new().with("workspace", "7"))]);
        assert!(!can(&set, "read", &Context::new().with("workbench", "x")));
    }

    #[test]
    fn wildcard_satisfies_any_value() {
        let set = effective(&[("read", Context::new().with_any("workspace"))]);
        assert!(can(&set, "read", &Context::new().with("workspace", "7")));
        assert!(can(&set, "read", &Context::new().with("workspace", "literally-anything")));
    }

    #[test]
    fn all_requested_dimensions_must_pass() {
        let set = effective(&[(
            "read",
            Context::new().with("workspace", "7").with("workbench", "b1"),
        )]);
        assert!(can(
            &set,
            "read",
            &Context::new().with("workspace", "7").with("workbench", "b1")
        ));
        assert!(!can(
            &set,
            "read",
            &Context::new().with("workspace", "7").with("workbench", "b2")
        ));
    }
}
