//! The service contract consumed by the surrounding application
//!
//! `PolicyService` is the one abstraction boundary route guards, data-source
//! checks, and UI introspection go through. It is constructed once from a
//! validated schema document and is immutable afterwards; `PolicyHandle` adds
//! exactly-once asynchronous initialization and atomic snapshot replacement
//! for hot reloads.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::OnceCell;

use crate::engine::{
    can, CapabilityProbe, Context, EffectivePermissionSet, PermissionAggregator, PolicyEvaluator,
    RoleBinding,
};
use crate::errors::{BindingError, SchemaError, SchemaResult};
use crate::schema::{SchemaDocument, ValidatedSchema};

// =============================================================================
// POLICY SERVICE
// =============================================================================

/// An immutable policy engine snapshot: validated schema plus a cache of
/// aggregated permission sets keyed by the canonicalized binding set.
///
/// All decision calls are synchronous and side-effect-free; the cache is the
/// only interior state and only ever stores values derivable from its key, so
/// concurrent readers can never observe an inconsistent snapshot.
#[derive(Debug)]
pub struct PolicyService {
    schema: Arc<ValidatedSchema>,
    aggregator: PermissionAggregator,
    cache: RwLock<HashMap<Vec<RoleBinding>, Arc<EffectivePermissionSet>>>,
}

impl PolicyService {
    /// One-time construction from a schema document. The only place schema
    /// errors surface; an invalid document never yields a service.
    pub fn init(document: SchemaDocument) -> SchemaResult<Self> {
        let schema = Arc::new(ValidatedSchema::load(document)?);
        tracing::info!(
            permissions = schema.permissions().count(),
            roles = schema.roles().count(),
            "policy schema loaded"
        );
        Ok(Self {
            aggregator: PermissionAggregator::new(Arc::clone(&schema)),
            schema,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn from_json_str(raw: &str) -> SchemaResult<Self> {
        Self::init(SchemaDocument::from_json_str(raw)?)
    }

    pub fn schema(&self) -> &ValidatedSchema {
        &self.schema
    }

    /// The aggregated permission set for `bindings`, cached by the exact
    /// binding set. Binding lists that are equal as sets (order and
    /// duplicates ignored) share one entry; any change to the set lands on a
    /// fresh key, so stale aggregations are never served.
    pub fn effective_permissions(&self, bindings: &[RoleBinding]) -> Arc<EffectivePermissionSet> {
        let key = canonical_key(bindings);
        if let Some(hit) = self.cache.read().get(&key) {
            return Arc::clone(hit);
        }
        let computed = Arc::new(self.aggregator.aggregate(&key));
        self.cache
            .write()
            .entry(key)
            .or_insert(computed)
            .clone()
    }

    /// Is the holder of `bindings` allowed `permission` within `context`?
    ///
    /// Passing a permission or dimension name outside the loaded schema is a
    /// caller bug: it trips an assertion in debug builds and simply denies in
    /// release builds.
    pub fn is_allowed(&self, bindings: &[RoleBinding], permission: &str, context: &Context) -> bool {
        debug_assert!(
            self.schema.permission(permission).is_some(),
            "permission `{permission}` is not declared in the loaded schema"
        );
        #[cfg(debug_assertions)]
        for dimension in context.dimensions() {
            debug_assert!(
                self.schema.has_dimension(dimension),
                "context dimension `{dimension}` is not declared in the loaded schema"
            );
        }
        can(&self.effective_permissions(bindings), permission, context)
    }

    /// OR-combined capability probe against the aggregated set for `bindings`.
    pub fn probe(&self, bindings: &[RoleBinding], probe: &CapabilityProbe) -> bool {
        probe.any(&self.effective_permissions(bindings))
    }

    /// Eagerly check bindings supplied by the identity layer against the
    /// schema, so typos in role or dimension names fail here instead of
    /// denying silently at decision time.
    pub fn validate_bindings(&self, bindings: &[RoleBinding]) -> Result<(), BindingError> {
        for binding in bindings {
            if self.schema.role(&binding.role).is_none() {
                return Err(BindingError::UnknownRole(binding.role.clone()));
            }
            for dimension in binding.context.dimensions() {
                if !self.schema.has_dimension(dimension) {
                    return Err(BindingError::UnknownDimension {
                        role: binding.role.clone(),
                        dimension: dimension.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PolicyEvaluator for PolicyService {
    async fn is_allowed(
        &self,
        bindings: &[RoleBinding],
        permission: &str,
        context: &Context,
    ) -> bool {
        PolicyService::is_allowed(self, bindings, permission, context)
    }

    async fn effective_permissions(&self, bindings: &[RoleBinding]) -> EffectivePermissionSet {
        PolicyService::effective_permissions(self, bindings)
            .as_ref()
            .clone()
    }
}

/// Sort and deduplicate so binding lists equal as sets share one cache key.
fn canonical_key(bindings: &[RoleBinding]) -> Vec<RoleBinding> {
    let mut key = bindings.to_vec();
    key.sort();
    key.dedup();
    key
}

// =============================================================================
// POLICY HANDLE
// =============================================================================

/// Shared, reloadable access to a `PolicyService`.
///
/// Concurrent callers racing `get_or_init` share a single in-flight
/// initialization - the schema document is fetched and validated exactly
/// once, and everyone awaits the same result. A reload validates the new
/// document first and then swaps the snapshot atomically, so in-flight
/// evaluations keep the service they already hold.
#[derive(Default)]
pub struct PolicyHandle {
    slot: OnceCell<RwLock<Arc<PolicyService>>>,
}

impl PolicyHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current service, initializing it from `fetch` if this is the
    /// first caller. `fetch` runs at most once per handle.
    pub async fn get_or_init<F, Fut>(&self, fetch: F) -> SchemaResult<Arc<PolicyService>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SchemaResult<SchemaDocument>>,
    {
        let slot = self
            .slot
            .get_or_try_init(|| async {
                let document = fetch().await?;
                let service = Arc::new(PolicyService::init(document)?);
                Ok::<_, SchemaError>(RwLock::new(service))
            })
            .await?;
        Ok(Arc::clone(&slot.read()))
    }

    /// The current snapshot, if initialization has completed.
    pub fn current(&self) -> Option<Arc<PolicyService>> {
        self.slot.get().map(|slot| Arc::clone(&slot.read()))
    }

    /// Validate `document` and publish it as the new snapshot. The old
    /// snapshot stays valid for callers still holding it; on validation
    /// failure the current snapshot is left untouched.
    pub fn reload(&self, document: SchemaDocument) -> SchemaResult<()> {
        let service = Arc::new(PolicyService::init(document)?);
        match self.slot.get() {
            Some(slot) => *slot.write() = service,
            None => {
                // first publication without an async init; if a concurrent
                // get_or_init won the race, publish over its snapshot
                if self.slot.set(RwLock::new(Arc::clone(&service))).is_err() {
                    if let Some(slot) = self.slot.get() {
                        *slot.write() = service;
                    }
                }
            }
        }
        Ok(())
    }
}
