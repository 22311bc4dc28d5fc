//! Decision pipeline - resolver, aggregator, evaluator, capability probe
//!
//! Everything here is a pure, deterministic computation over the immutable
//! `ValidatedSchema` and a principal's current bindings:
//! - `InheritanceResolver` flattens each role's transitive permission set
//! - `PermissionAggregator` unions a binding list into one effective set
//! - `can` answers a single (permission, context) check
//! - `CapabilityProbe` ORs a fixed list of checks

mod aggregate;
mod context;
mod effective;
mod evaluator;
mod probe;
mod resolver;

pub use aggregate::PermissionAggregator;
pub use context::{Context, RoleBinding, WILDCARD};
pub use effective::{AllowedValues, EffectivePermissionSet, GrantedContexts};
pub use evaluator::{can, PolicyEvaluator};
pub use probe::CapabilityProbe;
pub use resolver::InheritanceResolver;
