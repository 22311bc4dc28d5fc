pub mod engine;
pub mod errors;
pub mod schema;
pub mod service;

// Re-export the service contract and the types it speaks
pub use engine::{
    can, CapabilityProbe, Context, EffectivePermissionSet, PolicyEvaluator, RoleBinding, WILDCARD,
};
pub use errors::{BindingError, SchemaError};
pub use schema::{SchemaDocument, ValidatedSchema};
pub use service::{PolicyHandle, PolicyService};
