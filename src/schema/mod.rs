//! Schema model - the static description of permissions and roles
//!
//! A schema document arrives as raw data (file, embedded constant, or a
//! network fetch handled by the caller), is parsed into `SchemaDocument`, and
//! validated once into an immutable `ValidatedSchema`:
//! - every permission a role grants must exist in the permission catalog
//! - every inherited role must exist
//! - the inheritance graph must be acyclic
//!
//! Validation is the only place schema-level errors surface; decision-time
//! code assumes a well-formed schema.

mod document;
mod validated;

pub use document::{PermissionSpec, RoleSpec, SchemaDocument};
pub use validated::{Permission, Role, ValidatedSchema};
