use std::fmt;

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Load-time schema validation failure.
///
/// These are fatal: an application must not proceed with an invalid schema.
/// Once `ValidatedSchema::load` succeeds, later stages assume a well-formed
/// schema and never surface these at decision time. Evaluation misses (absent
/// permission, dimension, or value) are plain `false`, never an error.
#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("invalid schema document at `{path}`: {message}")]
    Parse { path: String, message: String },
    #[error("failed to load schema document: {0}")]
    Load(String),
    #[error("duplicate permission name: {0}")]
    DuplicatePermission(String),
    #[error("duplicate role name: {0}")]
    DuplicateRole(String),
    #[error("role `{role}` grants unknown permission `{permission}`")]
    UnknownPermission { role: String, permission: String },
    #[error("role `{role}` inherits unknown role `{parent}`")]
    UnknownParent { role: String, parent: String },
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("role inheritance cycle: {}", DisplayCycle(cycle))]
    InheritanceCycle { cycle: Vec<String> },
}

impl SchemaError {
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load(message.into())
    }

    pub fn unknown_permission(role: impl Into<String>, permission: impl Into<String>) -> Self {
        Self::UnknownPermission {
            role: role.into(),
            permission: permission.into(),
        }
    }

    pub fn unknown_parent(role: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::UnknownParent {
            role: role.into(),
            parent: parent.into(),
        }
    }

    /// The ordered list of role names forming the loop, if this is a cycle error.
    pub fn cycle(&self) -> Option<&[String]> {
        match self {
            Self::InheritanceCycle { cycle } => Some(cycle),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for SchemaError {
    fn from(value: anyhow::Error) -> Self {
        Self::Load(value.to_string())
    }
}

struct DisplayCycle<'a>(&'a [String]);

impl fmt::Display for DisplayCycle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{name}")?;
        }
        // close the loop back to the first member for readability
        if let Some(first) = self.0.first() {
            write!(f, " -> {first}")?;
        }
        Ok(())
    }
}

/// Validation failure for a role binding supplied by the identity layer.
///
/// The aggregator itself never fails on these (an unknown role simply grants
/// nothing); `PolicyService::validate_bindings` exposes them so typos in role
/// or dimension names can be caught eagerly instead of denying silently.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BindingError {
    #[error("binding references unknown role `{0}`")]
    UnknownRole(String),
    #[error("binding for role `{role}` uses unknown context dimension `{dimension}`")]
    UnknownDimension { role: String, dimension: String },
}
