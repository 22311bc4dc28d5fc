use super::context::Context;
use super::effective::EffectivePermissionSet;
use super::evaluator::can;

/// A fixed, ordered list of (permission, context) probes combined with OR.
///
/// Answers coarse questions like "is this principal an administrator of
/// anything" without storing a boolean that could drift from the underlying
/// grants - evaluate it against the current effective set every time.
#[derive(Debug, Clone, Default)]
pub struct CapabilityProbe {
    probes: Vec<(String, Context)>,
}

impl CapabilityProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: add one probe to the end of the list.
    pub fn check(mut self, permission: impl Into<String>, context: Context) -> Self {
        self.probes.push((permission.into(), context));
        self
    }

    /// Dimension-free probe: passes on mere possession of the permission.
    pub fn check_held(self, permission: impl Into<String>) -> Self {
        self.check(permission, Context::new())
    }

    /// True if any probe passes against `effective`.
    pub fn any(&self, effective: &EffectivePermissionSet) -> bool {
        self.probes
            .iter()
            .any(|(permission, context)| can(effective, permission, context))
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}
