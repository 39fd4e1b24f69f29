//! Deployment and user identity supplied by the host shell.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Who is being onboarded, and on which deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque deployment identifier.
    pub deployment_id: String,
    /// User identifier (the callsign).
    pub user_id: String,
}

impl Identity {
    pub fn new(deployment_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            user_id: user_id.into(),
        }
    }

    /// Both halves present and non-blank.
    pub fn is_complete(&self) -> bool {
        !self.deployment_id.trim().is_empty() && !self.user_id.trim().is_empty()
    }
}

/// Source of the current identity. `None` means "not ready yet".
pub trait IdentityProvider: Send + Sync {
    fn identity(&self) -> Option<Identity>;
}

/// Identity that resolves some time after startup.
///
/// Starts empty unless seeded; the host sets it once the session and
/// deployment lookups finish.
#[derive(Debug, Default)]
pub struct IdentityCell {
    inner: RwLock<Option<Identity>>,
}

impl IdentityCell {
    pub fn new(initial: Option<Identity>) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }

    /// Replace the current identity.
    pub fn set(&self, identity: Option<Identity>) {
        match self.inner.write() {
            Ok(mut guard) => *guard = identity,
            Err(poisoned) => *poisoned.into_inner() = identity,
        }
    }
}

impl IdentityProvider for IdentityCell {
    fn identity(&self) -> Option<Identity> {
        let guard = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.as_ref().filter(|id| id.is_complete()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cell_is_not_ready() {
        let cell = IdentityCell::default();
        assert!(cell.identity().is_none());
    }

    #[test]
    fn blank_parts_are_not_ready() {
        let cell = IdentityCell::new(Some(Identity::new("deploy-1", "  ")));
        assert!(cell.identity().is_none());

        cell.set(Some(Identity::new("", "ALPHA-1")));
        assert!(cell.identity().is_none());
    }

    #[test]
    fn set_resolves_identity() {
        let cell = IdentityCell::default();
        cell.set(Some(Identity::new("deploy-1", "ALPHA-1")));
        assert_eq!(cell.identity(), Some(Identity::new("deploy-1", "ALPHA-1")));

        cell.set(None);
        assert!(cell.identity().is_none());
    }
}
