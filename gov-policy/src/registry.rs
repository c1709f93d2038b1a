//! Named, immutable policy storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::config::Policy;
use crate::error::{PolicyError, PolicyResult};

/// Registry that stores loaded policies keyed by name.
///
/// Policies are immutable once registered; replacing one requires a new
/// name or a process restart, which keeps audit entries attributable to the
/// exact policy text that produced them.
#[derive(Default)]
pub struct PolicyRegistry {
    inner: RwLock<HashMap<String, Arc<Policy>>>,
}

impl std::fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("registered", &self.names())
            .finish()
    }
}

impl PolicyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a policy under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::DuplicatePolicy`] when the name is taken.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    pub fn register(&self, policy: Policy) -> PolicyResult<()> {
        let mut inner = self.inner.write().expect("policy registry poisoned");
        let name = policy.name().to_owned();
        if inner.contains_key(&name) {
            return Err(PolicyError::DuplicatePolicy { name });
        }

        debug!(policy = %name, version = policy.version(), "registering policy");
        inner.insert(name, Arc::new(policy));
        Ok(())
    }

    /// Looks a policy up by name.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownPolicy`] when nothing is registered
    /// under the name.
    pub fn get(&self, name: &str) -> PolicyResult<Arc<Policy>> {
        let inner = self.inner.read().expect("policy registry poisoned");
        inner
            .get(name)
            .cloned()
            .ok_or_else(|| PolicyError::UnknownPolicy {
                name: name.to_owned(),
            })
    }

    /// Lists registered policy names, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let inner = self.inner.read().expect("policy registry poisoned");
        let mut names: Vec<_> = inner.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_get_round_trip() {
        let registry = PolicyRegistry::new();
        registry.register(Policy::new("standard")).unwrap();

        let policy = registry.get("standard").unwrap();
        assert_eq!(policy.name(), "standard");
        assert_eq!(registry.names(), vec!["standard"]);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let registry = PolicyRegistry::new();
        registry.register(Policy::new("standard")).unwrap();
        let err = registry
            .register(Policy::new("standard"))
            .expect_err("duplicate should fail");
        assert!(matches!(err, PolicyError::DuplicatePolicy { name } if name == "standard"));
    }

    #[test]
    fn unknown_name_errors() {
        let registry = PolicyRegistry::new();
        let err = registry.get("missing").expect_err("unknown should fail");
        assert!(matches!(err, PolicyError::UnknownPolicy { name } if name == "missing"));
    }
}
