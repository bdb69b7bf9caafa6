//! # Subsystem Registry - Ordered Init Step Table
//!
//! Holds the fixed, ordered list of init steps the client brings up at
//! startup.
//!
//! ## Features
//!
//! - **Configuration order**: steps run in registration order, which is the
//!   dependency order; nothing is re-sorted at runtime
//! - **Build-then-freeze**: steps are added through `SubsystemRegistryBuilder`;
//!   the built registry exposes no mutation
//! - **Unique names**: duplicates are rejected at registration time
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut builder = SubsystemRegistry::builder();
//!
//! builder.register(InitStep::critical("security-config", SecurityConfigStep::new(cfg)))?;
//! builder.register(InitStep::optional("cache", CacheStep::new(cache)))?;
//!
//! let registry = builder.build();
//! let report = run_bootstrap(&registry).await?;
//! ```

use crate::errors::ConfigurationError;
use crate::subsystem_trait::InitStep;
use std::collections::HashSet;
use tracing::{debug, info};

/// Frozen, ordered table of init steps.
#[derive(Debug, Clone, Default)]
pub struct SubsystemRegistry {
    /// Steps in dependency order.
    steps: Vec<InitStep>,
}

impl SubsystemRegistry {
    /// Start building a registry.
    pub fn builder() -> SubsystemRegistryBuilder {
        SubsystemRegistryBuilder::new()
    }

    /// Build a registry from steps in order, rejecting duplicates.
    pub fn from_steps(
        steps: impl IntoIterator<Item = InitStep>,
    ) -> Result<Self, ConfigurationError> {
        let mut builder = Self::builder();
        for step in steps {
            builder.register(step)?;
        }
        Ok(builder.build())
    }

    /// All steps in registration order.
    pub fn steps(&self) -> &[InitStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(InitStep::name).collect()
    }

    /// Look up a step by name.
    pub fn get(&self, name: &str) -> Option<&InitStep> {
        self.steps.iter().find(|s| s.name() == name)
    }

    /// Steps whose failure aborts startup.
    pub fn critical_steps(&self) -> impl Iterator<Item = &InitStep> {
        self.steps.iter().filter(|s| s.criticality().is_critical())
    }
}

/// Mutable builder for [`SubsystemRegistry`].
#[derive(Debug, Default)]
pub struct SubsystemRegistryBuilder {
    steps: Vec<InitStep>,
    names: HashSet<String>,
}

impl SubsystemRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step after all previously registered steps.
    pub fn register(&mut self, step: InitStep) -> Result<&mut Self, ConfigurationError> {
        let name = step.name().trim();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyStepName);
        }
        if !self.names.insert(step.name().to_string()) {
            return Err(ConfigurationError::DuplicateStep(step.name().to_string()));
        }

        debug!(
            step = step.name(),
            criticality = %step.criticality(),
            position = self.steps.len(),
            "[Registry] Registered init step"
        );
        self.steps.push(step);
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> SubsystemRegistry {
        info!("[Registry] Frozen with {} init steps", self.steps.len());
        SubsystemRegistry { steps: self.steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SubsystemFailure;
    use crate::subsystem_trait::Criticality;

    fn noop(name: &str, criticality: Criticality) -> InitStep {
        InitStep::from_fn(name, criticality, || Ok::<(), SubsystemFailure>(()))
    }

    #[test]
    fn test_registry_preserves_registration_order() {
        let mut builder = SubsystemRegistry::builder();
        builder
            .register(noop("security-config", Criticality::Critical))
            .unwrap()
            .register(noop("cache", Criticality::Optional))
            .unwrap()
            .register(noop("scheduler", Criticality::Optional))
            .unwrap();
        let registry = builder.build();

        assert_eq!(registry.names(), vec!["security-config", "cache", "scheduler"]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.critical_steps().count(), 1);
        assert!(registry.get("cache").is_some());
        assert!(registry.get("sync").is_none());
    }

    #[test]
    fn test_registry_rejects_duplicate_names() {
        let mut builder = SubsystemRegistry::builder();
        builder.register(noop("cache", Criticality::Optional)).unwrap();

        let result = builder.register(noop("cache", Criticality::Critical));
        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::DuplicateStep("cache".into())
        );
        assert_eq!(builder.build().len(), 1);
    }

    #[test]
    fn test_registry_rejects_empty_names() {
        let result = SubsystemRegistry::from_steps([noop("  ", Criticality::Optional)]);
        assert_eq!(result.unwrap_err(), ConfigurationError::EmptyStepName);
    }

    #[test]
    fn test_empty_registry() {
        let registry = SubsystemRegistry::builder().build();
        assert!(registry.is_empty());
        assert!(registry.steps().is_empty());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn unique_names_keep_their_order(names in proptest::collection::hash_set("[a-z]{1,8}", 0..12)) {
                let names: Vec<String> = names.into_iter().collect();
                let registry = SubsystemRegistry::from_steps(
                    names.iter().map(|n| noop(n, Criticality::Optional)),
                ).unwrap();

                let registered: Vec<String> = registry.names().into_iter().map(String::from).collect();
                prop_assert_eq!(registered, names);
            }
        }
    }
}
