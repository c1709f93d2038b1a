//! Framework requirement catalogues.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use gov_primitives::{Classified, ErrorClass};

use crate::catalogues;

/// Result alias for compliance operations.
pub type ComplianceResult<T> = Result<T, ComplianceError>;

/// Errors produced by the compliance subsystem.
#[derive(Debug, Error)]
pub enum ComplianceError {
    /// The requested framework is not in the catalogue. Reported explicitly
    /// so callers cannot mistake "unrecognized framework" for "nothing to
    /// automate".
    #[error("unknown framework `{framework}`; available: {available}")]
    UnknownFramework {
        /// The requested framework identifier.
        framework: String,
        /// Comma-separated list of registered framework identifiers.
        available: String,
    },

    /// A framework with the same identifier is already registered.
    #[error("framework `{framework}` is already registered")]
    DuplicateFramework {
        /// The offending identifier.
        framework: String,
    },

    /// The hourly rate must be positive.
    #[error("hourly rate must be positive, got {rate}")]
    InvalidHourlyRate {
        /// The rejected rate.
        rate: f64,
    },

    /// Automation multipliers violated their ordering invariant.
    #[error("invalid automation multipliers: {reason}")]
    InvalidMultipliers {
        /// Human-readable reason for rejection.
        reason: String,
    },
}

impl Classified for ComplianceError {
    fn classification(&self) -> ErrorClass {
        ErrorClass::ClientFault
    }

    fn label(&self) -> &'static str {
        match self {
            Self::UnknownFramework { .. } => "unknown_framework",
            Self::DuplicateFramework { .. } => "duplicate_framework",
            Self::InvalidHourlyRate { .. } => "invalid_hourly_rate",
            Self::InvalidMultipliers { .. } => "invalid_multipliers",
        }
    }
}

/// How much of a requirement's labour is automated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationLevel {
    /// Tooling handles the requirement end-to-end.
    FullyAutomated,
    /// Tooling assists but human review is still needed.
    SemiAutomated,
    /// Entirely manual process.
    Manual,
}

impl AutomationLevel {
    /// Returns the wire representation of the level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullyAutomated => "fully_automated",
            Self::SemiAutomated => "semi_automated",
            Self::Manual => "manual",
        }
    }
}

/// One catalogue row: a compliance requirement with cost metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkRequirement {
    framework: String,
    requirement_id: String,
    description: String,
    baseline_manual_hours: f64,
    default_automation_level: AutomationLevel,
}

impl FrameworkRequirement {
    /// Creates a catalogue row.
    #[must_use]
    pub fn new(
        framework: impl Into<String>,
        requirement_id: impl Into<String>,
        description: impl Into<String>,
        baseline_manual_hours: f64,
        default_automation_level: AutomationLevel,
    ) -> Self {
        Self {
            framework: framework.into(),
            requirement_id: requirement_id.into(),
            description: description.into(),
            baseline_manual_hours,
            default_automation_level,
        }
    }

    /// Framework this requirement belongs to.
    #[must_use]
    pub fn framework(&self) -> &str {
        &self.framework
    }

    /// Short reference identifier, unique within the framework.
    #[must_use]
    pub fn requirement_id(&self) -> &str {
        &self.requirement_id
    }

    /// Plain-language description of the requirement.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Analyst-hours when the requirement is handled entirely by hand.
    #[must_use]
    pub fn baseline_manual_hours(&self) -> f64 {
        self.baseline_manual_hours
    }

    /// Automation level assumed when no override is supplied.
    #[must_use]
    pub fn default_automation_level(&self) -> AutomationLevel {
        self.default_automation_level
    }
}

struct FrameworkEntry {
    version: String,
    requirements: Vec<FrameworkRequirement>,
}

/// Registry of framework requirement catalogues.
///
/// Populated with the built-in frameworks at construction; additional
/// catalogues can be registered at process start. Requirement order within a
/// framework is stable and is the order reports are emitted in.
#[derive(Default)]
pub struct FrameworkCatalogue {
    frameworks: BTreeMap<String, FrameworkEntry>,
}

impl std::fmt::Debug for FrameworkCatalogue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameworkCatalogue")
            .field("registered", &self.frameworks())
            .finish()
    }
}

impl FrameworkCatalogue {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a catalogue holding the built-in frameworks: `eu_ai_act`,
    /// `gdpr`, `hipaa`, and `soc2`.
    ///
    /// # Panics
    ///
    /// Panics if a built-in registers twice, which would be a programming
    /// error in this crate.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut catalogue = Self::empty();
        for (framework, version, requirements) in catalogues::builtins() {
            catalogue
                .register(framework, version, requirements)
                .expect("builtin frameworks register once");
        }
        catalogue
    }

    /// Registers a framework catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`ComplianceError::DuplicateFramework`] when the identifier is
    /// already registered.
    pub fn register(
        &mut self,
        framework: impl Into<String>,
        version: impl Into<String>,
        requirements: Vec<FrameworkRequirement>,
    ) -> ComplianceResult<()> {
        let framework = framework.into();
        if self.frameworks.contains_key(&framework) {
            return Err(ComplianceError::DuplicateFramework { framework });
        }

        debug!(framework = %framework, count = requirements.len(), "registering framework catalogue");
        self.frameworks.insert(
            framework,
            FrameworkEntry {
                version: version.into(),
                requirements,
            },
        );
        Ok(())
    }

    /// Returns the ordered requirement rows for a framework.
    ///
    /// # Errors
    ///
    /// Returns [`ComplianceError::UnknownFramework`] listing the available
    /// identifiers when the framework is not registered.
    pub fn requirements(&self, framework: &str) -> ComplianceResult<&[FrameworkRequirement]> {
        self.entry(framework)
            .map(|entry| entry.requirements.as_slice())
    }

    /// Returns the catalogue revision string for a framework.
    ///
    /// # Errors
    ///
    /// Returns [`ComplianceError::UnknownFramework`] when the framework is
    /// not registered.
    pub fn version(&self, framework: &str) -> ComplianceResult<&str> {
        self.entry(framework).map(|entry| entry.version.as_str())
    }

    /// Lists registered framework identifiers, sorted.
    #[must_use]
    pub fn frameworks(&self) -> Vec<String> {
        self.frameworks.keys().cloned().collect()
    }

    fn entry(&self, framework: &str) -> ComplianceResult<&FrameworkEntry> {
        self.frameworks
            .get(framework)
            .ok_or_else(|| ComplianceError::UnknownFramework {
                framework: framework.to_owned(),
                available: self.frameworks().join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_four_frameworks() {
        let catalogue = FrameworkCatalogue::with_builtins();
        assert_eq!(
            catalogue.frameworks(),
            vec!["eu_ai_act", "gdpr", "hipaa", "soc2"]
        );
        assert_eq!(catalogue.requirements("eu_ai_act").unwrap().len(), 12);
        assert_eq!(catalogue.requirements("gdpr").unwrap().len(), 12);
        assert_eq!(catalogue.requirements("hipaa").unwrap().len(), 12);
        assert_eq!(catalogue.requirements("soc2").unwrap().len(), 5);
    }

    #[test]
    fn unknown_framework_lists_available_ids() {
        let catalogue = FrameworkCatalogue::with_builtins();
        let err = catalogue
            .requirements("pci_dss")
            .expect_err("unknown framework should error");
        let rendered = err.to_string();
        assert!(rendered.contains("pci_dss"));
        assert!(rendered.contains("gdpr"));
    }

    #[test]
    fn duplicate_registration_errors() {
        let mut catalogue = FrameworkCatalogue::with_builtins();
        let err = catalogue
            .register("gdpr", "2018", Vec::new())
            .expect_err("duplicate should fail");
        assert!(matches!(err, ComplianceError::DuplicateFramework { framework } if framework == "gdpr"));
    }

    #[test]
    fn requirement_ids_are_unique_within_each_framework() {
        let catalogue = FrameworkCatalogue::with_builtins();
        for framework in catalogue.frameworks() {
            let requirements = catalogue.requirements(&framework).unwrap();
            let mut ids: Vec<_> = requirements
                .iter()
                .map(FrameworkRequirement::requirement_id)
                .collect();
            ids.sort_unstable();
            let before = ids.len();
            ids.dedup();
            assert_eq!(ids.len(), before, "duplicate ids in {framework}");
        }
    }
}
