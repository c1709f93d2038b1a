//! Regulatory framework catalogues, evidence scoring, and cost estimation.
//!
//! One requirement catalogue per framework is the single source of truth for
//! both evidence-based checks and automation cost reports. Hour figures are
//! generic industry benchmarks, configurable at registration time; they are
//! data, not engine logic.

#![warn(missing_docs, clippy::pedantic)]

mod catalogues;
mod check;
mod cost;
mod framework;

/// Evidence scoring types and results.
pub use check::{EvidenceItem, EvidenceStatus, FrameworkReport, RequirementCheck};
/// Cost estimation types and the calculator.
pub use cost::{
    AutomationMultipliers, ComparisonReport, ComplianceCostReport, CostCalculator, CostScenario,
    DEFAULT_HOURLY_RATE, RequirementCostDetail,
};
/// Framework catalogue and requirement rows.
pub use framework::{
    AutomationLevel, ComplianceError, ComplianceResult, FrameworkCatalogue, FrameworkRequirement,
};
