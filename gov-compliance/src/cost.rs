//! Compliance cost estimation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::framework::{
    AutomationLevel, ComplianceError, ComplianceResult, FrameworkCatalogue,
};

/// Default labour rate in currency units per hour.
pub const DEFAULT_HOURLY_RATE: f64 = 150.0;

/// Hour-reduction multipliers per automation level.
///
/// A policy knob, not a structural invariant — but the ordering
/// `0 <= fully_automated <= semi_automated <= 1.0` is enforced so automation
/// can never increase hours, and the manual multiplier is fixed at `1.0`
/// (a manual scenario performs no hour reduction).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutomationMultipliers {
    fully_automated: f64,
    semi_automated: f64,
}

impl Default for AutomationMultipliers {
    fn default() -> Self {
        Self {
            fully_automated: 0.1,
            semi_automated: 0.35,
        }
    }
}

impl AutomationMultipliers {
    /// Creates a validated multiplier pair.
    ///
    /// # Errors
    ///
    /// Returns [`ComplianceError::InvalidMultipliers`] when the ordering
    /// `0 <= fully_automated <= semi_automated <= 1.0` does not hold.
    pub fn new(fully_automated: f64, semi_automated: f64) -> ComplianceResult<Self> {
        if !(0.0..=1.0).contains(&fully_automated)
            || !(0.0..=1.0).contains(&semi_automated)
            || fully_automated > semi_automated
        {
            return Err(ComplianceError::InvalidMultipliers {
                reason: format!(
                    "require 0 <= fully_automated ({fully_automated}) <= semi_automated ({semi_automated}) <= 1.0"
                ),
            });
        }
        Ok(Self {
            fully_automated,
            semi_automated,
        })
    }

    /// Returns the hour multiplier for an automation level.
    #[must_use]
    pub fn multiplier(&self, level: AutomationLevel) -> f64 {
        match level {
            AutomationLevel::FullyAutomated => self.fully_automated,
            AutomationLevel::SemiAutomated => self.semi_automated,
            AutomationLevel::Manual => 1.0,
        }
    }
}

/// Per-requirement line of a cost report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementCostDetail {
    /// The requirement's catalogue identifier.
    pub requirement_id: String,
    /// Plain-language description of the requirement.
    pub description: String,
    /// Effective automation level used for this line.
    pub automation_level: AutomationLevel,
    /// Analyst-hours when handled entirely by hand.
    pub hours_manual: f64,
    /// Analyst-hours under the effective automation level.
    pub hours_automated: f64,
    /// Cost when handled manually.
    pub cost_manual: f64,
    /// Cost under the effective automation level.
    pub cost_automated: f64,
    /// `cost_manual - cost_automated`; zero when the level is manual.
    pub savings: f64,
}

/// Cost-of-compliance report for one framework and automation scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCostReport {
    framework: String,
    total_requirements: usize,
    automated_count: usize,
    semi_automated_count: usize,
    manual_count: usize,
    total_hours_manual: f64,
    total_hours_automated: f64,
    total_cost_manual: f64,
    total_cost_with_automation: f64,
    savings_percentage: f64,
    hourly_rate: f64,
    requirement_details: Vec<RequirementCostDetail>,
}

impl ComplianceCostReport {
    /// The framework being reported on.
    #[must_use]
    pub fn framework(&self) -> &str {
        &self.framework
    }

    /// Number of requirements in the framework catalogue.
    #[must_use]
    pub fn total_requirements(&self) -> usize {
        self.total_requirements
    }

    /// Requirements fully automated in this scenario.
    #[must_use]
    pub fn automated_count(&self) -> usize {
        self.automated_count
    }

    /// Requirements semi-automated in this scenario.
    #[must_use]
    pub fn semi_automated_count(&self) -> usize {
        self.semi_automated_count
    }

    /// Requirements handled manually in this scenario.
    #[must_use]
    pub fn manual_count(&self) -> usize {
        self.manual_count
    }

    /// Sum of manual-mode hours across all requirements.
    #[must_use]
    pub fn total_hours_manual(&self) -> f64 {
        self.total_hours_manual
    }

    /// Sum of scenario hours across all requirements.
    #[must_use]
    pub fn total_hours_automated(&self) -> f64 {
        self.total_hours_automated
    }

    /// Total cost under fully manual handling.
    #[must_use]
    pub fn total_cost_manual(&self) -> f64 {
        self.total_cost_manual
    }

    /// Total cost under the scenario's automation levels.
    #[must_use]
    pub fn total_cost_with_automation(&self) -> f64 {
        self.total_cost_with_automation
    }

    /// Percentage cost reduction; zero when the manual cost is zero.
    #[must_use]
    pub fn savings_percentage(&self) -> f64 {
        self.savings_percentage
    }

    /// Hourly rate the report was computed with.
    #[must_use]
    pub fn hourly_rate(&self) -> f64 {
        self.hourly_rate
    }

    /// Per-requirement lines in catalogue order.
    #[must_use]
    pub fn requirement_details(&self) -> &[RequirementCostDetail] {
        &self.requirement_details
    }

    /// One-line human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "framework={} requirements={} manual_cost={:.0} automated_cost={:.0} savings={:.1}%",
            self.framework,
            self.total_requirements,
            self.total_cost_manual,
            self.total_cost_with_automation,
            self.savings_percentage
        )
    }
}

/// A labelled automation scenario for comparison runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostScenario {
    /// Human-readable scenario name.
    pub label: String,
    /// Per-requirement automation-level overrides.
    #[serde(default)]
    pub coverage: HashMap<String, AutomationLevel>,
}

/// Comparison of multiple automation scenarios for one framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    framework: String,
    scenarios: Vec<(String, ComplianceCostReport)>,
}

impl ComparisonReport {
    /// The framework being compared.
    #[must_use]
    pub fn framework(&self) -> &str {
        &self.framework
    }

    /// Labelled reports in input order.
    #[must_use]
    pub fn scenarios(&self) -> &[(String, ComplianceCostReport)] {
        &self.scenarios
    }

    /// The scenario with the lowest automated cost, when any exist.
    #[must_use]
    pub fn best_scenario(&self) -> Option<&(String, ComplianceCostReport)> {
        self.scenarios.iter().min_by(|a, b| {
            a.1.total_cost_with_automation
                .total_cmp(&b.1.total_cost_with_automation)
        })
    }
}

/// Turns a framework's requirement catalogue plus automation overrides into a
/// cost/savings report.
#[derive(Debug, Clone)]
pub struct CostCalculator {
    catalogue: Arc<FrameworkCatalogue>,
    multipliers: AutomationMultipliers,
}

impl CostCalculator {
    /// Creates a calculator over the supplied catalogue with default
    /// multipliers.
    #[must_use]
    pub fn new(catalogue: Arc<FrameworkCatalogue>) -> Self {
        Self {
            catalogue,
            multipliers: AutomationMultipliers::default(),
        }
    }

    /// Replaces the multiplier knob.
    #[must_use]
    pub fn with_multipliers(mut self, multipliers: AutomationMultipliers) -> Self {
        self.multipliers = multipliers;
        self
    }

    /// Generates a cost report for a framework under the given overrides.
    ///
    /// The effective level for each requirement is its override when present,
    /// else the catalogue default. Overrides naming unknown requirement ids
    /// are ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ComplianceError::UnknownFramework`] for an unregistered
    /// framework and [`ComplianceError::InvalidHourlyRate`] for a
    /// non-positive rate.
    pub fn generate(
        &self,
        framework: &str,
        overrides: &HashMap<String, AutomationLevel>,
        hourly_rate: f64,
    ) -> ComplianceResult<ComplianceCostReport> {
        if hourly_rate <= 0.0 {
            return Err(ComplianceError::InvalidHourlyRate { rate: hourly_rate });
        }
        let requirements = self.catalogue.requirements(framework)?;

        for id in overrides.keys() {
            if !requirements.iter().any(|r| r.requirement_id() == id) {
                warn!(framework, requirement_id = %id, "override names unknown requirement; ignoring");
            }
        }

        let mut automated_count = 0;
        let mut semi_automated_count = 0;
        let mut manual_count = 0;
        let mut total_hours_manual = 0.0;
        let mut total_hours_automated = 0.0;
        let mut details = Vec::with_capacity(requirements.len());

        for requirement in requirements {
            let level = overrides
                .get(requirement.requirement_id())
                .copied()
                .unwrap_or_else(|| requirement.default_automation_level());

            match level {
                AutomationLevel::FullyAutomated => automated_count += 1,
                AutomationLevel::SemiAutomated => semi_automated_count += 1,
                AutomationLevel::Manual => manual_count += 1,
            }

            let hours_manual = requirement.baseline_manual_hours();
            let hours_automated = hours_manual * self.multipliers.multiplier(level);
            let cost_manual = hours_manual * hourly_rate;
            let cost_automated = hours_automated * hourly_rate;

            total_hours_manual += hours_manual;
            total_hours_automated += hours_automated;

            details.push(RequirementCostDetail {
                requirement_id: requirement.requirement_id().to_owned(),
                description: requirement.description().to_owned(),
                automation_level: level,
                hours_manual,
                hours_automated,
                cost_manual,
                cost_automated,
                savings: cost_manual - cost_automated,
            });
        }

        let total_cost_manual = total_hours_manual * hourly_rate;
        let total_cost_with_automation = total_hours_automated * hourly_rate;
        let savings_percentage = if total_cost_manual > 0.0 {
            100.0 * (total_cost_manual - total_cost_with_automation) / total_cost_manual
        } else {
            0.0
        };

        Ok(ComplianceCostReport {
            framework: framework.to_owned(),
            total_requirements: requirements.len(),
            automated_count,
            semi_automated_count,
            manual_count,
            total_hours_manual,
            total_hours_automated,
            total_cost_manual,
            total_cost_with_automation,
            savings_percentage,
            hourly_rate,
            requirement_details: details,
        })
    }

    /// Compares multiple automation scenarios for the same framework.
    ///
    /// # Errors
    ///
    /// Propagates the same errors as [`CostCalculator::generate`].
    pub fn compare(
        &self,
        framework: &str,
        scenarios: &[CostScenario],
        hourly_rate: f64,
    ) -> ComplianceResult<ComparisonReport> {
        let mut labelled = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let report = self.generate(framework, &scenario.coverage, hourly_rate)?;
            labelled.push((scenario.label.clone(), report));
        }
        Ok(ComparisonReport {
            framework: framework.to_owned(),
            scenarios: labelled,
        })
    }
}
