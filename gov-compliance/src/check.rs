//! Evidence-based framework checks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::framework::{ComplianceResult, FrameworkCatalogue};

/// Status of the evidence supplied for one requirement.
///
/// `Skip` is distinct from `Fail`: insufficient evidence is reported as
/// not-evaluable, never as a known violation — and never as a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    /// The requirement is demonstrably satisfied.
    Pass,
    /// The requirement is demonstrably violated.
    Fail,
    /// No usable evidence was supplied.
    Skip,
}

/// Evidence supplied for one requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Evaluated status of the requirement.
    pub status: EvidenceStatus,
    /// Free-text explanation of how the status was determined.
    #[serde(default)]
    pub evidence: String,
}

impl EvidenceItem {
    /// Passing evidence with an explanation.
    #[must_use]
    pub fn pass(evidence: impl Into<String>) -> Self {
        Self {
            status: EvidenceStatus::Pass,
            evidence: evidence.into(),
        }
    }

    /// Failing evidence with an explanation.
    #[must_use]
    pub fn fail(evidence: impl Into<String>) -> Self {
        Self {
            status: EvidenceStatus::Fail,
            evidence: evidence.into(),
        }
    }

    /// Explicitly skipped evidence.
    #[must_use]
    pub fn skip() -> Self {
        Self {
            status: EvidenceStatus::Skip,
            evidence: String::new(),
        }
    }
}

/// Result of checking one catalogue requirement against evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementCheck {
    /// The requirement's catalogue identifier.
    pub requirement_id: String,
    /// Plain-language description of the requirement.
    pub description: String,
    /// Evaluated status.
    pub status: EvidenceStatus,
    /// Free-text evidence carried through from the input.
    pub evidence: String,
}

/// Requirement-level report produced by a framework check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkReport {
    framework: String,
    results: Vec<RequirementCheck>,
    passed_count: usize,
    failed_count: usize,
    skipped_count: usize,
    score_percent: f64,
}

impl FrameworkReport {
    fn new(framework: String, results: Vec<RequirementCheck>) -> Self {
        let passed_count = count(&results, EvidenceStatus::Pass);
        let failed_count = count(&results, EvidenceStatus::Fail);
        let skipped_count = count(&results, EvidenceStatus::Skip);

        let evaluable = results.len() - skipped_count;
        #[allow(clippy::cast_precision_loss)]
        let score_percent = if evaluable == 0 {
            0.0
        } else {
            passed_count as f64 / evaluable as f64 * 100.0
        };

        Self {
            framework,
            results,
            passed_count,
            failed_count,
            skipped_count,
            score_percent,
        }
    }

    /// The framework that was checked.
    #[must_use]
    pub fn framework(&self) -> &str {
        &self.framework
    }

    /// One check per catalogue requirement, in catalogue order.
    #[must_use]
    pub fn results(&self) -> &[RequirementCheck] {
        &self.results
    }

    /// Requirements with passing evidence.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.passed_count
    }

    /// Requirements with failing evidence.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed_count
    }

    /// Requirements with no usable evidence.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped_count
    }

    /// Pass rate over the evaluable requirements, 0–100. Zero when nothing
    /// was evaluable.
    #[must_use]
    pub fn score_percent(&self) -> f64 {
        self.score_percent
    }
}

fn count(results: &[RequirementCheck], status: EvidenceStatus) -> usize {
    results.iter().filter(|r| r.status == status).count()
}

impl FrameworkCatalogue {
    /// Checks supplied evidence against every requirement of a framework.
    ///
    /// Requirements absent from the evidence map are reported as skipped and
    /// excluded from the score denominator.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ComplianceError::UnknownFramework`] when the
    /// framework is not registered.
    pub fn run_check(
        &self,
        framework: &str,
        evidence: &HashMap<String, EvidenceItem>,
    ) -> ComplianceResult<FrameworkReport> {
        let requirements = self.requirements(framework)?;

        let results = requirements
            .iter()
            .map(|requirement| {
                let (status, text) = match evidence.get(requirement.requirement_id()) {
                    Some(item) => (item.status, item.evidence.clone()),
                    None => (EvidenceStatus::Skip, "no evidence provided".to_owned()),
                };
                RequirementCheck {
                    requirement_id: requirement.requirement_id().to_owned(),
                    description: requirement.description().to_owned(),
                    status,
                    evidence: text,
                }
            })
            .collect();

        Ok(FrameworkReport::new(framework.to_owned(), results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(pairs: &[(&str, EvidenceItem)]) -> HashMap<String, EvidenceItem> {
        pairs
            .iter()
            .map(|(id, item)| ((*id).to_owned(), item.clone()))
            .collect()
    }

    #[test]
    fn absent_evidence_is_skipped_not_failed() {
        let catalogue = FrameworkCatalogue::with_builtins();
        let report = catalogue
            .run_check(
                "soc2",
                &evidence(&[
                    ("CC6_security", EvidenceItem::pass("MFA enforced")),
                    ("PI1_processing_integrity", EvidenceItem::fail("no batch checks")),
                ]),
            )
            .unwrap();

        assert_eq!(report.results().len(), 5);
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.skipped_count(), 3);
        // 1 pass over 2 evaluable requirements.
        assert!((report.score_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_evaluable_requirements_score_zero() {
        let catalogue = FrameworkCatalogue::with_builtins();
        let report = catalogue.run_check("soc2", &HashMap::new()).unwrap();
        assert_eq!(report.skipped_count(), 5);
        assert!(report.score_percent().abs() < f64::EPSILON);
    }

    #[test]
    fn results_follow_catalogue_order() {
        let catalogue = FrameworkCatalogue::with_builtins();
        let report = catalogue.run_check("soc2", &HashMap::new()).unwrap();
        let ids: Vec<_> = report
            .results()
            .iter()
            .map(|r| r.requirement_id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec![
                "CC6_security",
                "A1_availability",
                "PI1_processing_integrity",
                "C1_confidentiality",
                "P1_privacy"
            ]
        );
    }

    #[test]
    fn unknown_framework_is_an_error() {
        let catalogue = FrameworkCatalogue::with_builtins();
        assert!(catalogue.run_check("iso_27001", &HashMap::new()).is_err());
    }

    #[test]
    fn full_pass_scores_one_hundred() {
        let catalogue = FrameworkCatalogue::with_builtins();
        let all_pass: HashMap<_, _> = catalogue
            .requirements("soc2")
            .unwrap()
            .iter()
            .map(|r| (r.requirement_id().to_owned(), EvidenceItem::pass("ok")))
            .collect();
        let report = catalogue.run_check("soc2", &all_pass).unwrap();
        assert!((report.score_percent() - 100.0).abs() < f64::EPSILON);
    }
}
