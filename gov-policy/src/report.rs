//! Aggregated evaluation reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gov_primitives::{AgentAction, Severity};

use crate::verdict::RuleVerdict;

/// Complete result of evaluating one action against one policy.
///
/// Constructed once per evaluation call and never mutated; the aggregate
/// fields are computed at construction so the invariants hold for the
/// report's whole lifetime:
/// `passed` iff every verdict passed (vacuously true with zero verdicts),
/// `violation_count` = number of failed verdicts, and `highest_severity` is
/// the maximum severity among failed verdicts (`"none"` on the wire iff
/// there are no failures).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    policy_name: String,
    action: AgentAction,
    verdicts: Vec<RuleVerdict>,
    passed: bool,
    timestamp: DateTime<Utc>,
    violation_count: usize,
    #[serde(with = "severity_or_none")]
    highest_severity: Option<Severity>,
}

impl ComplianceReport {
    /// Builds a report from verdicts collected in rule order.
    #[must_use]
    pub fn new(
        policy_name: impl Into<String>,
        action: AgentAction,
        verdicts: Vec<RuleVerdict>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let passed = verdicts.iter().all(RuleVerdict::passed);
        let violation_count = verdicts.iter().filter(|v| !v.passed()).count();
        let highest_severity = verdicts
            .iter()
            .filter(|v| !v.passed())
            .map(RuleVerdict::severity)
            .max();

        Self {
            policy_name: policy_name.into(),
            action,
            verdicts,
            passed,
            timestamp,
            violation_count,
            highest_severity,
        }
    }

    /// Name of the policy that produced this report.
    #[must_use]
    pub fn policy_name(&self) -> &str {
        &self.policy_name
    }

    /// The action that was evaluated, echoed back.
    #[must_use]
    pub fn action(&self) -> &AgentAction {
        &self.action
    }

    /// All verdicts, in policy rule order.
    #[must_use]
    pub fn verdicts(&self) -> &[RuleVerdict] {
        &self.verdicts
    }

    /// The verdicts that flagged a violation.
    pub fn failed_verdicts(&self) -> impl Iterator<Item = &RuleVerdict> {
        self.verdicts.iter().filter(|v| !v.passed())
    }

    /// The verdicts that passed.
    pub fn passed_verdicts(&self) -> impl Iterator<Item = &RuleVerdict> {
        self.verdicts.iter().filter(|v| v.passed())
    }

    /// True only when every verdict passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// UTC wall-clock time the evaluation completed.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Number of rules that flagged a violation.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.violation_count
    }

    /// Highest severity among failed verdicts; `None` when nothing failed.
    #[must_use]
    pub fn highest_severity(&self) -> Option<Severity> {
        self.highest_severity
    }

    /// One-line human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let status = if self.passed { "PASS" } else { "FAIL" };
        let severity = self
            .highest_severity
            .map_or("none", Severity::as_str);
        format!(
            "[{status}] policy=`{}` violations={} highest_severity={severity}",
            self.policy_name, self.violation_count
        )
    }
}

/// Serializes the highest severity as `"none"` when no verdict failed, per
/// the wire contract.
mod severity_or_none {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use gov_primitives::Severity;

    pub fn serialize<S>(value: &Option<Severity>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(severity) => serializer.serialize_str(severity.as_str()),
            None => serializer.serialize_str("none"),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Severity>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw == "none" {
            return Ok(None);
        }
        raw.parse::<Severity>().map(Some).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn verdict(name: &str, passed: bool, severity: Severity) -> RuleVerdict {
        RuleVerdict::new(name, passed, severity, "", Map::new())
    }

    fn report(verdicts: Vec<RuleVerdict>) -> ComplianceReport {
        ComplianceReport::new("standard", AgentAction::default(), verdicts, Utc::now())
    }

    #[test]
    fn empty_report_passes_vacuously() {
        let report = report(Vec::new());
        assert!(report.passed());
        assert_eq!(report.violation_count(), 0);
        assert_eq!(report.highest_severity(), None);
    }

    #[test]
    fn one_failure_fails_the_report() {
        let report = report(vec![
            verdict("a", true, Severity::Low),
            verdict("b", false, Severity::High),
            verdict("c", true, Severity::Critical),
        ]);
        assert!(!report.passed());
        assert_eq!(report.violation_count(), 1);
        // Severity of passing verdicts never contributes.
        assert_eq!(report.highest_severity(), Some(Severity::High));
        assert_eq!(report.failed_verdicts().count(), 1);
        assert_eq!(report.passed_verdicts().count(), 2);
    }

    #[test]
    fn highest_severity_uses_ordering_over_failures() {
        let report = report(vec![
            verdict("a", false, Severity::Medium),
            verdict("b", false, Severity::Critical),
            verdict("c", false, Severity::Low),
        ]);
        assert_eq!(report.highest_severity(), Some(Severity::Critical));
        assert_eq!(report.violation_count(), 3);
    }

    #[test]
    fn wire_format_renders_none_sentinel() {
        let clean = report(vec![verdict("a", true, Severity::High)]);
        let value = serde_json::to_value(&clean).unwrap();
        assert_eq!(value["highest_severity"], "none");
        assert_eq!(value["passed"], true);
        assert_eq!(value["violation_count"], 0);

        let parsed: ComplianceReport = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.highest_severity(), None);
    }

    #[test]
    fn summary_is_one_line() {
        let failing = report(vec![verdict("a", false, Severity::High)]);
        let line = failing.summary();
        assert!(line.contains("FAIL"));
        assert!(line.contains("violations=1"));
        assert!(line.contains("highest_severity=high"));
    }
}
