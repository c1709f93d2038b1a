//! The rule-walking evaluation engine.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, json};
use tracing::{debug, info};

use gov_primitives::{AgentAction, Severity};
use gov_rules::RuleCatalogue;

use crate::config::Policy;
use crate::report::ComplianceReport;
use crate::validation::PolicyValidation;
use crate::verdict::RuleVerdict;

/// Runs every enabled rule of a policy against an agent action.
///
/// Evaluation has no side effects beyond its return value; appending to the
/// audit trail is the caller's responsibility.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    catalogue: Arc<RuleCatalogue>,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(Arc::new(RuleCatalogue::with_builtins()))
    }
}

impl PolicyEngine {
    /// Creates an engine over the supplied rule catalogue.
    #[must_use]
    pub fn new(catalogue: Arc<RuleCatalogue>) -> Self {
        Self { catalogue }
    }

    /// Returns the catalogue this engine resolves rule types against.
    #[must_use]
    pub fn catalogue(&self) -> &Arc<RuleCatalogue> {
        &self.catalogue
    }

    /// Evaluates an action against all enabled rules in policy order.
    ///
    /// Fail-closed behavior: an unregistered rule type produces a failing
    /// verdict at `critical` severity, and an evaluator fault produces a
    /// failing verdict at the rule's configured severity — neither aborts
    /// evaluation of the remaining rules, and neither is ever skipped
    /// silently.
    #[must_use]
    pub fn evaluate(&self, policy: &Policy, action: &AgentAction) -> ComplianceReport {
        let timestamp = Utc::now();
        let mut verdicts = Vec::new();

        for rule in policy.enabled_rules() {
            let verdict = match self.catalogue.lookup(rule.rule_type()) {
                None => RuleVerdict::fail(
                    rule.name(),
                    Severity::Critical,
                    format!(
                        "no evaluator registered for rule type `{}`",
                        rule.rule_type()
                    ),
                    Map::new(),
                ),
                Some(evaluator) => match evaluator.evaluate(action, rule.params()) {
                    Ok(outcome) => {
                        let (passed, message, details) = outcome.into_parts();
                        RuleVerdict::new(rule.name(), passed, rule.severity(), message, details)
                    }
                    Err(fault) => {
                        let mut details = Map::new();
                        details.insert("fault".into(), json!(fault.reason));
                        RuleVerdict::fail(
                            rule.name(),
                            rule.severity(),
                            format!("rule `{}` could not evaluate the action", rule.name()),
                            details,
                        )
                    }
                },
            };

            if !verdict.passed() {
                info!(
                    policy = policy.name(),
                    rule = rule.name(),
                    severity = %verdict.severity(),
                    "rule failed: {}",
                    verdict.message()
                );
            }
            verdicts.push(verdict);
        }

        let report = ComplianceReport::new(policy.name(), action.clone(), verdicts, timestamp);
        debug!(policy = policy.name(), "evaluation complete: {}", report.summary());
        report
    }

    /// Structurally validates a policy against the catalogue, returning every
    /// problem found: unregistered rule types, params the type's evaluator
    /// rejects, and duplicate rule names.
    #[must_use]
    pub fn validate(&self, policy: &Policy) -> PolicyValidation {
        let mut errors = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for rule in policy.rules() {
            if !seen.insert(rule.name().to_owned()) {
                errors.push(format!(
                    "duplicate rule name `{}` in policy `{}`",
                    rule.name(),
                    policy.name()
                ));
            }

            match self.catalogue.lookup(rule.rule_type()) {
                None => errors.push(format!(
                    "rule `{}` references unregistered type `{}`",
                    rule.name(),
                    rule.rule_type()
                )),
                Some(evaluator) => {
                    for problem in evaluator.validate_params(rule.params()) {
                        errors.push(format!("rule `{}`: {problem}", rule.name()));
                    }
                }
            }
        }

        PolicyValidation::new(errors, policy.enabled_rules().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::config::RuleConfig;

    fn action(value: serde_json::Value) -> AgentAction {
        serde_json::from_value(value).unwrap()
    }

    fn spend_policy(max_cost: f64) -> Policy {
        Policy::new("spend-guard").with_rule(
            RuleConfig::new("limit-spend", "cost_limit")
                .with_severity(Severity::High)
                .with_param("max_cost", json!(max_cost)),
        )
    }

    #[test]
    fn failing_rule_fails_the_report() {
        let engine = PolicyEngine::default();
        let report = engine.evaluate(&spend_policy(0.05), &action(json!({"cost": 0.10})));

        assert!(!report.passed());
        assert_eq!(report.violation_count(), 1);
        assert_eq!(report.highest_severity(), Some(Severity::High));
        assert_eq!(report.verdicts()[0].rule_name(), "limit-spend");
    }

    #[test]
    fn passing_rule_passes_the_report() {
        let engine = PolicyEngine::default();
        let report = engine.evaluate(&spend_policy(0.05), &action(json!({"cost": 0.01})));

        assert!(report.passed());
        assert_eq!(report.violation_count(), 0);
        assert_eq!(report.highest_severity(), None);
    }

    #[test]
    fn disabled_rule_produces_no_verdict() {
        let engine = PolicyEngine::default();
        let policy = Policy::new("mixed")
            .with_rule(
                RuleConfig::new("limit-spend", "cost_limit").with_param("max_cost", json!(1.0)),
            )
            .with_rule(
                RuleConfig::new("pii-scan", "pii_check").disabled(),
            );

        let report = engine.evaluate(&policy, &action(json!({"cost": 0.5})));
        assert_eq!(report.verdicts().len(), 1);
        assert_eq!(report.verdicts()[0].rule_name(), "limit-spend");
    }

    #[test]
    fn unregistered_type_is_a_critical_failure_and_does_not_abort() {
        let engine = PolicyEngine::default();
        let policy = Policy::new("mixed")
            .with_rule(RuleConfig::new("mystery", "quantum_check"))
            .with_rule(
                RuleConfig::new("limit-spend", "cost_limit").with_param("max_cost", json!(1.0)),
            );

        let report = engine.evaluate(&policy, &action(json!({"cost": 0.5})));
        assert!(!report.passed());
        assert_eq!(report.verdicts().len(), 2);

        let mystery = &report.verdicts()[0];
        assert!(!mystery.passed());
        assert_eq!(mystery.severity(), Severity::Critical);
        assert!(mystery.message().contains("quantum_check"));

        // The later rule still ran.
        assert!(report.verdicts()[1].passed());
        assert_eq!(report.highest_severity(), Some(Severity::Critical));
    }

    #[test]
    fn evaluator_fault_becomes_failing_verdict_at_rule_severity() {
        let engine = PolicyEngine::default();
        // role_check with no allowed_roles param faults at evaluation time.
        let policy = Policy::new("broken").with_rule(
            RuleConfig::new("role-gate", "role_check").with_severity(Severity::Low),
        );

        let report = engine.evaluate(&policy, &action(json!({"agent_role": "ops"})));
        assert!(!report.passed());
        let verdict = &report.verdicts()[0];
        assert_eq!(verdict.severity(), Severity::Low);
        assert!(verdict.details()["fault"]
            .as_str()
            .unwrap()
            .contains("allowed_roles"));
    }

    #[test]
    fn verdict_order_matches_rule_order() {
        let engine = PolicyEngine::default();
        let policy = Policy::new("ordered")
            .with_rule(RuleConfig::new("b-first", "cost_limit").with_param("max_cost", json!(1.0)))
            .with_rule(
                RuleConfig::new("a-second", "keyword_block")
                    .with_param("keywords", json!(["forbidden"])),
            );

        let report = engine.evaluate(&policy, &action(json!({"cost": 0.5, "query": "ok"})));
        let names: Vec<_> = report.verdicts().iter().map(RuleVerdict::rule_name).collect();
        assert_eq!(names, vec!["b-first", "a-second"]);
    }

    #[test]
    fn validate_collects_every_problem() {
        let engine = PolicyEngine::default();
        let policy = Policy::new("broken")
            .with_rule(RuleConfig::new("gate", "role_check"))
            .with_rule(RuleConfig::new("gate", "quantum_check"))
            .with_rule(RuleConfig::new("words", "keyword_block").disabled());

        let validation = engine.validate(&policy);
        assert!(!validation.valid());
        assert_eq!(validation.enabled_rule_count(), 2);

        let errors = validation.errors();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.contains("allowed_roles")));
        assert!(errors.iter().any(|e| e.contains("duplicate rule name")));
        assert!(errors.iter().any(|e| e.contains("unregistered type")));
        // Disabled rules are still validated.
        assert!(errors.iter().any(|e| e.contains("keywords")));
    }

    #[test]
    fn validate_is_idempotent() {
        let engine = PolicyEngine::default();
        let policy = spend_policy(0.05);
        let first = engine.validate(&policy);
        let second = engine.validate(&policy);
        assert_eq!(first, second);
        assert!(first.valid());
        assert_eq!(first.enabled_rule_count(), 1);
    }
}
