//! Registry mapping rule-type identifiers to evaluator implementations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use gov_primitives::AgentAction;

use crate::condition::ConditionRule;
use crate::cost::CostLimitRule;
use crate::keyword::KeywordBlockRule;
use crate::pii::PiiCheckRule;
use crate::role::RoleCheckRule;

/// Result alias for catalogue operations.
pub type CatalogueResult<T> = Result<T, CatalogueError>;

/// Errors produced by catalogue registration.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// Rule type collided with an existing registration.
    #[error("rule type `{rule_type}` is already registered")]
    DuplicateRule {
        /// Name of the offending rule type.
        rule_type: String,
    },

    /// Rule type identifier failed validation.
    #[error("invalid rule type identifier: {reason}")]
    InvalidRuleType {
        /// Human-readable reason for rejection.
        reason: &'static str,
    },
}

/// Fault raised by an evaluator while examining an action.
///
/// Faults are contained per rule by the evaluation engine: they become a
/// failing verdict at the rule's configured severity, never an aborted
/// evaluation.
#[derive(Debug, Error)]
#[error("rule evaluation fault: {reason}")]
pub struct EvaluationFault {
    /// Human-readable explanation of the fault.
    pub reason: String,
}

impl EvaluationFault {
    /// Creates a fault from a string-like reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Raw result of one evaluator run, before the engine attaches the rule name
/// and configured severity.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    passed: bool,
    message: String,
    details: Map<String, Value>,
}

impl RuleOutcome {
    /// A passing outcome; passing outcomes carry no message.
    #[must_use]
    pub fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
            details: Map::new(),
        }
    }

    /// A passing outcome with structured context.
    #[must_use]
    pub fn pass_with_details(details: Map<String, Value>) -> Self {
        Self {
            passed: true,
            message: String::new(),
            details,
        }
    }

    /// A failing outcome with an explanatory message.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: Map::new(),
        }
    }

    /// A failing outcome with structured context.
    #[must_use]
    pub fn fail_with_details(message: impl Into<String>, details: Map<String, Value>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details,
        }
    }

    /// Whether the action satisfied the rule.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Explanatory message; empty when the outcome passed.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured context for the verdict (matched spans, offending values).
    #[must_use]
    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    /// Consumes the outcome, returning `(passed, message, details)`.
    #[must_use]
    pub fn into_parts(self) -> (bool, String, Map<String, Value>) {
        (self.passed, self.message, self.details)
    }
}

/// Trait implemented by every rule evaluator.
///
/// Evaluators are pure: they hold no mutable state and may be invoked
/// concurrently from any number of evaluation calls.
pub trait RuleEvaluator: Send + Sync {
    /// Evaluates an action against this rule using the supplied params.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationFault`] when the evaluator cannot examine the
    /// action at all (e.g. structurally unusable params). The engine converts
    /// faults into failing verdicts.
    fn evaluate(
        &self,
        action: &AgentAction,
        params: &Map<String, Value>,
    ) -> Result<RuleOutcome, EvaluationFault>;

    /// Validates the params a policy supplies for this rule type, returning
    /// every problem found. An empty list means the params are usable.
    fn validate_params(&self, params: &Map<String, Value>) -> Vec<String> {
        let _ = params;
        Vec::new()
    }
}

/// Registry that stores rule evaluators keyed by their type string.
#[derive(Default)]
pub struct RuleCatalogue {
    inner: RwLock<HashMap<String, Arc<dyn RuleEvaluator>>>,
}

impl std::fmt::Debug for RuleCatalogue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleCatalogue")
            .field("registered", &self.types())
            .finish()
    }
}

impl RuleCatalogue {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalogue pre-populated with the built-in rule types:
    /// `pii_check`, `role_check`, `cost_limit`, `keyword_block`, and
    /// `condition`.
    ///
    /// # Panics
    ///
    /// Panics if a built-in registers twice, which would be a programming
    /// error in this crate.
    #[must_use]
    pub fn with_builtins() -> Self {
        let catalogue = Self::new();
        catalogue
            .register(PiiCheckRule::TYPE, PiiCheckRule::default())
            .expect("builtin pii_check registers once");
        catalogue
            .register(RoleCheckRule::TYPE, RoleCheckRule::default())
            .expect("builtin role_check registers once");
        catalogue
            .register(CostLimitRule::TYPE, CostLimitRule::default())
            .expect("builtin cost_limit registers once");
        catalogue
            .register(KeywordBlockRule::TYPE, KeywordBlockRule::default())
            .expect("builtin keyword_block registers once");
        catalogue
            .register(ConditionRule::TYPE, ConditionRule::default())
            .expect("builtin condition registers once");
        catalogue
    }

    /// Registers an evaluator under the supplied rule-type string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::DuplicateRule`] when the type is already
    /// registered, or [`CatalogueError::InvalidRuleType`] for an empty name.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    pub fn register<E>(&self, rule_type: impl Into<String>, evaluator: E) -> CatalogueResult<()>
    where
        E: RuleEvaluator + 'static,
    {
        let rule_type = rule_type.into();
        if rule_type.trim().is_empty() {
            return Err(CatalogueError::InvalidRuleType {
                reason: "rule type cannot be empty",
            });
        }

        let mut inner = self.inner.write().expect("rule catalogue poisoned");
        if inner.contains_key(&rule_type) {
            return Err(CatalogueError::DuplicateRule { rule_type });
        }

        debug!(rule_type = %rule_type, "registering rule evaluator");
        inner.insert(rule_type, Arc::new(evaluator));
        Ok(())
    }

    /// Returns the evaluator registered for the supplied rule type.
    #[must_use]
    pub fn lookup(&self, rule_type: &str) -> Option<Arc<dyn RuleEvaluator>> {
        let inner = self.inner.read().ok()?;
        inner.get(rule_type).cloned()
    }

    /// Lists the registered rule-type identifiers, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    #[must_use]
    pub fn types(&self) -> Vec<String> {
        let inner = self.inner.read().expect("rule catalogue poisoned");
        let mut names: Vec<_> = inner.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysPass;

    impl RuleEvaluator for AlwaysPass {
        fn evaluate(
            &self,
            _action: &AgentAction,
            _params: &Map<String, Value>,
        ) -> Result<RuleOutcome, EvaluationFault> {
            Ok(RuleOutcome::pass())
        }
    }

    #[test]
    fn builtins_are_registered() {
        let catalogue = RuleCatalogue::with_builtins();
        assert_eq!(
            catalogue.types(),
            vec![
                "condition",
                "cost_limit",
                "keyword_block",
                "pii_check",
                "role_check"
            ]
        );
        assert!(catalogue.lookup("cost_limit").is_some());
        assert!(catalogue.lookup("no_such_rule").is_none());
    }

    #[test]
    fn duplicate_registration_errors() {
        let catalogue = RuleCatalogue::new();
        catalogue.register("custom", AlwaysPass).unwrap();
        let err = catalogue
            .register("custom", AlwaysPass)
            .expect_err("duplicate registration should fail");
        assert!(matches!(err, CatalogueError::DuplicateRule { rule_type } if rule_type == "custom"));
    }

    #[test]
    fn empty_rule_type_is_rejected() {
        let catalogue = RuleCatalogue::new();
        let err = catalogue
            .register("  ", AlwaysPass)
            .expect_err("blank rule type should fail");
        assert!(matches!(err, CatalogueError::InvalidRuleType { .. }));
    }

    #[test]
    fn custom_evaluator_is_callable_through_lookup() {
        let catalogue = RuleCatalogue::new();
        catalogue.register("custom", AlwaysPass).unwrap();
        let evaluator = catalogue.lookup("custom").unwrap();
        let outcome = evaluator
            .evaluate(&AgentAction::default(), &Map::new())
            .unwrap();
        assert!(outcome.passed());
        assert!(outcome.message().is_empty());
    }
}
