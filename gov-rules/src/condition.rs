//! Compound boolean condition trees over agent actions.
//!
//! A condition is a tagged expression tree: typed leaf operators combined
//! with `all_of` (AND) / `any_of` (OR) nodes, evaluated by structural
//! recursion with explicit short-circuiting. The evaluation result records
//! which leaf decided the outcome so verdict details stay attributable.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use gov_primitives::AgentAction;

use crate::catalogue::{EvaluationFault, RuleEvaluator, RuleOutcome};
use crate::pii::PiiPatternSet;

/// A compound boolean expression evaluated against an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ConditionExpr {
    /// True when PII patterns match the named fields (or any string field).
    ContainsPii {
        /// Optional field paths to restrict the scan to.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fields: Option<Vec<String>>,
    },
    /// True when the regex matches the named string field.
    Matches {
        /// Dotted path of the field to test.
        field: String,
        /// Regex source applied to the field value.
        pattern: String,
    },
    /// True when the named numeric field exceeds the threshold.
    GreaterThan {
        /// Dotted path of the field to compare.
        field: String,
        /// Exclusive lower bound for the comparison.
        threshold: f64,
    },
    /// True when the named field's value is a member of the list.
    InList {
        /// Dotted path of the field to test.
        field: String,
        /// Accepted values, compared by JSON equality.
        values: Vec<Value>,
    },
    /// True when every child condition is true. Short-circuits on the first
    /// false child.
    AllOf {
        /// Child conditions evaluated in order.
        conditions: Vec<ConditionExpr>,
    },
    /// True when any child condition is true. Short-circuits on the first
    /// true child.
    AnyOf {
        /// Child conditions evaluated in order.
        conditions: Vec<ConditionExpr>,
    },
}

/// Result of one evaluated leaf operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafResult {
    /// Position of the leaf within the tree, e.g. `all_of[1].greater_than(cost)`.
    pub path: String,
    /// The leaf's boolean value.
    pub value: bool,
    /// Diagnostic for the leaf (empty when it evaluated cleanly).
    pub message: String,
    /// Whether the leaf could not be evaluated (missing field, bad pattern).
    pub error: bool,
}

/// Full result of evaluating a condition tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionOutcome {
    /// The tree's boolean value.
    pub value: bool,
    /// Path of the leaf that decided the outcome via short-circuit, when one
    /// did; `None` when every child of the deciding combinator was evaluated.
    pub decided_by: Option<String>,
    /// Every leaf that was actually evaluated, in evaluation order.
    pub leaves: Vec<LeafResult>,
    /// Diagnostics for leaves that could not be evaluated. A non-empty list
    /// means the result must be treated as not-compliant, never as a pass.
    pub diagnostics: Vec<String>,
}

/// Evaluates a condition tree against an action.
///
/// Unknown fields and unusable patterns surface as diagnostics on the
/// returned outcome; they never silently evaluate to a pass.
#[must_use]
pub fn evaluate(expr: &ConditionExpr, action: &AgentAction, pii: &PiiPatternSet) -> ConditionOutcome {
    let mut leaves = Vec::new();
    let mut diagnostics = Vec::new();
    let (value, decided_by) = walk(expr, action, pii, &label(expr), &mut leaves, &mut diagnostics);
    ConditionOutcome {
        value,
        decided_by,
        leaves,
        diagnostics,
    }
}

fn label(expr: &ConditionExpr) -> String {
    match expr {
        ConditionExpr::ContainsPii { .. } => "contains_pii".to_owned(),
        ConditionExpr::Matches { field, .. } => format!("matches({field})"),
        ConditionExpr::GreaterThan { field, .. } => format!("greater_than({field})"),
        ConditionExpr::InList { field, .. } => format!("in_list({field})"),
        ConditionExpr::AllOf { .. } => "all_of".to_owned(),
        ConditionExpr::AnyOf { .. } => "any_of".to_owned(),
    }
}

fn walk(
    expr: &ConditionExpr,
    action: &AgentAction,
    pii: &PiiPatternSet,
    path: &str,
    leaves: &mut Vec<LeafResult>,
    diagnostics: &mut Vec<String>,
) -> (bool, Option<String>) {
    match expr {
        ConditionExpr::AllOf { conditions } => {
            for (index, child) in conditions.iter().enumerate() {
                let child_path = format!("{path}[{index}].{}", label(child));
                let (value, decided) = walk(child, action, pii, &child_path, leaves, diagnostics);
                if !value {
                    return (false, decided.or(Some(child_path)));
                }
            }
            (true, None)
        }
        ConditionExpr::AnyOf { conditions } => {
            for (index, child) in conditions.iter().enumerate() {
                let child_path = format!("{path}[{index}].{}", label(child));
                let (value, decided) = walk(child, action, pii, &child_path, leaves, diagnostics);
                if value {
                    return (true, decided.or(Some(child_path)));
                }
            }
            (false, None)
        }
        leaf => {
            let result = eval_leaf(leaf, action, pii, path);
            let value = result.value;
            if result.error {
                diagnostics.push(format!("{}: {}", result.path, result.message));
            }
            leaves.push(result);
            (value, Some(path.to_owned()))
        }
    }
}

fn eval_leaf(
    expr: &ConditionExpr,
    action: &AgentAction,
    pii: &PiiPatternSet,
    path: &str,
) -> LeafResult {
    let ok = |value: bool, message: String| LeafResult {
        path: path.to_owned(),
        value,
        message,
        error: false,
    };
    let broken = |message: String| LeafResult {
        path: path.to_owned(),
        value: false,
        message,
        error: true,
    };

    match expr {
        ConditionExpr::ContainsPii { fields } => {
            let matches = pii.scan(action, fields.as_deref());
            let value = !matches.is_empty();
            ok(value, format!("{} PII match(es)", matches.len()))
        }
        ConditionExpr::Matches { field, pattern } => {
            let compiled = match Regex::new(pattern) {
                Ok(compiled) => compiled,
                Err(err) => return broken(format!("pattern does not compile: {err}")),
            };
            match action.lookup(field) {
                Some(Value::String(text)) => {
                    let value = compiled.is_match(text);
                    ok(value, String::new())
                }
                Some(_) => broken(format!("field `{field}` is not a string")),
                None => broken(format!("field `{field}` is missing")),
            }
        }
        ConditionExpr::GreaterThan { field, threshold } => match action.lookup(field) {
            Some(raw) => match raw.as_f64() {
                Some(number) => ok(number > *threshold, String::new()),
                None => broken(format!("field `{field}` is not numeric")),
            },
            None => broken(format!("field `{field}` is missing")),
        },
        ConditionExpr::InList { field, values } => match action.lookup(field) {
            Some(raw) => ok(values.contains(raw), String::new()),
            None => broken(format!("field `{field}` is missing")),
        },
        ConditionExpr::AllOf { .. } | ConditionExpr::AnyOf { .. } => {
            unreachable!("combinators are handled by walk")
        }
    }
}

fn collect_pattern_errors(expr: &ConditionExpr, errors: &mut Vec<String>) {
    match expr {
        ConditionExpr::Matches { field, pattern } => {
            if let Err(err) = Regex::new(pattern) {
                errors.push(format!(
                    "condition: pattern for `{field}` does not compile: {err}"
                ));
            }
        }
        ConditionExpr::AllOf { conditions } | ConditionExpr::AnyOf { conditions } => {
            for child in conditions {
                collect_pattern_errors(child, errors);
            }
        }
        _ => {}
    }
}

/// Evaluates a condition tree supplied as rule params.
///
/// Rule type: `condition`. The params object is the serialized expression;
/// the expression describes the *violating* state, so the verdict fails when
/// the tree evaluates true — or when any leaf could not be evaluated.
#[derive(Debug, Default)]
pub struct ConditionRule;

impl ConditionRule {
    /// Catalogue key for this rule.
    pub const TYPE: &'static str = "condition";
}

fn parse_expr(params: &Map<String, Value>) -> Result<ConditionExpr, EvaluationFault> {
    serde_json::from_value(Value::Object(params.clone()))
        .map_err(|err| EvaluationFault::new(format!("condition expression is invalid: {err}")))
}

impl RuleEvaluator for ConditionRule {
    fn evaluate(
        &self,
        action: &AgentAction,
        params: &Map<String, Value>,
    ) -> Result<RuleOutcome, EvaluationFault> {
        let expr = parse_expr(params)?;
        let outcome = evaluate(&expr, action, &PiiPatternSet::default());

        let mut details = Map::new();
        details.insert("condition".into(), json!(outcome.value));
        if let Some(decided_by) = &outcome.decided_by {
            details.insert("decided_by".into(), json!(decided_by));
        }
        details.insert(
            "leaves".into(),
            serde_json::to_value(&outcome.leaves).unwrap_or(Value::Null),
        );

        if !outcome.diagnostics.is_empty() {
            details.insert("diagnostics".into(), json!(outcome.diagnostics));
            return Ok(RuleOutcome::fail_with_details(
                format!(
                    "condition could not be evaluated: {}",
                    outcome.diagnostics.join("; ")
                ),
                details,
            ));
        }

        if outcome.value {
            let decided = outcome.decided_by.as_deref().unwrap_or("all leaves");
            return Ok(RuleOutcome::fail_with_details(
                format!("condition matched (decided by {decided})"),
                details,
            ));
        }

        Ok(RuleOutcome::pass_with_details(details))
    }

    fn validate_params(&self, params: &Map<String, Value>) -> Vec<String> {
        match parse_expr(params) {
            Err(fault) => vec![format!("condition: {}", fault.reason)],
            Ok(expr) => {
                let mut errors = Vec::new();
                collect_pattern_errors(&expr, &mut errors);
                errors
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action(value: Value) -> AgentAction {
        serde_json::from_value(value).unwrap()
    }

    fn expr(value: Value) -> ConditionExpr {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn leaf_greater_than_compares_numbers() {
        let tree = expr(json!({"op": "greater_than", "field": "cost", "threshold": 0.05}));
        let outcome = evaluate(
            &tree,
            &action(json!({"cost": 0.10})),
            &PiiPatternSet::default(),
        );
        assert!(outcome.value);
        assert_eq!(outcome.decided_by.as_deref(), Some("greater_than(cost)"));
    }

    #[test]
    fn all_of_short_circuits_on_first_false() {
        let tree = expr(json!({
            "op": "all_of",
            "conditions": [
                {"op": "greater_than", "field": "cost", "threshold": 100.0},
                {"op": "matches", "field": "query", "pattern": "never evaluated"},
            ],
        }));
        let outcome = evaluate(
            &tree,
            &action(json!({"cost": 1.0, "query": "x"})),
            &PiiPatternSet::default(),
        );
        assert!(!outcome.value);
        // Only the first leaf ran.
        assert_eq!(outcome.leaves.len(), 1);
        assert_eq!(
            outcome.decided_by.as_deref(),
            Some("all_of[0].greater_than(cost)")
        );
    }

    #[test]
    fn any_of_short_circuits_on_first_true() {
        let tree = expr(json!({
            "op": "any_of",
            "conditions": [
                {"op": "in_list", "field": "env", "values": ["prod"]},
                {"op": "greater_than", "field": "cost", "threshold": 0.0},
            ],
        }));
        let outcome = evaluate(
            &tree,
            &action(json!({"env": "prod", "cost": 1.0})),
            &PiiPatternSet::default(),
        );
        assert!(outcome.value);
        assert_eq!(outcome.leaves.len(), 1);
        assert_eq!(outcome.decided_by.as_deref(), Some("any_of[0].in_list(env)"));
    }

    #[test]
    fn missing_field_is_a_diagnostic_not_a_pass() {
        let tree = expr(json!({"op": "greater_than", "field": "cost", "threshold": 1.0}));
        let outcome = evaluate(&tree, &action(json!({})), &PiiPatternSet::default());
        assert!(!outcome.value);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].contains("missing"));
    }

    #[test]
    fn contains_pii_leaf_finds_email() {
        let tree = expr(json!({"op": "contains_pii"}));
        let outcome = evaluate(
            &tree,
            &action(json!({"note": "mail bob@corp.example"})),
            &PiiPatternSet::default(),
        );
        assert!(outcome.value);
    }

    #[test]
    fn unknown_operator_is_rejected_at_parse() {
        let result = serde_json::from_value::<ConditionExpr>(
            json!({"op": "sounds_fine", "field": "x"}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn condition_rule_fails_when_tree_is_true() {
        let params = json!({"op": "greater_than", "field": "cost", "threshold": 0.05})
            .as_object()
            .cloned()
            .unwrap();
        let outcome = ConditionRule
            .evaluate(&action(json!({"cost": 0.10})), &params)
            .unwrap();
        assert!(!outcome.passed());
        assert!(outcome.message().contains("decided by"));
    }

    #[test]
    fn condition_rule_passes_when_tree_is_false() {
        let params = json!({"op": "greater_than", "field": "cost", "threshold": 0.05})
            .as_object()
            .cloned()
            .unwrap();
        let outcome = ConditionRule
            .evaluate(&action(json!({"cost": 0.01})), &params)
            .unwrap();
        assert!(outcome.passed());
    }

    #[test]
    fn condition_rule_fails_closed_on_diagnostics() {
        let params = json!({"op": "matches", "field": "query", "pattern": "x"})
            .as_object()
            .cloned()
            .unwrap();
        let outcome = ConditionRule
            .evaluate(&action(json!({})), &params)
            .unwrap();
        assert!(!outcome.passed());
        assert!(outcome.message().contains("could not be evaluated"));
    }

    #[test]
    fn condition_rule_rejects_unknown_operator_as_fault() {
        let params = json!({"op": "telepathy"}).as_object().cloned().unwrap();
        let err = ConditionRule
            .evaluate(&action(json!({})), &params)
            .expect_err("unknown operator should fault");
        assert!(err.reason.contains("invalid"));
    }

    #[test]
    fn validate_params_flags_bad_patterns() {
        let params = json!({
            "op": "all_of",
            "conditions": [{"op": "matches", "field": "q", "pattern": "("}],
        })
        .as_object()
        .cloned()
        .unwrap();
        let errors = ConditionRule.validate_params(&params);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("does not compile"));
    }
}
