//! Per-action spend limits.

use serde_json::{Map, Value, json};

use gov_primitives::AgentAction;

use crate::catalogue::{EvaluationFault, RuleEvaluator, RuleOutcome};

const DEFAULT_COST_FIELD: &str = "cost";

/// Enforces a maximum cost per action.
///
/// Rule type: `cost_limit`. An absent, non-numeric, or negative cost fails
/// closed: a cost the engine cannot verify is treated as over budget.
#[derive(Debug, Default)]
pub struct CostLimitRule;

impl CostLimitRule {
    /// Catalogue key for this rule.
    pub const TYPE: &'static str = "cost_limit";
}

fn max_cost(params: &Map<String, Value>) -> Result<f64, EvaluationFault> {
    let Some(raw) = params.get("max_cost") else {
        return Err(EvaluationFault::new(
            "cost_limit requires a numeric `max_cost`",
        ));
    };
    let Some(limit) = raw.as_f64() else {
        return Err(EvaluationFault::new("`max_cost` must be a number"));
    };
    if limit < 0.0 {
        return Err(EvaluationFault::new("`max_cost` must be non-negative"));
    }
    Ok(limit)
}

impl RuleEvaluator for CostLimitRule {
    fn evaluate(
        &self,
        action: &AgentAction,
        params: &Map<String, Value>,
    ) -> Result<RuleOutcome, EvaluationFault> {
        let limit = max_cost(params)?;
        let cost_field = params
            .get("cost_field")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_COST_FIELD);

        let mut details = Map::new();
        details.insert("cost_field".into(), json!(cost_field));
        details.insert("max_cost".into(), json!(limit));

        let Some(raw_cost) = action.lookup(cost_field) else {
            return Ok(RuleOutcome::fail_with_details(
                format!("action has no `{cost_field}` field; cannot verify cost"),
                details,
            ));
        };

        let Some(cost) = raw_cost.as_f64() else {
            details.insert("raw_value".into(), raw_cost.clone());
            return Ok(RuleOutcome::fail_with_details(
                format!("cost field `{cost_field}` holds a non-numeric value"),
                details,
            ));
        };

        details.insert("cost".into(), json!(cost));

        if cost < 0.0 {
            return Ok(RuleOutcome::fail_with_details(
                format!("cost {cost} is negative; invalid cost"),
                details,
            ));
        }

        if cost > limit {
            return Ok(RuleOutcome::fail_with_details(
                format!("action cost {cost:.4} exceeds limit {limit:.4}"),
                details,
            ));
        }

        Ok(RuleOutcome::pass_with_details(details))
    }

    fn validate_params(&self, params: &Map<String, Value>) -> Vec<String> {
        let mut errors = Vec::new();
        if let Err(fault) = max_cost(params) {
            errors.push(format!("cost_limit: {}", fault.reason));
        }
        if let Some(field) = params.get("cost_field")
            && !field.is_string()
        {
            errors.push("cost_limit: `cost_field` must be a string".to_owned());
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action(value: Value) -> AgentAction {
        serde_json::from_value(value).unwrap()
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn cost_within_limit_passes() {
        let outcome = CostLimitRule
            .evaluate(
                &action(json!({"cost": 0.01})),
                &params(json!({"max_cost": 0.05})),
            )
            .unwrap();
        assert!(outcome.passed());
        assert_eq!(outcome.details()["cost"], json!(0.01));
    }

    #[test]
    fn cost_over_limit_fails() {
        let outcome = CostLimitRule
            .evaluate(
                &action(json!({"cost": 0.10})),
                &params(json!({"max_cost": 0.05})),
            )
            .unwrap();
        assert!(!outcome.passed());
        assert!(outcome.message().contains("exceeds"));
    }

    #[test]
    fn cost_equal_to_limit_passes() {
        let outcome = CostLimitRule
            .evaluate(
                &action(json!({"cost": 0.05})),
                &params(json!({"max_cost": 0.05})),
            )
            .unwrap();
        assert!(outcome.passed());
    }

    #[test]
    fn absent_cost_fails_closed() {
        let outcome = CostLimitRule
            .evaluate(
                &action(json!({"type": "search"})),
                &params(json!({"max_cost": 1.0})),
            )
            .unwrap();
        assert!(!outcome.passed());
        assert!(outcome.message().contains("no `cost` field"));
    }

    #[test]
    fn non_numeric_cost_fails_closed() {
        let outcome = CostLimitRule
            .evaluate(
                &action(json!({"cost": "cheap"})),
                &params(json!({"max_cost": 1.0})),
            )
            .unwrap();
        assert!(!outcome.passed());
        assert_eq!(outcome.details()["raw_value"], json!("cheap"));
    }

    #[test]
    fn negative_cost_fails() {
        let outcome = CostLimitRule
            .evaluate(
                &action(json!({"cost": -0.5})),
                &params(json!({"max_cost": 1.0})),
            )
            .unwrap();
        assert!(!outcome.passed());
    }

    #[test]
    fn custom_cost_field_is_honored() {
        let outcome = CostLimitRule
            .evaluate(
                &action(json!({"estimated_cost": 2.0})),
                &params(json!({"max_cost": 1.0, "cost_field": "estimated_cost"})),
            )
            .unwrap();
        assert!(!outcome.passed());
    }

    #[test]
    fn missing_max_cost_is_a_fault() {
        let err = CostLimitRule
            .evaluate(&action(json!({"cost": 0.1})), &Map::new())
            .expect_err("missing max_cost should fault");
        assert!(err.reason.contains("max_cost"));
    }

    #[test]
    fn validate_params_flags_bad_limit() {
        let errors = CostLimitRule.validate_params(&params(json!({"max_cost": "lots"})));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("number"));
    }
}
