//! PII detection over action string fields.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value, json};

use gov_primitives::{AgentAction, redact};

use crate::catalogue::{EvaluationFault, RuleEvaluator, RuleOutcome};

lazy_static! {
    static ref SSN_PATTERN: Regex =
        Regex::new(r"\b\d{3}[-\s]\d{2}[-\s]\d{4}\b").expect("ssn pattern compiles");
    static ref CREDIT_CARD_PATTERN: Regex =
        Regex::new(r"\b(?:\d[ -]?){13,15}\d\b").expect("credit card pattern compiles");
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
            .expect("email pattern compiles");
    static ref PHONE_PATTERN: Regex =
        Regex::new(r"\b(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b")
            .expect("phone pattern compiles");
}

/// One detected PII span. Carries only the redacted rendering of the match —
/// the raw text never leaves the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiiMatch {
    /// Dotted path of the field the match was found in.
    pub field: String,
    /// Name of the pattern that matched (`ssn`, `email`, ...).
    pub pattern: String,
    /// Masked rendering of the matched span.
    pub redacted: String,
}

/// A named set of compiled PII patterns.
#[derive(Debug, Clone)]
pub struct PiiPatternSet {
    patterns: Vec<(String, Regex)>,
}

impl Default for PiiPatternSet {
    fn default() -> Self {
        Self {
            patterns: vec![
                ("ssn".to_owned(), SSN_PATTERN.clone()),
                ("credit_card".to_owned(), CREDIT_CARD_PATTERN.clone()),
                ("email".to_owned(), EMAIL_PATTERN.clone()),
                ("phone".to_owned(), PHONE_PATTERN.clone()),
            ],
        }
    }
}

impl PiiPatternSet {
    /// Builds the active pattern set from rule params.
    ///
    /// Supported keys: `check_ssn`, `check_credit_card`, `check_email`,
    /// `check_phone` (booleans, default `true`) and `extra_patterns`
    /// (object mapping pattern name to regex source).
    ///
    /// # Errors
    ///
    /// Returns a diagnostic string when an extra pattern fails to compile.
    pub fn from_params(params: &Map<String, Value>) -> Result<Self, String> {
        let enabled = |key: &str| params.get(key).and_then(Value::as_bool).unwrap_or(true);

        let mut patterns = Vec::new();
        if enabled("check_ssn") {
            patterns.push(("ssn".to_owned(), SSN_PATTERN.clone()));
        }
        if enabled("check_credit_card") {
            patterns.push(("credit_card".to_owned(), CREDIT_CARD_PATTERN.clone()));
        }
        if enabled("check_email") {
            patterns.push(("email".to_owned(), EMAIL_PATTERN.clone()));
        }
        if enabled("check_phone") {
            patterns.push(("phone".to_owned(), PHONE_PATTERN.clone()));
        }

        if let Some(extra) = params.get("extra_patterns") {
            let Some(extra) = extra.as_object() else {
                return Err("`extra_patterns` must be an object of name -> regex".to_owned());
            };
            for (name, source) in extra {
                let Some(source) = source.as_str() else {
                    return Err(format!("extra pattern `{name}` must be a regex string"));
                };
                let compiled = Regex::new(source)
                    .map_err(|err| format!("extra pattern `{name}` does not compile: {err}"))?;
                patterns.push((name.clone(), compiled));
            }
        }

        Ok(Self { patterns })
    }

    /// Scans the supplied fields (or every string field when `fields` is
    /// `None`) and returns all matches, redacted.
    #[must_use]
    pub fn scan(&self, action: &AgentAction, fields: Option<&[String]>) -> Vec<PiiMatch> {
        let mut matches = Vec::new();
        match fields {
            Some(paths) => {
                for path in paths {
                    if let Some(Value::String(text)) = action.lookup(path) {
                        self.scan_text(path, text, &mut matches);
                    }
                }
            }
            None => {
                for (path, text) in action.string_fields() {
                    self.scan_text(&path, text, &mut matches);
                }
            }
        }
        matches
    }

    fn scan_text(&self, field: &str, text: &str, matches: &mut Vec<PiiMatch>) {
        for (name, pattern) in &self.patterns {
            for found in pattern.find_iter(text) {
                matches.push(PiiMatch {
                    field: field.to_owned(),
                    pattern: name.clone(),
                    redacted: redact(found.as_str()),
                });
            }
        }
    }
}

/// Detects PII-like spans in the string values of an action.
///
/// Rule type: `pii_check`. Fails when any enabled pattern matches; verdict
/// details carry field paths and redacted spans only.
#[derive(Debug, Default)]
pub struct PiiCheckRule;

impl PiiCheckRule {
    /// Catalogue key for this rule.
    pub const TYPE: &'static str = "pii_check";

    const KNOWN_KEYS: [&'static str; 6] = [
        "check_ssn",
        "check_credit_card",
        "check_email",
        "check_phone",
        "extra_patterns",
        "fields",
    ];
}

impl RuleEvaluator for PiiCheckRule {
    fn evaluate(
        &self,
        action: &AgentAction,
        params: &Map<String, Value>,
    ) -> Result<RuleOutcome, EvaluationFault> {
        let patterns = PiiPatternSet::from_params(params).map_err(EvaluationFault::new)?;

        let fields: Option<Vec<String>> = match params.get("fields") {
            None => None,
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect(),
            ),
            Some(_) => {
                return Err(EvaluationFault::new(
                    "`fields` must be a list of field paths",
                ));
            }
        };

        let matches = patterns.scan(action, fields.as_deref());
        if matches.is_empty() {
            return Ok(RuleOutcome::pass());
        }

        let mut detected: Vec<&str> = matches.iter().map(|m| m.pattern.as_str()).collect();
        detected.sort_unstable();
        detected.dedup();

        let mut details = Map::new();
        details.insert("detected_types".into(), json!(detected));
        details.insert("match_count".into(), json!(matches.len()));
        details.insert(
            "matches".into(),
            Value::Array(
                matches
                    .iter()
                    .map(|m| {
                        json!({
                            "field": m.field,
                            "pattern": m.pattern,
                            "redacted": m.redacted,
                        })
                    })
                    .collect(),
            ),
        );

        Ok(RuleOutcome::fail_with_details(
            format!(
                "PII detected in action: {}. Found {} match(es).",
                detected.join(", "),
                matches.len()
            ),
            details,
        ))
    }

    fn validate_params(&self, params: &Map<String, Value>) -> Vec<String> {
        let mut errors = Vec::new();
        for key in params.keys() {
            if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                errors.push(format!("pii_check: unknown param `{key}`"));
            }
        }
        for key in [
            "check_ssn",
            "check_credit_card",
            "check_email",
            "check_phone",
        ] {
            if let Some(value) = params.get(key)
                && !value.is_boolean()
            {
                errors.push(format!("pii_check: `{key}` must be a boolean"));
            }
        }
        if let Some(fields) = params.get("fields")
            && !fields.is_array()
        {
            errors.push("pii_check: `fields` must be a list of field paths".to_owned());
        }
        if let Err(reason) = PiiPatternSet::from_params(params) {
            errors.push(format!("pii_check: {reason}"));
        }
        errors
    }
}
