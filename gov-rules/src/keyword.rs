//! Keyword and pattern blocking over action text fields.

use regex::RegexBuilder;
use serde_json::{Map, Value, json};

use gov_primitives::AgentAction;

use crate::catalogue::{EvaluationFault, RuleEvaluator, RuleOutcome};

/// Blocks actions containing configured keywords or regex patterns.
///
/// Rule type: `keyword_block`. Matching is case-insensitive substring search
/// by default; set `regex: true` to treat each keyword as a regex, or
/// `case_sensitive: true` to match exactly.
#[derive(Debug, Default)]
pub struct KeywordBlockRule;

impl KeywordBlockRule {
    /// Catalogue key for this rule.
    pub const TYPE: &'static str = "keyword_block";
}

fn keywords(params: &Map<String, Value>) -> Result<Vec<String>, EvaluationFault> {
    let Some(raw) = params.get("keywords") else {
        return Err(EvaluationFault::new(
            "keyword_block requires a `keywords` list",
        ));
    };
    let Some(items) = raw.as_array() else {
        return Err(EvaluationFault::new("`keywords` must be a list"));
    };
    let keywords: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect();
    if keywords.is_empty() || keywords.len() != items.len() {
        return Err(EvaluationFault::new(
            "`keywords` must be a non-empty list of strings",
        ));
    }
    Ok(keywords)
}

enum Matcher {
    Substring { needles: Vec<String>, fold: bool },
    Patterns(Vec<(String, regex::Regex)>),
}

impl Matcher {
    fn build(
        keywords: Vec<String>,
        case_sensitive: bool,
        use_regex: bool,
    ) -> Result<Self, EvaluationFault> {
        if !use_regex {
            let needles = if case_sensitive {
                keywords
            } else {
                keywords.iter().map(|k| k.to_lowercase()).collect()
            };
            return Ok(Self::Substring {
                needles,
                fold: !case_sensitive,
            });
        }

        let mut patterns = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let compiled = RegexBuilder::new(&keyword)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|err| {
                    EvaluationFault::new(format!("keyword pattern `{keyword}` does not compile: {err}"))
                })?;
            patterns.push((keyword, compiled));
        }
        Ok(Self::Patterns(patterns))
    }

    /// Returns the keywords found in `text`.
    fn hits(&self, text: &str) -> Vec<String> {
        match self {
            Self::Substring { needles, fold } => {
                let haystack = if *fold { text.to_lowercase() } else { text.to_owned() };
                needles
                    .iter()
                    .filter(|needle| haystack.contains(needle.as_str()))
                    .cloned()
                    .collect()
            }
            Self::Patterns(patterns) => patterns
                .iter()
                .filter(|(_, pattern)| pattern.is_match(text))
                .map(|(keyword, _)| keyword.clone())
                .collect(),
        }
    }
}

impl RuleEvaluator for KeywordBlockRule {
    fn evaluate(
        &self,
        action: &AgentAction,
        params: &Map<String, Value>,
    ) -> Result<RuleOutcome, EvaluationFault> {
        let keywords = keywords(params)?;
        let case_sensitive = params
            .get("case_sensitive")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let use_regex = params.get("regex").and_then(Value::as_bool).unwrap_or(false);

        let matcher = Matcher::build(keywords, case_sensitive, use_regex)?;

        let mut blocked: Vec<(String, String)> = Vec::new();
        for (path, text) in action.string_fields() {
            for keyword in matcher.hits(text) {
                blocked.push((path.clone(), keyword));
            }
        }

        if blocked.is_empty() {
            return Ok(RuleOutcome::pass());
        }

        let mut found: Vec<&str> = blocked.iter().map(|(_, k)| k.as_str()).collect();
        found.sort_unstable();
        found.dedup();

        let mut details = Map::new();
        details.insert("blocked_keywords".into(), json!(found));
        details.insert(
            "matches".into(),
            Value::Array(
                blocked
                    .iter()
                    .map(|(field, keyword)| json!({"field": field, "keyword": keyword}))
                    .collect(),
            ),
        );

        Ok(RuleOutcome::fail_with_details(
            format!(
                "blocked keyword(s) found: {}. {} match(es).",
                found.join(", "),
                blocked.len()
            ),
            details,
        ))
    }

    fn validate_params(&self, params: &Map<String, Value>) -> Vec<String> {
        let mut errors = Vec::new();
        match keywords(params) {
            Err(fault) => errors.push(format!("keyword_block: {}", fault.reason)),
            Ok(list) => {
                let use_regex = params.get("regex").and_then(Value::as_bool).unwrap_or(false);
                if use_regex {
                    for keyword in list {
                        if let Err(err) = RegexBuilder::new(&keyword).build() {
                            errors.push(format!(
                                "keyword_block: pattern `{keyword}` does not compile: {err}"
                            ));
                        }
                    }
                }
            }
        }
        for key in ["case_sensitive", "regex"] {
            if let Some(value) = params.get(key)
                && !value.is_boolean()
            {
                errors.push(format!("keyword_block: `{key}` must be a boolean"));
            }
        }
        errors
    }
}
