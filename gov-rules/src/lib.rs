//! Rule catalogue and built-in evaluators for the governance engine.
//!
//! A rule evaluator is a pure function over `(action, params)`; the catalogue
//! maps rule-type strings to evaluator implementations so new types can be
//! registered at process start without touching the evaluation engine.

#![warn(missing_docs, clippy::pedantic)]

mod catalogue;
pub mod condition;
mod cost;
mod keyword;
mod pii;
mod role;

/// Catalogue registry, evaluator contract, and outcome types.
pub use catalogue::{
    CatalogueError, CatalogueResult, EvaluationFault, RuleCatalogue, RuleEvaluator, RuleOutcome,
};
/// Per-action spend threshold evaluator.
pub use cost::CostLimitRule;
/// Blocked keyword / pattern evaluator.
pub use keyword::KeywordBlockRule;
/// PII detection evaluator and its reusable pattern set.
pub use pii::{PiiCheckRule, PiiMatch, PiiPatternSet};
/// Role membership evaluator.
pub use role::RoleCheckRule;
