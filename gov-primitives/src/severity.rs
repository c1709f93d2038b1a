//! Severity levels attached to rule verdicts.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity of a policy rule violation.
///
/// The derived ordering is load-bearing: `Low < Medium < High < Critical` is
/// used to compute the highest severity across failed verdicts and to sort
/// report output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; the violation carries negligible risk.
    Low,
    /// Default level for rules that do not specify one.
    Medium,
    /// Violation requires prompt operator attention.
    High,
    /// Violation must block the action outright.
    Critical,
}

impl Default for Severity {
    fn default() -> Self {
        Self::Medium
    }
}

impl Severity {
    /// Returns the wire representation of the severity.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized severity string.
#[derive(Debug, Error)]
#[error("unrecognized severity `{value}`; expected one of low, medium, high, critical")]
pub struct ParseSeverityError {
    /// The offending input string.
    pub value: String,
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(ParseSeverityError {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_ascending() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
        assert_eq!(
            [Severity::High, Severity::Low, Severity::Critical]
                .into_iter()
                .max(),
            Some(Severity::Critical)
        );
    }

    #[test]
    fn round_trips_through_serde() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        let parsed: Severity = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Severity::Critical);
    }

    #[test]
    fn unknown_value_is_rejected() {
        let result = serde_json::from_str::<Severity>("\"fatal\"");
        assert!(result.is_err());
        assert!("fatal".parse::<Severity>().is_err());
    }
}
