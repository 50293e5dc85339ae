//! Core, service-agnostic types for pdxloc.

use std::fmt::Display;

/// The result every top-level operation returns.
///
/// Services never let an error cross this boundary; everything a run has to
/// say (warnings, per-file errors, totals) is accumulated into `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Outcome {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Outcome {
            success: false,
            message: message.into(),
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// The source/target language codes for one run (e.g. `l_english` →
/// `l_french`), threaded explicitly through every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    /// Language code the mod is written in.
    pub source: String,

    /// Language code being translated to.
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        LanguagePair {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_success() {
        let outcome = Outcome::success("all done");
        assert!(outcome.success);
        assert_eq!(outcome.message, "all done");
    }

    #[test]
    fn test_outcome_failure() {
        let outcome = Outcome::failure("something broke");
        assert!(!outcome.success);
        assert_eq!(outcome.message, "something broke");
    }

    #[test]
    fn test_outcome_display() {
        let outcome = Outcome::success("report text");
        assert_eq!(format!("{}", outcome), "report text");
    }

    #[test]
    fn test_language_pair_new() {
        let pair = LanguagePair::new("l_english", "l_french");
        assert_eq!(pair.source, "l_english");
        assert_eq!(pair.target, "l_french");
    }
}
