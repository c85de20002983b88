//! Declarative rules: loading, condition evaluation and matching.
//!
//! A rule file is a JSON document:
//!
//! ```json
//! {
//!   "rules": [
//!     {
//!       "conditions": [
//!         { "field": "from", "predicate": "contains", "value": "boss@work.com" },
//!         { "field": "subject", "predicate": "equals", "value": "urgent" }
//!       ],
//!       "action": "move_message"
//!     }
//!   ]
//! }
//! ```
//!
//! Unknown fields, predicates and actions are accepted and never match or
//! never act. [`RuleSet::diagnostics`] reports them so they can be logged.

mod condition;
mod diagnostics;
mod matcher;
mod model;

use std::path::Path;

use serde::Deserialize;

pub use condition::{matches_sender, matches_subject};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use matcher::rule_matches;
pub use model::{Action, Condition, Field, Predicate, Rule};

use crate::Result;

/// Ordered list of rules, as loaded from a rule file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RuleSet {
    /// Rules in file order.
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Create a rule set from rules.
    #[must_use]
    pub const fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Parse a rule file's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a required key is missing.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a rule file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over rules in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Report parts of the rule set that will silently never match or act.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.rules
            .iter()
            .enumerate()
            .flat_map(|(index, rule)| diagnostics::check_rule(index, rule))
            .collect()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;

    const RULES: &str = r#"{
        "rules": [
            {
                "conditions": [
                    {"field": "From", "predicate": "contains", "value": "boss@work.com"},
                    {"field": "subject", "predicate": "Equals", "value": "urgent"}
                ],
                "action": "move_message"
            },
            {
                "conditions": [],
                "action": "archive"
            }
        ]
    }"#;

    #[test]
    fn test_parse_rule_file() {
        let rules = RuleSet::from_json(RULES).unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules.rules[0].conditions[0].field, Field::From);
        assert_eq!(rules.rules[0].conditions[1].predicate, Predicate::Equals);
        assert_eq!(rules.rules[0].action, Action::MoveMessage);
        assert_eq!(
            rules.rules[1].action,
            Action::Unrecognized("archive".to_string())
        );
    }

    #[test]
    fn test_missing_rules_key_is_an_error() {
        let err = RuleSet::from_json(r#"{"filters": []}"#).unwrap_err();
        assert!(matches!(err, Error::Rules(_)));
    }

    #[test]
    fn test_missing_action_is_an_error() {
        let err = RuleSet::from_json(r#"{"rules": [{"conditions": []}]}"#).unwrap_err();
        assert!(matches!(err, Error::Rules(_)));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(RuleSet::from_json("{\"rules\": [").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, RULES).unwrap();

        assert_eq!(RuleSet::load(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = RuleSet::load("/nonexistent/rules.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
