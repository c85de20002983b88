//! Rule file data models.

use std::fmt;

use serde::Deserialize;

/// Email attribute a condition tests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Field {
    /// The sender address.
    From,
    /// The subject line.
    Subject,
    /// Any other field name, kept verbatim. Ignored during matching.
    Unrecognized(String),
}

impl Field {
    /// Parse a field name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "from" => Self::From,
            "subject" => Self::Subject,
            _ => Self::Unrecognized(s.to_string()),
        }
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::From => f.write_str("from"),
            Self::Subject => f.write_str("subject"),
            Self::Unrecognized(s) => f.write_str(s),
        }
    }
}

/// How a condition's candidates are compared against the field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Predicate {
    /// Field equals a candidate.
    Equals,
    /// Field contains a candidate as a substring.
    Contains,
    /// Any other predicate, kept verbatim. Never matches.
    Unrecognized(String),
}

impl Predicate {
    /// Parse a predicate name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "equals" => Self::Equals,
            "contains" => Self::Contains,
            _ => Self::Unrecognized(s.to_string()),
        }
    }
}

impl From<String> for Predicate {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals => f.write_str("equals"),
            Self::Contains => f.write_str("contains"),
            Self::Unrecognized(s) => f.write_str(s),
        }
    }
}

/// A single field/predicate/value test.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Condition {
    /// Field under test.
    pub field: Field,
    /// Comparison to apply.
    pub predicate: Predicate,
    /// Comma-separated candidate list.
    pub value: String,
}

impl Condition {
    /// Create a condition from raw strings, as they would appear in a rule file.
    #[must_use]
    pub fn new(field: &str, predicate: &str, value: impl Into<String>) -> Self {
        Self {
            field: Field::parse(field),
            predicate: Predicate::parse(predicate),
            value: value.into(),
        }
    }

    /// Candidates split on commas, trimmed and lower-cased.
    ///
    /// Empty candidates are kept.
    pub fn candidates(&self) -> impl Iterator<Item = String> + '_ {
        self.value.split(',').map(|c| c.trim().to_lowercase())
    }
}

/// Effect applied to a matching email.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Action {
    /// Remove the unread marker.
    MarkAsRead,
    /// Add the unread marker.
    MarkAsUnread,
    /// Add the run's destination label.
    MoveMessage,
    /// Any other action name. Dispatching it does nothing.
    Unrecognized(String),
}

impl Action {
    /// Parse an action name. Action names are matched exactly.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "mark_as_read" => Self::MarkAsRead,
            "mark_as_unread" => Self::MarkAsUnread,
            "move_message" => Self::MoveMessage,
            _ => Self::Unrecognized(s.to_string()),
        }
    }

    /// Name as written in a rule file.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::MarkAsRead => "mark_as_read",
            Self::MarkAsUnread => "mark_as_unread",
            Self::MoveMessage => "move_message",
            Self::Unrecognized(s) => s,
        }
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered conditions plus one action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rule {
    /// Conditions, evaluated in order.
    pub conditions: Vec<Condition>,
    /// Action applied when the rule matches.
    pub action: Action,
}

impl Rule {
    /// Create a rule.
    #[must_use]
    pub const fn new(conditions: Vec<Condition>, action: Action) -> Self {
        Self { conditions, action }
    }
}
