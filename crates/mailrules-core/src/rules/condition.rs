//! Condition evaluators.
//!
//! Both evaluators are total and case-insensitive. A condition with an
//! unrecognized predicate evaluates to `false`.

use super::model::{Condition, Predicate};

/// Test a sender address against a `from` condition.
#[must_use]
pub fn matches_sender(sender: &str, condition: &Condition) -> bool {
    matches_text(sender, condition)
}

/// Test a subject line against a `subject` condition.
#[must_use]
pub fn matches_subject(subject: &str, condition: &Condition) -> bool {
    matches_text(subject, condition)
}

fn matches_text(text: &str, condition: &Condition) -> bool {
    let text = text.to_lowercase();
    let mut candidates = condition.candidates();

    match condition.predicate {
        Predicate::Equals => candidates.any(|candidate| candidate == text),
        Predicate::Contains => candidates.any(|candidate| text.contains(&candidate)),
        Predicate::Unrecognized(_) => false,
    }
}
