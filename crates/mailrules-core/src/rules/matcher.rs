//! Rule matching.

use super::condition::{matches_sender, matches_subject};
use super::model::{Field, Rule};
use crate::store::Email;

/// Decide whether `rule` fires for `email`.
///
/// Conditions are walked in order. A `from` condition overwrites the sender
/// result. A `subject` condition is only evaluated while the sender result
/// is currently `true`; otherwise it is skipped and the subject result keeps
/// its previous value. Unrecognized fields are ignored.
///
/// The rule matches when both results are `true`, so a rule without a `from`
/// condition, or whose `subject` conditions all precede its `from`
/// conditions, never matches.
#[must_use]
pub fn rule_matches(email: &Email, rule: &Rule) -> bool {
    let mut from_matched = false;
    let mut subject_matched = false;

    for condition in &rule.conditions {
        match condition.field {
            Field::From => from_matched = matches_sender(&email.sender, condition),
            Field::Subject if from_matched => {
                subject_matched = matches_subject(&email.subject, condition);
            }
            Field::Subject | Field::Unrecognized(_) => {}
        }
    }

    from_matched && subject_matched
}
