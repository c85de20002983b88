//! Load-time checks for rules that can never match or act.
//!
//! None of these change how a rule is evaluated.

use std::fmt;

use super::model::{Action, Field, Predicate, Rule};

/// Something in a rule that will be silently ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Zero-based index of the rule in the file.
    pub rule: usize,
    /// What was found.
    pub kind: DiagnosticKind,
}

/// Kind of problem found in a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A condition names a field other than `from` or `subject`.
    UnrecognizedField(String),
    /// A condition uses a predicate other than `equals` or `contains`.
    UnrecognizedPredicate(String),
    /// The action is not one the dispatcher knows.
    UnrecognizedAction(String),
    /// No `from` condition, so the rule cannot match.
    NoFromCondition,
    /// No `subject` condition, so the rule cannot match.
    NoSubjectCondition,
    /// Every `subject` condition comes before the first `from` condition.
    SubjectBeforeFrom,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {}: ", self.rule)?;
        match &self.kind {
            DiagnosticKind::UnrecognizedField(name) => {
                write!(f, "condition field {name:?} is ignored")
            }
            DiagnosticKind::UnrecognizedPredicate(name) => {
                write!(f, "predicate {name:?} never matches")
            }
            DiagnosticKind::UnrecognizedAction(name) => write!(f, "action {name:?} does nothing"),
            DiagnosticKind::NoFromCondition => f.write_str("no from condition, rule never matches"),
            DiagnosticKind::NoSubjectCondition => {
                f.write_str("no subject condition, rule never matches")
            }
            DiagnosticKind::SubjectBeforeFrom => {
                f.write_str("subject conditions precede every from condition, rule never matches")
            }
        }
    }
}

pub(super) fn check_rule(index: usize, rule: &Rule) -> Vec<Diagnostic> {
    let mut kinds = Vec::new();

    for condition in &rule.conditions {
        if let Field::Unrecognized(name) = &condition.field {
            kinds.push(DiagnosticKind::UnrecognizedField(name.clone()));
        }
        if let Predicate::Unrecognized(name) = &condition.predicate {
            kinds.push(DiagnosticKind::UnrecognizedPredicate(name.clone()));
        }
    }

    if let Action::Unrecognized(name) = &rule.action {
        kinds.push(DiagnosticKind::UnrecognizedAction(name.clone()));
    }

    let first_from = rule.conditions.iter().position(|c| c.field == Field::From);
    let last_subject = rule.conditions.iter().rposition(|c| c.field == Field::Subject);

    match (first_from, last_subject) {
        (None, _) => kinds.push(DiagnosticKind::NoFromCondition),
        (Some(_), None) => kinds.push(DiagnosticKind::NoSubjectCondition),
        (Some(from), Some(subject)) if subject < from => {
            kinds.push(DiagnosticKind::SubjectBeforeFrom);
        }
        _ => {}
    }

    kinds
        .into_iter()
        .map(|kind| Diagnostic { rule: index, kind })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Condition;

    #[test]
    fn test_well_formed_rule_has_no_diagnostics() {
        let rule = Rule::new(
            vec![
                Condition::new("from", "contains", "a"),
                Condition::new("subject", "equals", "b"),
            ],
            Action::MarkAsRead,
        );
        assert!(check_rule(0, &rule).is_empty());
    }

    #[test]
    fn test_reports_unrecognized_parts() {
        let rule = Rule::new(
            vec![
                Condition::new("from", "like", "a"),
                Condition::new("cc", "contains", "b"),
                Condition::new("subject", "equals", "c"),
            ],
            Action::parse("archive"),
        );

        let kinds: Vec<_> = check_rule(3, &rule).into_iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::UnrecognizedPredicate("like".to_string()),
                DiagnosticKind::UnrecognizedField("cc".to_string()),
                DiagnosticKind::UnrecognizedAction("archive".to_string()),
            ]
        );
    }

    #[test]
    fn test_reports_order_dependency() {
        let rule = Rule::new(
            vec![
                Condition::new("subject", "equals", "c"),
                Condition::new("from", "contains", "a"),
            ],
            Action::MarkAsRead,
        );

        let diagnostics = check_rule(1, &rule);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::SubjectBeforeFrom);
        assert_eq!(
            diagnostics[0].to_string(),
            "rule 1: subject conditions precede every from condition, rule never matches"
        );
    }

    #[test]
    fn test_reports_missing_fields() {
        let no_from = Rule::new(vec![Condition::new("subject", "equals", "c")], Action::MarkAsRead);
        assert_eq!(check_rule(0, &no_from)[0].kind, DiagnosticKind::NoFromCondition);

        let no_subject = Rule::new(vec![Condition::new("from", "equals", "c")], Action::MarkAsRead);
        assert_eq!(
            check_rule(0, &no_subject)[0].kind,
            DiagnosticKind::NoSubjectCondition
        );
    }
}
