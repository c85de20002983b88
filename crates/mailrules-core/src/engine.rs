//! Rule engine driver.

use tracing::{debug, info, warn};

use crate::action::{Dispatch, apply_action};
use crate::provider::{MailProvider, ProviderError};
use crate::rules::{RuleSet, rule_matches};
use crate::store::Email;

/// Counters for one engine run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Rules evaluated.
    pub rules: usize,
    /// Emails evaluated against each rule.
    pub emails: usize,
    /// (email, rule) pairs that matched.
    pub matched: usize,
    /// Mutations the provider accepted.
    pub applied: usize,
    /// Mutations the provider rejected.
    pub failed: usize,
    /// Matches whose action is unrecognized.
    pub skipped: usize,
}

/// Applies a rule set to stored emails through a mail provider.
pub struct RuleEngine<'a, P> {
    provider: &'a P,
    label_name: String,
}

impl<'a, P: MailProvider> RuleEngine<'a, P> {
    /// Create an engine that moves messages to the label named `label_name`.
    #[must_use]
    pub fn new(provider: &'a P, label_name: impl Into<String>) -> Self {
        Self {
            provider,
            label_name: label_name.into(),
        }
    }

    /// Find the destination label by name, ignoring case, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if listing or creating labels fails.
    pub async fn resolve_label(&self) -> Result<String, ProviderError> {
        let wanted = self.label_name.to_lowercase();
        let labels = self.provider.list_labels().await?;

        if let Some(label) = labels.into_iter().find(|l| l.name.to_lowercase() == wanted) {
            debug!(label = %label.name, id = %label.id, "using existing label");
            return Ok(label.id);
        }

        let label = self.provider.create_label(&self.label_name).await?;
        info!(label = %label.name, id = %label.id, "created label");
        Ok(label.id)
    }

    /// Run every rule against every email.
    ///
    /// Rules are the outer loop and emails the inner loop, both in their
    /// given order. Each matching pair dispatches the rule's action once;
    /// a rejected action is logged and the run continues.
    ///
    /// # Errors
    ///
    /// Returns an error only if the destination label cannot be resolved.
    pub async fn run(&self, rules: &RuleSet, emails: &[Email]) -> Result<RunReport, ProviderError> {
        let label_id = self.resolve_label().await?;

        let mut report = RunReport {
            rules: rules.len(),
            emails: emails.len(),
            ..RunReport::default()
        };

        for (index, rule) in rules.iter().enumerate() {
            for email in emails {
                if !rule_matches(email, rule) {
                    continue;
                }

                report.matched += 1;
                info!(
                    rule = index,
                    from = %email.sender,
                    subject = %email.subject,
                    action = %rule.action,
                    "rule matched"
                );

                match apply_action(self.provider, &email.id, &rule.action, &label_id).await {
                    Ok(Dispatch::Applied(_)) => {
                        report.applied += 1;
                        info!(email_id = %email.id, action = %rule.action, "applied action");
                    }
                    Ok(Dispatch::Skipped) => report.skipped += 1,
                    Err(e) => {
                        report.failed += 1;
                        warn!(
                            email_id = %email.id,
                            rule = index,
                            action = %rule.action,
                            error = %e,
                            "failed to apply action"
                        );
                    }
                }
            }
        }

        Ok(report)
    }
}
