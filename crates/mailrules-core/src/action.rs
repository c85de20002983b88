//! Action dispatch.
//!
//! Every action is expressed as a label-set [`Mutation`], so applying the
//! same action twice leaves the message as applying it once.

use tracing::debug;

use crate::provider::{MailProvider, Mutation, ProviderError, UNREAD_LABEL};
use crate::rules::Action;

/// What the dispatcher did for one (email, rule) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The mutation was sent to the provider.
    Applied(Mutation),
    /// The action is not recognized; nothing was sent.
    Skipped,
}

impl Action {
    /// The label mutation for this action, or `None` for unrecognized actions.
    ///
    /// `label_id` is the run's destination label, used by `move_message`.
    #[must_use]
    pub fn mutation(&self, label_id: &str) -> Option<Mutation> {
        match self {
            Self::MarkAsRead => Some(Mutation::remove(UNREAD_LABEL)),
            Self::MarkAsUnread => Some(Mutation::add(UNREAD_LABEL)),
            Self::MoveMessage => Some(Mutation::add(label_id)),
            Self::Unrecognized(_) => None,
        }
    }
}

/// Perform the provider side effect for `action` on one email.
///
/// # Errors
///
/// Returns the provider error unchanged; the caller decides whether to
/// continue.
pub async fn apply_action<P: MailProvider>(
    provider: &P,
    email_id: &str,
    action: &Action,
    label_id: &str,
) -> Result<Dispatch, ProviderError> {
    let Some(mutation) = action.mutation(label_id) else {
        debug!(email_id, action = %action, "unrecognized action, nothing to do");
        return Ok(Dispatch::Skipped);
    };

    provider.modify_labels(email_id, &mutation).await?;
    Ok(Dispatch::Applied(mutation))
}
