//! Local email storage.
//!
//! Fetched messages are written once and read back in full by each rule
//! run. Rows are keyed by the provider's message id, so re-fetching the
//! same message is a no-op.

mod model;
mod repository;

pub use model::Email;
pub use repository::EmailRepository;
