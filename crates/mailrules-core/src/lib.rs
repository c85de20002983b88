//! # mailrules-core
//!
//! Rule-based automation for a Gmail mailbox.
//!
//! This crate provides:
//! - **Rules** - JSON rule files, condition evaluation and rule matching
//! - **Actions** - read-state and label changes expressed as label mutations
//! - **Engine** - applies every rule to every stored email
//! - **Store** - local `SQLite` copy of fetched emails
//! - **Provider** - the mail provider interface and a Gmail REST client
//! - **Fetch** - pulls recent messages into the store
//!
//! # Example
//!
//! ```ignore
//! use mailrules_core::{Config, service};
//!
//! let config = Config::from_env()?;
//! let report = service::apply_rules(&config).await?;
//! println!("{} actions applied", report.applied);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod action;
pub mod config;
pub mod engine;
mod error;
pub mod fetch;
pub mod provider;
pub mod rules;
pub mod service;
pub mod store;

pub use action::{Dispatch, apply_action};
pub use config::Config;
pub use engine::{RuleEngine, RunReport};
pub use error::{Error, Result};
pub use fetch::{SyncReport, fetch_into};
pub use provider::{GmailClient, Label, MailProvider, Mutation, ProviderError, RawMessage};
pub use rules::{
    Action, Condition, Field, Predicate, Rule, RuleSet, matches_sender, matches_subject,
    rule_matches,
};
pub use store::{Email, EmailRepository};
