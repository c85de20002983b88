//! End-to-end tests for rule runs and fetching.
//!
//! These tests use an in-memory provider that keeps a label set per
//! message, so the final mailbox state can be checked without a network.

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::Utc;

use mailrules_core::provider::{Body, Header, MessageRef, Payload};
use mailrules_core::{
    Action, Condition, Config, Dispatch, Email, EmailRepository, Label, MailProvider, Mutation,
    ProviderError, RawMessage, Rule, RuleEngine, RuleSet, apply_action, service,
};

/// Provider double holding label sets in memory.
#[derive(Default)]
struct FakeMailbox {
    labels: RefCell<Vec<Label>>,
    messages: RefCell<HashMap<String, BTreeSet<String>>>,
    raw: Vec<RawMessage>,
    modify_calls: RefCell<Vec<(String, Mutation)>>,
    created: RefCell<Vec<String>>,
    failing: HashSet<String>,
}

impl FakeMailbox {
    fn new() -> Self {
        Self::default()
    }

    fn with_label(self, id: &str, name: &str) -> Self {
        self.labels.borrow_mut().push(Label {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    fn with_message(self, id: &str, labels: &[&str]) -> Self {
        self.messages
            .borrow_mut()
            .insert(id.to_string(), label_set(labels));
        self
    }

    fn failing_on(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    fn labels_of(&self, id: &str) -> BTreeSet<String> {
        self.messages.borrow().get(id).cloned().unwrap_or_default()
    }

    fn is_unread(&self, id: &str) -> bool {
        self.labels_of(id).contains("UNREAD")
    }
}

impl MailProvider for FakeMailbox {
    async fn list_labels(&self) -> Result<Vec<Label>, ProviderError> {
        Ok(self.labels.borrow().clone())
    }

    async fn create_label(&self, name: &str) -> Result<Label, ProviderError> {
        let label = Label {
            id: format!("Label_{}", self.labels.borrow().len() + 1),
            name: name.to_string(),
        };
        self.labels.borrow_mut().push(label.clone());
        self.created.borrow_mut().push(name.to_string());
        Ok(label)
    }

    async fn list_message_ids(&self, max_results: u32) -> Result<Vec<MessageRef>, ProviderError> {
        Ok(self
            .raw
            .iter()
            .take(max_results as usize)
            .map(|m| MessageRef { id: m.id.clone() })
            .collect())
    }

    async fn get_message(&self, id: &str) -> Result<RawMessage, ProviderError> {
        if self.failing.contains(id) {
            return Err(ProviderError::Api {
                status: 500,
                body: "backend error".to_string(),
            });
        }
        self.raw
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| ProviderError::Api {
                status: 404,
                body: "not found".to_string(),
            })
    }

    async fn modify_labels(&self, id: &str, mutation: &Mutation) -> Result<(), ProviderError> {
        self.modify_calls
            .borrow_mut()
            .push((id.to_string(), mutation.clone()));

        if self.failing.contains(id) {
            return Err(ProviderError::Api {
                status: 500,
                body: "backend error".to_string(),
            });
        }

        let mut messages = self.messages.borrow_mut();
        let labels = messages.get_mut(id).ok_or_else(|| ProviderError::Api {
            status: 404,
            body: "not found".to_string(),
        })?;
        for label in &mutation.remove_label_ids {
            labels.remove(label);
        }
        labels.extend(mutation.add_label_ids.iter().cloned());
        Ok(())
    }
}

fn label_set(labels: &[&str]) -> BTreeSet<String> {
    labels.iter().map(ToString::to_string).collect()
}

fn email(id: &str, sender: &str, subject: &str) -> Email {
    Email {
        id: id.to_string(),
        sender: sender.to_string(),
        subject: subject.to_string(),
        message: String::new(),
        received: Utc::now(),
        read: false,
    }
}

fn boss_rule(action: Action) -> Rule {
    Rule::new(
        vec![
            Condition::new("from", "contains", "boss@work.com"),
            Condition::new("subject", "equals", "urgent"),
        ],
        action,
    )
}

#[tokio::test]
async fn move_message_adds_only_the_resolved_label() {
    let mailbox = FakeMailbox::new()
        .with_label("Label_9", "Jobs")
        .with_message("m1", &["INBOX", "UNREAD"])
        .with_message("m2", &["INBOX"]);
    let emails = vec![
        email("m1", "boss@work.com", "Urgent"),
        email("m2", "friend@home.com", "Urgent"),
    ];
    let rules = RuleSet::new(vec![boss_rule(Action::MoveMessage)]);

    let report = RuleEngine::new(&mailbox, "Jobs")
        .run(&rules, &emails)
        .await
        .unwrap();

    assert_eq!(report.matched, 1);
    assert_eq!(report.applied, 1);
    assert_eq!(
        *mailbox.modify_calls.borrow(),
        vec![("m1".to_string(), Mutation::add("Label_9"))]
    );
    assert_eq!(
        mailbox.labels_of("m1"),
        label_set(&["INBOX", "Label_9", "UNREAD"])
    );
    assert_eq!(mailbox.labels_of("m2"), label_set(&["INBOX"]));
}

#[tokio::test]
async fn later_rule_undoes_earlier_rule() {
    let mailbox = FakeMailbox::new().with_message("m1", &["INBOX"]);
    let emails = vec![email("m1", "boss@work.com", "urgent")];
    let rules = RuleSet::new(vec![
        boss_rule(Action::MarkAsUnread),
        boss_rule(Action::MarkAsRead),
    ]);

    let report = RuleEngine::new(&mailbox, "Jobs")
        .run(&rules, &emails)
        .await
        .unwrap();

    assert_eq!(report.applied, 2);
    assert!(!mailbox.is_unread("m1"));
    let calls = mailbox.modify_calls.borrow();
    assert_eq!(calls[0].1, Mutation::add("UNREAD"));
    assert_eq!(calls[1].1, Mutation::remove("UNREAD"));
}

#[tokio::test]
async fn mark_as_read_is_idempotent() {
    let once = FakeMailbox::new().with_message("m1", &["INBOX", "UNREAD"]);
    let twice = FakeMailbox::new().with_message("m1", &["INBOX", "UNREAD"]);

    apply_action(&once, "m1", &Action::MarkAsRead, "Label_1")
        .await
        .unwrap();
    for _ in 0..2 {
        apply_action(&twice, "m1", &Action::MarkAsRead, "Label_1")
            .await
            .unwrap();
    }

    assert_eq!(once.labels_of("m1"), twice.labels_of("m1"));
    assert!(!twice.is_unread("m1"));
}

#[tokio::test]
async fn unrecognized_action_is_skipped_without_provider_call() {
    let mailbox = FakeMailbox::new().with_message("m1", &["INBOX"]);

    let dispatch = apply_action(&mailbox, "m1", &Action::parse("archive"), "Label_1")
        .await
        .unwrap();

    assert_eq!(dispatch, Dispatch::Skipped);
    assert!(mailbox.modify_calls.borrow().is_empty());
}

#[tokio::test]
async fn existing_label_is_matched_case_insensitively() {
    let mailbox = FakeMailbox::new().with_label("Label_3", "jobs");

    let id = RuleEngine::new(&mailbox, "Jobs").resolve_label().await.unwrap();

    assert_eq!(id, "Label_3");
    assert!(mailbox.created.borrow().is_empty());
}

#[tokio::test]
async fn missing_label_is_created_once_per_run() {
    let mailbox = FakeMailbox::new()
        .with_message("m1", &["INBOX"])
        .with_message("m2", &["INBOX"]);
    let emails = vec![
        email("m1", "boss@work.com", "urgent"),
        email("m2", "boss@work.com", "urgent"),
    ];
    let rules = RuleSet::new(vec![boss_rule(Action::MoveMessage)]);

    RuleEngine::new(&mailbox, "Jobs")
        .run(&rules, &emails)
        .await
        .unwrap();

    assert_eq!(*mailbox.created.borrow(), vec!["Jobs".to_string()]);
    assert!(mailbox.labels_of("m1").contains("Label_1"));
    assert!(mailbox.labels_of("m2").contains("Label_1"));
}

#[tokio::test]
async fn failed_action_does_not_stop_the_run() {
    let mailbox = FakeMailbox::new()
        .with_message("m1", &["INBOX", "UNREAD"])
        .with_message("m2", &["INBOX", "UNREAD"])
        .failing_on("m1");
    let emails = vec![
        email("m1", "boss@work.com", "urgent"),
        email("m2", "boss@work.com", "urgent"),
    ];
    let rules = RuleSet::new(vec![boss_rule(Action::MarkAsRead)]);

    let report = RuleEngine::new(&mailbox, "Jobs")
        .run(&rules, &emails)
        .await
        .unwrap();

    assert_eq!(report.matched, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.applied, 1);
    assert!(mailbox.is_unread("m1"));
    assert!(!mailbox.is_unread("m2"));
}

#[tokio::test]
async fn rules_without_from_or_in_wrong_order_never_act() {
    let mailbox = FakeMailbox::new().with_message("m1", &["INBOX", "UNREAD"]);
    let emails = vec![email("m1", "boss@work.com", "urgent")];
    let rules = RuleSet::new(vec![
        Rule::new(
            vec![Condition::new("subject", "equals", "urgent")],
            Action::MarkAsRead,
        ),
        Rule::new(
            vec![
                Condition::new("subject", "equals", "urgent"),
                Condition::new("from", "contains", "boss@work.com"),
            ],
            Action::MarkAsRead,
        ),
    ]);

    let report = RuleEngine::new(&mailbox, "Jobs")
        .run(&rules, &emails)
        .await
        .unwrap();

    assert_eq!(report.matched, 0);
    assert!(mailbox.modify_calls.borrow().is_empty());
}

fn raw_message(id: &str, from: &str, subject: &str, unread: bool) -> RawMessage {
    let mut label_ids = vec!["INBOX".to_string()];
    if unread {
        label_ids.push("UNREAD".to_string());
    }

    RawMessage {
        id: id.to_string(),
        label_ids,
        internal_date: Some("1714566600000".to_string()),
        payload: Payload {
            mime_type: Some("text/plain".to_string()),
            headers: vec![
                Header {
                    name: "From".to_string(),
                    value: from.to_string(),
                },
                Header {
                    name: "Subject".to_string(),
                    value: subject.to_string(),
                },
            ],
            body: Some(Body {
                // "see you at 9"
                data: Some("c2VlIHlvdSBhdCA5".to_string()),
            }),
            parts: Vec::new(),
        },
    }
}

fn test_config(dir: &tempfile::TempDir) -> Config {
    Config {
        database_url: format!("sqlite:{}?mode=rwc", dir.path().join("mail.db").display()),
        rules_path: dir.path().join("rules.json"),
        ..Config::default()
    }
}

#[tokio::test]
async fn fetch_then_apply_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    std::fs::write(
        &config.rules_path,
        r#"{"rules": [{
            "conditions": [
                {"field": "from", "predicate": "contains", "value": "boss@work.com"},
                {"field": "subject", "predicate": "equals", "value": "urgent"}
            ],
            "action": "move_message"
        }]}"#,
    )
    .unwrap();

    let mut mailbox = FakeMailbox::new()
        .with_message("m1", &["INBOX", "UNREAD"])
        .with_message("m2", &["INBOX"])
        .with_message("m3", &["INBOX"])
        .failing_on("m3");
    mailbox.raw = vec![
        raw_message("m1", "The Boss <boss@work.com>", "Urgent", true),
        raw_message("m2", "friend@home.com", "Lunch?", false),
        raw_message("m3", "boss@work.com", "urgent", false),
    ];

    let sync = service::fetch_emails_with(&mailbox, &config).await.unwrap();
    assert_eq!(sync.listed, 3);
    assert_eq!(sync.inserted, 2);
    assert_eq!(sync.failed, 1);

    let again = service::fetch_emails_with(&mailbox, &config).await.unwrap();
    assert_eq!(again.inserted, 0);
    assert_eq!(again.existing, 2);

    let repo = EmailRepository::connect(&config.database_url).await.unwrap();
    let stored = repo.get("m1").await.unwrap().unwrap();
    repo.close().await;
    assert_eq!(stored.message, "see you at 9");
    assert!(!stored.read);

    let report = service::apply_rules_with(&mailbox, &config).await.unwrap();
    assert_eq!(report.emails, 2);
    assert_eq!(report.applied, 1);
    assert!(mailbox.labels_of("m1").contains("Label_1"));
    assert_eq!(mailbox.labels_of("m2"), label_set(&["INBOX"]));
}

#[tokio::test]
async fn malformed_rule_file_aborts_before_any_action() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    std::fs::write(&config.rules_path, r#"{"rules": "nope"}"#).unwrap();
    let mailbox = FakeMailbox::new();

    let err = service::apply_rules_with(&mailbox, &config).await.unwrap_err();

    assert!(matches!(err, mailrules_core::Error::Rules(_)));
    assert!(mailbox.labels.borrow().is_empty());
}

#[tokio::test]
async fn missing_token_is_an_auth_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        token_path: dir.path().join("token.json"),
        ..test_config(&dir)
    };

    let err = service::authorize(&config).await.unwrap_err();
    assert!(matches!(
        err,
        mailrules_core::Error::Auth(mailrules_oauth::Error::NoToken)
    ));
}
