//! Integration tests for the scheduled reconciliation job.
//!
//! Runs the job end to end against the in-memory contact store with a
//! scripted validation provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use contact_reconciler::adapters::{InMemoryContactStore, InMemoryOperationLog};
use contact_reconciler::application::{
    CancellationSignal, RunOutcome, RunReconciliationConfig, RunReconciliationHandler, RunScope,
};
use contact_reconciler::domain::foundation::{EmailAddress, ListId, Timestamp};
use contact_reconciler::domain::validation::{
    CheckTier, Contact, Deliverability, EmailStatus, ValidationCause,
};
use contact_reconciler::ports::{
    LogOutcome, LogSource, ProviderError, ProviderVerdict, ValidationProvider,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Provider answering from a table keyed by address; unknown addresses are
/// deliverable.
struct ScriptedProvider {
    answers: HashMap<String, Result<ProviderVerdict, ProviderError>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            answers: HashMap::new(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn answer(mut self, email: &str, result: Result<ProviderVerdict, ProviderError>) -> Self {
        self.answers.insert(email.to_string(), result);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ValidationProvider for ScriptedProvider {
    async fn verify(&self, email: &EmailAddress) -> Result<ProviderVerdict, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.answers.get(email.as_str()).cloned().unwrap_or_else(|| {
            Ok(ProviderVerdict::new(Deliverability::Deliverable).with_query_id("q-default"))
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn pending_aged(email: &str, list_id: ListId, minutes: i64) -> Contact {
    Contact::new_pending(
        list_id,
        EmailAddress::new(email).unwrap(),
        Timestamp::now().minus_minutes(minutes),
    )
}

struct Job {
    handler: RunReconciliationHandler,
    store: InMemoryContactStore,
    oplog: InMemoryOperationLog,
    provider: Arc<ScriptedProvider>,
}

fn job(contacts: Vec<Contact>, provider: ScriptedProvider, config: RunReconciliationConfig) -> Job {
    let store = InMemoryContactStore::with_contacts(contacts);
    let oplog = InMemoryOperationLog::new();
    let provider = Arc::new(provider);
    let handler = RunReconciliationHandler::new(
        Arc::new(store.clone()),
        provider.clone(),
        Arc::new(oplog.clone()),
        config,
    );
    Job {
        handler,
        store,
        oplog,
        provider,
    }
}

// =============================================================================
// Scenario C - 20 minute old contact, 15m tier, deliverable
// =============================================================================

#[tokio::test]
async fn deliverable_verdict_resolves_contact_in_tier() {
    let list = ListId::new();
    let contact = pending_aged("c2@example.com", list, 20);
    let job = job(
        vec![contact.clone()],
        ScriptedProvider::new().answer(
            "c2@example.com",
            Ok(ProviderVerdict::new(Deliverability::Deliverable).with_query_id("q-20")),
        ),
        RunReconciliationConfig::default(),
    );

    let report = job
        .handler
        .run(RunScope::new(Some(list), CheckTier::Tier15m), CancellationSignal::none())
        .await
        .unwrap();

    assert_eq!(report.selected, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(report.outcome(), RunOutcome::Succeeded);

    let stored = job.store.get(&contact.id).await.unwrap();
    assert_eq!(stored.email_status, EmailStatus::Valid);
    assert_eq!(stored.email_event, Some(ValidationCause::CheckedDeliverable));
    assert_eq!(stored.validation_message.as_deref(), Some("q-20"));

    let entries = job.oplog.entries().await;
    assert!(entries
        .iter()
        .any(|e| e.source == LogSource::Scheduler && e.outcome == LogOutcome::Applied));
}

// =============================================================================
// Scenario D - 10 minute old contact is too young for the 15m tier
// =============================================================================

#[tokio::test]
async fn contact_younger_than_tier_is_not_selected() {
    let list = ListId::new();
    let contact = pending_aged("c3@example.com", list, 10);
    let job = job(
        vec![contact.clone()],
        ScriptedProvider::new(),
        RunReconciliationConfig::default(),
    );

    let report = job
        .handler
        .run(RunScope::new(Some(list), CheckTier::Tier15m), CancellationSignal::none())
        .await
        .unwrap();

    assert_eq!(report.selected, 0);
    assert_eq!(report.outcome(), RunOutcome::NothingSelected);
    assert_eq!(job.provider.calls(), 0);
    assert_eq!(job.store.get(&contact.id).await.unwrap(), contact);
}

#[tokio::test]
async fn every_tier_skips_contacts_younger_than_fifteen_minutes() {
    let contact = pending_aged("c3@example.com", ListId::new(), 5);

    for tier in [CheckTier::Tier15m, CheckTier::Tier30m, CheckTier::Tier1h] {
        let job = job(
            vec![contact.clone()],
            ScriptedProvider::new(),
            RunReconciliationConfig::default(),
        );
        let report = job
            .handler
            .run(RunScope::new(None, tier), CancellationSignal::none())
            .await
            .unwrap();
        assert_eq!(report.selected, 0, "tier {} selected a young contact", tier);
    }
}

#[tokio::test]
async fn tiers_partition_contacts_by_age() {
    let list = ListId::new();
    let contacts = vec![
        pending_aged("a@example.com", list, 20),
        pending_aged("b@example.com", list, 45),
        pending_aged("c@example.com", list, 180),
    ];

    let mut selected = Vec::new();
    for tier in [CheckTier::Tier15m, CheckTier::Tier30m, CheckTier::Tier1h] {
        let job = job(
            contacts.clone(),
            ScriptedProvider::new(),
            RunReconciliationConfig::default(),
        );
        let report = job
            .handler
            .run(RunScope::new(Some(list), tier), CancellationSignal::none())
            .await
            .unwrap();
        selected.push(report.selected);
    }

    assert_eq!(selected, vec![1, 1, 1]);
}

// =============================================================================
// Provider failures and verdict kinds
// =============================================================================

#[tokio::test]
async fn provider_failure_leaves_contact_unchanged() {
    let list = ListId::new();
    let failing = pending_aged("x@example.com", list, 40);
    let healthy = pending_aged("y@example.com", list, 40);
    let job = job(
        vec![failing.clone(), healthy.clone()],
        ScriptedProvider::new().answer(
            "x@example.com",
            Err(ProviderError::Http {
                status: 503,
                message: "unavailable".to_string(),
            }),
        ),
        RunReconciliationConfig::default(),
    );

    let report = job
        .handler
        .run(RunScope::new(Some(list), CheckTier::All), CancellationSignal::none())
        .await
        .unwrap();

    assert_eq!(report.selected, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(report.outcome(), RunOutcome::PartialFailure);
    assert_eq!(job.store.get(&failing.id).await.unwrap(), failing);
    assert_eq!(
        job.store.get(&healthy.id).await.unwrap().email_status,
        EmailStatus::Valid
    );
}

#[tokio::test]
async fn inconclusive_verdict_keeps_contact_pending_and_passes_suggestion() {
    let list = ListId::new();
    let contact = pending_aged("c1@gmial.com", list, 40);
    let job = job(
        vec![contact.clone()],
        ScriptedProvider::new().answer(
            "c1@gmial.com",
            Ok(ProviderVerdict::new(Deliverability::Inconclusive)
                .with_query_id("q-1")
                .with_suggestion("c1@gmail.com")),
        ),
        RunReconciliationConfig::default(),
    );

    let report = job
        .handler
        .run(RunScope::new(Some(list), CheckTier::All), CancellationSignal::none())
        .await
        .unwrap();

    assert_eq!(report.inconclusive, 1);
    assert_eq!(report.updated, 0);
    assert_eq!(report.suggestions.len(), 1);
    assert_eq!(report.suggestions[0].suggestion, "c1@gmail.com");
    assert_eq!(job.store.get(&contact.id).await.unwrap(), contact);
}

#[tokio::test]
async fn undeliverable_verdict_marks_contact_invalid() {
    let list = ListId::new();
    let contact = pending_aged("gone@example.com", list, 90);
    let job = job(
        vec![contact.clone()],
        ScriptedProvider::new().answer(
            "gone@example.com",
            Ok(ProviderVerdict::new(Deliverability::Undeliverable).with_query_id("q-9")),
        ),
        RunReconciliationConfig::default(),
    );

    job.handler
        .run(RunScope::new(None, CheckTier::Tier1h), CancellationSignal::none())
        .await
        .unwrap();

    let stored = job.store.get(&contact.id).await.unwrap();
    assert_eq!(stored.email_status, EmailStatus::Invalid);
    assert_eq!(stored.email_event, Some(ValidationCause::CheckedUndeliverable));
}

#[tokio::test]
async fn resolved_contacts_are_never_selected() {
    let list = ListId::new();
    let mut resolved = pending_aged("done@example.com", list, 120);
    resolved.email_status = EmailStatus::Valid;
    resolved.validation_message = Some("m1".to_string());
    let job = job(
        vec![resolved],
        ScriptedProvider::new(),
        RunReconciliationConfig::default(),
    );

    let report = job
        .handler
        .run(RunScope::new(Some(list), CheckTier::All), CancellationSignal::none())
        .await
        .unwrap();

    assert_eq!(report.selected, 0);
    assert_eq!(job.provider.calls(), 0);
}

#[tokio::test]
async fn list_scope_excludes_other_lists() {
    let mine = ListId::new();
    let other = ListId::new();
    let job = job(
        vec![
            pending_aged("a@example.com", mine, 40),
            pending_aged("b@example.com", other, 40),
        ],
        ScriptedProvider::new(),
        RunReconciliationConfig::default(),
    );

    let report = job
        .handler
        .run(RunScope::new(Some(mine), CheckTier::All), CancellationSignal::none())
        .await
        .unwrap();

    assert_eq!(report.selected, 1);
    assert_eq!(job.provider.calls(), 1);
}

// =============================================================================
// Timeouts and cancellation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn slow_provider_times_out_as_failure() {
    let list = ListId::new();
    let contact = pending_aged("slow@example.com", list, 40);
    let job = job(
        vec![contact.clone()],
        ScriptedProvider::new().with_delay(Duration::from_secs(60)),
        RunReconciliationConfig {
            check_timeout: Duration::from_secs(2),
            ..RunReconciliationConfig::default()
        },
    );

    let report = job
        .handler
        .run(RunScope::new(Some(list), CheckTier::All), CancellationSignal::none())
        .await
        .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(job.store.get(&contact.id).await.unwrap(), contact);
}

#[tokio::test(start_paused = true)]
async fn deadline_stops_launching_new_checks() {
    let list = ListId::new();
    let contacts: Vec<Contact> = (0..5)
        .map(|i| pending_aged(&format!("c{}@example.com", i), list, 40))
        .collect();
    let job = job(
        contacts,
        ScriptedProvider::new().with_delay(Duration::from_secs(1)),
        RunReconciliationConfig {
            max_concurrency: 1,
            ..RunReconciliationConfig::default()
        },
    );

    let report = job
        .handler
        .run(
            RunScope::new(Some(list), CheckTier::All),
            CancellationSignal::none().with_timeout(Duration::from_millis(2500)),
        )
        .await
        .unwrap();

    assert_eq!(report.outcome(), RunOutcome::Cancelled);
    assert!(report.not_started > 0);
    assert_eq!(
        report.selected,
        report.checked + report.failed + report.not_started
    );
    assert_eq!(job.provider.calls(), report.checked + report.failed);
}
