//! RunReconciliationHandler - Scheduled re-check of aged pending contacts.
//!
//! Selects pending contacts whose age falls in a tier window, asks the
//! provider about each one on a bounded worker pool and applies the verdict
//! through the same conditional update as webhook ingestion.
//!
//! Counters obey `selected = checked + failed + not_started` and
//! `checked = updated + inconclusive + skipped`.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::apply_transition::{apply_transition, ApplyOutcome};
use super::cancellation::CancellationSignal;
use crate::domain::foundation::{DomainError, ListId, Timestamp};
use crate::domain::validation::{scheduled_check_event, CheckTier, Contact, SuggestedCorrection};
use crate::ports::{
    ContactStore, LogOutcome, LogSource, OperationLog, OperationLogEntry, ProviderError,
    ValidationProvider,
};

/// Which contacts a run considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunScope {
    /// `None` means every list.
    pub list_id: Option<ListId>,
    pub tier: CheckTier,
}

impl RunScope {
    pub fn new(list_id: Option<ListId>, tier: CheckTier) -> Self {
        Self { list_id, tier }
    }
}

/// Configuration for reconciliation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReconciliationConfig {
    /// Maximum provider checks in flight.
    pub max_concurrency: usize,

    /// Deadline for a single provider call.
    pub check_timeout: Duration,

    /// Minimum spacing between check launches.
    pub min_request_interval: Duration,

    /// Re-reads after a lost conditional update.
    pub cas_retries: u32,
}

impl Default for RunReconciliationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            check_timeout: Duration::from_secs(10),
            min_request_interval: Duration::ZERO,
            cas_retries: 3,
        }
    }
}

/// Summary classification of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    NothingSelected,
    Succeeded,
    PartialFailure,
    Cancelled,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub selected: usize,
    pub checked: usize,
    pub updated: usize,
    pub failed: usize,
    pub inconclusive: usize,
    pub skipped: usize,
    pub not_started: usize,
    pub suggestions: Vec<SuggestedCorrection>,
}

impl RunReport {
    pub fn outcome(&self) -> RunOutcome {
        if self.selected == 0 {
            RunOutcome::NothingSelected
        } else if self.not_started > 0 {
            RunOutcome::Cancelled
        } else if self.failed > 0 {
            RunOutcome::PartialFailure
        } else {
            RunOutcome::Succeeded
        }
    }
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    #[error("contact store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),
}

impl From<DomainError> for ReconciliationError {
    fn from(err: DomainError) -> Self {
        ReconciliationError::StoreUnavailable(err.to_string())
    }
}

/// What happened to one contact.
#[derive(Debug)]
enum CheckOutcome {
    Updated,
    Inconclusive,
    Skipped,
    Failed,
    StoreFailed(DomainError),
}

#[derive(Debug)]
struct CheckReport {
    outcome: CheckOutcome,
    suggestion: Option<SuggestedCorrection>,
}

impl CheckReport {
    fn new(outcome: CheckOutcome) -> Self {
        Self {
            outcome,
            suggestion: None,
        }
    }
}

/// Handler for scheduled reconciliation runs.
pub struct RunReconciliationHandler {
    store: Arc<dyn ContactStore>,
    provider: Arc<dyn ValidationProvider>,
    oplog: Arc<dyn OperationLog>,
    config: RunReconciliationConfig,
}

impl RunReconciliationHandler {
    pub fn new(
        store: Arc<dyn ContactStore>,
        provider: Arc<dyn ValidationProvider>,
        oplog: Arc<dyn OperationLog>,
        config: RunReconciliationConfig,
    ) -> Self {
        Self {
            store,
            provider,
            oplog,
            config,
        }
    }

    pub async fn run(
        &self,
        scope: RunScope,
        mut cancel: CancellationSignal,
    ) -> Result<RunReport, ReconciliationError> {
        if self.config.max_concurrency == 0 {
            return Err(ReconciliationError::InvalidConfig(
                "max_concurrency must be at least 1".to_string(),
            ));
        }

        let now = Timestamp::now();
        let selection = self
            .store
            .select_pending(scope.list_id.as_ref(), scope.tier.window(), now)
            .await?;

        let mut report = RunReport {
            selected: selection.len(),
            ..RunReport::default()
        };

        info!(
            tier = %scope.tier,
            list_id = ?scope.list_id,
            selected = report.selected,
            provider = self.provider.name(),
            "Starting reconciliation run"
        );

        for contact_id in selection.unreadable {
            warn!(contact_id = %contact_id, "Pending contact row could not be read");
            report.failed += 1;
            record(
                self.oplog.as_ref(),
                OperationLogEntry::new(LogSource::Scheduler, LogOutcome::Failed)
                    .with_contact(contact_id)
                    .with_detail("unreadable contact row"),
            )
            .await;
        }

        let contacts = selection.contacts;
        if contacts.is_empty() {
            return Ok(report);
        }

        let mut tasks = FuturesUnordered::new();
        let mut store_failure: Option<DomainError> = None;
        let mut last_launch: Option<Instant> = None;
        let mut remaining = contacts.into_iter();

        while let Some(contact) = remaining.next() {
            while tasks.len() >= self.config.max_concurrency {
                match tasks.next().await {
                    Some(joined) => Self::absorb(&mut report, &mut store_failure, joined),
                    None => break,
                }
            }

            if store_failure.is_some() || cancel.is_cancelled() {
                report.not_started = 1 + remaining.len();
                break;
            }

            if let Some(last) = last_launch {
                let wait = self.config.min_request_interval.saturating_sub(last.elapsed());
                if !wait.is_zero() {
                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {}
                        _ = cancel.cancelled() => {}
                    }
                    if cancel.is_cancelled() {
                        report.not_started = 1 + remaining.len();
                        break;
                    }
                }
            }
            last_launch = Some(Instant::now());

            let store = Arc::clone(&self.store);
            let provider = Arc::clone(&self.provider);
            let oplog = Arc::clone(&self.oplog);
            let config = self.config.clone();
            tasks.push(tokio::spawn(async move {
                check_contact(store, provider, oplog, &config, contact).await
            }));
        }

        while let Some(joined) = tasks.next().await {
            Self::absorb(&mut report, &mut store_failure, joined);
        }

        if let Some(e) = store_failure {
            error!(error = %e, "Reconciliation run aborted by store failure");
            return Err(ReconciliationError::StoreUnavailable(e.to_string()));
        }

        info!(
            tier = %scope.tier,
            selected = report.selected,
            checked = report.checked,
            updated = report.updated,
            failed = report.failed,
            inconclusive = report.inconclusive,
            skipped = report.skipped,
            not_started = report.not_started,
            outcome = ?report.outcome(),
            "Reconciliation run finished"
        );

        Ok(report)
    }

    fn absorb(
        report: &mut RunReport,
        store_failure: &mut Option<DomainError>,
        joined: Result<CheckReport, tokio::task::JoinError>,
    ) {
        let check = match joined {
            Ok(check) => check,
            Err(e) => {
                error!("A check task failed to join: {}", e);
                report.failed += 1;
                return;
            }
        };

        if let Some(suggestion) = check.suggestion {
            report.suggestions.push(suggestion);
        }

        match check.outcome {
            CheckOutcome::Updated => {
                report.checked += 1;
                report.updated += 1;
            }
            CheckOutcome::Inconclusive => {
                report.checked += 1;
                report.inconclusive += 1;
            }
            CheckOutcome::Skipped => {
                report.checked += 1;
                report.skipped += 1;
            }
            CheckOutcome::Failed => report.failed += 1,
            CheckOutcome::StoreFailed(e) => {
                report.failed += 1;
                store_failure.get_or_insert(e);
            }
        }
    }
}

async fn check_contact(
    store: Arc<dyn ContactStore>,
    provider: Arc<dyn ValidationProvider>,
    oplog: Arc<dyn OperationLog>,
    config: &RunReconciliationConfig,
    contact: Contact,
) -> CheckReport {
    let contact_id = contact.id;

    let verdict = match tokio::time::timeout(config.check_timeout, provider.verify(&contact.email)).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout {
            timeout_secs: config.check_timeout.as_secs(),
        }),
    };

    let verdict = match verdict {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!(contact_id = %contact_id, error = %e, "Provider check failed");
            record(
                oplog.as_ref(),
                OperationLogEntry::new(LogSource::Scheduler, LogOutcome::Failed)
                    .with_contact(contact_id)
                    .with_detail(e.to_string()),
            )
            .await;
            return CheckReport::new(CheckOutcome::Failed);
        }
    };

    let suggestion = verdict
        .suggested_correction
        .clone()
        .map(|suggestion| SuggestedCorrection {
            contact_id,
            suggestion,
        });
    let token = verdict
        .query_id
        .clone()
        .unwrap_or_else(|| format!("check-{}", Uuid::new_v4()));

    let Some(event) =
        scheduled_check_event(contact_id, verdict.deliverability, token.clone(), Timestamp::now())
    else {
        debug!(contact_id = %contact_id, "Inconclusive verdict, contact stays pending");
        record(
            oplog.as_ref(),
            OperationLogEntry::new(LogSource::Scheduler, LogOutcome::Inconclusive)
                .with_contact(contact_id)
                .with_token(token),
        )
        .await;
        return CheckReport {
            outcome: CheckOutcome::Inconclusive,
            suggestion,
        };
    };

    let outcome = match apply_transition(store.as_ref(), contact, &event, config.cas_retries).await {
        Ok(ApplyOutcome::Applied(update)) => {
            info!(
                contact_id = %contact_id,
                correlation_token = %token,
                status = %update.email_status,
                "Applied scheduled check"
            );
            record(
                oplog.as_ref(),
                OperationLogEntry::new(LogSource::Scheduler, LogOutcome::Applied)
                    .with_contact(contact_id)
                    .with_token(token)
                    .with_detail(format!("{}/{}", update.email_status, update.email_event)),
            )
            .await;
            CheckOutcome::Updated
        }
        Ok(ApplyOutcome::Rejected(rejected)) => {
            record(
                oplog.as_ref(),
                OperationLogEntry::new(LogSource::Scheduler, LogOutcome::Skipped)
                    .with_contact(contact_id)
                    .with_token(token)
                    .with_detail(rejected.reason()),
            )
            .await;
            CheckOutcome::Skipped
        }
        Ok(ApplyOutcome::NotFound) => CheckOutcome::Skipped,
        Ok(ApplyOutcome::Contended { attempts }) => {
            warn!(contact_id = %contact_id, attempts, "Scheduled check lost every update race");
            CheckOutcome::Skipped
        }
        Err(e) => CheckOutcome::StoreFailed(e),
    };

    CheckReport {
        outcome,
        suggestion,
    }
}

async fn record(oplog: &dyn OperationLog, entry: OperationLogEntry) {
    if let Err(e) = oplog.append(entry).await {
        warn!(error = %e, "Failed to append to operation log");
    }
}
