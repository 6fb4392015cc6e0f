//! # Contact Reconciler CLI
//!
//! `serve` hosts the delivery webhook and monitor endpoints.
//! `reconcile` runs one pass of the tiered re-check job and prints its report.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use contact_reconciler::adapters::http::{app_router, ReconcilerAppState};
use contact_reconciler::adapters::{
    FileOperationLog, HttpValidationProvider, PostgresContactReader, PostgresContactStore,
};
use contact_reconciler::application::{
    CancellationSignal, RunReconciliationHandler, RunScope,
};
use contact_reconciler::config::{AppConfig, ServerConfig};
use contact_reconciler::domain::foundation::ListId;
use contact_reconciler::domain::validation::CheckTier;
use contact_reconciler::ports::OperationLog;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Reconciles contact email validation status.",
    long_about = "Applies delivery provider webhooks to contact validation status and re-checks pending contacts against the validation provider on a tiered schedule."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the webhook and monitor HTTP endpoints.
    Serve,

    /// Run one reconciliation pass over pending contacts.
    Reconcile {
        /// List to reconcile (UUID), or `all`.
        #[arg(long, default_value = "all", value_parser = parse_list_scope)]
        list: ListScope,

        /// Age tier: 15m, 30m, 1h or all.
        #[arg(long, default_value = "all")]
        tier: CheckTier,

        /// Stop launching checks after this many seconds.
        #[arg(long, env = "CONTACT_RECONCILER_DEADLINE_SECS")]
        deadline_secs: Option<u64>,
    },
}

/// `--list` argument: one list or every list.
#[derive(Debug, Clone, Copy)]
struct ListScope(Option<ListId>);

fn parse_list_scope(raw: &str) -> Result<ListScope, String> {
    if raw.trim().eq_ignore_ascii_case("all") {
        return Ok(ListScope(None));
    }
    raw.trim()
        .parse::<ListId>()
        .map(|id| ListScope(Some(id)))
        .map_err(|_| format!("expected a list UUID or 'all', got '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    init_tracing(&config.server);

    let pool = connect(&config).await?;
    let oplog: Arc<dyn OperationLog> = Arc::new(FileOperationLog::new(&config.oplog.path));

    match cli.command {
        Command::Serve => serve(&config, pool, oplog).await,
        Command::Reconcile {
            list,
            tier,
            deadline_secs,
        } => {
            let deadline = deadline_secs
                .map(Duration::from_secs)
                .or_else(|| config.reconciliation.default_deadline());
            reconcile(&config, pool, oplog, RunScope::new(list.0, tier), deadline).await
        }
    }
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    // stdout is reserved for the run report
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if server.is_production() {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

async fn connect(config: &AppConfig) -> Result<PgPool> {
    let pool = config
        .database
        .connect()
        .await
        .context("Failed to connect to the contact store")?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
        info!("Migrations applied");
    }

    Ok(pool)
}

async fn serve(config: &AppConfig, pool: PgPool, oplog: Arc<dyn OperationLog>) -> Result<()> {
    let mut state = ReconcilerAppState::new(
        Arc::new(PostgresContactStore::new(pool.clone())),
        Arc::new(PostgresContactReader::new(pool)),
        oplog,
    )
    .with_cas_retries(config.reconciliation.cas_retries);

    match config.webhook.verifier() {
        Some(verifier) => state = state.with_verifier(Arc::new(verifier)),
        None => warn!("No webhook signing secret configured; accepting unsigned callbacks"),
    }

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Listening");

    let app = app_router(state, config.server.request_timeout());
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
            }
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}

async fn reconcile(
    config: &AppConfig,
    pool: PgPool,
    oplog: Arc<dyn OperationLog>,
    scope: RunScope,
    deadline: Option<Duration>,
) -> Result<()> {
    let provider = HttpValidationProvider::new(config.provider.http_config()?)
        .context("Failed to build validation provider client")?;

    let handler = RunReconciliationHandler::new(
        Arc::new(PostgresContactStore::new(pool)),
        Arc::new(provider),
        oplog,
        config.reconciliation.run_config(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing in-flight checks");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut cancel = CancellationSignal::from_shutdown(shutdown_rx);
    if let Some(deadline) = deadline {
        cancel = cancel.with_timeout(deadline);
    }

    let report = handler
        .run(scope, cancel)
        .await
        .context("Reconciliation run failed")?;

    let output = serde_json::json!({
        "outcome": report.outcome(),
        "report": report,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
