//! Cooperative cancellation for reconciliation runs.
//!
//! A run stops launching new checks once either the shutdown channel flips
//! to `true` or the deadline passes. In-flight checks always finish.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Shutdown channel and/or deadline observed by a run.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    shutdown: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl CancellationSignal {
    /// A signal that never fires.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_shutdown(shutdown: watch::Receiver<bool>) -> Self {
        Self {
            shutdown: Some(shutdown),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Fire after `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn is_cancelled(&self) -> bool {
        let past_deadline = self.deadline.map_or(false, |d| Instant::now() >= d);
        let shutdown = self.shutdown.as_ref().map_or(false, |rx| *rx.borrow());
        past_deadline || shutdown
    }

    /// Resolves once the signal fires. Never resolves for `none()`.
    pub async fn cancelled(&mut self) {
        let deadline = self.deadline;
        let until_deadline = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        let shutdown = &mut self.shutdown;
        let until_shutdown = async move {
            match shutdown {
                Some(rx) => loop {
                    if *rx.borrow() {
                        return;
                    }
                    if rx.changed().await.is_err() {
                        // Sender dropped without signalling.
                        std::future::pending::<()>().await;
                    }
                },
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = until_deadline => {}
            _ = until_shutdown => {}
        }
    }
}
