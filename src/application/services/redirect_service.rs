//! Redirect resolution with synchronous or queued visit recording.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::warn;

use super::visit_recorder::VisitRecorder;
use crate::domain::repositories::{LinkRepository, VisitLedger};
use crate::domain::visit_event::VisitEvent;
use crate::domain::visit_worker::run_visit_worker;
use crate::error::AppError;
use crate::telemetry::VISITS_DROPPED_TOTAL;

/// How a redirect records its visit.
///
/// - `Sync`: the redirect returns after the visit has committed. Storage
///   failures reach the caller; no visit is lost.
/// - `Async`: the redirect returns once the visit is queued. Lower latency,
///   but a visit is lost if the queue is full, the process dies before the
///   queue drains, or the worker's store call fails.
///
/// In both modes a visit is applied as one atomic ledger call, so the
/// counter and the visit records never diverge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordingMode {
    #[default]
    Sync,
    Async,
}

impl FromStr for RecordingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sync" => Ok(Self::Sync),
            "async" => Ok(Self::Async),
            other => Err(format!(
                "unknown recording mode '{other}', expected 'sync' or 'async'"
            )),
        }
    }
}

impl fmt::Display for RecordingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => f.write_str("sync"),
            Self::Async => f.write_str("async"),
        }
    }
}

/// Resolves short codes to their original URL and records the visit.
///
/// In async mode the service owns the only sender of the visit queue:
/// dropping the service closes the queue and lets the worker drain it.
pub struct RedirectService<L: LinkRepository, V: VisitLedger> {
    recorder: Arc<VisitRecorder<L, V>>,
    queue: Option<mpsc::Sender<VisitEvent>>,
}

impl<L, V> RedirectService<L, V>
where
    L: LinkRepository,
    V: VisitLedger + 'static,
{
    /// Creates a service that records each visit before returning.
    pub fn synchronous(recorder: Arc<VisitRecorder<L, V>>) -> Self {
        Self {
            recorder,
            queue: None,
        }
    }

    /// Creates a service that queues visits for a background worker.
    ///
    /// Spawns the worker on the current runtime and returns its handle. The
    /// worker stops once the service is dropped and the queue is drained.
    pub fn asynchronous(
        recorder: Arc<VisitRecorder<L, V>>,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let worker = tokio::spawn(run_visit_worker(
            rx,
            recorder.ledger(),
            recorder.store_timeout(),
        ));

        (
            Self {
                recorder,
                queue: Some(tx),
            },
            worker,
        )
    }

    pub fn mode(&self) -> RecordingMode {
        if self.queue.is_some() {
            RecordingMode::Async
        } else {
            RecordingMode::Sync
        }
    }

    /// Resolves a short code and records one visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the short code is unknown, in either
    /// mode, and records nothing.
    /// Returns [`AppError::Storage`] if the lookup fails, or in sync mode if
    /// recording fails. A full queue in async mode is not an error: the
    /// redirect succeeds and the visit is dropped.
    pub async fn resolve(
        &self,
        short_code: &str,
        ip: &str,
        user_agent: &str,
    ) -> Result<String, AppError> {
        let Some(queue) = &self.queue else {
            return self.recorder.record_visit(short_code, ip, user_agent).await;
        };

        let link = self.recorder.resolve(short_code).await?;
        let event = VisitEvent::new(link.id, short_code, ip, user_agent);

        if let Err(e) = queue.try_send(event) {
            let reason = match e {
                TrySendError::Full(_) => "queue_full",
                TrySendError::Closed(_) => "queue_closed",
            };
            metrics::counter!(VISITS_DROPPED_TOTAL, "reason" => reason).increment(1);
            warn!(link_id = link.id, short_code, reason, "Visit dropped");
        }

        Ok(link.original_url)
    }
}
