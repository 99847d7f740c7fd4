//! Background worker applying queued visits through the ledger.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::repositories::VisitLedger;
use crate::domain::visit_event::VisitEvent;
use crate::telemetry::{VISITS_FAILED_TOTAL, VISITS_RECORDED_TOTAL};
use crate::utils::deadline::bounded;

/// Drains the visit queue until every sender is dropped.
///
/// Each event is applied as one atomic ledger call. Failures are logged and
/// counted, never retried: a failed event leaves neither counter nor record
/// behind, so skipping it keeps the two consistent.
pub async fn run_visit_worker<V: VisitLedger>(
    mut rx: mpsc::Receiver<VisitEvent>,
    ledger: Arc<V>,
    store_timeout: Duration,
) {
    while let Some(event) = rx.recv().await {
        let link_id = event.link_id;
        let short_code = event.short_code.clone();

        let result = bounded(
            store_timeout,
            "record_visit",
            ledger.record(link_id, event.into_new_visit()),
        )
        .await;

        match result {
            Ok(recorded) => {
                metrics::counter!(VISITS_RECORDED_TOTAL).increment(1);
                debug!(
                    link_id,
                    short_code = %short_code,
                    visits_counter = recorded.visits_counter,
                    "Visit recorded"
                );
            }
            Err(e) => {
                metrics::counter!(VISITS_FAILED_TOTAL).increment(1);
                warn!(
                    link_id,
                    short_code = %short_code,
                    error = %e,
                    "Failed to record queued visit"
                );
            }
        }
    }

    info!("Visit queue closed, worker stopped");
}
