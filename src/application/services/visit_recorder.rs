//! Visit recording: one redirect, one atomic ledger call.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::entities::{Link, NewVisit, RecordedVisit};
use crate::domain::repositories::{LinkRepository, VisitLedger};
use crate::error::AppError;
use crate::telemetry::{VISITS_FAILED_TOTAL, VISITS_RECORDED_TOTAL};
use crate::utils::deadline::{DEFAULT_STORE_TIMEOUT, bounded};

/// Records visits against short links.
///
/// Every successful [`VisitRecorder::record_visit`] is exactly one visit:
/// there is no deduplication, so a retried redirect counts twice.
pub struct VisitRecorder<L: LinkRepository, V: VisitLedger> {
    links: Arc<L>,
    ledger: Arc<V>,
    store_timeout: Duration,
}

impl<L: LinkRepository, V: VisitLedger> VisitRecorder<L, V> {
    /// Creates a new recorder using [`DEFAULT_STORE_TIMEOUT`] per store call.
    pub fn new(links: Arc<L>, ledger: Arc<V>) -> Self {
        Self {
            links,
            ledger,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub fn store_timeout(&self) -> Duration {
        self.store_timeout
    }

    pub fn ledger(&self) -> Arc<V> {
        Arc::clone(&self.ledger)
    }

    /// Resolves a short code without recording anything.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this short code.
    /// Returns [`AppError::Storage`] on database errors or timeout.
    pub async fn resolve(&self, short_code: &str) -> Result<Link, AppError> {
        bounded(
            self.store_timeout,
            "find_by_short_code",
            self.links.find_by_short_code(short_code),
        )
        .await?
        .ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "short_code": short_code }))
        })
    }

    /// Records one visit and returns the link's original URL.
    ///
    /// # Flow
    ///
    /// 1. Resolve the short code (no mutation if absent)
    /// 2. Increment the counter and append the visit in one ledger call
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the short code is unknown, or if the
    /// link was deleted between resolution and recording.
    /// Returns [`AppError::Storage`] if the ledger call fails or times out.
    /// A failed call changes neither the counter nor the visit record. A
    /// timed-out call may still have committed; see [`Self::record_for_link`].
    pub async fn record_visit(
        &self,
        short_code: &str,
        ip: &str,
        user_agent: &str,
    ) -> Result<String, AppError> {
        let link = self.resolve(short_code).await?;

        let recorded = self
            .record_for_link(link.id, NewVisit::new(ip, user_agent))
            .await?;

        debug!(
            link_id = link.id,
            short_code,
            visits_counter = recorded.visits_counter,
            "Visit recorded"
        );

        Ok(link.original_url)
    }

    /// Applies one visit to an already resolved link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link no longer exists.
    /// Returns [`AppError::Storage`] if the ledger call fails or times out.
    /// A timeout is ambiguous: if the store committed before the deadline but
    /// its reply arrived after it, the visit is recorded and counted even
    /// though the caller sees an error. Counter and records still agree.
    pub async fn record_for_link(
        &self,
        link_id: i64,
        visit: NewVisit,
    ) -> Result<RecordedVisit, AppError> {
        let result = bounded(
            self.store_timeout,
            "record_visit",
            self.ledger.record(link_id, visit),
        )
        .await;

        match &result {
            Ok(_) => metrics::counter!(VISITS_RECORDED_TOTAL).increment(1),
            Err(e) => {
                metrics::counter!(VISITS_FAILED_TOTAL).increment(1);
                warn!(link_id, error = %e, "Failed to record visit");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::VisitRecord;
    use crate::domain::repositories::{MockLinkRepository, MockVisitLedger};
    use chrono::Utc;

    fn test_link(id: i64, code: &str, url: &str) -> Link {
        let now = Utc::now();
        Link::new(id, code.to_string(), url.to_string(), 0, now, now)
    }

    fn recorded(link_id: i64, counter: i64, visit: &NewVisit) -> RecordedVisit {
        RecordedVisit {
            visits_counter: counter,
            visit: VisitRecord::new(
                1,
                link_id,
                visit.ip.clone(),
                visit.user_agent.clone(),
                Utc::now(),
            ),
        }
    }

    #[tokio::test]
    async fn test_record_visit_success() {
        let mut mock_links = MockLinkRepository::new();
        let mut mock_ledger = MockVisitLedger::new();

        mock_links
            .expect_find_by_short_code()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(Some(test_link(10, "abc123", "https://example.com"))));

        mock_ledger
            .expect_record()
            .withf(|link_id, visit| {
                *link_id == 10
                    && visit.ip == "192.168.1.1"
                    && visit.user_agent == "Mozilla/5.0"
                    && visit.visited_at.is_none()
            })
            .times(1)
            .returning(|link_id, visit| Ok(recorded(link_id, 1, &visit)));

        let recorder = VisitRecorder::new(Arc::new(mock_links), Arc::new(mock_ledger));

        let url = recorder
            .record_visit("abc123", "192.168.1.1", "Mozilla/5.0")
            .await
            .unwrap();

        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn test_record_visit_unknown_code_does_not_touch_ledger() {
        let mut mock_links = MockLinkRepository::new();
        let mut mock_ledger = MockVisitLedger::new();

        mock_links
            .expect_find_by_short_code()
            .times(1)
            .returning(|_| Ok(None));
        mock_ledger.expect_record().times(0);

        let recorder = VisitRecorder::new(Arc::new(mock_links), Arc::new(mock_ledger));

        let result = recorder.record_visit("missing", "1.1.1.1", "ua").await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.details()["short_code"], "missing");
    }

    #[tokio::test]
    async fn test_record_visit_surfaces_storage_error() {
        let mut mock_links = MockLinkRepository::new();
        let mut mock_ledger = MockVisitLedger::new();

        mock_links
            .expect_find_by_short_code()
            .returning(|_| Ok(Some(test_link(3, "err", "https://example.com"))));
        mock_ledger
            .expect_record()
            .times(1)
            .returning(|_, _| Err(AppError::storage("Database error", json!({}))));

        let recorder = VisitRecorder::new(Arc::new(mock_links), Arc::new(mock_ledger));

        let result = recorder.record_visit("err", "1.1.1.1", "ua").await;

        assert!(matches!(result.unwrap_err(), AppError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_not_retried() {
        let mut mock_links = MockLinkRepository::new();
        let mut mock_ledger = MockVisitLedger::new();

        mock_links
            .expect_find_by_short_code()
            .times(1)
            .returning(|_| Err(AppError::storage("Database error", json!({}))));
        mock_ledger.expect_record().times(0);

        let recorder = VisitRecorder::new(Arc::new(mock_links), Arc::new(mock_ledger));

        let result = recorder.record_visit("abc", "1.1.1.1", "ua").await;

        assert!(matches!(result.unwrap_err(), AppError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_every_call_is_one_visit() {
        let mut mock_links = MockLinkRepository::new();
        let mut mock_ledger = MockVisitLedger::new();

        mock_links
            .expect_find_by_short_code()
            .times(3)
            .returning(|_| Ok(Some(test_link(1, "same", "https://example.com"))));
        mock_ledger
            .expect_record()
            .times(3)
            .returning(|link_id, visit| Ok(recorded(link_id, 1, &visit)));

        let recorder = VisitRecorder::new(Arc::new(mock_links), Arc::new(mock_ledger));

        for _ in 0..3 {
            recorder.record_visit("same", "1.1.1.1", "ua").await.unwrap();
        }
    }
}
