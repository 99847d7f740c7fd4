//! Link analytics: counter, summary and one page of visit details.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;

use super::analytics_aggregator::{AnalyticsAggregator, AnalyticsSummary};
use crate::domain::entities::{Link, VisitRecord};
use crate::domain::pagination::{PageRequest, Pagination};
use crate::domain::repositories::{LinkRepository, VisitRepository};
use crate::error::AppError;
use crate::utils::deadline::{DEFAULT_STORE_TIMEOUT, bounded};

/// Full analytics response for one link.
#[derive(Debug, Clone, Serialize)]
pub struct LinkAnalytics {
    pub link: Link,
    /// The link's stored counter.
    pub visits: i64,
    /// Newest first.
    pub details: Vec<VisitRecord>,
    pub summary: AnalyticsSummary,
    pub pagination: Pagination,
}

/// Service composing link lookup, aggregation and detail paging.
pub struct AnalyticsService<L: LinkRepository, A: VisitRepository> {
    links: Arc<L>,
    visits: Arc<A>,
    aggregator: AnalyticsAggregator<A>,
    store_timeout: Duration,
}

impl<L: LinkRepository, A: VisitRepository> AnalyticsService<L, A> {
    /// Creates a new analytics service.
    pub fn new(links: Arc<L>, visits: Arc<A>) -> Self {
        let aggregator = AnalyticsAggregator::new(Arc::clone(&visits));
        Self {
            links,
            visits,
            aggregator,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.aggregator = self.aggregator.with_store_timeout(store_timeout);
        self.store_timeout = store_timeout;
        self
    }

    /// Retrieves analytics for a link.
    ///
    /// `pagination.total` is the number of visit records, which matches
    /// `visits` whenever the store is consistent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `page < 1` or `limit < 1`; no store
    /// call is made.
    /// Returns [`AppError::NotFound`] if the link does not exist.
    /// Returns [`AppError::Storage`] if any read fails or times out.
    pub async fn get_analytics(
        &self,
        link_id: i64,
        page: i64,
        limit: i64,
    ) -> Result<LinkAnalytics, AppError> {
        let request = PageRequest::new(page, limit)?;

        let link = bounded(
            self.store_timeout,
            "find_by_id",
            self.links.find_by_id(link_id),
        )
        .await?
        .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": link_id })))?;

        let (summary, details) = tokio::try_join!(
            self.aggregator.summarize(link_id),
            bounded(
                self.store_timeout,
                "visit_page",
                self.visits.page(link_id, request.limit, request.offset())
            ),
        )?;

        let pagination = request.with_total(summary.total_visits);

        Ok(LinkAnalytics {
            visits: link.visits_counter,
            link,
            details,
            summary,
            pagination,
        })
    }
}
