//! Per-link visit aggregation.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::entities::VisitSample;
use crate::domain::repositories::VisitRepository;
use crate::error::AppError;
use crate::utils::deadline::{DEFAULT_STORE_TIMEOUT, bounded};

/// Visits on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateCount {
    /// `YYYY-MM-DD`
    pub date: String,
    pub count: i64,
}

/// Aggregated view of a link's visit records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    pub total_visits: i64,
    pub unique_visitors: i64,
    /// Newest date first, one entry per date with at least one visit.
    pub visits_by_date: Vec<DateCount>,
}

impl AnalyticsSummary {
    pub fn empty() -> Self {
        Self {
            total_visits: 0,
            unique_visitors: 0,
            visits_by_date: Vec::new(),
        }
    }
}

/// Computes summaries from the visit samples of a [`VisitRepository`].
///
/// Read-only. Every figure of a summary is derived from a single
/// [`VisitRepository::samples_by_link`] read.
pub struct AnalyticsAggregator<A: VisitRepository> {
    visits: Arc<A>,
    store_timeout: Duration,
}

impl<A: VisitRepository> AnalyticsAggregator<A> {
    pub fn new(visits: Arc<A>) -> Self {
        Self {
            visits,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Summarizes all visits of a link.
    ///
    /// A link without visits yields [`AnalyticsSummary::empty`], not an error.
    /// Link existence is not checked here.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the read fails or times out; no
    /// partial summary is returned.
    pub async fn summarize(&self, link_id: i64) -> Result<AnalyticsSummary, AppError> {
        let samples = bounded(
            self.store_timeout,
            "samples_by_link",
            self.visits.samples_by_link(link_id),
        )
        .await?;

        Ok(summarize_samples(&samples))
    }
}

/// Derives all summary figures from one set of samples.
pub fn summarize_samples(samples: &[VisitSample]) -> AnalyticsSummary {
    let unique_ips: HashSet<&str> = samples.iter().map(|s| s.ip.as_str()).collect();
    let timestamps: Vec<DateTime<Utc>> = samples.iter().map(|s| s.visited_at).collect();

    AnalyticsSummary {
        total_visits: samples.len() as i64,
        unique_visitors: unique_ips.len() as i64,
        visits_by_date: bucket_by_date(&timestamps),
    }
}

/// Groups timestamps by UTC calendar date, newest date first.
pub fn bucket_by_date(timestamps: &[DateTime<Utc>]) -> Vec<DateCount> {
    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();

    for ts in timestamps {
        *buckets.entry(ts.date_naive()).or_default() += 1;
    }

    buckets
        .into_iter()
        .rev()
        .map(|(date, count)| DateCount {
            date: date.format("%Y-%m-%d").to_string(),
            count,
        })
        .collect()
}
