mod common;

use std::sync::Arc;

use async_trait::async_trait;
use link_analytics::application::services::AnalyticsAggregator;
use link_analytics::domain::entities::{NewVisit, VisitRecord, VisitSample};
use link_analytics::domain::pagination::paginate;
use link_analytics::domain::repositories::{VisitLedger, VisitRepository};
use link_analytics::error::AppError;
use link_analytics::infrastructure::persistence::MemoryStore;
use serde_json::json;

/// Commits one more visit right after every read, as a concurrent redirect would.
struct BusyStore {
    inner: Arc<MemoryStore>,
    link_id: i64,
}

impl BusyStore {
    async fn land_visit(&self) {
        self.inner
            .record(self.link_id, NewVisit::new("late", "ua"))
            .await
            .unwrap();
    }
}

#[async_trait]
impl VisitRepository for BusyStore {
    async fn page(
        &self,
        link_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VisitRecord>, AppError> {
        let page = self.inner.page(link_id, limit, offset).await;
        self.land_visit().await;
        page
    }

    async fn count_by_link(&self, link_id: i64) -> Result<i64, AppError> {
        let count = self.inner.count_by_link(link_id).await;
        self.land_visit().await;
        count
    }

    async fn distinct_ip_count(&self, link_id: i64) -> Result<i64, AppError> {
        let count = self.inner.distinct_ip_count(link_id).await;
        self.land_visit().await;
        count
    }

    async fn samples_by_link(&self, link_id: i64) -> Result<Vec<VisitSample>, AppError> {
        let samples = self.inner.samples_by_link(link_id).await;
        self.land_visit().await;
        samples
    }
}

#[tokio::test]
async fn test_summary_for_mixed_visits() {
    let store = common::store();
    let link = common::create_test_link(&store, "abc123", "https://example.com").await;

    common::record_at(&store, link.id, "A", common::utc(2023, 1, 1, 8, 0)).await;
    common::record_at(&store, link.id, "A", common::utc(2023, 1, 2, 9, 0)).await;
    common::record_at(&store, link.id, "A", common::utc(2023, 1, 2, 10, 0)).await;
    common::record_at(&store, link.id, "B", common::utc(2023, 1, 2, 11, 0)).await;

    let summary = AnalyticsAggregator::new(store.clone())
        .summarize(link.id)
        .await
        .unwrap();

    assert_eq!(summary.total_visits, 4);
    assert_eq!(summary.unique_visitors, 2);
    assert_eq!(
        serde_json::to_value(&summary.visits_by_date).unwrap(),
        json!([
            { "date": "2023-01-02", "count": 3 },
            { "date": "2023-01-01", "count": 1 }
        ])
    );
}

#[tokio::test]
async fn test_summary_of_link_without_visits_is_empty() {
    let store = common::store();
    let link = common::create_test_link(&store, "quiet", "https://example.com").await;

    let summary = AnalyticsAggregator::new(store.clone())
        .summarize(link.id)
        .await
        .unwrap();

    assert_eq!(summary.total_visits, 0);
    assert_eq!(summary.unique_visitors, 0);
    assert!(summary.visits_by_date.is_empty());
}

#[tokio::test]
async fn test_summary_buckets_sum_to_total_and_only_count_own_link() {
    let store = common::store();
    let link = common::create_test_link(&store, "mine", "https://example.com").await;
    let other = common::create_test_link(&store, "other", "https://other.example").await;

    for day in [5, 1, 3, 3, 5, 5, 2] {
        common::record_at(&store, link.id, "10.0.0.1", common::utc(2024, 3, day, 12, 0)).await;
    }
    common::record_at(&store, other.id, "10.0.0.2", common::utc(2024, 3, 4, 12, 0)).await;

    let summary = AnalyticsAggregator::new(store.clone())
        .summarize(link.id)
        .await
        .unwrap();

    let dates: Vec<&str> = summary
        .visits_by_date
        .iter()
        .map(|b| b.date.as_str())
        .collect();
    assert_eq!(
        dates,
        vec!["2024-03-05", "2024-03-03", "2024-03-02", "2024-03-01"]
    );
    assert_eq!(
        summary.visits_by_date.iter().map(|b| b.count).sum::<i64>(),
        summary.total_visits
    );
    assert_eq!(summary.total_visits, 7);
    assert_eq!(summary.unique_visitors, 1);
}

#[tokio::test]
async fn test_summary_is_consistent_while_visits_land() {
    let store = common::store();
    let link = common::create_test_link(&store, "busy", "https://example.com").await;
    common::record_at(&store, link.id, "A", common::utc(2023, 1, 1, 8, 0)).await;

    let busy = Arc::new(BusyStore {
        inner: store.clone(),
        link_id: link.id,
    });
    let summary = AnalyticsAggregator::new(busy).summarize(link.id).await.unwrap();

    assert_eq!(summary.total_visits, 1);
    assert_eq!(summary.unique_visitors, 1);
    assert_eq!(
        summary.visits_by_date.iter().map(|b| b.count).sum::<i64>(),
        summary.total_visits
    );
    assert_eq!(store.count_by_link(link.id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_get_analytics_details_newest_first_and_paginated() {
    let store = common::store();
    let link = common::create_test_link(&store, "paged", "https://example.com").await;

    for minute in 0..7 {
        common::record_at(
            &store,
            link.id,
            &format!("10.0.0.{minute}"),
            common::utc(2023, 6, 1, 12, minute),
        )
        .await;
    }

    let service = common::analytics_service(&store);

    let first = service.get_analytics(link.id, 1, 3).await.unwrap();
    let ips: Vec<&str> = first.details.iter().map(|v| v.ip.as_str()).collect();
    assert_eq!(ips, vec!["10.0.0.6", "10.0.0.5", "10.0.0.4"]);
    assert_eq!(first.visits, 7);
    assert_eq!(first.pagination.total, 7);
    assert_eq!(first.pagination.total_pages, 3);

    let last = service.get_analytics(link.id, 3, 3).await.unwrap();
    assert_eq!(last.details.len(), 1);
    assert_eq!(last.details[0].ip, "10.0.0.0");

    let beyond = service.get_analytics(link.id, 4, 3).await.unwrap();
    assert!(beyond.details.is_empty());
    assert_eq!(beyond.summary.total_visits, 7);
}

#[tokio::test]
async fn test_get_analytics_ties_broken_by_id() {
    let store = common::store();
    let link = common::create_test_link(&store, "ties", "https://example.com").await;
    let at = common::utc(2023, 6, 1, 12, 0);

    common::record_at(&store, link.id, "first", at).await;
    common::record_at(&store, link.id, "second", at).await;

    let analytics = common::analytics_service(&store)
        .get_analytics(link.id, 1, 10)
        .await
        .unwrap();

    assert_eq!(analytics.details[0].ip, "second");
    assert_eq!(analytics.details[1].ip, "first");
}

#[tokio::test]
async fn test_get_analytics_empty_link() {
    let store = common::store();
    let link = common::create_test_link(&store, "empty", "https://example.com").await;

    let analytics = common::analytics_service(&store)
        .get_analytics(link.id, 1, 10)
        .await
        .unwrap();

    assert_eq!(analytics.visits, 0);
    assert!(analytics.details.is_empty());
    assert_eq!(analytics.pagination.total_pages, 1);
    assert_eq!(analytics.pagination.offset, 0);
}

#[tokio::test]
async fn test_get_analytics_errors() {
    let store = common::store();
    let service = common::analytics_service(&store);

    let missing = service.get_analytics(404, 1, 10).await.unwrap_err();
    assert!(matches!(missing, AppError::NotFound { .. }));

    let bad_page = service.get_analytics(404, 0, 10).await.unwrap_err();
    assert!(matches!(bad_page, AppError::Validation { .. }));
    assert_eq!(bad_page.to_error_info().code, "validation_error");
}

#[tokio::test]
async fn test_counter_matches_records_after_recording() {
    let store = common::store();
    let link = common::create_test_link(&store, "sync", "https://example.com").await;
    let redirects = common::redirect_service(&store);

    for ip in ["A", "B", "A"] {
        redirects.resolve("sync", ip, "ua").await.unwrap();
    }

    let analytics = common::analytics_service(&store)
        .get_analytics(link.id, 1, 10)
        .await
        .unwrap();

    assert_eq!(analytics.visits, 3);
    assert_eq!(analytics.summary.total_visits, analytics.visits);
    assert_eq!(analytics.summary.unique_visitors, 2);
    assert_eq!(analytics.details.len(), 3);
}

#[test]
fn test_paginate_examples() {
    assert_eq!(paginate(10, 1, 5).unwrap().total_pages, 2);
    assert_eq!(paginate(0, 1, 5).unwrap().total_pages, 1);
    assert_eq!(paginate(7, 1, 3).unwrap().total_pages, 3);
    assert_eq!(paginate(7, 3, 3).unwrap().offset, 6);
    assert!(paginate(7, 1, 0).is_err());
}

