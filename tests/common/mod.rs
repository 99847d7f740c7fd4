#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use link_analytics::application::services::{
    AnalyticsService, LinkService, RedirectService, VisitRecorder,
};
use link_analytics::domain::entities::{Link, NewLink, NewVisit};
use link_analytics::domain::repositories::{LinkRepository, VisitLedger};
use link_analytics::infrastructure::persistence::MemoryStore;

pub type MemoryRecorder = VisitRecorder<MemoryStore, MemoryStore>;

pub fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

pub async fn create_test_link(store: &MemoryStore, code: &str, url: &str) -> Link {
    store
        .create(NewLink {
            short_code: code.to_string(),
            original_url: url.to_string(),
        })
        .await
        .unwrap()
}

/// Appends a visit with an explicit timestamp through the ledger.
pub async fn record_at(store: &MemoryStore, link_id: i64, ip: &str, at: DateTime<Utc>) {
    store
        .record(link_id, NewVisit::new(ip, "Mozilla/5.0").at(at))
        .await
        .unwrap();
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn recorder(store: &Arc<MemoryStore>) -> MemoryRecorder {
    VisitRecorder::new(store.clone(), store.clone())
}

pub fn redirect_service(store: &Arc<MemoryStore>) -> RedirectService<MemoryStore, MemoryStore> {
    RedirectService::synchronous(Arc::new(recorder(store)))
}

pub fn analytics_service(store: &Arc<MemoryStore>) -> AnalyticsService<MemoryStore, MemoryStore> {
    AnalyticsService::new(store.clone(), store.clone())
}

pub fn link_service(store: &Arc<MemoryStore>) -> LinkService<MemoryStore> {
    LinkService::new(store.clone())
}
