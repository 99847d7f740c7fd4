//! In-memory store implementing every repository trait.
//!
//! Intended for tests and local experiments. All state sits behind one async
//! `RwLock`; a ledger call holds the write lock for the whole
//! increment + append, which makes it atomic with respect to every reader.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::domain::entities::{
    Link, LinkPatch, NewLink, NewVisit, RecordedVisit, VisitRecord, VisitSample,
};
use crate::domain::repositories::{LinkRepository, VisitLedger, VisitRepository};
use crate::error::AppError;

#[derive(Default)]
struct State {
    links: BTreeMap<i64, Link>,
    visits: Vec<VisitRecord>,
    last_link_id: i64,
    last_visit_id: i64,
}

impl State {
    fn visits_of(&self, link_id: i64) -> impl Iterator<Item = &VisitRecord> {
        self.visits.iter().filter(move |v| v.link_id == link_id)
    }
}

/// Lock-protected in-memory backend.
///
/// [`MemoryStore::fail_appends`] makes every subsequent ledger call fail at
/// the append step, after the increment has been staged, to exercise the
/// rollback path.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    fail_appends: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles injected failures of the append step.
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Number of stored visit records across all links.
    pub async fn visit_count(&self) -> usize {
        self.state.read().await.visits.len()
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut state = self.state.write().await;

        if state
            .links
            .values()
            .any(|l| l.short_code == new_link.short_code)
        {
            return Err(AppError::storage(
                "Unique constraint violation",
                json!({ "constraint": "links_short_code_key" }),
            ));
        }

        state.last_link_id += 1;
        let now = Utc::now();
        let link = Link::new(
            state.last_link_id,
            new_link.short_code,
            new_link.original_url,
            0,
            now,
            now,
        );
        state.links.insert(link.id, link.clone());

        Ok(link)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        Ok(self.state.read().await.links.get(&id).cloned())
    }

    async fn find_by_short_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        Ok(self
            .state
            .read()
            .await
            .links
            .values()
            .find(|l| l.short_code == short_code)
            .cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Link>, AppError> {
        let state = self.state.read().await;
        let mut links: Vec<Link> = state.links.values().cloned().collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(links
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.state.read().await.links.len() as i64)
    }

    async fn update(&self, id: i64, patch: LinkPatch) -> Result<Option<Link>, AppError> {
        let mut state = self.state.write().await;

        let Some(link) = state.links.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(url) = patch.original_url {
            link.original_url = url;
        }
        link.updated_at = Utc::now();

        Ok(Some(link.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut state = self.state.write().await;

        if state.links.remove(&id).is_none() {
            return Ok(false);
        }
        state.visits.retain(|v| v.link_id != id);

        Ok(true)
    }
}

#[async_trait]
impl VisitRepository for MemoryStore {
    async fn page(
        &self,
        link_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VisitRecord>, AppError> {
        let state = self.state.read().await;
        let mut visits: Vec<VisitRecord> = state.visits_of(link_id).cloned().collect();
        visits.sort_by(|a, b| b.visited_at.cmp(&a.visited_at).then(b.id.cmp(&a.id)));

        Ok(visits
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_by_link(&self, link_id: i64) -> Result<i64, AppError> {
        Ok(self.state.read().await.visits_of(link_id).count() as i64)
    }

    async fn distinct_ip_count(&self, link_id: i64) -> Result<i64, AppError> {
        let state = self.state.read().await;
        let mut ips: Vec<&str> = state.visits_of(link_id).map(|v| v.ip.as_str()).collect();
        ips.sort_unstable();
        ips.dedup();

        Ok(ips.len() as i64)
    }

    async fn samples_by_link(&self, link_id: i64) -> Result<Vec<VisitSample>, AppError> {
        Ok(self
            .state
            .read()
            .await
            .visits_of(link_id)
            .map(|v| VisitSample::new(v.ip.clone(), v.visited_at))
            .collect())
    }
}

#[async_trait]
impl VisitLedger for MemoryStore {
    async fn record(&self, link_id: i64, visit: NewVisit) -> Result<RecordedVisit, AppError> {
        let mut state = self.state.write().await;

        // Stage both writes; nothing is applied until both have succeeded.
        let Some(current) = state.links.get(&link_id).map(|l| l.visits_counter) else {
            return Err(AppError::not_found("Link not found", json!({ "link_id": link_id })));
        };
        let visits_counter = current + 1;

        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(AppError::storage("Injected append failure", json!({ "link_id": link_id })));
        }

        let record = VisitRecord::new(
            state.last_visit_id + 1,
            link_id,
            visit.ip,
            visit.user_agent,
            visit.visited_at.unwrap_or_else(Utc::now),
        );

        state.last_visit_id = record.id;
        state.visits.push(record.clone());
        if let Some(link) = state.links.get_mut(&link_id) {
            link.visits_counter = visits_counter;
        }

        Ok(RecordedVisit {
            visits_counter,
            visit: record,
        })
    }
}
