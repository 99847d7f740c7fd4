//! Visit record entity: one redirect observation tied to a link.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A visit recorded when a short link is resolved.
///
/// Immutable once stored. The ip is kept as the raw string received; no
/// format validation or canonicalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitRecord {
    pub id: i64,
    pub link_id: i64,
    pub ip: String,
    pub user_agent: String,
    pub visited_at: DateTime<Utc>,
}

impl VisitRecord {
    pub fn new(
        id: i64,
        link_id: i64,
        ip: String,
        user_agent: String,
        visited_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            link_id,
            ip,
            user_agent,
            visited_at,
        }
    }
}

/// The fields of a stored visit that aggregation reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitSample {
    pub ip: String,
    pub visited_at: DateTime<Utc>,
}

impl VisitSample {
    pub fn new(ip: impl Into<String>, visited_at: DateTime<Utc>) -> Self {
        Self {
            ip: ip.into(),
            visited_at,
        }
    }
}

/// Input data for recording a visit.
///
/// `visited_at` defaults to the recording time when `None`. It is set
/// explicitly when a visit is recorded after the fact (asynchronous mode) so
/// the stored timestamp reflects when the redirect actually happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    pub ip: String,
    pub user_agent: String,
    pub visited_at: Option<DateTime<Utc>>,
}

impl NewVisit {
    pub fn new(ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            user_agent: user_agent.into(),
            visited_at: None,
        }
    }

    /// Pins the visit timestamp instead of using the recording time.
    pub fn at(mut self, visited_at: DateTime<Utc>) -> Self {
        self.visited_at = Some(visited_at);
        self
    }
}

/// Outcome of one committed visit: the link's new counter and the stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedVisit {
    pub visits_counter: i64,
    pub visit: VisitRecord,
}
