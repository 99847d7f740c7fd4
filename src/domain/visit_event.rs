//! Visit event model for asynchronous visit recording.

use chrono::{DateTime, Utc};

use crate::domain::entities::NewVisit;

/// An in-memory representation of a resolved redirect awaiting recording.
///
/// Created after the short code has been resolved, so it already carries the
/// link id; the worker does not repeat the lookup. `visited_at` is captured
/// when the redirect happens, not when the worker gets to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitEvent {
    pub link_id: i64,
    pub short_code: String,
    pub ip: String,
    pub user_agent: String,
    pub visited_at: DateTime<Utc>,
}

impl VisitEvent {
    /// Creates a new visit event stamped with the current time.
    pub fn new(
        link_id: i64,
        short_code: impl Into<String>,
        ip: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            link_id,
            short_code: short_code.into(),
            ip: ip.into(),
            user_agent: user_agent.into(),
            visited_at: Utc::now(),
        }
    }

    /// Converts the event into ledger input, keeping the original timestamp.
    pub fn into_new_visit(self) -> NewVisit {
        NewVisit::new(self.ip, self.user_agent).at(self.visited_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_event_creation() {
        let before = Utc::now();
        let event = VisitEvent::new(42, "abc123", "192.168.1.1", "Mozilla/5.0");

        assert_eq!(event.link_id, 42);
        assert_eq!(event.short_code, "abc123");
        assert_eq!(event.ip, "192.168.1.1");
        assert_eq!(event.user_agent, "Mozilla/5.0");
        assert!(event.visited_at >= before);
    }

    #[test]
    fn test_into_new_visit_keeps_timestamp() {
        let event = VisitEvent::new(1, "code1", "1.1.1.1", "Safari");
        let visited_at = event.visited_at;

        let visit = event.into_new_visit();

        assert_eq!(visit.ip, "1.1.1.1");
        assert_eq!(visit.user_agent, "Safari");
        assert_eq!(visit.visited_at, Some(visited_at));
    }
}
