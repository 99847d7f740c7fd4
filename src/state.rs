//! Shared service handles built at startup.

use std::sync::Arc;

use crate::application::services::{AnalyticsService, LinkService, RedirectService};
use crate::infrastructure::persistence::{PgLinkRepository, PgVisitLedger, PgVisitRepository};

pub type PgLinkService = LinkService<PgLinkRepository>;
pub type PgRedirectService = RedirectService<PgLinkRepository, PgVisitLedger>;
pub type PgAnalyticsService = AnalyticsService<PgLinkRepository, PgVisitRepository>;

/// Services over the PostgreSQL backend.
///
/// Cloning is cheap. In async recording mode every clone keeps the visit
/// queue open; all clones must be dropped before the worker can drain.
#[derive(Clone)]
pub struct AppState {
    pub links: Arc<PgLinkService>,
    pub redirects: Arc<PgRedirectService>,
    pub analytics: Arc<PgAnalyticsService>,
}

impl AppState {
    pub fn new(
        links: Arc<PgLinkService>,
        redirects: Arc<PgRedirectService>,
        analytics: Arc<PgAnalyticsService>,
    ) -> Self {
        Self {
            links,
            redirects,
            analytics,
        }
    }
}
