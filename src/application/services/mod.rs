//! Business logic services for the application layer.

pub mod analytics_aggregator;
pub mod analytics_service;
pub mod link_service;
pub mod redirect_service;
pub mod visit_recorder;

pub use analytics_aggregator::{AnalyticsAggregator, AnalyticsSummary, DateCount};
pub use analytics_service::{AnalyticsService, LinkAnalytics};
pub use link_service::LinkService;
pub use redirect_service::{RecordingMode, RedirectService};
pub use visit_recorder::VisitRecorder;
