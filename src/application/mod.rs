//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation and timeouts. Services consume repository traits and are generic
//! over the storage backend.
//!
//! # Available Services
//!
//! - [`services::visit_recorder::VisitRecorder`] - Atomic visit recording
//! - [`services::redirect_service::RedirectService`] - Redirects in sync or async recording mode
//! - [`services::analytics_aggregator::AnalyticsAggregator`] - Per-link visit summaries
//! - [`services::analytics_service::AnalyticsService`] - Summary plus paginated visit details
//! - [`services::link_service::LinkService`] - Link lifecycle

pub mod services;
