//! Domain layer containing business entities and contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`pagination`] - Page/offset/limit arithmetic
//! - [`visit_event`] - Queued visit model for asynchronous recording
//! - [`visit_worker`] - Background worker applying queued visits
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])
//!
//! # Asynchronous Recording Flow
//!
//! 1. [`crate::application::services::RedirectService`] resolves the short code
//! 2. [`visit_event::VisitEvent`] is sent to a bounded channel
//! 3. [`visit_worker::run_visit_worker`] applies it through [`repositories::VisitLedger`]

pub mod entities;
pub mod pagination;
pub mod repositories;
pub mod visit_event;
pub mod visit_worker;
