//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access following the Repository pattern and are
//! implemented by concrete stores in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Link lookups and lifecycle
//! - [`VisitRepository`] - Visit record reads and aggregation primitives
//! - [`VisitLedger`] - Atomic counter increment + visit append
//!
//! # Testing
//!
//! See integration tests in `tests/` for usage against the in-memory store.

pub mod link_repository;
pub mod visit_ledger;
pub mod visit_repository;

pub use link_repository::LinkRepository;
pub use visit_ledger::VisitLedger;
pub use visit_repository::VisitRepository;

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use visit_ledger::MockVisitLedger;
#[cfg(test)]
pub use visit_repository::MockVisitRepository;
