//! Storage backends implementing the domain repository traits.
//!
//! # PostgreSQL
//!
//! SQLx-based implementations sharing one connection pool:
//!
//! - [`PgLinkRepository`] - Link storage and retrieval
//! - [`PgVisitRepository`] - Visit record reads and aggregation primitives
//! - [`PgVisitLedger`] - Transactional counter increment + visit append
//!
//! # In-memory
//!
//! - [`MemoryStore`] - Implements all three traits; used by tests

pub mod memory_store;
pub mod pg_link_repository;
pub mod pg_visit_ledger;
pub mod pg_visit_repository;

pub use memory_store::MemoryStore;
pub use pg_link_repository::PgLinkRepository;
pub use pg_visit_ledger::PgVisitLedger;
pub use pg_visit_repository::PgVisitRepository;
