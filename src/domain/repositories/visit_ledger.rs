//! Transactional boundary for recording a visit.

use crate::domain::entities::{NewVisit, RecordedVisit};
use crate::error::AppError;
use async_trait::async_trait;

/// Records one visit as a single atomic unit.
///
/// An implementation must apply both of the following, or neither:
///
/// 1. an atomic storage-level increment of `links.visits_counter`
///    (no application-side read-modify-write)
/// 2. the append of one visit record for the same link
///
/// Any failure, including a dropped future after a timeout, must leave no
/// observable trace of either step.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgVisitLedger`] - one PostgreSQL transaction
/// - [`crate::infrastructure::persistence::MemoryStore`] - one write-lock critical section
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitLedger: Send + Sync {
    /// Increments the link's counter and appends the visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist (nothing is written).
    /// Returns [`AppError::Storage`] on persistence failure (nothing is written).
    async fn record(&self, link_id: i64, visit: NewVisit) -> Result<RecordedVisit, AppError>;
}
