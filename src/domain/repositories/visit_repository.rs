//! Repository trait for reading visit records.

use crate::domain::entities::{VisitRecord, VisitSample};
use crate::error::AppError;
use async_trait::async_trait;

/// Read primitives over stored visit records.
///
/// Appending is not part of this trait; records are only created through
/// [`crate::domain::repositories::VisitLedger::record`] together with the
/// counter increment.
///
/// All reads observe committed data only (read committed).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Fetches a page of visits for a link, newest first.
    ///
    /// Ordering is `visited_at DESC, id DESC` so that pages are stable when
    /// several visits share a timestamp.
    async fn page(
        &self,
        link_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VisitRecord>, AppError>;

    /// Counts visit records for a link.
    async fn count_by_link(&self, link_id: i64) -> Result<i64, AppError>;

    /// Counts distinct raw ip strings among a link's visit records.
    async fn distinct_ip_count(&self, link_id: i64) -> Result<i64, AppError>;

    /// Returns the ip and timestamp of every visit record for a link, in no
    /// particular order.
    ///
    /// All samples come from one committed snapshot, so a visit committed
    /// concurrently is either fully included or absent.
    async fn samples_by_link(&self, link_id: i64) -> Result<Vec<VisitSample>, AppError>;
}
