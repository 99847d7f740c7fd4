//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// Exposes lookups and lifecycle operations. No method here touches
/// `visits_counter`; the counter only moves through
/// [`crate::domain::repositories::VisitLedger`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - In-memory implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new link with a zero visit counter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the short code already exists
    /// (constraint `links_short_code_key`) or on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its identifier.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Finds a link by its short code.
    async fn find_by_short_code(&self, short_code: &str) -> Result<Option<Link>, AppError>;

    /// Lists links newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Link>, AppError>;

    /// Counts all links.
    async fn count(&self) -> Result<i64, AppError>;

    /// Partially updates a link and bumps `updated_at`.
    ///
    /// Returns `Ok(None)` if no link has this id.
    async fn update(&self, id: i64, patch: LinkPatch) -> Result<Option<Link>, AppError>;

    /// Deletes a link and, by cascade, all of its visit records.
    ///
    /// Returns `Ok(true)` if the link existed.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
