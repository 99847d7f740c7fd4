//! Link lifecycle service.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::pagination::{PageRequest, Pagination};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::deadline::{DEFAULT_STORE_TIMEOUT, bounded};
use serde_json::json;

/// Service for creating, reading, updating and deleting links.
///
/// The visit counter is never written here; it only moves through the visit
/// ledger.
pub struct LinkService<L: LinkRepository> {
    link_repository: Arc<L>,
    store_timeout: Duration,
}

impl<L: LinkRepository> LinkService<L> {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<L>) -> Self {
        Self {
            link_repository,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Creates a link with a zero visit counter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the short code or URL is empty.
    /// Returns [`AppError::Storage`] if the short code is taken (details carry
    /// the constraint name) or on database errors.
    pub async fn create(
        &self,
        short_code: String,
        original_url: String,
    ) -> Result<Link, AppError> {
        if short_code.trim().is_empty() {
            return Err(AppError::bad_request(
                "Short code must not be empty",
                json!({ "short_code": short_code }),
            ));
        }

        if original_url.trim().is_empty() {
            return Err(AppError::bad_request(
                "Original URL must not be empty",
                json!({ "original_url": original_url }),
            ));
        }

        let new_link = NewLink {
            short_code,
            original_url,
        };

        bounded(
            self.store_timeout,
            "create_link",
            self.link_repository.create(new_link),
        )
        .await
    }

    /// Retrieves a link by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn get(&self, id: i64) -> Result<Link, AppError> {
        bounded(
            self.store_timeout,
            "find_by_id",
            self.link_repository.find_by_id(id),
        )
        .await?
        .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": id })))
    }

    /// Retrieves a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    pub async fn get_by_short_code(&self, short_code: &str) -> Result<Link, AppError> {
        bounded(
            self.store_timeout,
            "find_by_short_code",
            self.link_repository.find_by_short_code(short_code),
        )
        .await?
        .ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "short_code": short_code }))
        })
    }

    /// Lists links, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `page < 1` or `limit < 1`.
    pub async fn list(&self, page: i64, limit: i64) -> Result<(Vec<Link>, Pagination), AppError> {
        let request = PageRequest::new(page, limit)?;

        let (links, total) = tokio::try_join!(
            bounded(
                self.store_timeout,
                "list_links",
                self.link_repository.list(request.limit, request.offset())
            ),
            bounded(
                self.store_timeout,
                "count_links",
                self.link_repository.count()
            ),
        )?;

        Ok((links, request.with_total(total)))
    }

    /// Applies a partial update and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the new URL is empty.
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn update(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError> {
        if let Some(url) = &patch.original_url
            && url.trim().is_empty()
        {
            return Err(AppError::bad_request(
                "Original URL must not be empty",
                json!({ "link_id": id }),
            ));
        }

        bounded(
            self.store_timeout,
            "update_link",
            self.link_repository.update(id, patch),
        )
        .await?
        .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": id })))
    }

    /// Deletes a link together with its visit records.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let deleted = bounded(
            self.store_timeout,
            "delete_link",
            self.link_repository.delete(id),
        )
        .await?;

        if !deleted {
            return Err(AppError::not_found("Link not found", json!({ "link_id": id })));
        }

        Ok(())
    }
}
