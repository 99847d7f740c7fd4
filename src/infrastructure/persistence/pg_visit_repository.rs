//! PostgreSQL implementation of visit repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{VisitRecord, VisitSample};
use crate::domain::repositories::VisitRepository;
use crate::error::AppError;

/// PostgreSQL repository for visit record reads.
///
/// Each method is a single statement, so each observes one committed snapshot.
pub struct PgVisitRepository {
    pool: Arc<PgPool>,
}

impl PgVisitRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct VisitRow {
    pub(super) id: i64,
    pub(super) link_id: i64,
    pub(super) ip: String,
    pub(super) user_agent: String,
    pub(super) visited_at: DateTime<Utc>,
}

impl From<VisitRow> for VisitRecord {
    fn from(r: VisitRow) -> Self {
        VisitRecord::new(r.id, r.link_id, r.ip, r.user_agent, r.visited_at)
    }
}

#[async_trait]
impl VisitRepository for PgVisitRepository {
    async fn page(
        &self,
        link_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VisitRecord>, AppError> {
        let rows = sqlx::query_as::<_, VisitRow>(
            r#"
            SELECT id, link_id, ip, user_agent, visited_at
            FROM visits
            WHERE link_id = $1
            ORDER BY visited_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(link_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(VisitRecord::from).collect())
    }

    async fn count_by_link(&self, link_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visits WHERE link_id = $1")
            .bind(link_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn distinct_ip_count(&self, link_id: i64) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT ip) FROM visits WHERE link_id = $1")
                .bind(link_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn samples_by_link(&self, link_id: i64) -> Result<Vec<VisitSample>, AppError> {
        let rows: Vec<(String, DateTime<Utc>)> =
            sqlx::query_as("SELECT ip, visited_at FROM visits WHERE link_id = $1")
                .bind(link_id)
                .fetch_all(self.pool.as_ref())
                .await?;

        Ok(rows
            .into_iter()
            .map(|(ip, visited_at)| VisitSample::new(ip, visited_at))
            .collect())
    }
}
