//! PostgreSQL implementation of the visit ledger.
//!
//! One visit is one transaction:
//!
//! ```sql
//! BEGIN;
//! UPDATE links SET visits_counter = visits_counter + 1 WHERE id = $1 RETURNING visits_counter;
//! INSERT INTO visits (link_id, ip, user_agent, visited_at) VALUES (...) RETURNING ...;
//! COMMIT;
//! ```
//!
//! The `UPDATE` takes the row lock on the link, so concurrent visits to the
//! same link serialize on it and no increment is lost. Both statements go
//! through the same connection; if either fails, or the future is dropped
//! before `COMMIT`, the transaction is rolled back.

use async_trait::async_trait;
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;

use super::pg_visit_repository::VisitRow;
use crate::domain::entities::{NewVisit, RecordedVisit, VisitRecord};
use crate::domain::repositories::VisitLedger;
use crate::error::AppError;

/// Transactional visit recorder backed by PostgreSQL.
pub struct PgVisitLedger {
    pool: Arc<PgPool>,
}

impl PgVisitLedger {
    /// Creates a new ledger with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Atomically bumps the counter. `None` when the link does not exist.
async fn increment_visits(
    conn: &mut PgConnection,
    link_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        UPDATE links
        SET visits_counter = visits_counter + 1
        WHERE id = $1
        RETURNING visits_counter
        "#,
    )
    .bind(link_id)
    .fetch_optional(conn)
    .await
}

async fn append_visit(
    conn: &mut PgConnection,
    link_id: i64,
    visit: &NewVisit,
) -> Result<VisitRow, sqlx::Error> {
    sqlx::query_as::<_, VisitRow>(
        r#"
        INSERT INTO visits (link_id, ip, user_agent, visited_at)
        VALUES ($1, $2, $3, COALESCE($4, NOW()))
        RETURNING id, link_id, ip, user_agent, visited_at
        "#,
    )
    .bind(link_id)
    .bind(&visit.ip)
    .bind(&visit.user_agent)
    .bind(visit.visited_at)
    .fetch_one(conn)
    .await
}

#[async_trait]
impl VisitLedger for PgVisitLedger {
    async fn record(&self, link_id: i64, visit: NewVisit) -> Result<RecordedVisit, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(visits_counter) = increment_visits(&mut *tx, link_id).await? else {
            tx.rollback().await?;
            return Err(AppError::not_found("Link not found", json!({ "link_id": link_id })));
        };

        let row = append_visit(&mut *tx, link_id, &visit).await?;

        tx.commit().await?;

        Ok(RecordedVisit {
            visits_counter,
            visit: VisitRecord::from(row),
        })
    }
}
