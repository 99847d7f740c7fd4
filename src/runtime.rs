//! Store and worker lifecycle.
//!
//! Handles database connection, migrations, service wiring and the optional
//! background visit worker. Everything is created in [`Runtime::init`] and
//! torn down in [`Runtime::shutdown`]; there are no global handles.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::task::JoinHandle;

use crate::application::services::{
    AnalyticsService, LinkService, RecordingMode, RedirectService, VisitRecorder,
};
use crate::config::Config;
use crate::infrastructure::persistence::{PgLinkRepository, PgVisitLedger, PgVisitRepository};
use crate::state::AppState;

/// Running application: services, pool and worker handle.
pub struct Runtime {
    state: AppState,
    pool: PgPool,
    worker: Option<JoinHandle<()>>,
    drain_timeout: Duration,
}

impl Runtime {
    /// Connects to the database and wires every service.
    ///
    /// Initializes:
    /// - PostgreSQL connection pool
    /// - Apply migrations
    /// - Repositories and services
    /// - Background visit worker (async recording mode only)
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or migrations fail.
    pub async fn init(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
            .idle_timeout(Duration::from_secs(config.db_idle_timeout))
            .max_lifetime(Duration::from_secs(config.db_max_lifetime))
            .connect(&config.database_url)
            .await
            .context("Failed to connect to database")?;
        tracing::info!("Connected to database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        let (state, worker) = build_state(config, Arc::new(pool.clone()));

        Ok(Self {
            state,
            pool,
            worker,
            drain_timeout: config.shutdown_drain_timeout(),
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Drains queued visits, then closes the pool.
    ///
    /// The worker is given [`Config::shutdown_drain_timeout`] to finish;
    /// visits still queued after that are lost.
    pub async fn shutdown(self) {
        let Self {
            state,
            pool,
            worker,
            drain_timeout,
        } = self;

        // Closes the visit queue once the last clone is gone.
        drop(state);

        if let Some(worker) = worker {
            match tokio::time::timeout(drain_timeout, worker).await {
                Ok(Ok(())) => tracing::info!("Visit queue drained"),
                Ok(Err(e)) => tracing::error!(error = %e, "Visit worker panicked"),
                Err(_) => tracing::warn!(
                    timeout_secs = drain_timeout.as_secs(),
                    "Visit queue not drained before timeout, remaining visits lost"
                ),
            }
        }

        pool.close().await;
        tracing::info!("Database pool closed");
    }
}

fn build_state(config: &Config, pool: Arc<PgPool>) -> (AppState, Option<JoinHandle<()>>) {
    let store_timeout = config.store_timeout();

    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let visit_repository = Arc::new(PgVisitRepository::new(pool.clone()));
    let visit_ledger = Arc::new(PgVisitLedger::new(pool));

    let recorder = Arc::new(
        VisitRecorder::new(link_repository.clone(), visit_ledger)
            .with_store_timeout(store_timeout),
    );

    let (redirects, worker) = match config.recording_mode {
        RecordingMode::Sync => (RedirectService::synchronous(recorder), None),
        RecordingMode::Async => {
            let (service, worker) =
                RedirectService::asynchronous(recorder, config.visit_queue_capacity);
            tracing::info!(
                capacity = config.visit_queue_capacity,
                "Visit worker started"
            );
            (service, Some(worker))
        }
    };

    let links = LinkService::new(link_repository.clone()).with_store_timeout(store_timeout);
    let analytics = AnalyticsService::new(link_repository, visit_repository)
        .with_store_timeout(store_timeout);

    let state = AppState::new(Arc::new(links), Arc::new(redirects), Arc::new(analytics));

    (state, worker)
}
