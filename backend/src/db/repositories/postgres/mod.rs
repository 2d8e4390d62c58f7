//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution
//!
//! Configuration comes from [`PostgresConfig`](crate::db::PostgresConfig).
//!
//! Statistics are computed by the shared engine in
//! [`crate::services::statistics`] over coils loaded in id order, so results
//! match the in-memory backend exactly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

use crate::db::config::PostgresConfig;
use crate::db::repository::{CoilRepository, ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{storage_precision, utc_now, ClosedRange, Coil, CoilFilter, CoilId, NewCoil};
use crate::services::{compute_stats, CoilStats};

mod models;
mod schema;

use models::{CoilRow, NewCoilRow};
use schema::coils;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    pub idle_connections: u32,
    pub total_connections: u32,
    pub max_size: u32,
    /// Total operations handed to a connection
    pub total_queries: u64,
    pub failed_queries: u64,
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        log::info!(
            "Postgres repository ready (pool max={}, min={})",
            config.max_pool_size,
            config.min_pool_size
        );

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Run `f` on a pooled connection inside `spawn_blocking`.
    ///
    /// Retryable failures (pool exhaustion, serialization conflicts) are
    /// retried up to `max_retries` times with exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    log::warn!(
                        "Retrying database operation (attempt {}/{}) after {:?}",
                        attempt + 1,
                        max_retries + 1,
                        retry_delay
                    );
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::from(e);
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Current pool state and query counters.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    /// Seed a fully specified coil. Fixture helper, mirrors
    /// [`LocalRepository::insert_coil`](crate::db::repositories::LocalRepository::insert_coil).
    pub async fn insert_coil(
        &self,
        coil: NewCoil,
        date_added: DateTime<Utc>,
        date_removed: Option<DateTime<Utc>>,
    ) -> RepositoryResult<Coil> {
        let date_added = storage_precision(date_added);
        let date_removed = date_removed.map(storage_precision);
        if date_removed.is_some_and(|removed| removed < date_added) {
            return Err(RepositoryError::validation_with_context(
                "date_removed precedes date_added",
                ErrorContext::new("insert_coil").with_entity("coil"),
            ));
        }

        let row = NewCoilRow {
            date_removed,
            ..NewCoilRow::from_new(&coil, date_added)
        };
        self.with_conn(move |conn| {
            let inserted: CoilRow = diesel::insert_into(coils::table)
                .values(&row)
                .returning(CoilRow::as_returning())
                .get_result(conn)?;
            Ok(inserted.into())
        })
        .await
    }

    /// Delete every coil and reset the id sequence.
    pub async fn clear(&self) -> RepositoryResult<()> {
        self.with_conn(|conn| {
            sql_query("TRUNCATE TABLE coils RESTART IDENTITY").execute(conn)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl CoilRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn create_coil(&self, coil: &NewCoil) -> RepositoryResult<Coil> {
        let row = NewCoilRow::from_new(coil, utc_now());
        self.with_conn(move |conn| {
            let inserted: CoilRow = diesel::insert_into(coils::table)
                .values(&row)
                .returning(CoilRow::as_returning())
                .get_result(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("create_coil"))?;
            Ok(inserted.into())
        })
        .await
    }

    async fn remove_coil(
        &self,
        id: CoilId,
        at: Option<DateTime<Utc>>,
    ) -> RepositoryResult<Option<Coil>> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let current = coils::table
                    .find(id.value())
                    .select(CoilRow::as_select())
                    .for_update()
                    .first::<CoilRow>(tx)
                    .optional()?;

                let Some(current) = current else {
                    return Ok(None);
                };
                if current.date_removed.is_some() {
                    return Ok(None);
                }

                let removed_at = at.map_or_else(utc_now, storage_precision);
                if removed_at < current.date_added {
                    return Err(RepositoryError::validation_with_context(
                        format!(
                            "date_removed {} precedes date_added {}",
                            removed_at, current.date_added
                        ),
                        ErrorContext::new("remove_coil")
                            .with_entity("coil")
                            .with_entity_id(id),
                    ));
                }

                let updated = diesel::update(
                    coils::table
                        .filter(coils::id.eq(id.value()))
                        .filter(coils::date_removed.is_null()),
                )
                .set(coils::date_removed.eq(Some(removed_at)))
                .returning(CoilRow::as_returning())
                .get_result::<CoilRow>(tx)
                .optional()?;

                Ok(updated.map(Coil::from))
            })
        })
        .await
    }

    async fn list_coils(&self, filter: &CoilFilter) -> RepositoryResult<Vec<Coil>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut query = coils::table.select(CoilRow::as_select()).into_boxed();

            if let Some(ClosedRange { min, max }) = filter.id_range {
                query = query.filter(coils::id.between(min.value(), max.value()));
            }
            if let Some(ClosedRange { min, max }) = filter.weight_range {
                query = query.filter(coils::weight.between(min, max));
            }
            if let Some(ClosedRange { min, max }) = filter.length_range {
                query = query.filter(coils::length.between(min, max));
            }
            if let Some(ClosedRange { min, max }) = filter.date_added_range {
                query = query.filter(coils::date_added.between(min, max));
            }
            // NULL BETWEEN .. is never true, so active coils drop out here
            if let Some(ClosedRange { min, max }) = filter.date_removed_range {
                query = query.filter(coils::date_removed.between(min, max));
            }

            let rows = query
                .order(coils::id.asc())
                .load::<CoilRow>(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("list_coils"))?;
            Ok(rows.into_iter().map(Coil::from).collect())
        })
        .await
    }

    async fn get_statistics(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<CoilStats> {
        let coils = self
            .with_conn(move |conn| {
                // Coils added after `end` cannot affect any statistic
                let rows = coils::table
                    .filter(coils::date_added.le(end))
                    .select(CoilRow::as_select())
                    .order(coils::id.asc())
                    .load::<CoilRow>(conn)
                    .map_err(|e| RepositoryError::from(e).with_operation("get_statistics"))?;
                Ok(rows.into_iter().map(Coil::from).collect::<Vec<_>>())
            })
            .await?;

        Ok(compute_stats(&coils, &ClosedRange::new(start, end)))
    }
}
