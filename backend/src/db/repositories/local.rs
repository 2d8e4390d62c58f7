//! In-memory local repository implementation.
//!
//! Suitable for unit tests and local development. Coils live in a `BTreeMap`
//! keyed by id, so listings come out in ascending id order without sorting and
//! the statistics engine sees the same input order as the Postgres backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::repository::{CoilRepository, ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{storage_precision, utc_now, ClosedRange, Coil, CoilFilter, CoilId, NewCoil};
use crate::services::{compute_stats, CoilStats};

/// In-memory local repository.
///
/// Cloning is cheap and clones share the same underlying data.
///
/// # Example
/// ```
/// use coil_warehouse::db::repositories::LocalRepository;
/// use coil_warehouse::db::repository::CoilRepository;
/// use coil_warehouse::models::NewCoil;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let repo = LocalRepository::new();
///     let coil = repo.create_coil(&NewCoil::new(10.0, 20.0).unwrap()).await.unwrap();
///     assert!(coil.is_active());
///     assert_eq!(repo.coil_count(), 1);
/// });
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    coils: BTreeMap<CoilId, Coil>,
    next_id: i64,
    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            coils: BTreeMap::new(),
            next_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn allocate_id(&mut self) -> CoilId {
        let id = CoilId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Seed a fully specified coil, assigning the next id.
    ///
    /// Fixtures use this to place coils at arbitrary points in time, which
    /// [`CoilRepository::create_coil`] cannot do.
    pub fn insert_coil(
        &self,
        coil: NewCoil,
        date_added: DateTime<Utc>,
        date_removed: Option<DateTime<Utc>>,
    ) -> RepositoryResult<Coil> {
        let date_added = storage_precision(date_added);
        let date_removed = date_removed.map(storage_precision);
        if let Some(removed) = date_removed {
            ensure_removal_order(date_added, removed, "insert_coil", None)?;
        }

        let mut data = self.data.write();
        let id = data.allocate_id();
        let mut stored = coil.into_coil(id, date_added);
        stored.date_removed = date_removed;
        data.coils.insert(id, stored.clone());
        Ok(stored)
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all coils and restart id assignment at 1.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Number of coils stored, active or removed.
    pub fn coil_count(&self) -> usize {
        self.data.read().coils.len()
    }

    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_removal_order(
    added: DateTime<Utc>,
    removed: DateTime<Utc>,
    operation: &str,
    id: Option<CoilId>,
) -> RepositoryResult<()> {
    if removed < added {
        let mut context = ErrorContext::new(operation).with_entity("coil");
        if let Some(id) = id {
            context = context.with_entity_id(id);
        }
        return Err(RepositoryError::validation_with_context(
            format!("date_removed {} precedes date_added {}", removed, added),
            context,
        ));
    }
    Ok(())
}

#[async_trait]
impl CoilRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn create_coil(&self, coil: &NewCoil) -> RepositoryResult<Coil> {
        self.check_health("create_coil")?;

        let mut data = self.data.write();
        let id = data.allocate_id();
        let stored = coil.into_coil(id, utc_now());
        data.coils.insert(id, stored.clone());
        Ok(stored)
    }

    async fn remove_coil(
        &self,
        id: CoilId,
        at: Option<DateTime<Utc>>,
    ) -> RepositoryResult<Option<Coil>> {
        self.check_health("remove_coil")?;

        let mut data = self.data.write();
        let Some(coil) = data.coils.get_mut(&id) else {
            return Ok(None);
        };
        if !coil.is_active() {
            return Ok(None);
        }

        let removed_at = at.map_or_else(utc_now, storage_precision);
        ensure_removal_order(coil.date_added, removed_at, "remove_coil", Some(id))?;
        coil.date_removed = Some(removed_at);
        Ok(Some(coil.clone()))
    }

    async fn list_coils(&self, filter: &CoilFilter) -> RepositoryResult<Vec<Coil>> {
        self.check_health("list_coils")?;

        let data = self.data.read();
        let coils = match filter.id_range {
            Some(ClosedRange { min, max }) if min <= max => data
                .coils
                .range(min..=max)
                .map(|(_, coil)| coil)
                .filter(|coil| filter.matches(coil))
                .cloned()
                .collect(),
            Some(_) => Vec::new(),
            None => data
                .coils
                .values()
                .filter(|coil| filter.matches(coil))
                .cloned()
                .collect(),
        };
        Ok(coils)
    }

    async fn get_statistics(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<CoilStats> {
        self.check_health("get_statistics")?;

        let data = self.data.read();
        let coils: Vec<Coil> = data.coils.values().cloned().collect();
        drop(data);

        Ok(compute_stats(&coils, &ClosedRange::new(start, end)))
    }
}
