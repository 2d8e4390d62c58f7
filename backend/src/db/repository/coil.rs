//! Coil repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::models::{Coil, CoilFilter, CoilId, NewCoil};
use crate::services::CoilStats;

/// Storage operations for coils.
///
/// Implementations must be `Send + Sync` so a single handle can be shared
/// across request handlers behind an `Arc<dyn CoilRepository>`.
#[async_trait]
pub trait CoilRepository: Send + Sync {
    /// Check if the backing store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if healthy
    /// - `Ok(false)` if unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Insert a new active coil.
    ///
    /// The store assigns the id and sets `date_added` to the current time.
    async fn create_coil(&self, coil: &NewCoil) -> RepositoryResult<Coil>;

    /// Mark a coil as removed.
    ///
    /// Sets `date_removed` to `at`, or to the current time when `at` is `None`.
    ///
    /// # Returns
    /// * `Ok(Some(Coil))` - The updated coil
    /// * `Ok(None)` - The id is unknown or the coil was already removed
    /// * `Err(RepositoryError::ValidationError)` - `at` precedes `date_added`
    async fn remove_coil(
        &self,
        id: CoilId,
        at: Option<DateTime<Utc>>,
    ) -> RepositoryResult<Option<Coil>>;

    /// List coils matching every range in `filter`, ordered by ascending id.
    async fn list_coils(&self, filter: &CoilFilter) -> RepositoryResult<Vec<Coil>>;

    /// Aggregate statistics for the inclusive window `[start, end]`.
    ///
    /// Callers guarantee `start <= end`; the service layer enforces it.
    async fn get_statistics(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<CoilStats>;
}
