//! High-level database service layer.
//!
//! Repository-agnostic operations that validate input and log before
//! delegating to a [`CoilRepository`]. Handlers call these rather than the
//! repository directly so validation is identical for every backend.
//!
//! ```text
//! HTTP handlers ─► services (validation, logging) ─► CoilRepository
//!                                                     ├─ LocalRepository
//!                                                     └─ PostgresRepository
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use coil_warehouse::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let coil = services::create_coil(&repo, 10.0, 20.0).await?;
//!     let removed = services::remove_coil(&repo, coil.id).await?;
//!     assert!(removed.is_some());
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::repository::{CoilRepository, ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{Coil, CoilFilter, CoilId, NewCoil};
use crate::services::CoilStats;

// ==================== Health & Connection ====================

/// Check if the backing store is healthy.
pub async fn health_check<R: CoilRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Coil Operations ====================

/// Create a coil after validating `length > 0` and `weight > 0`.
///
/// # Returns
/// * `Ok(Coil)` - The stored coil with its assigned id
/// * `Err(RepositoryError::ValidationError)` - Non-positive or NaN dimensions
pub async fn create_coil<R: CoilRepository + ?Sized>(
    repo: &R,
    length: f64,
    weight: f64,
) -> RepositoryResult<Coil> {
    let new_coil = NewCoil::new(length, weight).map_err(|message| {
        RepositoryError::validation_with_context(
            message,
            ErrorContext::new("create_coil").with_entity("coil"),
        )
    })?;

    let coil = repo.create_coil(&new_coil).await?;
    info!(
        "Created coil {} (length={}, weight={})",
        coil.id, coil.length, coil.weight
    );
    Ok(coil)
}

/// Remove an active coil now.
///
/// `Ok(None)` when the id is unknown or the coil was already removed.
pub async fn remove_coil<R: CoilRepository + ?Sized>(
    repo: &R,
    id: CoilId,
) -> RepositoryResult<Option<Coil>> {
    remove_coil_at(repo, id, None).await
}

/// Remove an active coil at an explicit instant (`None` means now).
pub async fn remove_coil_at<R: CoilRepository + ?Sized>(
    repo: &R,
    id: CoilId,
    at: Option<DateTime<Utc>>,
) -> RepositoryResult<Option<Coil>> {
    let removed = repo.remove_coil(id, at).await?;
    match &removed {
        Some(coil) => info!(
            "Removed coil {} (date_removed={:?})",
            coil.id, coil.date_removed
        ),
        None => info!("Coil {} not found or already removed", id),
    }
    Ok(removed)
}

/// List coils matching `filter`, ordered by ascending id.
pub async fn list_coils<R: CoilRepository + ?Sized>(
    repo: &R,
    filter: &CoilFilter,
) -> RepositoryResult<Vec<Coil>> {
    let coils = repo.list_coils(filter).await?;
    debug!("Listed {} coils (filtered={})", coils.len(), !filter.is_unfiltered());
    Ok(coils)
}

// ==================== Statistics ====================

/// Aggregate statistics for `[start, end]`.
///
/// # Returns
/// * `Err(RepositoryError::InvalidWindow)` - `start > end`
pub async fn get_statistics<R: CoilRepository + ?Sized>(
    repo: &R,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> RepositoryResult<CoilStats> {
    if start > end {
        return Err(RepositoryError::invalid_window(start, end));
    }

    let stats = repo.get_statistics(start, end).await?;
    info!(
        "Statistics for {} .. {}: added={}, removed={}",
        start, end, stats.added_count, stats.removed_count
    );
    Ok(stats)
}
