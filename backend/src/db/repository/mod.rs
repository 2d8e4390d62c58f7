//! Repository trait definitions for coil storage.
//!
//! - [`error`]: Error types for repository operations
//! - [`coil`]: The [`CoilRepository`] trait implemented by every backend
//!
//! Code that needs storage takes a `&R where R: CoilRepository + ?Sized`, so it
//! works with both concrete repositories and `Arc<dyn CoilRepository>`.

pub mod coil;
pub mod error;

pub use coil::CoilRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
