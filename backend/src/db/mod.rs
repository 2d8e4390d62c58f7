//! Coil storage: repository trait, backends, configuration and service layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, server binary)            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Input validation (dimensions, window ordering)       │
//! │  - Operation logging                                    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository/) - CoilRepository        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                │
//! ┌───▼──────────────────┐  ┌──────────▼──────────────┐
//! │ Postgres Repository  │  │ Local Repository        │
//! │ (Diesel, feature)    │  │ (in-memory)             │
//! └──────────────────────┘  └─────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! ```ignore
//! use coil_warehouse::db::{services, RepositoryFactory};
//!
//! let repo = RepositoryFactory::from_env().await?;
//! let coils = services::list_coils(repo.as_ref(), &Default::default()).await?;
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod config;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

#[cfg(test)]
#[path = "services_tests.rs"]
mod services_tests;

pub use config::PostgresConfig;
pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::{PoolStats, PostgresRepository};
pub use repository::{CoilRepository, ErrorContext, RepositoryError, RepositoryResult};

pub use services::{
    create_coil, get_statistics, health_check, list_coils, remove_coil, remove_coil_at,
};
