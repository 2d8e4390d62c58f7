//! Repository factory for dependency injection.
//!
//! Builds an `Arc<dyn CoilRepository>` from runtime configuration. The caller
//! owns the handle and passes it to whatever needs storage; nothing here keeps
//! a process-wide instance.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::config::PostgresConfig;
use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::PostgresRepository;
use super::repository::{CoilRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Postgres + Diesel implementation
    Postgres,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string, case-insensitively.
    ///
    /// Accepts `postgres`/`pg` and `local`/`memory`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl std::fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::Local => write!(f, "local"),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variables.
    ///
    /// Reads `REPOSITORY_TYPE`; an unparseable value falls back to Local.
    /// Without it, Postgres is chosen when a database URL is present.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or_else(|e| {
                log::warn!("{}; falling back to local repository", e);
                Self::Local
            });
        }

        if std::env::var("DATABASE_URL").is_ok() || std::env::var("PG_DATABASE_URL").is_ok() {
            Self::Postgres
        } else {
            Self::Local
        }
    }
}

fn postgres_disabled() -> RepositoryError {
    RepositoryError::configuration("Postgres repository feature not enabled")
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use coil_warehouse::db::{PostgresConfig, RepositoryFactory, RepositoryType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = PostgresConfig::from_env()?;
///     let _pg_repo = RepositoryFactory::create(RepositoryType::Postgres, Some(&config)).await?;
///
///     let local_repo = RepositoryFactory::create_local();
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// `postgres_config` is required for [`RepositoryType::Postgres`] and ignored otherwise.
    pub async fn create(
        repo_type: RepositoryType,
        postgres_config: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn CoilRepository>> {
        log::info!("Creating {} repository", repo_type);
        match repo_type {
            RepositoryType::Postgres => {
                let config = postgres_config.ok_or_else(|| {
                    RepositoryError::configuration("Postgres repository requires PostgresConfig")
                })?;
                Self::create_postgres_dyn(config).await
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a Postgres repository.
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<PostgresRepository>> {
        let config = config.clone();
        // Pool construction and migrations block on network I/O
        let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
        Ok(Arc::new(repo))
    }

    #[cfg(feature = "postgres-repo")]
    async fn create_postgres_dyn(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<dyn CoilRepository>> {
        let pg = Self::create_postgres(config).await?;
        Ok(pg as Arc<dyn CoilRepository>)
    }

    #[cfg(not(feature = "postgres-repo"))]
    async fn create_postgres_dyn(
        _config: &PostgresConfig,
    ) -> RepositoryResult<Arc<dyn CoilRepository>> {
        Err(postgres_disabled())
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn CoilRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create repository from environment configuration.
    ///
    /// See [`RepositoryType::from_env`] and [`PostgresConfig::from_env`].
    pub async fn from_env() -> RepositoryResult<Arc<dyn CoilRepository>> {
        RepositoryBuilder::new().from_env()?.build().await
    }

    /// Create repository from a TOML configuration file.
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn CoilRepository>> {
        RepositoryBuilder::new()
            .from_config_file(config_path)?
            .build()
            .await
    }

    /// Create repository from the default configuration file location.
    ///
    /// See [`RepositoryConfig::from_default_location`].
    pub async fn from_default_config() -> RepositoryResult<Arc<dyn CoilRepository>> {
        RepositoryBuilder::new().from_default_config()?.build().await
    }
}

/// Builder for configuring repository creation.
///
/// # Example
/// ```ignore
/// use coil_warehouse::db::{PostgresConfig, RepositoryBuilder, RepositoryType};
///
/// let repo = RepositoryBuilder::new()
///     .repository_type(RepositoryType::Postgres)
///     .postgres_config(PostgresConfig::with_url("postgres://localhost/warehouse"))
///     .build()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct RepositoryBuilder {
    repo_type: RepositoryType,
    postgres_config: Option<PostgresConfig>,
}

impl RepositoryBuilder {
    /// Create a new repository builder.
    ///
    /// The type starts from [`RepositoryType::from_env`].
    pub fn new() -> Self {
        Self {
            repo_type: RepositoryType::from_env(),
            postgres_config: None,
        }
    }

    pub fn repository_type(mut self, repo_type: RepositoryType) -> Self {
        self.repo_type = repo_type;
        self
    }

    pub fn postgres_config(mut self, config: PostgresConfig) -> Self {
        self.postgres_config = Some(config);
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env(mut self) -> Result<Self, RepositoryError> {
        self.repo_type = RepositoryType::from_env();

        if self.repo_type == RepositoryType::Postgres {
            if cfg!(not(feature = "postgres-repo")) {
                return Err(postgres_disabled());
            }
            let config = PostgresConfig::from_env().map_err(RepositoryError::configuration)?;
            self.postgres_config = Some(config);
        }

        Ok(self)
    }

    /// Load configuration from a TOML file.
    pub fn from_config_file<P: AsRef<Path>>(self, config_path: P) -> Result<Self, RepositoryError> {
        let repo_config = RepositoryConfig::from_file(config_path)?;
        self.apply_config(&repo_config)
    }

    /// Load configuration from the default location.
    pub fn from_default_config(self) -> Result<Self, RepositoryError> {
        let repo_config = RepositoryConfig::from_default_location()?;
        self.apply_config(&repo_config)
    }

    fn apply_config(mut self, repo_config: &RepositoryConfig) -> Result<Self, RepositoryError> {
        self.repo_type = repo_config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if self.repo_type == RepositoryType::Postgres {
            if cfg!(not(feature = "postgres-repo")) {
                return Err(postgres_disabled());
            }
            self.postgres_config = repo_config.to_postgres_config()?;
        }

        Ok(self)
    }

    /// The repository type this builder will create.
    pub fn selected_type(&self) -> RepositoryType {
        self.repo_type
    }

    /// Build the repository instance.
    pub async fn build(self) -> RepositoryResult<Arc<dyn CoilRepository>> {
        RepositoryFactory::create(self.repo_type, self.postgres_config.as_ref()).await
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
