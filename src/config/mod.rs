//! SQLite-backed configuration for lms-admin
//!
//! The same database holds:
//! - Typed settings (API endpoint, timeouts, sync transport)
//! - The local mirror of the chapter document used as offline fallback

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub mod db;
pub mod migrations;
pub mod repository;
pub mod settings;

pub use settings::Settings;

use crate::persistence::LocalCache;

pub struct Config {
    pub(crate) pool: sqlx::SqlitePool,
    config_path: PathBuf,
}

impl Config {
    /// Get the path to the SQLite database file
    pub fn get_db_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("lms-admin")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".lms-admin")
        };

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
            log::info!("Created config directory: {:?}", config_dir);
        }

        Ok(config_dir.join("config.db"))
    }

    pub async fn load() -> Result<Self> {
        let db_path = Self::get_db_path()?;
        Self::open(&db_path).await
    }

    /// Open (and migrate) a database at an explicit path
    pub async fn open(db_path: &Path) -> Result<Self> {
        log::debug!("Loading config from: {:?}", db_path);

        let pool = db::connect(db_path).await?;
        db::run_migrations(&pool).await?;

        Ok(Self {
            pool,
            config_path: db_path.to_path_buf(),
        })
    }

    /// Create a new config for testing (in-memory database)
    pub async fn new_test() -> Result<Self> {
        let pool = db::connect_memory().await?;
        db::run_migrations(&pool).await?;

        Ok(Self {
            pool,
            config_path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Handle on the local chapter mirror sharing this database
    pub fn local_cache(&self) -> LocalCache {
        LocalCache::new(self.pool.clone())
    }

    /// Typed settings with `.env` / environment overrides applied
    pub async fn settings(&self) -> Result<Settings> {
        let stored = repository::settings::list(&self.pool).await?;
        Settings::from_values(&stored)?.apply_env_overrides()
    }

    pub async fn get_setting(&self, key: &str) -> Result<String> {
        let spec = settings::find_spec(key)
            .with_context(|| format!("Unknown setting '{}'", key))?;
        Ok(repository::settings::get(&self.pool, key)
            .await?
            .unwrap_or_else(|| spec.default.to_string()))
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        Settings::validate(key, value)?;
        repository::settings::set(&self.pool, key, value).await
    }

    /// Drop a stored value so the default applies again
    pub async fn reset_setting(&self, key: &str) -> Result<bool> {
        settings::find_spec(key).with_context(|| format!("Unknown setting '{}'", key))?;
        repository::settings::delete(&self.pool, key).await
    }

    pub async fn reset_all_settings(&self) -> Result<u64> {
        repository::settings::clear(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_setting_lifecycle() {
        let config = Config::new_test().await.unwrap();
        assert_eq!(config.get_setting(settings::API_MAX_ATTEMPTS).await.unwrap(), "3");

        config.set_setting(settings::API_MAX_ATTEMPTS, "5").await.unwrap();
        assert_eq!(config.get_setting(settings::API_MAX_ATTEMPTS).await.unwrap(), "5");

        assert!(config.set_setting(settings::API_MAX_ATTEMPTS, "many").await.is_err());
        assert!(config.set_setting("nope", "1").await.is_err());

        assert!(config.reset_setting(settings::API_MAX_ATTEMPTS).await.unwrap());
        assert_eq!(config.get_setting(settings::API_MAX_ATTEMPTS).await.unwrap(), "3");
    }
}
