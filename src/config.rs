use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::errors::{CoreError, CoreResult};

pub const DEFAULT_CONFIG_FILE: &str = "survey-groups.toml";

/// Runtime settings for the admin tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file path, or `:memory:`
    pub database: String,
    /// Prefix for generated admin URLs
    pub base_url: String,
    /// Rows per page when the session has no page size of its own
    pub default_page_size: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: "survey.db".to_string(),
            base_url: "/index.php".to_string(),
            default_page_size: 10,
        }
    }
}

impl AppConfig {
    /// Read the TOML file when it exists, otherwise start from defaults;
    /// `SURVEY_GROUPS_*` environment variables win over both.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            debug!("Loading configuration from {}", path.display());
            let content = fs::read_to_string(path).map_err(|e| {
                CoreError::internal(format!("Failed to read {}", path.display())).with_source(e)
            })?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> CoreResult<Self> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| CoreError::validation(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(database) = lookup("SURVEY_GROUPS_DATABASE") {
            self.database = database;
        }
        if let Some(base_url) = lookup("SURVEY_GROUPS_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(page_size) = lookup("SURVEY_GROUPS_PAGE_SIZE") {
            self.default_page_size = page_size.trim().parse().map_err(|_| {
                CoreError::validation(format!(
                    "SURVEY_GROUPS_PAGE_SIZE must be a positive integer, got '{}'",
                    page_size
                ))
            })?;
        }
        self.validate()
    }

    fn validate(&self) -> CoreResult<()> {
        if self.default_page_size == 0 {
            return Err(CoreError::validation(
                "default_page_size must be greater than zero",
            ));
        }
        if self.database.trim().is_empty() {
            return Err(CoreError::validation("database must not be empty"));
        }
        Ok(())
    }
}
