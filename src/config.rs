use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::classifier::KNOWN_DISTRICTS;
use crate::db::DEFAULT_TEMPLATE_NAME;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub autosave: AutosaveConfig,
    pub classifier: ClassifierConfig,
    pub templates: TemplatesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub districts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    pub default_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: "data/messages.db".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            autosave: AutosaveConfig { interval_secs: 10 },
            classifier: ClassifierConfig {
                districts: KNOWN_DISTRICTS.iter().map(ToString::to_string).collect(),
            },
            templates: TemplatesConfig {
                default_name: DEFAULT_TEMPLATE_NAME.to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        // Start with default values
        for (key, value) in Self::default().into_iter() {
            builder = builder.set_default(key, value)?;
        }

        let config = builder
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("notice-drafter").required(false))
            // Add environment variables with prefix
            .add_source(
                Environment::with_prefix("NOTICE_DRAFTER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            return Err(anyhow::anyhow!("database.path must not be empty"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        if self.autosave.interval_secs == 0 {
            return Err(anyhow::anyhow!("autosave.interval_secs must be greater than 0"));
        }

        if self.classifier.districts.is_empty() {
            return Err(anyhow::anyhow!("classifier.districts must name at least one district"));
        }
        if self.classifier.districts.iter().any(|d| d.trim().is_empty()) {
            return Err(anyhow::anyhow!("classifier.districts must not contain blank entries"));
        }

        if self.templates.default_name.trim().is_empty() {
            return Err(anyhow::anyhow!("templates.default_name must not be empty"));
        }

        Ok(())
    }

    /// Get database path from environment or config
    pub fn get_database_path(&self) -> String {
        std::env::var("NOTICE_DRAFTER_DB").unwrap_or_else(|_| self.database.path.clone())
    }

    /// Get log level from environment or config
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}

impl IntoIterator for AppConfig {
    type Item = (String, config::Value);
    type IntoIter = std::collections::hash_map::IntoIter<String, config::Value>;

    fn into_iter(self) -> Self::IntoIter {
        let mut map = std::collections::HashMap::new();

        // Flatten the configuration into key-value pairs
        map.insert("database.path".to_string(), config::Value::from(self.database.path));

        map.insert("logging.level".to_string(), config::Value::from(self.logging.level));
        if let Some(file_path) = self.logging.file_path {
            map.insert("logging.file_path".to_string(), config::Value::from(file_path));
        }
        map.insert("logging.format".to_string(), config::Value::from(self.logging.format));

        map.insert("autosave.interval_secs".to_string(), config::Value::from(self.autosave.interval_secs));

        map.insert("classifier.districts".to_string(), config::Value::from(self.classifier.districts));

        map.insert("templates.default_name".to_string(), config::Value::from(self.templates.default_name));

        map.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.path, "data/messages.db");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.autosave.interval_secs, 10);
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.autosave.interval_secs = 0;
        assert!(config.validate().is_err());
    }
}
