use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ExpresError, Result};

/// Top-level configuration.
///
/// Loaded from `~/.expres/config.toml` by default. Recording duration and
/// media size are hard caps and deliberately not part of this file; see
/// [`crate::limits`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpresConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl ExpresConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ExpresConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is missing or
    /// invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ExpresError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.api.base_url.trim();
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ExpresError::Config(format!(
                "api.base_url must be an http(s) URL, got: {}",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ExpresError::Config(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Remote backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the incidents backend.
    pub base_url: String,
    /// Path of the create-incident endpoint, relative to `base_url`.
    pub create_incident_path: String,
    /// Transport-level timeout for a single request.
    pub timeout_secs: u64,
    /// Session token issued by the authentication collaborator.
    pub bearer_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://desarrollo.appacademy.es/api/".to_string(),
            create_incident_path: "Incidencias/IncidenciaRapida".to_string(),
            timeout_secs: 60,
            bearer_token: None,
        }
    }
}

impl ApiConfig {
    /// Full URL of the create-incident endpoint.
    pub fn create_incident_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.create_incident_path.trim_start_matches('/')
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ExpresConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.api.timeout_secs, 60);
        assert!(config.api.bearer_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_create_incident_url_joins_slashes() {
        let mut api = ApiConfig::default();
        assert_eq!(
            api.create_incident_url(),
            "https://desarrollo.appacademy.es/api/Incidencias/IncidenciaRapida"
        );

        api.base_url = "http://127.0.0.1:8080".to_string();
        api.create_incident_path = "/Incidencias/IncidenciaRapida".to_string();
        assert_eq!(
            api.create_incident_url(),
            "http://127.0.0.1:8080/Incidencias/IncidenciaRapida"
        );
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(
            r#"
[general]
log_level = "debug"

[api]
base_url = "http://localhost:9000/api"
create_incident_path = "Incidencias/IncidenciaRapida"
timeout_secs = 5
bearer_token = "abc"
"#,
        );

        let config = ExpresConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.api.base_url, "http://localhost:9000/api");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.bearer_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let file = create_temp_config(
            r#"
[api]
timeout_secs = 10
"#,
        );

        let config = ExpresConfig::load(file.path()).unwrap();
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.api.base_url, ApiConfig::default().base_url);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let file = create_temp_config(
            r#"
[api]
base_url = "ftp://example.com"
"#,
        );
        assert!(matches!(
            ExpresConfig::load(file.path()),
            Err(ExpresError::Config(_))
        ));

        let file = create_temp_config("[api]\ntimeout_secs = 0\n");
        assert!(ExpresConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is not [ valid toml");
        assert!(ExpresConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = ExpresConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config, ExpresConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ExpresConfig::default();
        config.api.bearer_token = Some("token".to_string());
        config.general.log_level = "warn".to_string();
        config.save(&path).unwrap();

        let loaded = ExpresConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = ExpresConfig::load(file.path()).unwrap();
        assert_eq!(config, ExpresConfig::default());
    }
}
