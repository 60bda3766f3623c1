//! Story-service configuration — bus identity and launch defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::constants::{APP_NAME, DEFAULT_BUS_NAME, DEFAULT_OBJECT_PATH, SERVICE_JSON_ENV};

/// Where on the session bus the story service lives, plus optional
/// launch defaults.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_bus_name")]
    pub bus_name: String,
    #[serde(default = "default_object_path")]
    pub object_path: String,
    /// Script used by `/launch` when no path is given.
    #[serde(default)]
    pub default_script: Option<String>,
}

fn default_bus_name() -> String {
    DEFAULT_BUS_NAME.to_string()
}

fn default_object_path() -> String {
    DEFAULT_OBJECT_PATH.to_string()
}

/// Where the service configuration was loaded from.
#[derive(Clone, Debug)]
pub enum ServiceSource {
    Embedded,
    File(PathBuf),
}

impl ServiceSource {
    pub fn label(&self) -> String {
        match self {
            ServiceSource::Embedded => "embedded defaults".to_string(),
            ServiceSource::File(path) => path.display().to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn load() -> Result<(Self, ServiceSource)> {
        if let Ok(path) = env::var(SERVICE_JSON_ENV) {
            let path = PathBuf::from(path);
            return Ok((Self::load_from_path(&path)?, ServiceSource::File(path)));
        }

        let cwd_path = PathBuf::from("service.json");
        if cwd_path.exists() {
            return Ok((
                Self::load_from_path(&cwd_path)?,
                ServiceSource::File(cwd_path),
            ));
        }

        if let Some(config_path) = config_dir_file("service.json") {
            if config_path.exists() {
                return Ok((
                    Self::load_from_path(&config_path)?,
                    ServiceSource::File(config_path),
                ));
            }
        }

        let embedded: ServiceConfig = serde_json::from_str(include_str!("../../service.json"))
            .context("parse embedded service.json")?;
        Ok((embedded, ServiceSource::Embedded))
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read service config from {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("parse service config from {}", path.display()))?;
        Ok(config)
    }
}

fn config_dir_file(filename: &str) -> Option<PathBuf> {
    let proj_dirs = ProjectDirs::from("net", APP_NAME, APP_NAME)?;
    Some(proj_dirs.config_dir().join(filename))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::ServiceConfig;
    use crate::constants::{DEFAULT_BUS_NAME, DEFAULT_OBJECT_PATH};

    #[test]
    fn embedded_config_matches_the_service_defaults() {
        let config: ServiceConfig =
            serde_json::from_str(include_str!("../../service.json")).unwrap();
        assert_eq!(config.bus_name, DEFAULT_BUS_NAME);
        assert_eq!(config.object_path, DEFAULT_OBJECT_PATH);
        assert_eq!(config.default_script, None);
    }

    #[test]
    fn partial_config_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.json");
        fs::write(&path, r#"{"default_script": "/srv/stories/intro.ink"}"#).unwrap();

        let config = ServiceConfig::load_from_path(&path).unwrap();
        assert_eq!(config.bus_name, DEFAULT_BUS_NAME);
        assert_eq!(config.object_path, DEFAULT_OBJECT_PATH);
        assert_eq!(
            config.default_script.as_deref(),
            Some("/srv/stories/intro.ink")
        );
    }

    #[test]
    fn full_config_files_override_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.json");
        fs::write(
            &path,
            r#"{"bus_name": "org.example.story", "object_path": "/org/example/story"}"#,
        )
        .unwrap();

        let config = ServiceConfig::load_from_path(&path).unwrap();
        assert_eq!(config.bus_name, "org.example.story");
        assert_eq!(config.object_path, "/org/example/story");
    }

    #[test]
    fn malformed_config_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.json");
        fs::write(&path, "not json").unwrap();

        assert!(ServiceConfig::load_from_path(&path).is_err());
    }
}
