//! Configuration types.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::identity::Identity;

/// Guide service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideConfig {
    /// libSQL file backing the key-value store.
    pub db_path: PathBuf,
    pub port: u16,
    pub deployment_id: Option<String>,
    /// User identity (the callsign).
    pub callsign: Option<String>,
    /// Environment signal used for platform detection.
    pub user_agent: Option<String>,
    /// JSON step catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
    /// Installer-package endpoint. Downloads are disabled when unset.
    pub artifact_url: Option<String>,
    pub handoff_scheme: String,
    /// Where the wizard goes after its last phase.
    pub completion_redirect: String,
    /// Daily-rolling log directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/tak-guide.db"),
            port: 8080,
            deployment_id: None,
            callsign: None,
            user_agent: None,
            catalog_path: None,
            artifact_url: None,
            handoff_scheme: "tak".to_string(),
            completion_redirect: "/".to_string(),
            log_dir: None,
        }
    }
}

impl GuideConfig {
    /// Read `TAK_GUIDE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let port = match var("TAK_GUIDE_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "TAK_GUIDE_PORT".into(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => defaults.port,
        };

        Ok(Self {
            db_path: var("TAK_GUIDE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            port,
            deployment_id: var("TAK_GUIDE_DEPLOYMENT"),
            callsign: var("TAK_GUIDE_CALLSIGN"),
            user_agent: var("TAK_GUIDE_USER_AGENT"),
            catalog_path: var("TAK_GUIDE_CATALOG_PATH").map(PathBuf::from),
            artifact_url: var("TAK_GUIDE_ARTIFACT_URL"),
            handoff_scheme: var("TAK_GUIDE_HANDOFF_SCHEME").unwrap_or(defaults.handoff_scheme),
            completion_redirect: var("TAK_GUIDE_COMPLETION_REDIRECT")
                .unwrap_or(defaults.completion_redirect),
            log_dir: var("TAK_GUIDE_LOG_DIR").map(PathBuf::from),
        })
    }

    /// Create the configured log directory, returning it.
    pub fn ensure_log_dir(&self) -> Result<Option<&Path>, ConfigError> {
        let Some(dir) = self.log_dir.as_deref() else {
            return Ok(None);
        };
        std::fs::create_dir_all(dir)?;
        Ok(Some(dir))
    }

    /// Identity from config, if both halves are set.
    pub fn identity(&self) -> Option<Identity> {
        match (&self.deployment_id, &self.callsign) {
            (Some(d), Some(c)) => Some(Identity::new(d.clone(), c.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from(vars: &[(&str, &str)]) -> Result<GuideConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GuideConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(from(&[]).unwrap(), GuideConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = from(&[
            ("TAK_GUIDE_DB_PATH", "/var/lib/guide.db"),
            ("TAK_GUIDE_PORT", "9000"),
            ("TAK_GUIDE_DEPLOYMENT", "deploy-1"),
            ("TAK_GUIDE_CALLSIGN", "ALPHA-1"),
            ("TAK_GUIDE_ARTIFACT_URL", "https://pkg.test/packages"),
            ("TAK_GUIDE_HANDOFF_SCHEME", "itak"),
            ("TAK_GUIDE_COMPLETION_REDIRECT", "/home"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/guide.db"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.handoff_scheme, "itak");
        assert_eq!(config.completion_redirect, "/home");
        assert_eq!(config.identity(), Some(Identity::new("deploy-1", "ALPHA-1")));
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = from(&[("TAK_GUIDE_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "TAK_GUIDE_PORT"));
    }

    #[test]
    fn log_dir_is_created_on_demand() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs/guide");
        let config = GuideConfig {
            log_dir: Some(dir.clone()),
            ..GuideConfig::default()
        };
        assert_eq!(config.ensure_log_dir().unwrap(), Some(dir.as_path()));
        assert!(dir.is_dir());

        assert_eq!(GuideConfig::default().ensure_log_dir().unwrap(), None);
    }

    #[test]
    fn log_dir_over_a_file_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("taken");
        std::fs::write(&file, "x").unwrap();
        let config = GuideConfig {
            log_dir: Some(file.join("logs")),
            ..GuideConfig::default()
        };
        assert!(matches!(config.ensure_log_dir(), Err(ConfigError::Io(_))));
    }

    #[test]
    fn blank_values_are_unset() {
        let config = from(&[("TAK_GUIDE_CALLSIGN", "  "), ("TAK_GUIDE_DEPLOYMENT", "d")]).unwrap();
        assert!(config.callsign.is_none());
        assert!(config.identity().is_none());
    }
}
