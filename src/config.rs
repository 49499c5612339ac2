//! Configuration file handling
//!
//! The config lives at `$WIRENODE_CONFIG` or `<config dir>/wirenode/config.toml`.
//! A missing file is not an error: defaults apply and credentials come from
//! the environment.

use crate::connector::Service;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Credentials profile for one service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "service", rename_all = "kebab-case")]
pub enum ProfileConfig {
    Elasticsearch {
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
    Jira {
        #[serde(default)]
        domain: Option<String>,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        api_token: Option<String>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
        #[serde(default)]
        access_token: Option<String>,
    },
    Raindrop {
        #[serde(default)]
        access_token: Option<String>,
    },
    Lemlist {
        #[serde(default)]
        api_key: Option<String>,
    },
}

impl ProfileConfig {
    pub fn service(&self) -> Service {
        match self {
            ProfileConfig::Elasticsearch { .. } => Service::Elasticsearch,
            ProfileConfig::Jira { .. } => Service::Jira,
            ProfileConfig::Raindrop { .. } => Service::Raindrop,
            ProfileConfig::Lemlist { .. } => Service::Lemlist,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Defaults {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Keep processing records after one fails
    pub continue_on_fail: bool,
    pub user_agent: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            continue_on_fail: false,
            user_agent: format!("wirenode/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileConfig>,
}

impl Config {
    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                debug!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!(
            "Loaded config from {} ({} profiles)",
            path.display(),
            config.profiles.len()
        );
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.timeout_secs.max(1))
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Result<&ProfileConfig> {
        self.profiles
            .get(name)
            .ok_or_else(|| anyhow!("Unknown profile: {}", name))
    }

    /// The only profile configured for a service, if exactly one exists
    pub fn sole_profile_for(&self, service: Service) -> Option<&ProfileConfig> {
        let mut matching = self.profiles.values().filter(|p| p.service() == service);
        match (matching.next(), matching.next()) {
            (Some(profile), None) => Some(profile),
            _ => None,
        }
    }
}

/// Path of the config file, honouring `WIRENODE_CONFIG`
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("WIRENODE_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("wirenode").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[defaults]
timeout_secs = 10
continue_on_fail = true

[profiles.work]
service = "jira"
domain = "https://acme.atlassian.net"
email = "me@acme.io"

[profiles.search]
service = "elasticsearch"
base_url = "https://es.local:9200"
username = "elastic"
"#;

    #[test]
    fn test_parse_profiles() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.defaults.timeout_secs, 10);
        assert!(config.defaults.continue_on_fail);
        assert_eq!(config.profiles.len(), 2);
        assert_eq!(config.profile("work").unwrap().service(), Service::Jira);
        assert!(config.profile("missing").is_err());
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.defaults.timeout_secs, 30);
        assert!(!config.defaults.continue_on_fail);
        assert!(config.defaults.user_agent.starts_with("wirenode/"));
    }

    #[test]
    fn test_sole_profile_for_service() {
        let config = Config::parse(SAMPLE).unwrap();
        assert!(config.sole_profile_for(Service::Jira).is_some());
        assert!(config.sole_profile_for(Service::Raindrop).is_none());
    }

    #[test]
    fn test_unknown_service_tag_fails() {
        let bad = "[profiles.x]\nservice = \"gitlab\"\n";
        assert!(Config::parse(bad).is_err());
    }
}
