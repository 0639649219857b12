//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::model::RoleSelection;

/// Default GraphQL endpoint of the host platform
pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = ".bprov.yaml";

const DEFAULT_BOARD_LIMIT: u32 = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, miette::Diagnostic)]
pub enum ConfigError {
    #[error("No API token configured")]
    #[diagnostic(
        code(bprov::config::missing_token),
        help("Set BPROV_API_TOKEN, pass --token, or add api_token to .bprov.yaml")
    )]
    MissingToken,
}

/// Layered configuration: defaults, global file, local file, environment
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// GraphQL endpoint
    pub api_url: Option<String>,

    /// Personal API token
    pub api_token: Option<String>,

    /// Value for the `API-Version` header
    pub api_version: Option<String>,

    /// Maximum number of boards to list
    pub board_limit: Option<u32>,

    /// Role used for invitations when none is given
    pub default_role: Option<RoleSelection>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (applied by the accessors)

        // 2. Global user config (~/.config/bprov/config.yaml or $BPROV_CONFIG)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Local config (./.bprov.yaml)
        if let Some(local) = Self::read_file(Path::new(LOCAL_CONFIG_FILE)) {
            config.merge(local);
        }

        // 4. Environment variables
        config.apply_env(|key| std::env::var(key).ok());

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                return None;
            }
        };
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                None
            }
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var("BPROV_API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Some(url) = var("BPROV_API_URL") {
            self.api_url = Some(url);
        }
        if let Some(role) = var("BPROV_DEFAULT_ROLE") {
            match role.parse() {
                Ok(role) => self.default_role = Some(role),
                Err(e) => tracing::warn!("ignoring BPROV_DEFAULT_ROLE: {}", e),
            }
        }
    }

    /// Get the path to the global config file (BPROV_CONFIG overrides it)
    pub fn global_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("BPROV_CONFIG") {
            return Some(PathBuf::from(path));
        }
        directories::ProjectDirs::from("", "", "bprov")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.api_token.is_some() {
            self.api_token = other.api_token;
        }
        if other.api_version.is_some() {
            self.api_version = other.api_version;
        }
        if other.board_limit.is_some() {
            self.board_limit = other.board_limit;
        }
        if other.default_role.is_some() {
            self.default_role = other.default_role;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Get the API token, failing if none was configured anywhere
    pub fn api_token(&self) -> Result<&str, ConfigError> {
        self.api_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)
    }

    pub fn board_limit(&self) -> u32 {
        self.board_limit.unwrap_or(DEFAULT_BOARD_LIMIT)
    }

    pub fn default_role(&self) -> RoleSelection {
        self.default_role.unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Copy with the token masked, for display
    pub fn redacted(&self) -> Config {
        let mut shown = self.clone();
        shown.api_token = self.api_token.as_ref().map(|t| mask_token(t));
        shown
    }
}

fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        "****".to_string()
    } else {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.board_limit(), 100);
        assert_eq!(config.default_role(), RoleSelection::Guest);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(matches!(config.api_token(), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            api_url: Some("https://a".to_string()),
            board_limit: Some(10),
            ..Default::default()
        };
        base.merge(Config {
            board_limit: Some(25),
            default_role: Some(RoleSelection::Member),
            ..Default::default()
        });
        assert_eq!(base.api_url(), "https://a");
        assert_eq!(base.board_limit(), 25);
        assert_eq!(base.default_role(), RoleSelection::Member);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BPROV_API_TOKEN", "tok"),
            ("BPROV_API_URL", "http://localhost:1234/v2"),
            ("BPROV_DEFAULT_ROLE", "Member"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.api_token().unwrap(), "tok");
        assert_eq!(config.api_url(), "http://localhost:1234/v2");
        assert_eq!(config.default_role(), RoleSelection::Member);
    }

    #[test]
    fn test_blank_token_is_missing() {
        let config = Config {
            api_token: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.api_token().is_err());
    }

    #[test]
    fn test_parse_yaml() {
        let config: Config =
            serde_yml::from_str("api_token: abc\nboard_limit: 50\ndefault_role: member\n").unwrap();
        assert_eq!(config.board_limit(), 50);
        assert_eq!(config.default_role(), RoleSelection::Member);
    }

    #[test]
    fn test_read_file_skips_bad_files() {
        let tmp = tempfile::TempDir::new().unwrap();

        // A directory exists but cannot be read as a file
        assert!(Config::read_file(tmp.path()).is_none());
        assert!(Config::read_file(&tmp.path().join("missing.yaml")).is_none());

        let invalid = tmp.path().join("invalid.yaml");
        std::fs::write(&invalid, "board_limit: [not a number\n").unwrap();
        assert!(Config::read_file(&invalid).is_none());

        let valid = tmp.path().join("valid.yaml");
        std::fs::write(&valid, "board_limit: 5\n").unwrap();
        assert_eq!(Config::read_file(&valid).unwrap().board_limit(), 5);
    }

    #[test]
    fn test_redacted_masks_token() {
        let config = Config {
            api_token: Some("abcdefghijkl1234".to_string()),
            ..Default::default()
        };
        assert_eq!(config.redacted().api_token.as_deref(), Some("****1234"));

        let short = Config {
            api_token: Some("abc".to_string()),
            ..Default::default()
        };
        assert_eq!(short.redacted().api_token.as_deref(), Some("****"));
    }
}
