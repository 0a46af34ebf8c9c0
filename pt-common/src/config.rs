//! Configuration loading and resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::poem::DEFAULT_POEM_COUNT;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ENV_ROOT_FOLDER: &str = "PT_ROOT_FOLDER";
/// Environment variable overriding the listen port
pub const ENV_PORT: &str = "PT_PORT";
/// Environment variable overriding the bind address
pub const ENV_BIND: &str = "PT_BIND";

pub const DEFAULT_PORT: u16 = 5730;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_RESULTS_FILE: &str = "results.csv";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 60 * 60;
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// `[logging]` table of the TOML config
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Contents of the TOML config file; every key is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub human_poem_count: Option<u32>,
    pub ai_poem_count: Option<u32>,
    /// Results log location; relative paths are taken from the root folder
    pub results_file: Option<PathBuf>,
    /// Seconds of inactivity before a visitor session may be dropped
    pub session_idle_secs: Option<u64>,
    /// Most visitor sessions held in memory
    pub max_sessions: Option<usize>,
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }
}

/// Settings given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Folder holding `real_poems/`, `fake_poems/` and `logo/`
    pub root_folder: PathBuf,
    pub bind: String,
    pub port: u16,
    pub human_poem_count: u32,
    pub ai_poem_count: u32,
    /// Absolute or root-relative path to the results log
    pub results_path: PathBuf,
    pub session_idle_secs: u64,
    pub max_sessions: usize,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge command line, environment, TOML and defaults
    pub fn resolve(cli: &CliOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let root_folder = cli
            .root_folder
            .clone()
            .or_else(|| std::env::var(ENV_ROOT_FOLDER).ok().map(PathBuf::from))
            .or_else(|| toml_config.root_folder.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        let port = match cli.port {
            Some(port) => port,
            None => match env_port()? {
                Some(port) => port,
                None => toml_config.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let bind = cli
            .bind
            .clone()
            .or_else(|| std::env::var(ENV_BIND).ok())
            .or_else(|| toml_config.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let human_poem_count = toml_config.human_poem_count.unwrap_or(DEFAULT_POEM_COUNT);
        let ai_poem_count = toml_config.ai_poem_count.unwrap_or(DEFAULT_POEM_COUNT);
        if human_poem_count == 0 || ai_poem_count == 0 {
            return Err(Error::Config(
                "human_poem_count and ai_poem_count must be at least 1".to_string(),
            ));
        }

        let max_sessions = toml_config.max_sessions.unwrap_or(DEFAULT_MAX_SESSIONS);
        if max_sessions == 0 {
            return Err(Error::Config("max_sessions must be at least 1".to_string()));
        }

        let results_file = toml_config
            .results_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_FILE));
        let results_path = if results_file.is_absolute() {
            results_file
        } else {
            root_folder.join(results_file)
        };

        Ok(Self {
            root_folder,
            bind,
            port,
            human_poem_count,
            ai_poem_count,
            results_path,
            session_idle_secs: toml_config
                .session_idle_secs
                .unwrap_or(DEFAULT_SESSION_IDLE_SECS),
            max_sessions,
            log_level: toml_config.logging.level.clone(),
        })
    }

    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Location of the logo image
    pub fn logo_path(&self) -> PathBuf {
        self.root_folder.join("logo").join("logo2.png")
    }
}

fn env_port() -> Result<Option<u16>> {
    match std::env::var(ENV_PORT) {
        Ok(value) => value
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} is not a valid port: {}", ENV_PORT, value))),
        Err(_) => Ok(None),
    }
}

/// Default TOML config location for the platform
///
/// `~/.config/poem-turing/config.toml` on Linux, the platform config
/// directory elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("poem-turing").join("config.toml"))
}

/// Load the TOML config
///
/// An explicitly requested file must exist. A missing default file is not an
/// error: a warning is logged and defaults apply.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            Some(path) => {
                warn!(
                    "No config file at {}, using defaults",
                    path.display()
                );
                return Ok(TomlConfig::default());
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config = TomlConfig::parse(&content)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_toml() {
        let config = TomlConfig::parse(
            r#"
root_folder = "/srv/poems"
port = 8080
human_poem_count = 40
results_file = "/var/lib/poems/results.csv"

[logging]
level = "debug"
"#,
        )
        .unwrap();

        assert_eq!(config.root_folder, Some(PathBuf::from("/srv/poems")));
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.human_poem_count, Some(40));
        assert_eq!(config.ai_poem_count, None);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_parse_empty_toml_uses_defaults() {
        let config = TomlConfig::parse("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = TomlConfig::parse("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_cli_wins_over_toml() {
        let cli = CliOverrides {
            root_folder: Some(PathBuf::from("/from/cli")),
            port: Some(9000),
            bind: Some("0.0.0.0".to_string()),
        };
        let toml_config = TomlConfig {
            root_folder: Some(PathBuf::from("/from/toml")),
            port: Some(8000),
            bind: Some("10.0.0.1".to_string()),
            ..Default::default()
        };

        let config = ServiceConfig::resolve(&cli, &toml_config).unwrap();
        assert_eq!(config.root_folder, PathBuf::from("/from/cli"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.results_path, PathBuf::from("/from/cli/results.csv"));
        assert_eq!(config.logo_path(), PathBuf::from("/from/cli/logo/logo2.png"));
    }

    #[test]
    fn test_session_limits() {
        let cli = CliOverrides {
            root_folder: Some(PathBuf::from("/tmp")),
            port: Some(1),
            bind: Some("127.0.0.1".to_string()),
        };
        let config = ServiceConfig::resolve(&cli, &TomlConfig::default()).unwrap();
        assert_eq!(config.session_idle_secs, DEFAULT_SESSION_IDLE_SECS);
        assert_eq!(config.max_sessions, DEFAULT_MAX_SESSIONS);

        let toml_config = TomlConfig::parse("session_idle_secs = 120\nmax_sessions = 50\n").unwrap();
        let config = ServiceConfig::resolve(&cli, &toml_config).unwrap();
        assert_eq!(config.session_idle_secs, 120);
        assert_eq!(config.max_sessions, 50);

        let toml_config = TomlConfig::parse("max_sessions = 0").unwrap();
        assert!(ServiceConfig::resolve(&cli, &toml_config).is_err());
    }

    #[test]
    fn test_zero_poem_count_rejected() {
        let cli = CliOverrides {
            root_folder: Some(PathBuf::from("/tmp")),
            port: Some(1),
            bind: Some("127.0.0.1".to_string()),
        };
        let toml_config = TomlConfig {
            ai_poem_count: Some(0),
            ..Default::default()
        };
        assert!(ServiceConfig::resolve(&cli, &toml_config).is_err());
    }
}
