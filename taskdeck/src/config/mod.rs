//! Configuration system for the Taskdeck client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskdeck/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// A resolved value is outside its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    session: SessionFileConfig,
    ui: UiFileConfig,
    notify: NotifyFileConfig,
    theme: ThemeFileConfig,
}

/// `[session]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SessionFileConfig {
    email: Option<String>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    date_format: Option<String>,
    default_due_hour: Option<u32>,
}

/// `[notify]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct NotifyFileConfig {
    success_ttl_secs: Option<u64>,
    error_ttl_secs: Option<u64>,
}

/// `[theme]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ThemeFileConfig {
    file: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- Session --
    /// Account to sign in as on startup, if any.
    pub email: Option<String>,

    // -- UI --
    /// Date display format for far-off due dates (chrono format string).
    pub date_format: String,
    /// Hour of day given to tasks created from a calendar slot (0-23).
    pub default_due_hour: u32,

    // -- Notices --
    /// How long success notices stay visible.
    pub success_notice_ttl: Duration,
    /// How long error notices stay visible.
    pub error_notice_ttl: Duration,

    // -- Theme --
    /// Override path for the theme preference file.
    pub theme_file: Option<PathBuf>,

    // -- Logging --
    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            email: None,
            date_format: "%Y-%m-%d".to_string(),
            default_due_hour: 9,
            success_notice_ttl: Duration::from_secs(3),
            error_notice_ttl: Duration::from_secs(5),
            theme_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// CLI args and env vars are parsed via `clap`. If `--config` is given
    /// and the file does not exist, returns an error. If no `--config` is
    /// given, the default path (`~/.config/taskdeck/config.toml`) is tried
    /// and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed, or if a resolved value fails validation.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        let config = Self::resolve(cli, &file);
        config.validate()?;
        Ok(config)
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. This is separated from `load()` to
    /// enable unit testing without CLI parsing.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            email: cli.email.clone().or_else(|| file.session.email.clone()),
            date_format: cli
                .date_format
                .clone()
                .or_else(|| file.ui.date_format.clone())
                .unwrap_or(defaults.date_format),
            default_due_hour: file
                .ui
                .default_due_hour
                .unwrap_or(defaults.default_due_hour),
            success_notice_ttl: file
                .notify
                .success_ttl_secs
                .map_or(defaults.success_notice_ttl, Duration::from_secs),
            error_notice_ttl: file
                .notify
                .error_ttl_secs
                .map_or(defaults.error_notice_ttl, Duration::from_secs),
            theme_file: file.theme.file.clone().map(PathBuf::from),
            log_level: cli.log_level.clone(),
        }
    }

    /// Check resolved values that have an allowed range.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_due_hour >= 24 {
            return Err(ConfigError::Invalid(format!(
                "default_due_hour {} is out of range (0-23)",
                self.default_due_hour
            )));
        }
        if self.date_format.is_empty() {
            return Err(ConfigError::Invalid(
                "date_format must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Time of day for tasks created from a calendar slot.
    #[must_use]
    pub fn default_due_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.default_due_hour, 0, 0).unwrap_or(NaiveTime::MIN)
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Task and calendar dashboard with live sync")]
pub struct CliArgs {
    /// Sign in as this account on startup.
    #[arg(long, env = "TASKDECK_EMAIL")]
    pub email: Option<String>,

    /// Path to config file (default: `~/.config/taskdeck/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Date display format (chrono format string).
    #[arg(long)]
    pub date_format: Option<String>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKDECK_LOG")]
    pub log_level: String,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            // No config dir available; use defaults.
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskdeck").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
