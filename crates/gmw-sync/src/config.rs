//! Monitor configuration.
//!
//! One explicit value constructed at startup and passed into the pipeline;
//! nothing downstream reads process state. In CI (`GITHUB_ACTIONS` set) the
//! mail credentials come from environment variables and missing ones are
//! fatal before any fetch; local runs read `config.json` instead.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gmw_notify::EmailSettings;
use gmw_storage::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_DATA_FILE: &str = "multi_store_products.json";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Pause between source fetches; load reduction, not correctness.
const SOURCE_PAUSE: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variables are not set: {0}")]
    MissingEnv(String),
    #[error("invalid SMTP_PORT value {0:?}")]
    InvalidPort(String),
    #[error("reading {}: {}", .path.display(), .source)]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {}", .path.display(), .source)]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub email: EmailSettings,
    pub data_file: PathBuf,
    pub user_agent: String,
    pub http_timeout: Duration,
    pub source_pause: Duration,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    email: EmailSettings,
}

impl MonitorConfig {
    /// Loads configuration for this run. `config_file` and `data_file`
    /// override the default paths when given.
    pub fn load(
        config_file: Option<&Path>,
        data_file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let email = if env::var_os("GITHUB_ACTIONS").is_some() {
            info!("running in CI; reading mail credentials from the environment");
            email_from_env()?
        } else {
            let path = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
            info!(path = %path.display(), "running locally; reading mail credentials from file");
            email_from_file(path)?
        };

        Ok(Self {
            email,
            data_file: data_file
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout: DEFAULT_TIMEOUT,
            source_pause: SOURCE_PAUSE,
        })
    }
}

fn email_from_env() -> Result<EmailSettings, ConfigError> {
    let mut missing = Vec::new();
    let sender_email = required_env("SENDER_EMAIL", &mut missing);
    let sender_password = required_env("SENDER_PASSWORD", &mut missing);
    let recipient_email = required_env("RECIPIENT_EMAIL", &mut missing);
    if !missing.is_empty() {
        return Err(ConfigError::MissingEnv(missing.join(", ")));
    }

    let port_raw = env::var("SMTP_PORT").unwrap_or_else(|_| "587".to_string());
    let smtp_port = port_raw
        .parse()
        .map_err(|_| ConfigError::InvalidPort(port_raw))?;

    Ok(EmailSettings {
        smtp_server: env::var("SMTP_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
        smtp_port,
        sender_email,
        sender_password,
        recipient_email,
    })
}

fn required_env(name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            missing.push(name);
            String::new()
        }
    }
}

fn email_from_file(path: &Path) -> Result<EmailSettings, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile =
        serde_json::from_str(&text).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parsed.email)
}
