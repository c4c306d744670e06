use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding `api.base_url`
pub const ENV_API_BASE_URL: &str = "SYRA_API_BASE_URL";
/// Environment variable overriding `session.store_path`
pub const ENV_STORE_PATH: &str = "SYRA_STORE_PATH";

/// Errors raised while loading or saving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Configuration for the SYRA client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote API configuration
    pub api: ApiConfig,
    /// Session token storage
    pub session: SessionConfig,
    /// Sign-in flow
    pub auth: AuthConfig,
    /// Output configuration
    pub output: OutputConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every API path is appended to
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

/// Session token storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// SQLite file holding the token
    pub store_path: PathBuf,
    /// Where the session sends an unauthenticated user
    pub entry_point: String,
}

/// Sign-in flow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Path the identity provider redirects back to
    pub callback_path: String,
    /// API path that starts the provider sign-in
    pub login_path: String,
    /// Loopback address the CLI listens on for the callback
    pub listen_address: String,
    /// How long to wait for the callback, in seconds
    pub callback_timeout_seconds: u64,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format: "console", "json", or "jsonl"
    pub format: String,
    /// Output file path (stdout when absent)
    pub file_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig {
                base_url: "http://localhost:3000".to_string(),
                timeout_seconds: 30,
            },
            session: SessionConfig {
                store_path: PathBuf::from("syra_session.db"),
                entry_point: "/".to_string(),
            },
            auth: AuthConfig {
                callback_path: "/auth/callback".to_string(),
                login_path: "/api/auth/login".to_string(),
                listen_address: "127.0.0.1:8765".to_string(),
                callback_timeout_seconds: 300,
            },
            output: OutputConfig {
                format: "console".to_string(),
                file_path: None,
            },
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `SYRA_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_API_BASE_URL).filter(|v| !v.is_empty()) {
            log::debug!("API base URL overridden from {}", ENV_API_BASE_URL);
            self.api.base_url = base_url;
        }
        if let Some(path) = lookup(ENV_STORE_PATH).filter(|v| !v.is_empty()) {
            log::debug!("Token store path overridden from {}", ENV_STORE_PATH);
            self.session.store_path = PathBuf::from(path);
        }
    }

    /// Absolute URL for an API path
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api.base_url.trim_end_matches('/'), path)
    }

    /// Where the sign-in action sends the user
    pub fn login_url(&self) -> String {
        self.api_url(&self.auth.login_path)
    }
}
