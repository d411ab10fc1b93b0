use serde::Deserialize;
use std::fs;
use std::path::Path;

const ENV_CONFIG_PATH: &str = "REPERTO_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_SECRET_KEY: &str = "SECRET_KEY";
const ENV_TOKEN_EXPIRE_MINUTES: &str = "ACCESS_TOKEN_EXPIRE_MINUTES";
const ENV_PASSWORD_ITERATIONS: &str = "PASSWORD_HASH_ITERATIONS";

const DEFAULT_SECRET_KEY: &str = "your-secret-key-here-change-in-production";
/// 7 days
const DEFAULT_TOKEN_EXPIRE_MINUTES: i64 = 60 * 24 * 7;
pub const DEFAULT_PASSWORD_ITERATIONS: u32 = 600_000;

/// Cross-origin configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. If empty, any origin is allowed.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Token and password settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub token_expire_minutes: i64,
    pub password_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            token_expire_minutes: DEFAULT_TOKEN_EXPIRE_MINUTES,
            password_iterations: DEFAULT_PASSWORD_ITERATIONS,
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cors: CorsConfig::default(),
            auth: AuthConfig::default(),
            port: 8000,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let secret_key = match std::env::var(ENV_SECRET_KEY) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                tracing::warn!("SECRET_KEY not set, using the built-in development key");
                DEFAULT_SECRET_KEY.to_string()
            }
        };

        let token_expire_minutes = std::env::var(ENV_TOKEN_EXPIRE_MINUTES)
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|m: &i64| *m > 0)
            .unwrap_or(DEFAULT_TOKEN_EXPIRE_MINUTES);

        let password_iterations = std::env::var(ENV_PASSWORD_ITERATIONS)
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|i: &u32| *i > 0)
            .unwrap_or(DEFAULT_PASSWORD_ITERATIONS);

        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let cors = Self::load_config_file(&config_path)
            .map(|cf| cf.cors)
            .unwrap_or_default();

        Self {
            cors,
            auth: AuthConfig {
                secret_key,
                token_expire_minutes,
                password_iterations,
            },
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
