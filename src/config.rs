use std::{env, path::PathBuf, time::Duration};

use dotenv::dotenv;
use tracing::Level;

use crate::errors::ConfigError;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STATIC_IMAGES_PATH: &str = "/static/imgs";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub session_cookie: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api: ApiConfig,
    pub static_images_path: String,
    pub log_path: Option<PathBuf>,
    pub log_level: Level,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenv().ok();
        Config::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("API_BASE_URL").ok_or(ConfigError::Missing("API_BASE_URL"))?;

        let timeout = match lookup("API_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    return Err(ConfigError::Invalid {
                        var: "API_TIMEOUT_SECS",
                        value,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let log_level = match lookup("LOG_LEVEL") {
            Some(value) => value.parse::<Level>().map_err(|_| ConfigError::Invalid {
                var: "LOG_LEVEL",
                value: value.clone(),
            })?,
            None => Level::INFO,
        };

        Ok(Config {
            api: ApiConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                session_cookie: lookup("API_SESSION_COOKIE").filter(|c| !c.is_empty()),
                timeout,
            },
            static_images_path: lookup("STATIC_IMAGES_PATH")
                .unwrap_or_else(|| String::from(DEFAULT_STATIC_IMAGES_PATH)),
            log_path: lookup("LOG_PATH").map(PathBuf::from),
            log_level,
        })
    }
}
