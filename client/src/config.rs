//! Client configuration: where the backend lives and where session state
//! is kept on disk.

use crate::error::{ClientError, Result};
use directories::BaseDirs;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const API_URL_ENV: &str = "DEVSYNC_API_URL";
pub const DATA_DIR_ENV: &str = "DEVSYNC_DATA_DIR";
pub const SESSION_DB_FILE: &str = "session.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash, e.g. `http://localhost:8080/api`
    pub api_url: String,
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Build a config from explicit values, falling back to the environment
    /// and then to defaults
    pub fn resolve(api_url: Option<String>, data_dir: Option<PathBuf>) -> Result<Self> {
        let api_url = api_url
            .or_else(|| std::env::var(API_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let data_dir = match data_dir.or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from)) {
            Some(dir) => dir,
            None => default_data_dir()?,
        };

        Self::new(&api_url, data_dir)
    }

    pub fn new(api_url: &str, data_dir: PathBuf) -> Result<Self> {
        Ok(ClientConfig {
            api_url: normalize_api_url(api_url)?,
            data_dir,
        })
    }

    pub fn session_db_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_DB_FILE)
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new()
        .ok_or_else(|| ClientError::Config("Failed to get home directory".to_string()))?;
    Ok(base_dirs.home_dir().join(".devsync"))
}

/// Check the URL is absolute http(s) and strip trailing slashes
pub fn normalize_api_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed)
        .map_err(|e| ClientError::Config(format!("Invalid API URL {:?}: {}", raw, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        scheme => Err(ClientError::Config(format!(
            "Unsupported API URL scheme {:?}; expected http or https",
            scheme
        ))),
    }
}
