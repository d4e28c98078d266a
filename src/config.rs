use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    /// JID the bot treats as its administrator.
    admin_jid: String,
    /// Directory for state files (database, logs). Defaults to current directory.
    data_dir: Option<String>,
    /// Directory for downloaded media. Defaults to `<data_dir>/media`.
    media_dir: Option<String>,
    #[serde(default = "default_download_retries")]
    download_retries: u32,
    #[serde(default = "default_download_initial_delay_ms")]
    download_initial_delay_ms: u64,
    #[serde(default = "default_max_media_size")]
    max_media_size: usize,
    /// Allowed MIME top-level types for downloaded media.
    #[serde(default = "default_allowed_media_types")]
    allowed_media_types: Vec<String>,
    #[serde(default = "default_cache_capacity")]
    cache_capacity: usize,
    #[serde(default = "default_cache_ttl_secs")]
    cache_ttl_secs: u64,
    /// API key for the completion fallback. The HF_API_KEY environment
    /// variable takes precedence.
    #[serde(default)]
    completion_api_key: String,
    #[serde(default = "default_completion_endpoint")]
    completion_endpoint: String,
    #[serde(default = "default_completion_model")]
    completion_model: String,
    /// Pipeline worker count.
    #[serde(default = "default_workers")]
    workers: usize,
}

fn default_download_retries() -> u32 {
    5
}

fn default_download_initial_delay_ms() -> u64 {
    1000
}

fn default_max_media_size() -> usize {
    10 * 1024 * 1024
}

fn default_allowed_media_types() -> Vec<String> {
    ["image", "video", "audio", "application"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_cache_capacity() -> usize {
    100
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_completion_endpoint() -> String {
    "https://router.huggingface.co/v1/chat/completions".to_string()
}

fn default_completion_model() -> String {
    "meta-llama/Llama-3.2-3B-Instruct:novita".to_string()
}

fn default_workers() -> usize {
    4
}

#[derive(Debug, Clone)]
pub struct Config {
    pub admin_jid: String,
    pub data_dir: PathBuf,
    pub media_dir: PathBuf,
    pub download_retries: u32,
    pub download_initial_delay: Duration,
    pub max_media_size: usize,
    pub allowed_media_types: Vec<String>,
    pub cache_capacity: usize,
    pub cache_ttl: Duration,
    pub completion_api_key: String,
    pub completion_endpoint: String,
    pub completion_model: String,
    pub workers: usize,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        if file.admin_jid.is_empty() || !file.admin_jid.contains('@') {
            return Err(ConfigError::Validation(
                "admin_jid is required and must be a JID (e.g. 233201234567@c.us)".into(),
            ));
        }
        if file.download_retries == 0 {
            return Err(ConfigError::Validation("download_retries must be at least 1".into()));
        }
        if file.workers == 0 {
            return Err(ConfigError::Validation("workers must be at least 1".into()));
        }

        let data_dir = file.data_dir.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
        let media_dir = file
            .media_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("media"));

        let completion_api_key = std::env::var("HF_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .unwrap_or(file.completion_api_key);

        Ok(Self {
            admin_jid: file.admin_jid,
            data_dir,
            media_dir,
            download_retries: file.download_retries,
            download_initial_delay: Duration::from_millis(file.download_initial_delay_ms),
            max_media_size: file.max_media_size,
            allowed_media_types: file.allowed_media_types,
            cache_capacity: file.cache_capacity,
            cache_ttl: Duration::from_secs(file.cache_ttl_secs),
            completion_api_key,
            completion_endpoint: file.completion_endpoint,
            completion_model: file.completion_model,
            workers: file.workers,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_jid: "admin@c.us".to_string(),
            data_dir: PathBuf::from("."),
            media_dir: PathBuf::from("./media"),
            download_retries: default_download_retries(),
            download_initial_delay: Duration::from_millis(default_download_initial_delay_ms()),
            max_media_size: default_max_media_size(),
            allowed_media_types: default_allowed_media_types(),
            cache_capacity: default_cache_capacity(),
            cache_ttl: Duration::from_secs(default_cache_ttl_secs()),
            completion_api_key: String::new(),
            completion_endpoint: default_completion_endpoint(),
            completion_model: default_completion_model(),
            workers: default_workers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_valid_config_with_defaults() {
        let file = write_config(r#"{ "admin_jid": "233201234567@c.us" }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(config.admin_jid, "233201234567@c.us");
        assert_eq!(config.download_retries, 5);
        assert_eq!(config.download_initial_delay, Duration::from_millis(1000));
        assert_eq!(config.max_media_size, 10 * 1024 * 1024);
        assert_eq!(config.cache_capacity, 100);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn test_media_dir_defaults_under_data_dir() {
        let file = write_config(r#"{ "admin_jid": "a@c.us", "data_dir": "/var/lib/bot" }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.media_dir, PathBuf::from("/var/lib/bot/media"));
    }

    #[test]
    fn test_explicit_overrides() {
        let file = write_config(
            r#"{
                "admin_jid": "a@c.us",
                "download_retries": 3,
                "download_initial_delay_ms": 250,
                "cache_capacity": 10,
                "cache_ttl_secs": 60,
                "allowed_media_types": ["image"]
            }"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.download_retries, 3);
        assert_eq!(config.download_initial_delay, Duration::from_millis(250));
        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.allowed_media_types, vec!["image".to_string()]);
    }

    #[test]
    fn test_missing_admin_jid() {
        let file = write_config(r#"{ "admin_jid": "" }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("admin_jid"));
    }

    #[test]
    fn test_admin_jid_must_look_like_jid() {
        let file = write_config(r#"{ "admin_jid": "not-a-jid" }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let file = write_config(r#"{ "admin_jid": "a@c.us", "download_retries": 0 }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_file_not_found() {
        let err = assert_err(Config::load("/nonexistent/path/config.json"));
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }
}
