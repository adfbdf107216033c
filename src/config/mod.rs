mod api;
mod defaults;

use crate::api::chat_endpoint;
use crate::cli::Args;
use crate::error::{ChatError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use api::{ApiConfig, SessionConfig, SiteConfig};
pub use defaults::{default_api_url, default_site_url, default_timeout_secs, is_truthy};

pub struct Config {
    pub api_url: String,
    pub endpoint: String,
    pub site_url: String,
    pub timeout: Duration,
    pub verbose: bool,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let file_config = FileConfig::load().map_err(|e| ChatError::ConfigError(format!("{:#}", e)))?;
        Self::resolve(args, &file_config, |key| env::var(key).ok())
    }

    /// Merge settings with precedence CLI args > environment > config file >
    /// defaults. `env` looks up environment variables.
    pub fn resolve(
        args: &Args,
        file_config: &FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_url = args
            .api_url
            .clone()
            .or_else(|| env("SITECHAT_API_URL"))
            .or(file_config.api.base_url.clone())
            .unwrap_or_else(default_api_url);

        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ChatError::ConfigError(format!(
                "API URL must start with http:// or https://, got {}",
                api_url
            )));
        }

        let site_url = env("SITECHAT_SITE_URL")
            .or(file_config.site.base_url.clone())
            .unwrap_or_else(default_site_url);

        let timeout_secs = match args.timeout {
            Some(secs) => secs,
            None => match env("SITECHAT_TIMEOUT") {
                Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                    ChatError::ConfigError(format!("SITECHAT_TIMEOUT is not a number: {}", raw))
                })?,
                None => file_config
                    .api
                    .timeout_secs
                    .unwrap_or_else(default_timeout_secs),
            },
        };
        if timeout_secs == 0 {
            return Err(ChatError::ConfigError(
                "timeout must be at least one second".to_string(),
            ));
        }

        let verbose = args.verbose
            || env("SITECHAT_VERBOSE")
                .map(|v| is_truthy(&v))
                .or(file_config.session.verbose)
                .unwrap_or(false);

        let data_dir = env("SITECHAT_DATA_DIR")
            .or(file_config.session.data_dir.clone())
            .map(PathBuf::from);

        Ok(Config {
            endpoint: chat_endpoint(&api_url),
            api_url,
            site_url,
            timeout: Duration::from_secs(timeout_secs),
            verbose,
            data_dir,
        })
    }
}

impl FileConfig {
    pub fn load() -> anyhow::Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        // No config file found, return default
        Ok(FileConfig::default())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))?
        };

        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".sitechat.yaml"),
            PathBuf::from(".sitechat.yml"),
            PathBuf::from(".sitechat.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let config_dir = config_dir.join("sitechat");
            paths.push(config_dir.join("sitechat.yaml"));
            paths.push(config_dir.join("sitechat.yml"));
            paths.push(config_dir.join("sitechat.json"));
        }

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(&Args::default(), &FileConfig::default(), env_from(&[])).unwrap();
        assert_eq!(config.endpoint, "https://api.nickbell.dev/api/v1/chat");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.verbose);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_precedence() {
        let mut file_config = FileConfig::default();
        file_config.api.base_url = Some("http://file.local".to_string());
        file_config.api.timeout_secs = Some(10);
        file_config.session.verbose = Some(true);

        let env = env_from(&[("SITECHAT_API_URL", "http://env.local"), ("SITECHAT_TIMEOUT", "20")]);
        let config = Config::resolve(&Args::default(), &file_config, &env).unwrap();
        assert_eq!(config.api_url, "http://env.local");
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert!(config.verbose);

        let args = Args {
            api_url: Some("http://args.local/api/v1".to_string()),
            timeout: Some(5),
            ..Default::default()
        };
        let config = Config::resolve(&args, &file_config, &env).unwrap();
        assert_eq!(config.endpoint, "http://args.local/api/v1/chat");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let args = Args::default();
        let file_config = FileConfig::default();
        assert!(Config::resolve(&args, &file_config, env_from(&[("SITECHAT_TIMEOUT", "soon")])).is_err());
        assert!(Config::resolve(&args, &file_config, env_from(&[("SITECHAT_API_URL", "ftp://x")])).is_err());
        assert!(Config::resolve(&args, &file_config, env_from(&[("SITECHAT_TIMEOUT", "0")])).is_err());
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sitechat.yaml");
        fs::write(
            &path,
            "api:\n  base_url: http://localhost:8080\n  timeout_secs: 12\nsite:\n  base_url: http://localhost:3000\n",
        )
        .unwrap();

        let file_config = FileConfig::load_from(&path).unwrap();
        assert_eq!(file_config.api.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(file_config.api.timeout_secs, Some(12));
        assert_eq!(file_config.site.base_url.as_deref(), Some("http://localhost:3000"));
        assert!(file_config.session.verbose.is_none());
    }
}
