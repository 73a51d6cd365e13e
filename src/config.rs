use crate::constants::DEFAULT_BASE_URL;
use crate::errors::{CoinchatError, CoinchatResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub jwt: String,
    pub user_id: String,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            jwt: String::new(),
            user_id: String::new(),
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

/// Loads the config file (creating it with defaults on first run), applies
/// environment overrides, and installs the result as the global config.
pub fn initialize_config() -> CoinchatResult<()> {
    let config_path = get_config_path()?;

    let mut config = if config_path.exists() {
        load_config_from(&config_path)?
    } else {
        let config = Config::default();

        fs::create_dir_all(config_path.parent().unwrap()).map_err(|e| {
            CoinchatError::config_error(format!("Failed to create config directory: {}", e))
        })?;

        let config_str = serde_json::to_string_pretty(&config)
            .map_err(|e| CoinchatError::config_error(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, config_str)
            .map_err(|e| CoinchatError::config_error(format!("Failed to write config file: {}", e)))?;

        config
    };

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    *CONFIG.write().unwrap() = config;

    Ok(())
}

fn load_config_from(path: &Path) -> CoinchatResult<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| CoinchatError::config_error(format!("Failed to read config file: {}", e)))?;

    serde_json::from_str(&config_str)
        .map_err(|e| CoinchatError::config_error(format!("Failed to parse config: {}", e)))
}

/// Environment wins over the file. The user identifier comes from the session
/// context this way rather than living as a literal anywhere in the client.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(url) = env::var("COINCHAT_BASE_URL") {
        config.base_url = url;
    }
    if let Ok(jwt) = env::var("COINCHAT_JWT") {
        config.jwt = jwt;
    }
    if let Ok(user) = env::var("COINCHAT_USER") {
        config.user_id = user;
    }
}

fn get_config_path() -> CoinchatResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| CoinchatError::config_error("Could not determine home directory"))?;

    Ok(home_dir.join(".config").join("coinchat").join("config.json"))
}

fn validate_config(config: &Config) -> CoinchatResult<()> {
    if config.base_url.is_empty() {
        return Err(CoinchatError::config_error("base_url is required"));
    }

    if config.user_id.is_empty() {
        return Err(CoinchatError::config_error(
            "user_id is required (set COINCHAT_USER or edit the config file)",
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(CoinchatError::config_error(
            "request_timeout_secs must be greater than 0",
        ));
    }

    Ok(())
}

pub fn get_config() -> Config {
    CONFIG.read().unwrap().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn valid_config() -> Config {
        Config {
            user_id: "user123".to_string(),
            jwt: "token".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_validate_config_valid() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_config_missing_user() {
        let mut config = valid_config();
        config.user_id.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_zero_timeout() {
        let mut config = valid_config();
        config.request_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    // Environment variables are process-global, so both cases live in one
    // test to keep them sequential.
    #[test]
    fn test_env_overrides_beat_file_values() {
        env::set_var("COINCHAT_BASE_URL", "http://env.example:9999");
        env::set_var("COINCHAT_JWT", "env-jwt");
        env::set_var("COINCHAT_USER", "env-user");

        let mut config = valid_config();
        apply_env_overrides(&mut config);

        env::remove_var("COINCHAT_BASE_URL");
        env::remove_var("COINCHAT_JWT");
        env::remove_var("COINCHAT_USER");

        assert_eq!(config.base_url, "http://env.example:9999");
        assert_eq!(config.jwt, "env-jwt");
        assert_eq!(config.user_id, "env-user");

        // With the variables gone, the file values stand.
        let mut untouched = valid_config();
        apply_env_overrides(&mut untouched);
        assert_eq!(untouched.base_url, DEFAULT_BASE_URL);
        assert_eq!(untouched.user_id, "user123");
    }

    #[test]
    fn test_load_config_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = valid_config();

        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.user_id, "user123");
        assert_eq!(loaded.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_config_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
