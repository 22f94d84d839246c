use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{LazyLock, RwLock},
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{ConfigError, Result},
    paths::xdg_config_home,
    profile::Profile,
};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application's configuration
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// The name of the default profile to use.
    pub default_profile: String,

    /// A map of profile names to server definitions.
    pub profile: HashMap<String, Profile>,

    /// Request timeout in seconds.
    /// Default: 30
    pub timeout: Option<u64>,

    /// User agent sent with every API request.
    pub user_agent: Option<String>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));
pub static CURRENT_PROFILE: LazyLock<RwLock<Option<String>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("SPACEREPO_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("spacerepo").join("config.toml"),
    })
});

pub fn init() -> Result<()> {
    let config = Config::new()?;
    let mut global_config = CONFIG.write().unwrap();
    *global_config = Some(config);
    Ok(())
}

pub fn get_config() -> Config {
    {
        let config_guard = CONFIG.read().unwrap();
        if let Some(config) = config_guard.as_ref() {
            return config.clone();
        }
    }

    let mut config_guard = CONFIG.write().unwrap();
    config_guard
        .get_or_insert_with(Config::default_config)
        .clone()
}

pub fn get_current_profile() -> String {
    let current_profile = CURRENT_PROFILE.read().unwrap();
    current_profile
        .clone()
        .unwrap_or_else(|| get_config().default_profile.clone())
}

pub fn set_current_profile(name: &str) -> Result<()> {
    let config = get_config();
    if !config.profile.contains_key(name) {
        return Err(ConfigError::InvalidProfile(name.to_string()));
    }
    let mut profile = CURRENT_PROFILE.write().unwrap();
    *profile = Some(name.to_string());
    Ok(())
}

impl Config {
    pub fn default_config() -> Self {
        let default_profile = Profile {
            server: "https://localhost".to_string(),
            username: None,
            password: None,
            verify_ssl: Some(true),
        };
        let default_profile_name = "default".to_string();

        Self {
            profile: HashMap::from([(default_profile_name.clone(), default_profile)]),
            default_profile: default_profile_name,
            timeout: Some(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
        }
    }

    /// Creates a new configuration by loading it from the configuration file.
    /// If the configuration file is not found, it uses the default configuration.
    pub fn new() -> Result<Self> {
        let config_path = CONFIG_PATH.read().unwrap().to_path_buf();

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default_config(),
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    pub fn resolve(&mut self) -> Result<()> {
        if !self.profile.contains_key(&self.default_profile) {
            return Err(ConfigError::MissingDefaultProfile(
                self.default_profile.clone(),
            ));
        }

        self.timeout.get_or_insert(DEFAULT_TIMEOUT_SECS);

        for profile in self.profile.values_mut() {
            profile.verify_ssl.get_or_insert(true);
        }

        Ok(())
    }

    pub fn default_profile(&self) -> Result<&Profile> {
        self.profile
            .get(&self.default_profile)
            .ok_or_else(|| ConfigError::MissingDefaultProfile(self.default_profile.clone()))
    }

    pub fn get_profile(&self, name: &str) -> Result<&Profile> {
        self.profile
            .get(name)
            .ok_or(ConfigError::MissingProfile(name.to_string()))
    }

    /// Returns the profile selected for this run with the `SPACEREPO_SERVER`,
    /// `SPACEREPO_USERNAME` and `SPACEREPO_PASSWORD` overrides applied.
    pub fn active_profile(&self) -> Result<Profile> {
        let mut profile = self.get_profile(&get_current_profile())?.clone();

        if let Ok(server) = std::env::var("SPACEREPO_SERVER") {
            profile.server = server;
        }
        if let Ok(username) = std::env::var("SPACEREPO_USERNAME") {
            profile.username = Some(username);
        }
        if let Ok(password) = std::env::var("SPACEREPO_PASSWORD") {
            profile.password = Some(password);
        }

        Ok(profile)
    }

    pub fn timeout(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = CONFIG_PATH.read().unwrap().to_path_buf();
        let serialized = toml::to_string_pretty(self)?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, serialized)?;
        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}

pub fn generate_default_config() -> Result<()> {
    let config_path = CONFIG_PATH.read().unwrap().to_path_buf();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    Config::default_config().save()?;
    info!(
        "Default configuration file generated at: {}",
        config_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;
    use crate::{error::ConfigError, test_utils::with_env};

    fn set_config_path(path: PathBuf) {
        *CONFIG_PATH.write().unwrap() = path;
    }

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_config();

        assert_eq!(config.default_profile, "default");
        assert!(config.profile.contains_key("default"));
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT_SECS));
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_config_resolve_missing_default_profile() {
        let mut config = Config::default_config();
        config.default_profile = "nonexistent".to_string();

        let result = config.resolve();
        assert!(matches!(result, Err(ConfigError::MissingDefaultProfile(_))));
    }

    #[test]
    fn test_config_resolve_sets_defaults() {
        let mut config = Config::default_config();
        config.timeout = None;
        config.profile.get_mut("default").unwrap().verify_ssl = None;

        config.resolve().unwrap();

        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.profile["default"].verify_ssl, Some(true));
    }

    #[test]
    fn test_get_profile() {
        let config = Config::default_config();

        assert!(config.get_profile("default").is_ok());

        let missing = config.get_profile("nonexistent");
        assert!(matches!(missing, Err(ConfigError::MissingProfile(_))));
    }

    #[test]
    fn test_config_parse_from_toml() {
        let content = r#"
default_profile = "prod"
timeout = 5

[profile.prod]
server = "https://uyuni.example.com"
username = "admin"

[profile.lab]
server = "http://lab.local"
verify_ssl = false
"#;
        let mut config: Config = toml::from_str(content).unwrap();
        config.resolve().unwrap();

        assert_eq!(config.timeout(), 5);
        let prod = config.default_profile().unwrap();
        assert_eq!(prod.server, "https://uyuni.example.com");
        assert_eq!(prod.username.as_deref(), Some("admin"));
        assert!(prod.verify_ssl());
        assert!(!config.get_profile("lab").unwrap().verify_ssl());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default_config();
        let serialized = toml::to_string(&config);
        assert!(serialized.is_ok());

        let deserialized: std::result::Result<Config, _> = toml::from_str(&serialized.unwrap());
        assert!(deserialized.is_ok());
    }

    #[test]
    #[serial]
    fn test_active_profile_env_override() {
        with_env(
            vec![
                ("SPACEREPO_SERVER", Some("https://override.example.com")),
                ("SPACEREPO_USERNAME", Some("ops")),
                ("SPACEREPO_PASSWORD", Some("secret")),
            ],
            || {
                let config = Config::default_config();
                *CONFIG.write().unwrap() = Some(config.clone());
                *CURRENT_PROFILE.write().unwrap() = None;

                let profile = config.active_profile().unwrap();
                assert_eq!(profile.server, "https://override.example.com");
                assert_eq!(profile.username.as_deref(), Some("ops"));
                assert_eq!(profile.password.as_deref(), Some("secret"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_set_current_profile_rejects_unknown() {
        *CONFIG.write().unwrap() = Some(Config::default_config());

        let result = set_current_profile("missing");
        assert!(matches!(result, Err(ConfigError::InvalidProfile(_))));
        assert!(set_current_profile("default").is_ok());
        assert_eq!(get_current_profile(), "default");

        *CURRENT_PROFILE.write().unwrap() = None;
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        set_config_path(dir.path().join("absent.toml"));

        let config = Config::new().unwrap();
        assert_eq!(config.default_profile, "default");
    }

    #[test]
    #[serial]
    fn test_generate_default_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spacerepo").join("config.toml");
        set_config_path(path.clone());

        generate_default_config().unwrap();
        assert!(path.exists());

        let loaded = Config::new().unwrap();
        assert!(loaded.profile.contains_key("default"));

        let again = generate_default_config();
        assert!(matches!(again, Err(ConfigError::ConfigAlreadyExists)));
    }
}
