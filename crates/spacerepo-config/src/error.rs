use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(spacerepo_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(spacerepo_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(spacerepo_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid profile: {0}")]
    #[diagnostic(
        code(spacerepo_config::invalid_profile),
        help("Check available profiles in your config file")
    )]
    InvalidProfile(String),

    #[error("Missing default profile: {0}")]
    #[diagnostic(
        code(spacerepo_config::missing_default_profile),
        help("Ensure the default_profile field references an existing profile")
    )]
    MissingDefaultProfile(String),

    #[error("Missing profile: {0}")]
    #[diagnostic(
        code(spacerepo_config::missing_profile),
        help("Add the profile to your configuration or use an existing one")
    )]
    MissingProfile(String),

    #[error("Invalid server URL '{url}': {source}")]
    #[diagnostic(
        code(spacerepo_config::invalid_server_url),
        help("Use a full URL such as https://uyuni.example.com")
    )]
    InvalidServerUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported server URL scheme: {0}")]
    #[diagnostic(
        code(spacerepo_config::unsupported_scheme),
        help("Only http and https servers are supported")
    )]
    UnsupportedScheme(String),

    #[error("No username configured for profile '{0}'")]
    #[diagnostic(
        code(spacerepo_config::missing_username),
        help("Set `username` in the profile, SPACEREPO_USERNAME, or pass --username")
    )]
    MissingUsername(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(spacerepo_config::io))]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
