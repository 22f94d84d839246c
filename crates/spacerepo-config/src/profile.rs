use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

/// Path of the XML-RPC endpoint relative to the server root.
pub const API_PATH: &str = "rpc/api";

/// A profile describes one management server and the account used on it.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Profile {
    /// Base URL of the server, e.g. `https://uyuni.example.com`.
    pub server: String,

    /// Login name used for `auth.login`.
    pub username: Option<String>,

    /// Password used for `auth.login`. Prompted for when unset.
    pub password: Option<String>,

    /// Verify the server's TLS certificate.
    /// Default: true
    pub verify_ssl: Option<bool>,
}

impl Profile {
    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl.unwrap_or(true)
    }

    /// Returns the XML-RPC endpoint for this profile's server.
    pub fn api_url(&self) -> Result<Url> {
        let mut base = Url::parse(&self.server).map_err(|source| {
            ConfigError::InvalidServerUrl {
                url: self.server.clone(),
                source,
            }
        })?;

        match base.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        base.join(API_PATH)
            .map_err(|source| ConfigError::InvalidServerUrl {
                url: self.server.clone(),
                source,
            })
    }
}
