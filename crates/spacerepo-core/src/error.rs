//! Error types for spacerepo-core.

use miette::Diagnostic;
use spacerepo_config::error::ConfigError;
use spacerepo_rpc::RpcError;
use thiserror::Error;

/// Message logged when a filter argument lacks its `+`/`-` flag.
pub const FILTER_SYNTAX_ERROR: &str = "Each filter must start with + or -";

#[derive(Error, Diagnostic, Debug)]
pub enum SpaceError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rpc(#[from] RpcError),

    #[error("Error while {action}")]
    #[diagnostic(code(spacerepo::io))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", FILTER_SYNTAX_ERROR)]
    #[diagnostic(
        code(spacerepo::invalid_filter),
        help("Prefix include patterns with '+' and exclude patterns with '-', e.g. +kernel*")
    )]
    InvalidFilter(String),

    #[error("Login to {server} failed")]
    #[diagnostic(
        code(spacerepo::login),
        help("Check the username and password of the selected profile")
    )]
    LoginFailed {
        server: String,
        #[source]
        source: RpcError,
    },

    #[error("{0}")]
    #[diagnostic(code(spacerepo::error))]
    Custom(String),
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, SpaceError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, SpaceError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            SpaceError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_message() {
        let err = SpaceError::InvalidFilter("foo".to_string());
        assert_eq!(err.to_string(), FILTER_SYNTAX_ERROR);
        assert_eq!(FILTER_SYNTAX_ERROR, "Each filter must start with + or -");
    }

    #[test]
    fn test_io_context() {
        let result: std::io::Result<()> = Err(std::io::Error::other("boom"));
        let err = result.with_context(|| "reading password".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Error while reading password");
    }

    #[test]
    fn test_rpc_error_is_transparent() {
        let err: SpaceError = RpcError::Fault {
            code: 1,
            message: "nope".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Server fault 1: nope");
    }
}
