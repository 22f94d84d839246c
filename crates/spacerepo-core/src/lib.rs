use error::SpaceError;

pub mod api;
pub mod commands;
pub mod error;
pub mod help;
pub mod output;
pub mod shell;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use shell::Shell;

pub type SpaceResult<T> = std::result::Result<T, SpaceError>;
