pub mod config;
pub mod error;
pub mod paths;
pub mod profile;

#[cfg(test)]
pub mod test_utils;
