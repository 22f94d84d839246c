//! Minimal XML-RPC client used to talk to the management server's `/rpc/api`
//! endpoint.

pub mod client;
pub mod codec;
pub mod error;
pub mod value;

pub use client::{Client, ClientConfig};
pub use error::{Result, RpcError};
pub use value::Value;
