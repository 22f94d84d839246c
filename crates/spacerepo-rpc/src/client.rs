use std::time::Duration;

use tracing::{debug, trace};
use ureq::{tls::TlsConfig, Agent, Proxy};
use url::Url;

use crate::{
    codec::{decode_response, encode_call},
    error::{Result, RpcError},
    value::Value,
};

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    pub proxy: Option<Proxy>,
    pub timeout: Option<Duration>,
    pub verify_ssl: bool,
}

impl Default for ClientConfig {
    /// Creates a default `ClientConfig` with the `spacerepo/<version>` user
    /// agent, TLS verification on, and no proxy or timeout.
    fn default() -> Self {
        Self {
            user_agent: Some(concat!("spacerepo/", env!("CARGO_PKG_VERSION")).into()),
            proxy: None,
            timeout: None,
            verify_ssl: true,
        }
    }
}

impl ClientConfig {
    /// Builds an HTTP `Agent` configured from this `ClientConfig`.
    pub fn build(&self) -> Agent {
        let mut config = Agent::config_builder()
            .proxy(self.proxy.clone())
            .timeout_global(self.timeout);

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        if !self.verify_ssl {
            config = config.tls_config(TlsConfig::builder().disable_verification(true).build());
        }

        config.build().into()
    }
}

/// XML-RPC client bound to one endpoint.
#[derive(Clone)]
pub struct Client {
    agent: Agent,
    endpoint: Url,
}

impl Client {
    pub fn new(endpoint: Url, config: &ClientConfig) -> Self {
        Self {
            agent: config.build(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Calls `method` with `params` and returns the decoded result.
    ///
    /// Server faults are returned as [`RpcError::Fault`]; HTTP error statuses
    /// as [`RpcError::HttpError`].
    pub fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        debug!(method, endpoint = %self.endpoint, "xmlrpc call");

        let body = encode_call(method, params);
        let mut response = self
            .agent
            .post(self.endpoint.as_str())
            .header("Content-Type", "text/xml")
            .send(body.as_str())
            .map_err(|err| match err {
                ureq::Error::StatusCode(status) => RpcError::HttpError {
                    status,
                    url: self.endpoint.to_string(),
                },
                other => other.into(),
            })?;

        let text = response.body_mut().read_to_string()?;
        trace!(method, response = %text, "xmlrpc response");

        decode_response(&text)
    }
}
