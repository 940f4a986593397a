//! HTTP transport port and the per-chain client handle.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// JSON over HTTP against one base endpoint.
///
/// Deadlines are owned by the transport (set from the chain's configured
/// timeout when it is built). Dropping a returned future cancels the request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Base URL every path is resolved against.
    fn endpoint(&self) -> &str;

    /// POST `body` as JSON to `path` (empty for the endpoint itself).
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value>;

    /// GET `path` with query parameters.
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value>;
}

/// Settings used to open a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSpec {
    pub endpoint: String,
    pub timeout: Duration,
    pub bearer: Option<String>,
}

impl TransportSpec {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
            bearer: None,
        }
    }

    #[must_use]
    pub fn with_bearer(mut self, bearer: impl Into<String>) -> Self {
        self.bearer = Some(bearer.into());
        self
    }
}

/// Opens transports. Production uses reqwest; tests script the responses.
pub trait TransportFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the endpoint is malformed or the client cannot be built.
    fn open(&self, spec: &TransportSpec) -> Result<Arc<dyn HttpTransport>>;
}

/// Native client handle attached to a chain row.
#[derive(Clone)]
pub enum ChainClient {
    /// JSON-RPC 2.0 endpoint (EVM, Starknet, Solana, Sui, Benfen).
    JsonRpc(Arc<dyn HttpTransport>),
    /// GraphQL endpoint (Fuel).
    GraphQl(Arc<dyn HttpTransport>),
    /// REST endpoint (zkSync Lite).
    Rest(Arc<dyn HttpTransport>),
    /// Indexer client shared by every Ton chain on the same network.
    Ton(Arc<dyn HttpTransport>),
    /// No long-lived client. Bitcoin resolves its indexer per call from
    /// remote config; Cosmos and unknown backends have no adapter.
    Detached,
}

impl ChainClient {
    /// The underlying transport, if the handle carries one.
    #[must_use]
    pub fn transport(&self) -> Option<&Arc<dyn HttpTransport>> {
        match self {
            ChainClient::JsonRpc(t)
            | ChainClient::GraphQl(t)
            | ChainClient::Rest(t)
            | ChainClient::Ton(t) => Some(t),
            ChainClient::Detached => None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ChainClient::JsonRpc(_) => "json-rpc",
            ChainClient::GraphQl(_) => "graphql",
            ChainClient::Rest(_) => "rest",
            ChainClient::Ton(_) => "ton",
            ChainClient::Detached => "detached",
        }
    }
}

impl fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.transport() {
            Some(t) => write!(f, "{}({})", self.kind(), t.endpoint()),
            None => write!(f, "{}", self.kind()),
        }
    }
}
