use thiserror::Error;

use crate::domain::Backend;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised by chain adapters.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("unsupported backend: {code}")]
    UnsupportedBackend { code: i32 },

    #[error("{operation} is not supported by {backend} chains")]
    Unsupported {
        backend: Backend,
        operation: &'static str,
    },

    #[error("token not found: {address} on {chain}")]
    TokenNotFound { chain: String, address: String },

    #[error("invalid address: {address}")]
    InvalidAddress { address: String },

    #[error("transaction {hash} is still pending")]
    TxPending { hash: String },

    #[error("transaction {hash} not found")]
    TxNotFound { hash: String },

    #[error("rpc error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("invalid response from {method}: {reason}")]
    InvalidResponse { method: String, reason: String },
}

/// Coarse classification used by callers that only care about the error family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    NotFound,
    Unsupported,
    TransientNetwork,
    DataIntegrity,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("invalid cache key: {0}")]
    InvalidKey(String),

    #[error("{operation} on {chain} failed: {source}")]
    Chain {
        chain: String,
        operation: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("network error: {0}")]
    Network(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an adapter error with the operation and chain it happened on.
    pub fn in_chain(self, chain: impl Into<String>, operation: &'static str) -> Self {
        Error::Chain {
            chain: chain.into(),
            operation,
            source: Box::new(self),
        }
    }

    /// Innermost error, looking through any chain context.
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Error::Chain { source, .. } => source.root(),
            other => other,
        }
    }

    /// Map onto the five error families callers branch on.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            Error::Config(_) | Error::InvalidKey(_) => ErrorKind::Config,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Rpc(rpc) => match rpc {
                RpcError::UnsupportedBackend { .. } | RpcError::Unsupported { .. } => {
                    ErrorKind::Unsupported
                }
                RpcError::TokenNotFound { .. } | RpcError::TxNotFound { .. } => {
                    ErrorKind::NotFound
                }
                RpcError::TxPending { .. } | RpcError::Remote { .. } => {
                    ErrorKind::TransientNetwork
                }
                RpcError::InvalidAddress { .. } | RpcError::InvalidResponse { .. } => {
                    ErrorKind::DataIntegrity
                }
            },
            Error::Http(_) | Error::Io(_) | Error::Network(_) | Error::Connection(_) => {
                ErrorKind::TransientNetwork
            }
            Error::Database(_) => ErrorKind::TransientNetwork,
            Error::Json(_) | Error::Url(_) | Error::Parse(_) => ErrorKind::DataIntegrity,
            Error::Chain { .. } => ErrorKind::DataIntegrity,
        }
    }

    pub(crate) fn invalid_response(method: impl Into<String>, reason: impl Into<String>) -> Self {
        RpcError::InvalidResponse {
            method: method.into(),
            reason: reason.into(),
        }
        .into()
    }

    pub(crate) fn unsupported(backend: Backend, operation: &'static str) -> Self {
        RpcError::Unsupported { backend, operation }.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_looks_through_chain_context() {
        let err = Error::from(RpcError::TokenNotFound {
            chain: "Ethereum".into(),
            address: "0xabc".into(),
        })
        .in_chain("Ethereum", "get_token_info");

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(matches!(
            err.root(),
            Error::Rpc(RpcError::TokenNotFound { .. })
        ));
        assert!(err.to_string().contains("get_token_info on Ethereum"));
    }

    #[test]
    fn unsupported_backend_is_unsupported_kind() {
        let err = Error::from(RpcError::UnsupportedBackend { code: 42 });
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
