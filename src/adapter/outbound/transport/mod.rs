//! HTTP transports for chain endpoints.

mod http;

pub use http::{ReqwestTransport, ReqwestTransportFactory};
