//! reqwest-backed [`HttpTransport`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::port::{HttpTransport, TransportFactory, TransportSpec};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// JSON over HTTP against one base endpoint, with the deadline baked into
/// the client.
pub struct ReqwestTransport {
    http: HttpClient,
    endpoint: String,
    bearer: Option<String>,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or the client
    /// cannot be built.
    pub fn new(spec: &TransportSpec) -> Result<Self> {
        Url::parse(&spec.endpoint)?;
        let http = HttpClient::builder()
            .timeout(spec.timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(spec.timeout))
            .build()?;
        Ok(Self {
            http,
            endpoint: spec.endpoint.trim_end_matches('/').to_string(),
            bearer: spec.bearer.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        join(&self.endpoint, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!("{status}: {}", body.trim())));
        }
        Ok(response.json::<Value>().await?)
    }
}

fn join(endpoint: &str, path: &str) -> String {
    if path.is_empty() {
        endpoint.to_string()
    } else if path.starts_with('/') {
        format!("{endpoint}{path}")
    } else {
        format!("{endpoint}/{path}")
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        self.send(self.http.post(url).json(body)).await
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        self.send(self.http.get(url).query(query)).await
    }
}

/// Opens a [`ReqwestTransport`] per spec.
#[derive(Debug, Default)]
pub struct ReqwestTransportFactory;

impl TransportFactory for ReqwestTransportFactory {
    fn open(&self, spec: &TransportSpec) -> Result<Arc<dyn HttpTransport>> {
        Ok(Arc::new(ReqwestTransport::new(spec)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_join_onto_the_endpoint() {
        assert_eq!(join("https://node.test", ""), "https://node.test");
        assert_eq!(join("https://node.test/api", "/v3/account"), "https://node.test/api/v3/account");
        assert_eq!(join("https://node.test", "tokens/0x1"), "https://node.test/tokens/0x1");
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let spec = TransportSpec::new("https://node.test/rpc/", Duration::from_secs(3));
        let transport = ReqwestTransport::new(&spec).unwrap();
        assert_eq!(transport.endpoint(), "https://node.test/rpc");
    }

    #[test]
    fn malformed_endpoint_is_rejected() {
        let spec = TransportSpec::new("not a url", Duration::from_secs(3));
        let err = ReqwestTransportFactory.open(&spec).err().unwrap();
        assert!(matches!(err, Error::Url(_)));
    }
}
