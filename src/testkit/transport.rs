//! Scripted JSON transports.
//!
//! JSON-RPC bodies (objects with a `method`, or batches of them) are answered
//! by method name. Anything else is answered by request path. Unscripted
//! requests fail with a network error so a test never hangs on a missing
//! script.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::port::{HttpTransport, TransportFactory, TransportSpec};

type Handler = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

#[derive(Clone)]
enum RpcReply {
    Result(Handler),
    Error { code: i64, message: String },
}

#[derive(Default)]
pub struct ScriptedTransport {
    endpoint: String,
    rpc: Mutex<HashMap<String, RpcReply>>,
    post: Mutex<HashMap<String, Handler>>,
    get: Mutex<HashMap<String, Handler>>,
    calls: Mutex<HashMap<String, usize>>,
    requests: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Answer `method` with a fixed `result`.
    pub fn on_rpc(&self, method: &str, result: Value) -> &Self {
        self.on_rpc_with(method, move |_| result.clone())
    }

    /// Answer `method` with a result computed from the request params.
    pub fn on_rpc_with(
        &self,
        method: &str,
        handler: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> &Self {
        self.rpc
            .lock()
            .insert(method.to_string(), RpcReply::Result(Arc::new(handler)));
        self
    }

    /// Answer `method` with a JSON-RPC error object.
    pub fn on_rpc_error(&self, method: &str, code: i64, message: &str) -> &Self {
        self.rpc.lock().insert(
            method.to_string(),
            RpcReply::Error {
                code,
                message: message.to_string(),
            },
        );
        self
    }

    /// Answer a non-RPC POST to `path` with a body computed from the request.
    pub fn on_post(
        &self,
        path: &str,
        handler: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> &Self {
        self.post.lock().insert(path.to_string(), Arc::new(handler));
        self
    }

    /// Answer a GET to `path` with a body computed from the query, passed as
    /// a JSON object.
    pub fn on_get(
        &self,
        path: &str,
        handler: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> &Self {
        self.get.lock().insert(path.to_string(), Arc::new(handler));
        self
    }

    /// HTTP requests made, counting a batch once.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Times `key` was served: an RPC method name or a request path.
    pub fn calls(&self, key: &str) -> usize {
        self.calls.lock().get(key).copied().unwrap_or(0)
    }

    fn count(&self, key: &str) {
        *self.calls.lock().entry(key.to_string()).or_default() += 1;
    }

    fn answer_rpc(&self, request: &Value) -> Result<Value> {
        let method = request
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();
        self.count(method);
        let reply = self.rpc.lock().get(method).cloned();
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        match reply {
            Some(RpcReply::Result(handler)) => {
                let params = request.get("params").cloned().unwrap_or(Value::Null);
                Ok(json!({ "jsonrpc": "2.0", "id": id, "result": handler(&params) }))
            }
            Some(RpcReply::Error { code, message }) => Ok(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": code, "message": message },
            })),
            None => Err(Error::Network(format!("no scripted reply for {method}"))),
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match body {
            Value::Array(batch) => batch
                .iter()
                .map(|request| self.answer_rpc(request))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) if map.contains_key("method") => self.answer_rpc(body),
            _ => {
                self.count(path);
                let handler = self.post.lock().get(path).cloned();
                handler
                    .map(|h| h(body))
                    .ok_or_else(|| Error::Network(format!("no scripted reply for POST {path}")))
            }
        }
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.count(path);
        let handler = self.get.lock().get(path).cloned();
        let query: serde_json::Map<String, Value> = query
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
            .collect();
        handler
            .map(|h| h(&Value::Object(query)))
            .ok_or_else(|| Error::Network(format!("no scripted reply for GET {path}")))
    }
}

/// Hands out one [`ScriptedTransport`] per endpoint and counts opens.
#[derive(Default)]
pub struct ScriptedTransportFactory {
    transports: Mutex<HashMap<String, Arc<ScriptedTransport>>>,
    specs: Mutex<Vec<TransportSpec>>,
}

impl ScriptedTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The transport for `endpoint`, created empty on first use.
    pub fn transport(&self, endpoint: &str) -> Arc<ScriptedTransport> {
        Arc::clone(
            self.transports
                .lock()
                .entry(endpoint.to_string())
                .or_insert_with(|| Arc::new(ScriptedTransport::new(endpoint))),
        )
    }

    pub fn opened(&self) -> usize {
        self.specs.lock().len()
    }

    pub fn specs(&self) -> Vec<TransportSpec> {
        self.specs.lock().clone()
    }
}

impl TransportFactory for ScriptedTransportFactory {
    fn open(&self, spec: &TransportSpec) -> Result<Arc<dyn HttpTransport>> {
        self.specs.lock().push(spec.clone());
        Ok(self.transport(&spec.endpoint))
    }
}
