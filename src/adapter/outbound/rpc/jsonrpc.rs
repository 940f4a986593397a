//! JSON-RPC 2.0 framing over an [`HttpTransport`].

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::{Error, Result, RpcError};
use crate::port::HttpTransport;

fn request(id: u64, method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
}

/// Pull `result` out of a response envelope. A `null` result is returned
/// as-is so callers can treat it as absence.
fn unwrap_envelope(method: &str, mut response: Value) -> Result<Value> {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        return Err(RpcError::Remote {
            code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        }
        .into());
    }
    match response.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(Error::invalid_response(method, "missing result")),
    }
}

/// Single call returning the raw `result` value.
pub(crate) async fn call_value(
    transport: &dyn HttpTransport,
    method: &str,
    params: Value,
) -> Result<Value> {
    let response = transport.post_json("", &request(1, method, params)).await?;
    unwrap_envelope(method, response)
}

/// Single call decoded into `T`.
pub(crate) async fn call<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    method: &str,
    params: Value,
) -> Result<T> {
    let result = call_value(transport, method, params).await?;
    decode(method, result)
}

pub(crate) fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::invalid_response(method, e.to_string()))
}

/// Several calls in one round-trip. Results come back in request order; an
/// error on any element fails the whole batch.
pub(crate) async fn batch(
    transport: &dyn HttpTransport,
    calls: Vec<(&str, Value)>,
) -> Result<Vec<Value>> {
    let methods: Vec<String> = calls.iter().map(|(m, _)| (*m).to_string()).collect();
    let body = Value::Array(
        calls
            .into_iter()
            .enumerate()
            .map(|(i, (method, params))| request(i as u64 + 1, method, params))
            .collect(),
    );

    let Value::Array(responses) = transport.post_json("", &body).await? else {
        return Err(Error::invalid_response("batch", "expected an array"));
    };

    let mut results = vec![Value::Null; methods.len()];
    let mut seen = vec![false; methods.len()];
    for response in responses {
        let slot = response
            .get("id")
            .and_then(Value::as_u64)
            .and_then(|id| usize::try_from(id).ok())
            .and_then(|id| id.checked_sub(1))
            .filter(|i| *i < methods.len())
            .ok_or_else(|| Error::invalid_response("batch", "unknown response id"))?;
        results[slot] = unwrap_envelope(&methods[slot], response)?;
        seen[slot] = true;
    }
    if let Some(missing) = seen.iter().position(|s| !s) {
        return Err(Error::invalid_response(&methods[missing], "missing from batch response"));
    }
    Ok(results)
}

/// Hex quantity such as `"0x1b4"`.
pub(crate) fn parse_quantity(method: &str, value: &Value) -> Result<u64> {
    let text = value
        .as_str()
        .ok_or_else(|| Error::invalid_response(method, "expected a hex quantity"))?;
    u64::from_str_radix(text.trim_start_matches("0x"), 16)
        .map_err(|e| Error::invalid_response(method, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::ScriptedTransport;

    #[tokio::test]
    async fn remote_errors_surface_code_and_message() {
        let transport = ScriptedTransport::new("http://node.test");
        transport.on_rpc_error("eth_blockNumber", -32000, "header not found");
        let err = call_value(&transport, "eth_blockNumber", json!([]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Rpc(RpcError::Remote { code: -32000, ref message }) if message == "header not found"
        ));
    }

    #[tokio::test]
    async fn batch_keeps_request_order_in_one_round_trip() {
        let transport = ScriptedTransport::new("http://node.test");
        transport.on_rpc_with("echo", |params| params[0].clone());
        let results = batch(
            &transport,
            vec![("echo", json!(["a"])), ("echo", json!(["b"])), ("echo", json!(["c"]))],
        )
        .await
        .unwrap();
        assert_eq!(results, vec![json!("a"), json!("b"), json!("c")]);
        assert_eq!(transport.requests(), 1);
    }

    #[tokio::test]
    async fn one_failed_element_fails_the_batch() {
        let transport = ScriptedTransport::new("http://node.test");
        transport.on_rpc("ok", json!(1));
        transport.on_rpc_error("bad", 3, "execution reverted");
        let err = batch(&transport, vec![("ok", json!([])), ("bad", json!([]))])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::TransientNetwork);
    }

    #[test]
    fn quantities_are_hex() {
        assert_eq!(parse_quantity("m", &json!("0x1b4")).unwrap(), 436);
        assert!(parse_quantity("m", &json!(12)).is_err());
    }
}
