//! Fuel over its GraphQL API.

use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::RpcContext;
use crate::domain::address::{fuel_checksum, is_native_address, is_prefixed_hex};
use crate::domain::amount::parse_u256;
use crate::domain::{Backend, ChainInfo, TokenInfo};
use crate::error::{Error, Result, RpcError};
use crate::port::{ChainRpc, HttpTransport, TxOutcome};

const BALANCE: &str = r"
query ($owner: Address!, $assetId: AssetId!) {
    balance(owner: $owner, assetId: $assetId) { amount }
}";

const TX_STATUS: &str = r"
query ($id: TransactionId!) {
    transaction(id: $id) {
        status {
            __typename
            ... on SuccessStatus { blockHeight }
            ... on FailureStatus { blockHeight }
        }
    }
}";

const LATEST_BLOCK: &str = "{ chain { latestBlock { height } } }";

pub struct FuelRpc {
    chain: Arc<ChainInfo>,
    transport: Arc<dyn HttpTransport>,
}

impl FuelRpc {
    /// # Errors
    ///
    /// Returns an error if the chain has no GraphQL client.
    pub fn new(ctx: &RpcContext) -> Result<Self> {
        Ok(Self {
            chain: Arc::clone(&ctx.chain),
            transport: ctx.require_transport()?,
        })
    }

    async fn query(&self, operation: &str, query: &str, variables: Value) -> Result<Value> {
        let mut response = self
            .transport
            .post_json("", &json!({ "query": query, "variables": variables }))
            .await?;
        if let Some(message) = response
            .get("errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first())
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
        {
            return Err(RpcError::Remote {
                code: 0,
                message: message.to_string(),
            }
            .into());
        }
        response
            .get_mut("data")
            .map(Value::take)
            .ok_or_else(|| Error::invalid_response(operation, "missing data"))
    }
}

/// Fuel serializes `U32`/`U64` scalars as decimal strings.
fn scalar(operation: &str, value: &Value) -> Result<i64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
    .ok_or_else(|| Error::invalid_response(operation, format!("expected an integer, got {value}")))
}

#[async_trait]
impl ChainRpc for FuelRpc {
    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    fn backend(&self) -> Backend {
        Backend::Fuel
    }

    fn is_address_valid(&self, address: &str) -> bool {
        is_prefixed_hex(address.trim(), 64)
    }

    fn checksum_address(&self, address: &str) -> String {
        fuel_checksum(address).unwrap_or_else(|| address.to_string())
    }

    async fn get_latest_block_number(&self) -> Result<i64> {
        let op = "latestBlock";
        let data = self.query(op, LATEST_BLOCK, json!({})).await?;
        scalar(op, &data["chain"]["latestBlock"]["height"])
    }

    async fn is_tx_success(&self, hash: &str) -> Result<TxOutcome> {
        let op = "transaction";
        let hash = hash.trim();
        let data = self.query(op, TX_STATUS, json!({ "id": hash })).await?;
        let tx = &data["transaction"];
        if tx.is_null() {
            return Err(RpcError::TxNotFound {
                hash: hash.to_string(),
            }
            .into());
        }
        let status = &tx["status"];
        let success = match status["__typename"].as_str() {
            Some("SuccessStatus") => true,
            Some("FailureStatus") => false,
            _ => {
                return Err(RpcError::TxPending {
                    hash: hash.to_string(),
                }
                .into())
            }
        };
        Ok(TxOutcome {
            success,
            height: scalar(op, &status["blockHeight"])?,
        })
    }

    async fn get_allowance(&self, _owner: &str, _token: &str, _spender: &str) -> Result<U256> {
        Err(Error::unsupported(Backend::Fuel, "get_allowance"))
    }

    async fn get_balance(&self, owner: &str, token: &str) -> Result<U256> {
        let op = "balance";
        let data = self
            .query(op, BALANCE, json!({ "owner": owner.trim(), "assetId": token.trim() }))
            .await?;
        let amount = data["balance"]["amount"]
            .as_str()
            .ok_or_else(|| Error::invalid_response(op, "missing amount"))?;
        parse_u256(amount).map_err(|e| Error::invalid_response(op, e.to_string()))
    }

    /// Only the gas token is known without an indexer.
    async fn get_token_info(&self, token: &str) -> Result<TokenInfo> {
        if is_native_address(token) {
            return Ok(TokenInfo::native(&self.chain));
        }
        Err(Error::unsupported(Backend::Fuel, "get_token_info"))
    }
}
