//! zkSync Lite over the v0.2 REST API.
//!
//! Every response is wrapped as `{ status, result, error }`. Accounts hold
//! balances keyed by token symbol, so token addresses are resolved to
//! symbols through `/tokens/{address}` first.

use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::RpcContext;
use crate::application::TokenCache;
use crate::domain::address::{evm_checksum, is_hex_zero, is_native_address};
use crate::domain::amount::parse_u256;
use crate::domain::{Backend, ChainInfo, TokenInfo};
use crate::error::{Error, Result, RpcError};
use crate::port::{ChainRpc, HttpTransport, TxOutcome};

const NATIVE_SYMBOL: &str = "ETH";

#[derive(Deserialize)]
struct Token {
    symbol: String,
    decimals: i32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Transaction {
    status: String,
    #[serde(default)]
    block_number: Option<i64>,
}

pub struct ZksyncLiteRpc {
    chain: Arc<ChainInfo>,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<TokenCache>,
}

impl ZksyncLiteRpc {
    /// # Errors
    ///
    /// Returns an error if the chain has no REST client.
    pub fn new(ctx: &RpcContext) -> Result<Self> {
        Ok(Self {
            chain: Arc::clone(&ctx.chain),
            transport: ctx.require_transport()?,
            tokens: Arc::clone(&ctx.tokens),
        })
    }

    /// `result` of a successful response; `Value::Null` when the API has
    /// nothing for the request.
    async fn get(&self, path: &str) -> Result<Value> {
        let mut response = self.transport.get_json(path, &[]).await?;
        if response["status"].as_str() == Some("error") {
            let error = &response["error"];
            return Err(RpcError::Remote {
                code: error["code"].as_i64().unwrap_or_default(),
                message: error["message"].as_str().unwrap_or("unknown error").to_string(),
            }
            .into());
        }
        response
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| Error::invalid_response(path, "missing result"))
    }

    async fn symbol(&self, token: &str) -> Result<String> {
        if is_hex_zero(token) {
            return Ok(NATIVE_SYMBOL.to_string());
        }
        self.get_token_info(token).await.map(|t| t.token_name)
    }
}

#[async_trait]
impl ChainRpc for ZksyncLiteRpc {
    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    fn backend(&self) -> Backend {
        Backend::ZksyncLite
    }

    fn is_address_valid(&self, address: &str) -> bool {
        evm_checksum(address).is_some()
    }

    fn checksum_address(&self, address: &str) -> String {
        evm_checksum(address).unwrap_or_else(|| address.to_string())
    }

    async fn get_latest_block_number(&self) -> Result<i64> {
        let path = "/blocks/lastFinalized";
        let block = self.get(path).await?;
        block["blockNumber"]
            .as_i64()
            .ok_or_else(|| Error::invalid_response(path, "missing blockNumber"))
    }

    async fn is_tx_success(&self, hash: &str) -> Result<TxOutcome> {
        let hash = hash.trim();
        let path = format!("/transactions/{hash}");
        let tx = self.get(&path).await?;
        if tx.is_null() {
            return Err(RpcError::TxNotFound {
                hash: hash.to_string(),
            }
            .into());
        }
        let tx: Transaction = serde_json::from_value(tx)
            .map_err(|e| Error::invalid_response(&path, e.to_string()))?;
        let success = match tx.status.as_str() {
            "committed" | "finalized" => true,
            "rejected" => false,
            _ => {
                return Err(RpcError::TxPending {
                    hash: hash.to_string(),
                }
                .into())
            }
        };
        Ok(TxOutcome {
            success,
            height: tx.block_number.unwrap_or_default(),
        })
    }

    async fn get_allowance(&self, _owner: &str, _token: &str, _spender: &str) -> Result<U256> {
        Err(Error::unsupported(Backend::ZksyncLite, "get_allowance"))
    }

    /// Finalized balance. An account the API has never seen holds nothing.
    async fn get_balance(&self, owner: &str, token: &str) -> Result<U256> {
        let symbol = self.symbol(token.trim()).await?;
        let path = format!("/accounts/{}/finalized", owner.trim());
        let account = self.get(&path).await?;
        match account["balances"][symbol.as_str()].as_str() {
            Some(amount) => parse_u256(amount).map_err(|e| Error::invalid_response(&path, e.to_string())),
            None => Ok(U256::ZERO),
        }
    }

    async fn get_token_info(&self, token: &str) -> Result<TokenInfo> {
        let token = token.trim();
        if is_native_address(token) {
            return Ok(TokenInfo::native(&self.chain));
        }
        if let Some(hit) = self.tokens.get(Backend::ZksyncLite, &self.chain.name, token) {
            return Ok((*hit).clone());
        }
        let path = format!("/tokens/{token}");
        let found = self.get(&path).await?;
        if found.is_null() {
            return Err(RpcError::TokenNotFound {
                chain: self.chain.name.clone(),
                address: token.to_string(),
            }
            .into());
        }
        let found: Token = serde_json::from_value(found)
            .map_err(|e| Error::invalid_response(&path, e.to_string()))?;
        if found.symbol.trim().is_empty() || found.decimals <= 0 {
            return Err(RpcError::TokenNotFound {
                chain: self.chain.name.clone(),
                address: token.to_string(),
            }
            .into());
        }
        let info = TokenInfo {
            full_name: found.symbol.clone(),
            ..TokenInfo::new(&self.chain.name, token, found.symbol, found.decimals)
        };
        Ok((*self.tokens.add(Backend::ZksyncLite, info)).clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testkit::{chain_info, ScriptedTransport};

    const OWNER: &str = "0x8d35b3c9bE3f1Cf3DE5B5E37fB4a7B8b3A0c61d2";
    const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

    fn rpc(transport: Arc<ScriptedTransport>) -> ZksyncLiteRpc {
        ZksyncLiteRpc {
            chain: Arc::new(chain_info("ZksyncLite", Backend::ZksyncLite, transport.clone())),
            transport,
            tokens: Arc::new(TokenCache::new()),
        }
    }

    fn ok(result: Value) -> Value {
        json!({ "status": "success", "result": result, "error": null })
    }

    #[tokio::test]
    async fn token_balance_is_looked_up_by_symbol() {
        let transport = Arc::new(ScriptedTransport::new("http://zksynclite.test"));
        transport.on_get(&format!("/tokens/{USDC}"), |_| {
            ok(json!({ "id": 2, "address": USDC, "symbol": "USDC", "decimals": 6 }))
        });
        transport.on_get(&format!("/accounts/{OWNER}/finalized"), |_| {
            ok(json!({ "balances": { "ETH": "7", "USDC": "2500000" } }))
        });
        let rpc = rpc(transport.clone());

        assert_eq!(rpc.get_balance(OWNER, USDC).await.unwrap(), U256::from(2_500_000u64));
        assert_eq!(rpc.get_balance(OWNER, "0x0").await.unwrap(), U256::from(7u64));
        assert_eq!(transport.calls(&format!("/tokens/{USDC}")), 1);
    }

    #[tokio::test]
    async fn token_without_decimals_is_not_found() {
        let transport = Arc::new(ScriptedTransport::new("http://zksynclite.test"));
        transport.on_get(&format!("/tokens/{USDC}"), |_| {
            ok(json!({ "id": 2, "address": USDC, "symbol": "", "decimals": 0 }))
        });
        let rpc = rpc(transport);
        let err = rpc.get_token_info(USDC).await.unwrap_err();
        assert!(matches!(err, Error::Rpc(RpcError::TokenNotFound { .. })));
        assert!(rpc.tokens.is_empty());
    }

    #[tokio::test]
    async fn native_sentinel_answers_without_network() {
        let transport = Arc::new(ScriptedTransport::new("http://zksynclite.test"));
        let info = rpc(transport.clone()).get_token_info("0x0").await.unwrap();
        assert_eq!(info.chain_name, "ZksyncLite");
        assert_eq!(transport.requests(), 0);
    }

    #[tokio::test]
    async fn unknown_account_has_zero_balance() {
        let transport = Arc::new(ScriptedTransport::new("http://zksynclite.test"));
        transport.on_get(&format!("/accounts/{OWNER}/finalized"), |_| ok(Value::Null));
        let balance = rpc(transport).get_balance(OWNER, "0x0").await.unwrap();
        assert_eq!(balance, U256::ZERO);
    }

    #[tokio::test]
    async fn queued_transaction_is_pending() {
        let transport = Arc::new(ScriptedTransport::new("http://zksynclite.test"));
        transport.on_get("/transactions/0xabc", |_| ok(json!({ "status": "queued" })));
        let err = rpc(transport.clone()).is_tx_success("0xabc").await.unwrap_err();
        assert!(matches!(err, Error::Rpc(RpcError::TxPending { .. })));

        transport.on_get("/transactions/0xabc", |_| {
            ok(json!({ "status": "finalized", "blockNumber": 42 }))
        });
        let outcome = rpc(transport).is_tx_success("0xabc").await.unwrap();
        assert_eq!(outcome, TxOutcome { success: true, height: 42 });
    }

    #[tokio::test]
    async fn api_errors_are_remote_errors() {
        let transport = Arc::new(ScriptedTransport::new("http://zksynclite.test"));
        transport.on_get("/blocks/lastFinalized", |_| {
            json!({ "status": "error", "result": null, "error": { "code": 300, "message": "internal" } })
        });
        let err = rpc(transport).get_latest_block_number().await.unwrap_err();
        assert!(matches!(err, Error::Rpc(RpcError::Remote { code: 300, .. })));
    }

    #[test]
    fn checksum_follows_evm_rules() {
        let rpc = rpc(Arc::new(ScriptedTransport::new("http://zksynclite.test")));
        let once = rpc.checksum_address(&OWNER.to_lowercase());
        assert_eq!(rpc.checksum_address(&once), once);
        assert!(rpc.is_address_valid(OWNER));
    }
}
