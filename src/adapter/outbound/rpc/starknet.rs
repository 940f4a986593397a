//! Starknet over `starknet_*` JSON-RPC.

use std::sync::Arc;

use alloy_primitives::{keccak256, U256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::jsonrpc;
use super::RpcContext;
use crate::domain::address::{
    is_native_address, is_prefixed_hex, starknet_checksum, strip_hex_prefix,
};
use crate::domain::amount::parse_u256;
use crate::domain::{Backend, ChainInfo, TokenInfo};
use crate::error::{Error, Result, RpcError};
use crate::port::{ChainRpc, HttpTransport, TxOutcome};

pub struct StarknetRpc {
    chain: Arc<ChainInfo>,
    transport: Arc<dyn HttpTransport>,
}

#[derive(Deserialize)]
struct Receipt {
    finality_status: String,
    #[serde(default)]
    execution_status: Option<String>,
    #[serde(default)]
    block_number: Option<i64>,
}

/// Entry point selector: Starknet keccak of the function name.
fn selector(name: &str) -> String {
    let mut hash = keccak256(name.as_bytes()).0;
    hash[0] &= 0x03;
    format!("{:#x}", U256::from_be_bytes(hash))
}

/// Canonical lowercase felt, as the node expects it.
fn felt(text: &str) -> Result<String> {
    let text = text.trim();
    let digits = strip_hex_prefix(text);
    if digits.is_empty() || digits.len() > 64 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RpcError::InvalidAddress {
            address: text.to_string(),
        }
        .into());
    }
    let value = U256::from_str_radix(digits, 16).map_err(|_| RpcError::InvalidAddress {
        address: text.to_string(),
    })?;
    Ok(format!("{value:#x}"))
}

impl StarknetRpc {
    /// # Errors
    ///
    /// Returns an error if the chain has no JSON-RPC client.
    pub fn new(ctx: &RpcContext) -> Result<Self> {
        Ok(Self {
            chain: Arc::clone(&ctx.chain),
            transport: ctx.require_transport()?,
        })
    }
}

#[async_trait]
impl ChainRpc for StarknetRpc {
    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    fn backend(&self) -> Backend {
        Backend::Starknet
    }

    fn is_address_valid(&self, address: &str) -> bool {
        is_prefixed_hex(address.trim(), 64)
    }

    fn checksum_address(&self, address: &str) -> String {
        starknet_checksum(address).unwrap_or_else(|| address.to_string())
    }

    async fn get_latest_block_number(&self) -> Result<i64> {
        jsonrpc::call(self.transport.as_ref(), "starknet_blockNumber", json!([])).await
    }

    async fn is_tx_success(&self, hash: &str) -> Result<TxOutcome> {
        let method = "starknet_getTransactionReceipt";
        let hash = felt(hash)?;
        let receipt: Receipt = jsonrpc::call(self.transport.as_ref(), method, json!([hash])).await?;
        match receipt.finality_status.as_str() {
            "ACCEPTED_ON_L2" | "ACCEPTED_ON_L1" => Ok(TxOutcome {
                success: receipt.execution_status.as_deref() == Some("SUCCEEDED"),
                height: receipt
                    .block_number
                    .ok_or_else(|| Error::invalid_response(method, "missing block_number"))?,
            }),
            "RECEIVED" | "PRE_CONFIRMED" | "PENDING" => Err(RpcError::TxPending { hash }.into()),
            other => Err(Error::invalid_response(method, format!("unknown finality status {other}"))),
        }
    }

    async fn get_allowance(&self, _owner: &str, _token: &str, _spender: &str) -> Result<U256> {
        Err(Error::unsupported(Backend::Starknet, "get_allowance"))
    }

    /// ERC-20 style `balanceOf`; the result is a `u256` split into low and
    /// high 128-bit felts.
    async fn get_balance(&self, owner: &str, token: &str) -> Result<U256> {
        let method = "starknet_call";
        let call = json!({
            "contract_address": felt(token)?,
            "entry_point_selector": selector("balanceOf"),
            "calldata": [felt(owner)?],
        });
        let words: Vec<String> =
            jsonrpc::call(self.transport.as_ref(), method, json!([call, "latest"])).await?;
        let word = |i: usize| -> Result<U256> {
            words
                .get(i)
                .map(|w| parse_u256(w).map_err(|e| Error::invalid_response(method, e.to_string())))
                .transpose()
                .map(Option::unwrap_or_default)
        };
        let (low, high) = (word(0)?, word(1)?);
        Ok(low | (high << 128))
    }

    /// Only the gas token is known without an indexer.
    async fn get_token_info(&self, token: &str) -> Result<TokenInfo> {
        if is_native_address(token) {
            return Ok(TokenInfo::native(&self.chain));
        }
        Err(Error::unsupported(Backend::Starknet, "get_token_info"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::testkit::{chain_info, ScriptedTransport};

    const ETH: &str = "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7";
    const OWNER: &str = "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn rpc(transport: Arc<ScriptedTransport>) -> StarknetRpc {
        StarknetRpc {
            chain: Arc::new(chain_info("Starknet", Backend::Starknet, transport.clone())),
            transport,
        }
    }

    #[test]
    fn balance_of_selector_matches_known_value() {
        assert_eq!(
            selector("balanceOf"),
            "0x2e4263afad30923c891518314c3c95dbe830a16874e8abc5777a9a20b54c76e"
        );
    }

    #[tokio::test]
    async fn balance_combines_low_and_high_words() {
        let transport = Arc::new(ScriptedTransport::new("http://starknet.test"));
        transport.on_rpc_with("starknet_call", |params: &Value| {
            assert_eq!(params[1], "latest");
            json!(["0x5", "0x1"])
        });
        let balance = rpc(transport).get_balance(OWNER, ETH).await.unwrap();
        assert_eq!(balance, U256::from(5u64) + (U256::from(1u64) << 128));
    }

    #[tokio::test]
    async fn receipt_finality_maps_to_outcome() {
        let transport = Arc::new(ScriptedTransport::new("http://starknet.test"));
        let rpc = rpc(transport.clone());

        transport.on_rpc(
            "starknet_getTransactionReceipt",
            json!({ "finality_status": "ACCEPTED_ON_L2", "execution_status": "REVERTED", "block_number": 9 }),
        );
        assert_eq!(
            rpc.is_tx_success("0xabc").await.unwrap(),
            TxOutcome { success: false, height: 9 }
        );

        transport.on_rpc(
            "starknet_getTransactionReceipt",
            json!({ "finality_status": "RECEIVED" }),
        );
        let err = rpc.is_tx_success("0xabc").await.unwrap_err();
        assert!(matches!(err, Error::Rpc(RpcError::TxPending { .. })));
    }

    #[test]
    fn checksum_is_idempotent() {
        let rpc = rpc(Arc::new(ScriptedTransport::new("http://starknet.test")));
        let once = rpc.checksum_address(ETH);
        assert_eq!(rpc.checksum_address(&once), once);
        assert!(rpc.is_address_valid(ETH));
        assert!(!rpc.is_address_valid("0x49d3"));
    }
}
