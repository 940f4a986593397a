//! Benfen: balances only, through `bfcx_getBalance`.

use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use serde_json::json;

use super::jsonrpc;
use super::RpcContext;
use crate::domain::address::is_native_address;
use crate::domain::amount::parse_u256;
use crate::domain::{Backend, ChainInfo, TokenInfo};
use crate::error::{Error, Result};
use crate::port::{ChainRpc, HttpTransport, TxOutcome};

const PREFIX: &str = "BFC";

pub struct BenfenRpc {
    chain: Arc<ChainInfo>,
    transport: Arc<dyn HttpTransport>,
}

impl BenfenRpc {
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
impl ChainRpc for BenfenRpc {
    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    fn backend(&self) -> Backend {
        Backend::Benfen
    }

    /// `BFC` followed by 68 hex digits: a 32-byte address and a 2-byte checksum.
    fn is_address_valid(&self, address: &str) -> bool {
        address
            .strip_prefix(PREFIX)
            .is_some_and(|rest| rest.len() == 68 && rest.bytes().all(|b| b.is_ascii_hexdigit()))
    }

    fn checksum_address(&self, address: &str) -> String {
        address.to_string()
    }

    async fn get_latest_block_number(&self) -> Result<i64> {
        Err(Error::unsupported(Backend::Benfen, "get_latest_block_number"))
    }

    async fn is_tx_success(&self, _hash: &str) -> Result<TxOutcome> {
        Err(Error::unsupported(Backend::Benfen, "is_tx_success"))
    }

    async fn get_allowance(&self, _owner: &str, _token: &str, _spender: &str) -> Result<U256> {
        Err(Error::unsupported(Backend::Benfen, "get_allowance"))
    }

    async fn get_balance(&self, owner: &str, token: &str) -> Result<U256> {
        let method = "bfcx_getBalance";
        let result = jsonrpc::call_value(
            self.transport.as_ref(),
            method,
            json!([owner.trim(), token.trim()]),
        )
        .await?;
        let total = result["totalBalance"]
            .as_str()
            .ok_or_else(|| Error::invalid_response(method, format!("result invalid {result}")))?;
        parse_u256(total).map_err(|e| Error::invalid_response(method, e.to_string()))
    }

    /// Only the gas token is known without an indexer.
    async fn get_token_info(&self, token: &str) -> Result<TokenInfo> {
        if is_native_address(token) {
            return Ok(TokenInfo::native(&self.chain));
        }
        Err(Error::unsupported(Backend::Benfen, "get_token_info"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testkit::{chain_info, ScriptedTransport};

    fn rpc(transport: Arc<ScriptedTransport>) -> BenfenRpc {
        BenfenRpc {
            chain: Arc::new(chain_info("Benfen", Backend::Benfen, transport.clone())),
            transport,
        }
    }

    #[test]
    fn address_format() {
        let rpc = rpc(Arc::new(ScriptedTransport::new("http://benfen.test")));
        let valid = format!("BFC{}", "ab".repeat(34));
        assert!(rpc.is_address_valid(&valid));
        assert!(!rpc.is_address_valid(&format!("0x{}", "ab".repeat(34))));
        assert!(!rpc.is_address_valid("BFC1234"));
        assert_eq!(rpc.checksum_address(&valid), valid);
    }

    #[tokio::test]
    async fn balance_passes_token_through() {
        let transport = Arc::new(ScriptedTransport::new("http://benfen.test"));
        transport.on_rpc_with("bfcx_getBalance", |params| {
            assert_eq!(params[1], "0x2::bfc::BFC");
            json!({ "totalBalance": "9000" })
        });
        let owner = format!("BFC{}", "00".repeat(34));
        let balance = rpc(transport).get_balance(&owner, "0x2::bfc::BFC").await.unwrap();
        assert_eq!(balance, U256::from(9000u64));
    }

    #[tokio::test]
    async fn other_operations_are_unsupported() {
        let rpc = rpc(Arc::new(ScriptedTransport::new("http://benfen.test")));
        assert_eq!(rpc.get_latest_block_number().await.unwrap_err().kind(), ErrorKind::Unsupported);
        assert_eq!(rpc.get_token_info("x").await.unwrap_err().kind(), ErrorKind::Unsupported);
    }
}
