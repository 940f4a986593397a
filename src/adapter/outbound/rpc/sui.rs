//! Sui over `suix_*` / `sui_*` JSON-RPC.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use super::jsonrpc;
use super::RpcContext;
use crate::application::TokenCache;
use crate::domain::address::{is_hex_zero, is_native_address, is_prefixed_hex};
use crate::domain::amount::parse_u256;
use crate::domain::{Backend, ChainInfo, TokenInfo};
use crate::error::{Error, Result, RpcError};
use crate::port::{ChainRpc, HttpTransport, TxOutcome};

const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// Supply reported for every entry of the legacy table.
const LEGACY_TOTAL_SUPPLY: u64 = 1_000_000_000;

#[derive(Debug, Deserialize)]
struct LegacyToken {
    name: String,
    symbol: String,
    #[serde(rename = "iconUrl", default)]
    icon_url: String,
    decimals: i32,
}

/// Coin types launched before their on-chain metadata was published.
static LEGACY_TOKENS: Lazy<HashMap<String, LegacyToken>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../data/sui_legacy_tokens.json")).unwrap_or_else(
        |e| {
            error!(error = %e, "Invalid legacy Sui token table");
            HashMap::new()
        },
    )
});

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinMetadata {
    decimals: i32,
    name: String,
    symbol: String,
    #[serde(default)]
    icon_url: Option<String>,
}

pub struct SuiRpc {
    chain: Arc<ChainInfo>,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<TokenCache>,
}

impl SuiRpc {
    /// # Errors
    ///
    /// Returns an error if the chain has no JSON-RPC client.
    pub fn new(ctx: &RpcContext) -> Result<Self> {
        Ok(Self {
            chain: Arc::clone(&ctx.chain),
            transport: ctx.require_transport()?,
            tokens: Arc::clone(&ctx.tokens),
        })
    }

    fn coin_type(token: &str) -> &str {
        let token = token.trim();
        if is_hex_zero(token) {
            SUI_COIN_TYPE
        } else {
            token
        }
    }

    fn legacy(&self, coin_type: &str) -> Option<TokenInfo> {
        LEGACY_TOKENS.get(coin_type).map(|t| TokenInfo {
            full_name: t.name.clone(),
            icon: (!t.icon_url.is_empty()).then(|| t.icon_url.clone()),
            total_supply: U256::from(LEGACY_TOTAL_SUPPLY),
            ..TokenInfo::new(&self.chain.name, coin_type, &t.symbol, t.decimals)
        })
    }

    async fn total_supply(&self, coin_type: &str) -> Result<U256> {
        let method = "suix_getTotalSupply";
        let supply = jsonrpc::call_value(self.transport.as_ref(), method, json!([coin_type])).await?;
        let value = supply["value"]
            .as_str()
            .ok_or_else(|| Error::invalid_response(method, "missing value"))?;
        parse_u256(value).map_err(|e| Error::invalid_response(method, e.to_string()))
    }
}

#[async_trait]
impl ChainRpc for SuiRpc {
    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    fn backend(&self) -> Backend {
        Backend::Sui
    }

    fn is_address_valid(&self, address: &str) -> bool {
        is_prefixed_hex(address, 64)
    }

    fn checksum_address(&self, address: &str) -> String {
        address.to_string()
    }

    async fn get_latest_block_number(&self) -> Result<i64> {
        let method = "sui_getLatestCheckpointSequenceNumber";
        let seq: String = jsonrpc::call(self.transport.as_ref(), method, json!([])).await?;
        seq.parse()
            .map_err(|_| Error::invalid_response(method, format!("checkpoint {seq:?}")))
    }

    async fn is_tx_success(&self, hash: &str) -> Result<TxOutcome> {
        let method = "sui_getTransactionBlock";
        let digest = hash.trim();
        let tx = jsonrpc::call_value(
            self.transport.as_ref(),
            method,
            json!([digest, { "showEffects": true }]),
        )
        .await?;
        let Some(checkpoint) = tx.get("checkpoint").and_then(|c| c.as_str()) else {
            return Err(RpcError::TxPending {
                hash: digest.to_string(),
            }
            .into());
        };
        let status = tx["effects"]["status"]["status"]
            .as_str()
            .ok_or_else(|| Error::invalid_response(method, "missing effects status"))?;
        Ok(TxOutcome {
            success: status == "success",
            height: checkpoint
                .parse()
                .map_err(|_| Error::invalid_response(method, format!("checkpoint {checkpoint:?}")))?,
        })
    }

    async fn get_allowance(&self, _owner: &str, _token: &str, _spender: &str) -> Result<U256> {
        Err(Error::unsupported(Backend::Sui, "get_allowance"))
    }

    async fn get_balance(&self, owner: &str, token: &str) -> Result<U256> {
        let method = "suix_getBalance";
        let balance = jsonrpc::call_value(
            self.transport.as_ref(),
            method,
            json!([owner.trim(), Self::coin_type(token)]),
        )
        .await?;
        let total = balance["totalBalance"]
            .as_str()
            .ok_or_else(|| Error::invalid_response(method, format!("sui balance invalid {balance}")))?;
        parse_u256(total).map_err(|e| Error::invalid_response(method, e.to_string()))
    }

    async fn get_token_info(&self, token: &str) -> Result<TokenInfo> {
        let token = token.trim();
        if is_native_address(token) {
            return Ok(TokenInfo::native(&self.chain));
        }
        if let Some(info) = self.legacy(token) {
            return Ok(info);
        }
        let coin_type = Self::coin_type(token);
        if let Some(hit) = self.tokens.get(Backend::Sui, &self.chain.name, coin_type) {
            return Ok((*hit).clone());
        }

        let meta: Option<CoinMetadata> = jsonrpc::call(
            self.transport.as_ref(),
            "suix_getCoinMetadata",
            json!([coin_type]),
        )
        .await?;
        let meta = meta
            .filter(|meta| !meta.symbol.trim().is_empty() && meta.decimals > 0)
            .ok_or_else(|| RpcError::TokenNotFound {
                chain: self.chain.name.clone(),
                address: coin_type.to_string(),
            })?;

        let total_supply = match self.total_supply(coin_type).await {
            Ok(supply) => supply,
            Err(e) => {
                debug!(coin_type, error = %e, "Total supply unavailable");
                U256::ZERO
            }
        };
        let info = TokenInfo {
            full_name: meta.name,
            icon: meta.icon_url.filter(|url| !url.is_empty()),
            total_supply,
            ..TokenInfo::new(&self.chain.name, coin_type, meta.symbol, meta.decimals)
        };
        Ok((*self.tokens.add(Backend::Sui, info)).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{chain_info, ScriptedTransport};

    const HOPPY: &str =
        "0x43e9045850072b10168c565ca7c57060a420015343023a49e87e6e47d3a74231::hoppy::HOPPY";
    const USDC: &str =
        "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC";

    fn rpc(transport: Arc<ScriptedTransport>) -> SuiRpc {
        SuiRpc {
            chain: Arc::new(chain_info("Sui", Backend::Sui, transport.clone())),
            transport,
            tokens: Arc::new(TokenCache::new()),
        }
    }

    #[tokio::test]
    async fn legacy_table_answers_without_network() {
        let transport = Arc::new(ScriptedTransport::new("http://sui.test"));
        let info = rpc(transport.clone()).get_token_info(HOPPY).await.unwrap();
        assert_eq!(info.token_name, "HOPPY");
        assert_eq!(info.full_name, "HOP BUNNY");
        assert_eq!(info.decimals, 6);
        assert_eq!(info.total_supply, U256::from(LEGACY_TOTAL_SUPPLY));
        assert_eq!(transport.requests(), 0);
    }

    #[tokio::test]
    async fn total_supply_failure_is_tolerated() {
        let transport = Arc::new(ScriptedTransport::new("http://sui.test"));
        transport.on_rpc(
            "suix_getCoinMetadata",
            json!({ "decimals": 6, "name": "USD Coin", "symbol": "USDC", "iconUrl": null }),
        );
        transport.on_rpc_error("suix_getTotalSupply", -32000, "unavailable");
        let rpc = rpc(transport.clone());

        let info = rpc.get_token_info(USDC).await.unwrap();
        assert_eq!(info.token_name, "USDC");
        assert_eq!(info.total_supply, U256::ZERO);
        assert_eq!(info.icon, None);

        rpc.get_token_info(USDC).await.unwrap();
        assert_eq!(transport.calls("suix_getCoinMetadata"), 1);
    }

    #[tokio::test]
    async fn missing_metadata_is_token_not_found() {
        let transport = Arc::new(ScriptedTransport::new("http://sui.test"));
        transport.on_rpc("suix_getCoinMetadata", serde_json::Value::Null);
        let err = rpc(transport).get_token_info(USDC).await.unwrap_err();
        assert!(matches!(err, Error::Rpc(RpcError::TokenNotFound { .. })));
    }

    #[tokio::test]
    async fn metadata_without_symbol_or_decimals_is_token_not_found() {
        let transport = Arc::new(ScriptedTransport::new("http://sui.test"));
        transport.on_rpc(
            "suix_getCoinMetadata",
            json!({ "decimals": 0, "name": "", "symbol": "", "iconUrl": null }),
        );
        let rpc = rpc(transport);
        let err = rpc.get_token_info(USDC).await.unwrap_err();
        assert!(matches!(err, Error::Rpc(RpcError::TokenNotFound { .. })));
        assert!(rpc.tokens.is_empty());
    }

    #[tokio::test]
    async fn native_sentinel_uses_gas_token() {
        let transport = Arc::new(ScriptedTransport::new("http://sui.test"));
        let mut chain = chain_info("Sui", Backend::Sui, transport.clone());
        chain.gas_token.name = "SUI".into();
        chain.gas_token.decimals = 9;
        let rpc = SuiRpc {
            chain: Arc::new(chain),
            transport: transport.clone(),
            tokens: Arc::new(TokenCache::new()),
        };
        let info = rpc.get_token_info("0x0").await.unwrap();
        assert_eq!(info.token_name, "SUI");
        assert_eq!(info.decimals, 9);
        assert_eq!(transport.requests(), 0);
    }

    #[tokio::test]
    async fn zero_address_means_sui() {
        let transport = Arc::new(ScriptedTransport::new("http://sui.test"));
        transport.on_rpc_with("suix_getBalance", |params| {
            assert_eq!(params[1], SUI_COIN_TYPE);
            json!({ "coinType": SUI_COIN_TYPE, "totalBalance": "1500000000" })
        });
        let owner = format!("0x{}", "1".repeat(64));
        let balance = rpc(transport).get_balance(&owner, "0x0").await.unwrap();
        assert_eq!(balance, U256::from(1_500_000_000u64));
    }

    #[tokio::test]
    async fn transaction_effects_decide_success() {
        let transport = Arc::new(ScriptedTransport::new("http://sui.test"));
        transport.on_rpc(
            "sui_getTransactionBlock",
            json!({ "digest": "abc", "checkpoint": "1234", "effects": { "status": { "status": "failure" } } }),
        );
        let outcome = rpc(transport).is_tx_success("abc").await.unwrap();
        assert_eq!(outcome, TxOutcome { success: false, height: 1234 });
    }

    #[test]
    fn addresses_are_case_sensitive_and_unchanged() {
        let rpc = rpc(Arc::new(ScriptedTransport::new("http://sui.test")));
        let owner = format!("0x{}", "aB".repeat(32));
        assert!(rpc.is_address_valid(&owner));
        assert_eq!(rpc.checksum_address(&owner), owner);
        assert!(!rpc.is_address_valid("0x2"));
    }
}
