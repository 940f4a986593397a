//! Bitcoin balances through the Unisat indexer.
//!
//! There is no long-lived client: the indexer server and bearer token for
//! each chain come from remote config (`base_config` / `unisat_api_config`)
//! and are resolved on every call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Network};
use serde::Deserialize;
use serde_json::Value;

use super::RpcContext;
use crate::domain::address::{is_hex_zero, is_native_address};
use crate::domain::amount::parse_u256;
use crate::domain::{Backend, ChainInfo, TokenInfo};
use crate::error::{ConfigError, Error, Result, RpcError};
use crate::port::{ChainRpc, HttpTransport, RemoteConfig, TransportFactory, TransportSpec, TxOutcome};

pub(crate) const CONFIG_NAMESPACE: &str = "base_config";
pub(crate) const CONFIG_KEY: &str = "unisat_api_config";

const BRC20_PREFIX: &str = "brc20_";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// One entry of the `unisat_api_config` map.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UnisatServer {
    server: String,
    #[serde(default)]
    bearer: String,
    /// Seconds.
    #[serde(default)]
    timeout: u64,
}

pub struct BitcoinRpc {
    chain: Arc<ChainInfo>,
    remote: Arc<dyn RemoteConfig>,
    transports: Arc<dyn TransportFactory>,
}

impl BitcoinRpc {
    /// # Errors
    ///
    /// Never fails; the indexer is resolved per call.
    pub fn new(ctx: &RpcContext) -> Result<Self> {
        Ok(Self {
            chain: Arc::clone(&ctx.chain),
            remote: Arc::clone(&ctx.remote),
            transports: Arc::clone(&ctx.transports),
        })
    }

    fn network(&self) -> Network {
        if self.chain.is_testnet {
            Network::Testnet
        } else {
            Network::Bitcoin
        }
    }

    fn parse_address(&self, address: &str) -> Option<Address> {
        address
            .trim()
            .parse::<Address<NetworkUnchecked>>()
            .ok()?
            .require_network(self.network())
            .ok()
    }

    fn indexer(&self) -> Result<Arc<dyn HttpTransport>> {
        let raw = self
            .remote
            .get(CONFIG_NAMESPACE, CONFIG_KEY)
            .ok_or(ConfigError::MissingField { field: CONFIG_KEY })?;
        let mut servers: HashMap<String, UnisatServer> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::InvalidValue {
                field: CONFIG_KEY,
                reason: e.to_string(),
            })?;
        let server = servers.remove(&self.chain.name).ok_or_else(|| Error::NotFound {
            kind: "unisat server",
            key: self.chain.name.clone(),
        })?;
        let timeout = if server.timeout == 0 { DEFAULT_TIMEOUT_SECS } else { server.timeout };
        let mut spec = TransportSpec::new(server.server, Duration::from_secs(timeout));
        if !server.bearer.is_empty() {
            spec = spec.with_bearer(server.bearer);
        }
        self.transports.open(&spec)
    }

    /// `data` of a Unisat response; a non-zero `code` is an API error.
    async fn get(&self, path: &str) -> Result<Value> {
        let mut response = self.indexer()?.get_json(path, &[]).await?;
        let code = response["code"].as_i64().unwrap_or(-1);
        if code != 0 {
            return Err(RpcError::Remote {
                code,
                message: response["msg"].as_str().unwrap_or("unknown error").to_string(),
            }
            .into());
        }
        Ok(response.get_mut("data").map(Value::take).unwrap_or(Value::Null))
    }
}

#[async_trait]
impl ChainRpc for BitcoinRpc {
    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    fn backend(&self) -> Backend {
        Backend::Bitcoin
    }

    fn is_address_valid(&self, address: &str) -> bool {
        self.parse_address(address).is_some()
    }

    fn checksum_address(&self, address: &str) -> String {
        self.parse_address(address)
            .map_or_else(|| address.to_string(), |a| a.to_string())
    }

    async fn get_latest_block_number(&self) -> Result<i64> {
        Err(Error::unsupported(Backend::Bitcoin, "get_latest_block_number"))
    }

    async fn is_tx_success(&self, _hash: &str) -> Result<TxOutcome> {
        Err(Error::unsupported(Backend::Bitcoin, "is_tx_success"))
    }

    async fn get_allowance(&self, _owner: &str, _token: &str, _spender: &str) -> Result<U256> {
        Err(Error::unsupported(Backend::Bitcoin, "get_allowance"))
    }

    /// Satoshis for the zero address, BRC-20 overall balance for
    /// `brc20_<tick>`. A BRC-20 balance that is not a whole number reads as 0.
    async fn get_balance(&self, owner: &str, token: &str) -> Result<U256> {
        let owner = owner.trim();
        let token = token.trim();
        if is_hex_zero(token) {
            let path = format!("/v1/indexer/address/{owner}/balance");
            let data = self.get(&path).await?;
            return data["satoshi"]
                .as_u64()
                .map(U256::from)
                .ok_or_else(|| Error::invalid_response(&path, "missing satoshi"));
        }
        match token.strip_prefix(BRC20_PREFIX).filter(|tick| !tick.is_empty()) {
            Some(tick) => {
                let path = format!("/v1/indexer/address/{owner}/brc20/{tick}/info");
                let data = self.get(&path).await?;
                Ok(data["overallBalance"]
                    .as_str()
                    .and_then(|b| parse_u256(b).ok())
                    .unwrap_or_default())
            }
            None => Err(Error::unsupported(Backend::Bitcoin, "get_balance")),
        }
    }

    /// Only the gas token is known without an indexer.
    async fn get_token_info(&self, token: &str) -> Result<TokenInfo> {
        if is_native_address(token) {
            return Ok(TokenInfo::native(&self.chain));
        }
        Err(Error::unsupported(Backend::Bitcoin, "get_token_info"))
    }
}
