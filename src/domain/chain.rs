//! Chain reference data.

use std::fmt;

use serde::Serialize;

use super::Backend;
use crate::port::outbound::transport::ChainClient;

/// Native coin descriptor of a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GasToken {
    pub name: String,
    pub address: String,
    pub decimals: i32,
    pub icon: String,
}

/// One configured chain together with its connected client.
///
/// Every string field is trimmed when the row is loaded.
#[derive(Clone)]
pub struct ChainInfo {
    pub id: i64,
    pub chain_id: String,
    pub real_chain_id: String,
    pub name: String,
    pub alias_name: String,
    pub backend: Backend,
    pub eip1559: bool,
    pub network_code: i32,
    pub icon: String,
    pub block_interval: i32,
    /// Request timeout in milliseconds; zero or negative means the configured default.
    pub timeout: i32,
    pub rpc_end_point: String,
    pub explorer_url: String,
    pub official_rpc: String,
    pub mev_rpc: String,
    pub disabled: bool,
    pub is_testnet: bool,
    pub order_weight: i32,
    pub gas_token: GasToken,
    pub transfer_contract_address: Option<String>,
    pub deposit_contract_address: Option<String>,
    pub layer1: Option<String>,
    pub client: ChainClient,
}

impl ChainInfo {
    /// Numeric chain id, or 0 when the id is not a number.
    #[must_use]
    pub fn chain_id_i64(&self) -> i64 {
        self.chain_id.parse().unwrap_or(0)
    }

    /// Numeric chain id, or 0 when it does not fit in 32 bits.
    #[must_use]
    pub fn chain_id_i32(&self) -> i32 {
        self.chain_id.parse().unwrap_or(0)
    }

    #[must_use]
    pub fn is_evm(&self) -> bool {
        self.backend == Backend::Evm
    }

    #[must_use]
    pub fn is_svm(&self) -> bool {
        self.backend == Backend::Solana
    }
}

impl fmt::Debug for ChainInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainInfo")
            .field("id", &self.id)
            .field("chain_id", &self.chain_id)
            .field("name", &self.name)
            .field("backend", &self.backend)
            .field("network_code", &self.network_code)
            .field("rpc_end_point", &self.rpc_end_point)
            .field("disabled", &self.disabled)
            .field("is_testnet", &self.is_testnet)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
