use alloy_primitives::U256;
use serde::Serialize;

use super::ChainInfo;

/// Token metadata, keyed by `(chain_name, token_address)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub chain_name: String,
    pub token_address: String,
    /// Ticker symbol.
    pub token_name: String,
    pub decimals: i32,
    pub full_name: String,
    pub total_supply: U256,
    pub icon: Option<String>,
    /// Set for Solana mints that carry a freeze authority.
    pub has_freeze_authority: bool,
}

impl TokenInfo {
    pub fn new(
        chain_name: impl Into<String>,
        token_address: impl Into<String>,
        token_name: impl Into<String>,
        decimals: i32,
    ) -> Self {
        Self {
            chain_name: chain_name.into(),
            token_address: token_address.into(),
            token_name: token_name.into(),
            decimals,
            full_name: String::new(),
            total_supply: U256::ZERO,
            icon: None,
            has_freeze_authority: false,
        }
    }

    /// Record describing the chain's own gas token.
    #[must_use]
    pub fn native(chain: &ChainInfo) -> Self {
        let gas = &chain.gas_token;
        Self {
            chain_name: chain.name.clone(),
            token_address: gas.address.clone(),
            token_name: gas.name.clone(),
            decimals: gas.decimals,
            full_name: gas.name.clone(),
            total_supply: U256::ZERO,
            icon: (!gas.icon.is_empty()).then(|| gas.icon.clone()),
            has_freeze_authority: false,
        }
    }
}
