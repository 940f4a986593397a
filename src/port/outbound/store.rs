//! Backing store port for reference tables.
//!
//! Records mirror the table columns as loaded. Trimming, parsing and
//! indexing happen in the managers, so one malformed row can be skipped
//! without failing the whole load.

use crate::domain::TokenInfo;
use crate::error::Result;

/// Row of `t_chain_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainRecord {
    pub id: i64,
    pub chain_id: String,
    pub real_chain_id: String,
    pub name: String,
    pub alias_name: String,
    pub backend: i32,
    pub eip1559: i32,
    pub network_code: i32,
    pub icon: String,
    pub block_interval: i32,
    pub timeout: i32,
    pub rpc_end_point: String,
    pub explorer_url: String,
    pub official_rpc: String,
    pub mev_rpc: Option<String>,
    pub disabled: i32,
    pub is_testnet: i32,
    pub order_weight: i32,
    pub gas_token_name: String,
    pub gas_token_address: String,
    pub gas_token_decimal: i32,
    pub gas_token_icon: String,
    pub transfer_contract_address: Option<String>,
    pub deposit_contract_address: Option<String>,
    pub layer1: Option<String>,
}

/// Row of `t_token_info` or `t_swap_token_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRecord {
    pub token_name: String,
    pub chain_name: String,
    pub token_address: String,
    pub decimals: i32,
    pub full_name: String,
    pub total_supply: String,
    pub icon: String,
}

/// Row of `t_account`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: i64,
    pub chain_id: i64,
    pub address: String,
}

/// Row of `t_maker_address_groups`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MakerGroupRecord {
    pub id: i64,
    pub group_name: String,
    pub env: String,
}

/// Row of `t_maker_addresses` or `t_security_addresses`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MakerAddressRecord {
    pub id: i64,
    pub group_id: i64,
    pub backend: i32,
    pub address: String,
}

/// Row of `t_dynamic_dtc`. Every amount and fee is a decimal string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DtcRecord {
    pub token_name: String,
    pub from_chain: String,
    pub to_chain: String,
    pub dtc: [String; 4],
    pub amount: [String; 4],
}

/// Read-mostly access to the reference tables.
///
/// Every `load_*` returns the full table; an `Err` means the query itself
/// failed and the caller keeps whatever it loaded last.
pub trait ReferenceStore: Send + Sync {
    fn load_chains(&self) -> Result<Vec<ChainRecord>>;

    fn load_tokens(&self) -> Result<Vec<TokenRecord>>;

    fn load_accounts(&self) -> Result<Vec<AccountRecord>>;

    fn load_maker_groups(&self) -> Result<Vec<MakerGroupRecord>>;

    fn load_maker_addresses(&self) -> Result<Vec<MakerAddressRecord>>;

    fn load_security_addresses(&self) -> Result<Vec<MakerAddressRecord>>;

    fn load_dtcs(&self) -> Result<Vec<DtcRecord>>;

    /// Point lookup in `t_token_info`.
    fn find_token(&self, chain_name: &str, token_address: &str) -> Result<Option<TokenRecord>>;

    /// Point lookup in `t_swap_token_info`.
    fn find_swap_token(&self, chain_name: &str, token_address: &str)
        -> Result<Option<TokenRecord>>;

    /// Insert into `t_token_info`, ignoring a row that already exists for the
    /// same `(chain_name, token_address)`. Returns whether a row was written.
    fn insert_token_ignore(&self, token: &TokenInfo) -> Result<bool>;
}
