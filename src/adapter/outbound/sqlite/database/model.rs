//! Database row types for Diesel ORM.
//!
//! Rows convert into the port records field for field; nothing is trimmed
//! or parsed here.

use diesel::prelude::*;

use super::schema::{
    t_account, t_chain_info, t_dynamic_dtc, t_maker_address_groups, t_swap_token_info,
    t_token_info,
};
use crate::domain::TokenInfo;
use crate::port::outbound::store::{
    AccountRecord, ChainRecord, DtcRecord, MakerAddressRecord, MakerGroupRecord, TokenRecord,
};

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = t_chain_info)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChainRow {
    pub id: i64,
    pub chainid: String,
    pub real_chainid: String,
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
    pub mev_rpc_url: Option<String>,
}

impl From<ChainRow> for ChainRecord {
    fn from(row: ChainRow) -> Self {
        Self {
            id: row.id,
            chain_id: row.chainid,
            real_chain_id: row.real_chainid,
            name: row.name,
            alias_name: row.alias_name,
            backend: row.backend,
            eip1559: row.eip1559,
            network_code: row.network_code,
            icon: row.icon,
            block_interval: row.block_interval,
            timeout: row.timeout,
            rpc_end_point: row.rpc_end_point,
            explorer_url: row.explorer_url,
            official_rpc: row.official_rpc,
            mev_rpc: row.mev_rpc_url,
            disabled: row.disabled,
            is_testnet: row.is_testnet,
            order_weight: row.order_weight,
            gas_token_name: row.gas_token_name,
            gas_token_address: row.gas_token_address,
            gas_token_decimal: row.gas_token_decimal,
            gas_token_icon: row.gas_token_icon,
            transfer_contract_address: row.transfer_contract_address,
            deposit_contract_address: row.deposit_contract_address,
            layer1: row.layer1,
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = t_token_info)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TokenRow {
    pub token_name: String,
    pub chain_name: String,
    pub token_address: String,
    pub decimals: i32,
    pub full_name: String,
    pub total_supply: String,
    pub icon: String,
}

impl From<TokenRow> for TokenRecord {
    fn from(row: TokenRow) -> Self {
        Self {
            token_name: row.token_name,
            chain_name: row.chain_name,
            token_address: row.token_address,
            decimals: row.decimals,
            full_name: row.full_name,
            total_supply: row.total_supply,
            icon: row.icon,
        }
    }
}

/// Insertable row for `t_token_info`; the id is assigned by SQLite.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = t_token_info)]
pub struct NewTokenRow {
    pub token_name: String,
    pub chain_name: String,
    pub token_address: String,
    pub decimals: i32,
    pub full_name: String,
    pub total_supply: String,
    pub icon: String,
}

impl From<&TokenInfo> for NewTokenRow {
    fn from(token: &TokenInfo) -> Self {
        Self {
            token_name: token.token_name.clone(),
            chain_name: token.chain_name.clone(),
            token_address: token.token_address.clone(),
            decimals: token.decimals,
            full_name: token.full_name.clone(),
            total_supply: token.total_supply.to_string(),
            icon: token.icon.clone().unwrap_or_default(),
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = t_swap_token_info)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SwapTokenRow {
    pub token_name: String,
    pub chain_name: String,
    pub token_address: String,
    pub decimals: i32,
    pub icon: String,
}

impl From<SwapTokenRow> for TokenRecord {
    fn from(row: SwapTokenRow) -> Self {
        Self {
            token_name: row.token_name,
            chain_name: row.chain_name,
            token_address: row.token_address,
            decimals: row.decimals,
            icon: row.icon,
            ..Self::default()
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = t_account)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountRow {
    pub id: i64,
    pub chain_id: i64,
    pub address: String,
}

impl From<AccountRow> for AccountRecord {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            chain_id: row.chain_id,
            address: row.address,
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = t_maker_address_groups)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MakerGroupRow {
    pub id: i64,
    pub group_name: String,
    pub env: String,
}

impl From<MakerGroupRow> for MakerGroupRecord {
    fn from(row: MakerGroupRow) -> Self {
        Self {
            id: row.id,
            group_name: row.group_name,
            env: row.env,
        }
    }
}

/// `t_maker_addresses` and `t_security_addresses` share one layout.
#[derive(Queryable, Debug, Clone)]
pub struct MakerAddressRow {
    pub id: i64,
    pub group_id: i64,
    pub backend: i32,
    pub address: String,
}

impl From<MakerAddressRow> for MakerAddressRecord {
    fn from(row: MakerAddressRow) -> Self {
        Self {
            id: row.id,
            group_id: row.group_id,
            backend: row.backend,
            address: row.address,
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = t_dynamic_dtc)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DtcRow {
    pub token_name: String,
    pub from_chain: String,
    pub to_chain: String,
    pub dtc_lv1: String,
    pub dtc_lv2: String,
    pub dtc_lv3: String,
    pub dtc_lv4: String,
    pub amount_lv1: String,
    pub amount_lv2: String,
    pub amount_lv3: String,
    pub amount_lv4: String,
}

impl From<DtcRow> for DtcRecord {
    fn from(row: DtcRow) -> Self {
        Self {
            token_name: row.token_name,
            from_chain: row.from_chain,
            to_chain: row.to_chain,
            dtc: [row.dtc_lv1, row.dtc_lv2, row.dtc_lv3, row.dtc_lv4],
            amount: [row.amount_lv1, row.amount_lv2, row.amount_lv3, row.amount_lv4],
        }
    }
}
