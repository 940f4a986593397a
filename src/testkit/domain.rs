//! Builders for rows and chains used across tests.

use std::sync::Arc;

use crate::domain::{Backend, ChainInfo, GasToken};
use crate::port::{ChainClient, ChainRecord, DtcRecord, HttpTransport, TokenRecord};

/// A chain row with an endpoint of `http://{name}.test`.
pub fn chain_record(id: i64, chain_id: &str, name: &str, backend: i32, netcode: i32) -> ChainRecord {
    ChainRecord {
        id,
        chain_id: chain_id.to_string(),
        name: name.to_string(),
        backend,
        network_code: netcode,
        rpc_end_point: format!("http://{}.test", name.trim().to_lowercase()),
        ..ChainRecord::default()
    }
}

pub fn token_record(chain: &str, address: &str, name: &str, decimals: i32) -> TokenRecord {
    TokenRecord {
        token_name: name.to_string(),
        chain_name: chain.to_string(),
        token_address: address.to_string(),
        decimals,
        full_name: name.to_string(),
        ..TokenRecord::default()
    }
}

/// USDT Ethereum to Arbitrum: up to 100 costs 1, 1000 costs 5, 10000 costs
/// 20, anything above costs 50.
pub fn usdt_route() -> DtcRecord {
    DtcRecord {
        token_name: "USDT".into(),
        from_chain: "Ethereum".into(),
        to_chain: "Arbitrum".into(),
        dtc: ["1".into(), "5".into(), "20".into(), "50".into()],
        amount: ["100".into(), "1000".into(), "10000".into(), "100000".into()],
    }
}

/// A loaded chain bound to `transport`, wrapped the way the connector would.
pub fn chain_info(name: &str, backend: Backend, transport: Arc<dyn HttpTransport>) -> ChainInfo {
    let client = match backend {
        Backend::Fuel => ChainClient::GraphQl(transport),
        Backend::ZksyncLite => ChainClient::Rest(transport),
        Backend::Ton => ChainClient::Ton(transport),
        Backend::Bitcoin | Backend::Cosmos | Backend::Unrecognized(_) => ChainClient::Detached,
        _ => ChainClient::JsonRpc(transport),
    };
    ChainInfo {
        id: 1,
        chain_id: "1".into(),
        real_chain_id: "1".into(),
        name: name.to_string(),
        alias_name: name.to_string(),
        backend,
        eip1559: false,
        network_code: 1,
        icon: String::new(),
        block_interval: 0,
        timeout: 0,
        rpc_end_point: format!("http://{}.test", name.to_lowercase()),
        explorer_url: String::new(),
        official_rpc: String::new(),
        mev_rpc: String::new(),
        disabled: false,
        is_testnet: false,
        order_weight: 0,
        gas_token: GasToken::default(),
        transfer_contract_address: None,
        deposit_contract_address: None,
        layer1: None,
        client,
    }
}
