//! SQL for seeding reference tables.

pub const ETHEREUM_USDT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";
pub const ARBITRUM_USDT: &str = "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9";

/// An enabled chain with an `http://{name}.test` endpoint.
pub fn chain(id: i64, chain_id: &str, name: &str, backend: i32, gas_token: &str) -> String {
    format!(
        "INSERT INTO t_chain_info (id, chainid, real_chainid, name, alias_name, backend, network_code, \
         rpc_end_point, gas_token_name, gas_token_address, gas_token_decimal) \
         VALUES ({id}, '{chain_id}', '{chain_id}', '{name}', '{name}', {backend}, {id}, \
         'http://{endpoint}.test', '{gas_token}', '0x0', 18)",
        endpoint = name.to_lowercase(),
    )
}

pub fn disable_chain(name: &str) -> String {
    format!("UPDATE t_chain_info SET disabled = 1 WHERE name = '{name}'")
}

pub fn order_weight(name: &str, weight: i32) -> String {
    format!("UPDATE t_chain_info SET order_weight = {weight} WHERE name = '{name}'")
}

pub fn token(chain: &str, address: &str, name: &str, decimals: i32) -> String {
    format!(
        "INSERT INTO t_token_info (token_name, chain_name, token_address, decimals, full_name) \
         VALUES ('{name}', '{chain}', '{address}', {decimals}, '{name}')"
    )
}

pub fn swap_token(chain: &str, address: &str, name: &str, decimals: i32) -> String {
    format!(
        "INSERT INTO t_swap_token_info (token_name, chain_name, token_address, decimals) \
         VALUES ('{name}', '{chain}', '{address}', {decimals})"
    )
}

/// USDT Ethereum to Arbitrum: up to 100 costs 1, 1000 costs 5, 10000 costs
/// 20, anything above costs 50.
pub fn usdt_route() -> String {
    "INSERT INTO t_dynamic_dtc (token_name, from_chain, to_chain, \
     dtc_lv1, dtc_lv2, dtc_lv3, dtc_lv4, amount_lv1, amount_lv2, amount_lv3, amount_lv4) \
     VALUES ('USDT', 'Ethereum', 'Arbitrum', '1', '5', '20', '50', '100', '1000', '10000', '100000')"
        .to_string()
}

pub fn account(chain_id: i64, address: &str) -> String {
    format!("INSERT INTO t_account (chain_id, address) VALUES ({chain_id}, '{address}')")
}

pub fn maker_group(id: i64, name: &str, env: &str) -> String {
    format!("INSERT INTO t_maker_address_groups (id, group_name, env) VALUES ({id}, '{name}', '{env}')")
}

pub fn maker_address(group_id: i64, backend: i32, address: &str) -> String {
    format!(
        "INSERT INTO t_maker_addresses (group_id, backend, address) VALUES ({group_id}, {backend}, '{address}')"
    )
}

pub fn security_address(group_id: i64, backend: i32, address: &str) -> String {
    format!(
        "INSERT INTO t_security_addresses (group_id, backend, address) VALUES ({group_id}, {backend}, '{address}')"
    )
}

/// Ethereum and Arbitrum with USDT on both and the USDT fee route.
pub fn bridge_fixture() -> Vec<String> {
    vec![
        chain(1, "1", "Ethereum", 1, "ETH"),
        chain(2, "42161", "Arbitrum", 1, "ETH"),
        token("Ethereum", ETHEREUM_USDT, "USDT", 6),
        token("Arbitrum", ARBITRUM_USDT, "USDT", 6),
        usdt_route(),
    ]
}
