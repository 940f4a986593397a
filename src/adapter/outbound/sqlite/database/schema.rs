//! Diesel table definitions for the reference tables.

diesel::table! {
    t_chain_info (id) {
        id -> BigInt,
        chainid -> Text,
        real_chainid -> Text,
        name -> Text,
        alias_name -> Text,
        backend -> Integer,
        eip1559 -> Integer,
        network_code -> Integer,
        icon -> Text,
        block_interval -> Integer,
        timeout -> Integer,
        rpc_end_point -> Text,
        explorer_url -> Text,
        official_rpc -> Text,
        disabled -> Integer,
        is_testnet -> Integer,
        order_weight -> Integer,
        gas_token_name -> Text,
        gas_token_address -> Text,
        gas_token_decimal -> Integer,
        gas_token_icon -> Text,
        transfer_contract_address -> Nullable<Text>,
        deposit_contract_address -> Nullable<Text>,
        layer1 -> Nullable<Text>,
        mev_rpc_url -> Nullable<Text>,
    }
}

diesel::table! {
    t_token_info (id) {
        id -> BigInt,
        token_name -> Text,
        chain_name -> Text,
        token_address -> Text,
        decimals -> Integer,
        full_name -> Text,
        total_supply -> Text,
        icon -> Text,
    }
}

diesel::table! {
    t_swap_token_info (id) {
        id -> BigInt,
        token_name -> Text,
        chain_name -> Text,
        token_address -> Text,
        decimals -> Integer,
        icon -> Text,
    }
}

diesel::table! {
    t_account (id) {
        id -> BigInt,
        chain_id -> BigInt,
        address -> Text,
    }
}

diesel::table! {
    t_maker_address_groups (id) {
        id -> BigInt,
        group_name -> Text,
        env -> Text,
    }
}

diesel::table! {
    t_maker_addresses (id) {
        id -> BigInt,
        group_id -> BigInt,
        backend -> Integer,
        address -> Text,
    }
}

diesel::table! {
    t_security_addresses (id) {
        id -> BigInt,
        group_id -> BigInt,
        backend -> Integer,
        address -> Text,
    }
}

diesel::table! {
    t_dynamic_dtc (id) {
        id -> BigInt,
        token_name -> Text,
        from_chain -> Text,
        to_chain -> Text,
        dtc_lv1 -> Text,
        dtc_lv2 -> Text,
        dtc_lv3 -> Text,
        dtc_lv4 -> Text,
        amount_lv1 -> Text,
        amount_lv2 -> Text,
        amount_lv3 -> Text,
        amount_lv4 -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    t_chain_info,
    t_token_info,
    t_swap_token_info,
    t_account,
    t_maker_address_groups,
    t_maker_addresses,
    t_security_addresses,
    t_dynamic_dtc,
);
