//! Handlers for the one-shot `token` and `balance` queries.

use serde_json::json;

use super::command::{BalanceArgs, TokenArgs};
use super::output;
use crate::domain::address::is_native_address;
use crate::domain::amount::to_ui_string;
use crate::domain::TokenInfo;
use crate::error::Result;
use crate::infrastructure::bootstrap::Hub;
use crate::infrastructure::config::settings::Config;

fn loaded_hub(config: &Config) -> Result<Hub> {
    let hub = Hub::from_config(config)?;
    hub.chains.load_all_chains()?;
    hub.tokens.load_all_tokens()?;
    Ok(hub)
}

/// Execute the token command.
///
/// # Errors
///
/// Returns an error when the chain is unknown or the on-chain lookup fails.
pub async fn token(config: &Config, args: &TokenArgs) -> Result<()> {
    let hub = loaded_hub(config)?;

    let cached = if args.onchain {
        None
    } else {
        hub.tokens
            .get_by_chain_name_token_addr(&args.chain, &args.address)
            .map(|t| (*t).clone())
    };
    let (info, source) = match cached {
        Some(info) => (info, "reference table"),
        None => {
            let rpc = hub.rpc_for(&args.chain)?;
            (rpc.get_token_info(&args.address).await?, "chain")
        }
    };
    print_token(&info, source);
    Ok(())
}

fn print_token(info: &TokenInfo, source: &str) {
    if output::is_json() {
        output::json_output(json!({
            "command": "token",
            "source": source,
            "chain": info.chain_name,
            "address": info.token_address,
            "symbol": info.token_name,
            "name": info.full_name,
            "decimals": info.decimals,
            "total_supply": info.total_supply.to_string(),
            "icon": info.icon,
        }));
        return;
    }
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Chain", &info.chain_name);
    output::field("Address", &info.token_address);
    output::field("Symbol", output::highlight(&info.token_name));
    output::field("Name", &info.full_name);
    output::field("Decimals", info.decimals);
    output::field("Total supply", to_ui_string(info.total_supply, info.decimals));
    if info.has_freeze_authority {
        output::warning("Mint has a freeze authority");
    }
    output::field("Source", source);
}

/// Execute the balance command.
///
/// # Errors
///
/// Returns an error when the chain is unknown or the balance query fails.
pub async fn balance(config: &Config, args: &BalanceArgs) -> Result<()> {
    let hub = loaded_hub(config)?;
    let rpc = hub.rpc_for(&args.chain)?;
    let owner = rpc.checksum_address(&args.owner);
    let raw = rpc.get_balance(&owner, &args.token).await?;

    let decimals = if is_native_address(&args.token) {
        Some(rpc.chain().gas_token.decimals)
    } else {
        hub.tokens
            .get_by_chain_name_token_addr(&args.chain, &args.token)
            .map(|t| t.decimals)
    };

    if output::is_json() {
        output::json_output(json!({
            "command": "balance",
            "chain": rpc.chain().name,
            "owner": owner,
            "token": args.token,
            "raw": raw.to_string(),
            "amount": decimals.map(|d| to_ui_string(raw, d)),
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Chain", &rpc.chain().name);
    output::field("Owner", &owner);
    output::field("Token", &args.token);
    output::field("Raw", raw);
    match decimals {
        Some(d) => output::field("Amount", output::highlight(to_ui_string(raw, d))),
        None => output::hint("token not in the reference table; showing base units only"),
    }
    Ok(())
}
