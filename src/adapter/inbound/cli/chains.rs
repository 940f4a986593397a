//! Handler for the `chains` command.

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::ChainsArgs;
use super::output;
use crate::domain::ChainInfo;
use crate::error::Result;
use crate::infrastructure::bootstrap::Hub;
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct ChainRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Chain Id")]
    chain_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Backend")]
    backend: String,
    #[tabled(rename = "Netcode")]
    network_code: i32,
    #[tabled(rename = "Gas Token")]
    gas_token: String,
    #[tabled(rename = "Flags")]
    flags: String,
}

impl From<&ChainInfo> for ChainRow {
    fn from(chain: &ChainInfo) -> Self {
        let mut flags = Vec::new();
        if chain.is_testnet {
            flags.push("testnet");
        }
        if chain.disabled {
            flags.push("disabled");
        }
        if chain.eip1559 {
            flags.push("eip1559");
        }
        Self {
            id: chain.id,
            chain_id: chain.chain_id.clone(),
            name: chain.name.clone(),
            backend: chain.backend.to_string(),
            network_code: chain.network_code,
            gas_token: chain.gas_token.name.clone(),
            flags: flags.join(","),
        }
    }
}

/// Execute the chains command.
///
/// # Errors
///
/// Returns an error when the database cannot be opened or the chain table
/// query fails.
pub fn execute(config: &Config, args: &ChainsArgs) -> Result<()> {
    let hub = Hub::from_config(config)?;
    hub.chains.load_all_chains()?;

    let mut chains = hub.chains.get_all_chains();
    if !args.all {
        chains.retain(|c| !c.disabled);
    }
    chains.sort_by(|a, b| b.order_weight.cmp(&a.order_weight).then(a.id.cmp(&b.id)));

    if output::is_json() {
        let list: Vec<_> = chains
            .iter()
            .map(|c| {
                json!({
                    "id": c.id,
                    "chain_id": c.chain_id,
                    "name": c.name,
                    "backend": c.backend.to_string(),
                    "network_code": c.network_code,
                    "gas_token": c.gas_token.name,
                    "is_testnet": c.is_testnet,
                    "disabled": c.disabled,
                })
            })
            .collect();
        output::json_output(json!({ "command": "chains", "chains": list }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    if chains.is_empty() {
        output::warning("No chains configured");
        return Ok(());
    }
    let rows: Vec<ChainRow> = chains.iter().map(|c| ChainRow::from(c.as_ref())).collect();
    output::lines(&Table::new(rows).to_string());
    if !args.all {
        output::hint(&format!("run {} to include disabled chains", output::highlight("chainhub chains --all")));
    }
    Ok(())
}
