//! Chain registry: every configured chain with its connected client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use super::snapshot::{query_failed, Reload, ReloadReport, RowFailures, Snapshot};
use crate::domain::{Backend, ChainInfo, GasToken};
use crate::error::{ConfigError, Result};
use crate::port::{
    Alert, Alerter, ChainClient, ChainRecord, HttpTransport, ReferenceStore, TransportFactory,
    TransportSpec,
};

const TABLE: &str = "t_chain_info";

/// Builds the client handle for a chain row.
///
/// Ton chains share one indexer client per network. The first Ton row of a
/// network creates it; a failed creation is not cached, so the next row or
/// the next reload tries again.
pub struct ClientConnector {
    factory: Arc<dyn TransportFactory>,
    default_timeout: Duration,
    ton_mainnet: OnceCell<Arc<dyn HttpTransport>>,
    ton_testnet: OnceCell<Arc<dyn HttpTransport>>,
}

impl ClientConnector {
    pub fn new(factory: Arc<dyn TransportFactory>, default_timeout: Duration) -> Self {
        Self {
            factory,
            default_timeout,
            ton_mainnet: OnceCell::new(),
            ton_testnet: OnceCell::new(),
        }
    }

    /// Timeout for a chain, falling back to the default when unset.
    #[must_use]
    pub fn timeout_for(&self, timeout_ms: i32) -> Duration {
        u64::try_from(timeout_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map_or(self.default_timeout, Duration::from_millis)
    }

    /// # Errors
    ///
    /// Returns an error when the row has no endpoint or the transport cannot
    /// be opened.
    pub fn connect(&self, chain: &ChainInfo) -> Result<ChainClient> {
        let client = match chain.backend {
            Backend::Evm | Backend::Starknet | Backend::Solana | Backend::Sui | Backend::Benfen => {
                ChainClient::JsonRpc(self.open(chain)?)
            }
            Backend::Fuel => ChainClient::GraphQl(self.open(chain)?),
            Backend::ZksyncLite => ChainClient::Rest(self.open(chain)?),
            Backend::Ton => {
                let cell = if chain.is_testnet {
                    &self.ton_testnet
                } else {
                    &self.ton_mainnet
                };
                ChainClient::Ton(Arc::clone(cell.get_or_try_init(|| self.open(chain))?))
            }
            Backend::Bitcoin | Backend::Cosmos | Backend::Unrecognized(_) => ChainClient::Detached,
        };
        Ok(client)
    }

    fn open(&self, chain: &ChainInfo) -> Result<Arc<dyn HttpTransport>> {
        if chain.rpc_end_point.is_empty() {
            return Err(ConfigError::MissingField {
                field: "rpc_end_point",
            }
            .into());
        }
        let spec = TransportSpec::new(&chain.rpc_end_point, self.timeout_for(chain.timeout));
        self.factory.open(&spec)
    }
}

/// One generation of chain indexes.
#[derive(Default)]
pub struct ChainIndex {
    by_id: HashMap<i64, Arc<ChainInfo>>,
    by_chain_id: HashMap<String, Arc<ChainInfo>>,
    by_name: HashMap<String, Arc<ChainInfo>>,
    by_netcode: HashMap<i32, Arc<ChainInfo>>,
    all: Vec<Arc<ChainInfo>>,
}

impl ChainIndex {
    fn insert(&mut self, chain: ChainInfo) {
        let chain = Arc::new(chain);
        self.by_id.insert(chain.id, Arc::clone(&chain));
        self.by_chain_id
            .insert(chain.chain_id.to_lowercase(), Arc::clone(&chain));
        self.by_name
            .insert(chain.name.to_lowercase(), Arc::clone(&chain));
        self.by_netcode
            .insert(chain.network_code, Arc::clone(&chain));
        self.all.push(chain);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.all.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Reference data for every configured chain.
pub struct ChainRegistry {
    store: Arc<dyn ReferenceStore>,
    alerter: Arc<dyn Alerter>,
    connector: ClientConnector,
    index: Snapshot<ChainIndex>,
}

impl ChainRegistry {
    pub fn new(
        store: Arc<dyn ReferenceStore>,
        alerter: Arc<dyn Alerter>,
        connector: ClientConnector,
    ) -> Self {
        Self {
            store,
            alerter,
            connector,
            index: Snapshot::default(),
        }
    }

    /// Load every chain row, connect clients and publish the new generation.
    ///
    /// # Errors
    ///
    /// Returns the store error when the table query fails; the previous
    /// generation keeps serving.
    pub fn load_all_chains(&self) -> Result<ReloadReport> {
        let records = self
            .store
            .load_chains()
            .map_err(|e| query_failed(TABLE, self.alerter.as_ref(), e))?;

        let mut failures = RowFailures::new(TABLE, self.alerter.as_ref());
        let mut next = ChainIndex::default();

        for record in records {
            let mut chain = match chain_from_record(record) {
                Ok(chain) => chain,
                Err((key, e)) => {
                    failures.skip(key, e);
                    continue;
                }
            };
            match self.connector.connect(&chain) {
                Ok(client) => chain.client = client,
                Err(e) => {
                    let error = e.to_string();
                    let alert = Alert::ClientFailed {
                        chain: chain.name.clone(),
                        error: error.clone(),
                    };
                    failures.skip_with(&chain.name, &error, alert);
                    continue;
                }
            }
            debug!(chain = %chain.name, client = ?chain.client, "Chain loaded");
            next.insert(chain);
        }

        let report = failures.report(next.len());
        self.index.publish(next);
        info!(
            table = TABLE,
            loaded = report.loaded,
            skipped = report.skipped,
            "Chains reloaded"
        );
        Ok(report)
    }

    #[must_use]
    pub fn get_chain_info_by_id(&self, id: i64) -> Option<Arc<ChainInfo>> {
        self.index.read(|idx| idx.by_id.get(&id).cloned())
    }

    #[must_use]
    pub fn get_chain_info_by_chain_id(&self, chain_id: &str) -> Option<Arc<ChainInfo>> {
        let key = chain_id.trim().to_lowercase();
        self.index.read(|idx| idx.by_chain_id.get(&key).cloned())
    }

    #[must_use]
    pub fn get_chain_info_by_i64_chain_id(&self, chain_id: i64) -> Option<Arc<ChainInfo>> {
        self.get_chain_info_by_chain_id(&chain_id.to_string())
    }

    #[must_use]
    pub fn get_chain_info_by_name(&self, name: &str) -> Option<Arc<ChainInfo>> {
        let key = name.trim().to_lowercase();
        self.index.read(|idx| idx.by_name.get(&key).cloned())
    }

    #[must_use]
    pub fn get_chain_info_by_netcode(&self, netcode: i32) -> Option<Arc<ChainInfo>> {
        self.index.read(|idx| idx.by_netcode.get(&netcode).cloned())
    }

    /// Every chain of the current generation, in load order.
    #[must_use]
    pub fn get_all_chains(&self) -> Vec<Arc<ChainInfo>> {
        self.index.read(|idx| idx.all.clone())
    }

    /// The whole current generation, for callers doing several lookups that
    /// must agree with each other.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ChainIndex> {
        self.index.load()
    }

    /// Internal row ids.
    #[must_use]
    pub fn ids(&self) -> Vec<i64> {
        self.index.read(|idx| idx.by_id.keys().copied().collect())
    }

    /// Numeric chain ids; non-numeric ids are left out.
    #[must_use]
    pub fn chain_ids(&self) -> Vec<i32> {
        self.index
            .read(|idx| idx.by_chain_id.keys().filter_map(|k| k.parse().ok()).collect())
    }
}

impl ChainIndex {
    #[must_use]
    pub fn by_id(&self, id: i64) -> Option<&Arc<ChainInfo>> {
        self.by_id.get(&id)
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Arc<ChainInfo>> {
        self.by_name.get(&name.trim().to_lowercase())
    }

    #[must_use]
    pub fn by_chain_id(&self, chain_id: &str) -> Option<&Arc<ChainInfo>> {
        self.by_chain_id.get(&chain_id.trim().to_lowercase())
    }

    #[must_use]
    pub fn by_netcode(&self, netcode: i32) -> Option<&Arc<ChainInfo>> {
        self.by_netcode.get(&netcode)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ChainInfo>> {
        self.all.iter()
    }
}

impl Reload for ChainRegistry {
    fn name(&self) -> &'static str {
        "chains"
    }

    fn reload(&self) -> Result<ReloadReport> {
        self.load_all_chains()
    }
}

fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

fn trimmed_opt(value: Option<String>) -> Option<String> {
    value.map(trimmed)
}

/// Decode a row into a chain without a client. The error carries the row
/// key for the alert.
fn chain_from_record(record: ChainRecord) -> std::result::Result<ChainInfo, (String, ConfigError)> {
    let name = trimmed(record.name);
    if name.is_empty() {
        return Err((
            format!("id={}", record.id),
            ConfigError::MissingField { field: "name" },
        ));
    }
    let chain_id = trimmed(record.chain_id);
    if chain_id.is_empty() {
        return Err((name, ConfigError::MissingField { field: "chainid" }));
    }

    Ok(ChainInfo {
        id: record.id,
        chain_id,
        real_chain_id: trimmed(record.real_chain_id),
        name,
        alias_name: trimmed(record.alias_name),
        backend: Backend::from_code(record.backend),
        eip1559: record.eip1559 != 0,
        network_code: record.network_code,
        icon: trimmed(record.icon),
        block_interval: record.block_interval,
        timeout: record.timeout,
        rpc_end_point: trimmed(record.rpc_end_point),
        explorer_url: trimmed(record.explorer_url),
        official_rpc: trimmed(record.official_rpc),
        mev_rpc: trimmed_opt(record.mev_rpc).unwrap_or_default(),
        disabled: record.disabled != 0,
        is_testnet: record.is_testnet != 0,
        order_weight: record.order_weight,
        gas_token: GasToken {
            name: trimmed(record.gas_token_name),
            address: trimmed(record.gas_token_address),
            decimals: record.gas_token_decimal,
            icon: trimmed(record.gas_token_icon),
        },
        transfer_contract_address: trimmed_opt(record.transfer_contract_address),
        deposit_contract_address: trimmed_opt(record.deposit_contract_address),
        layer1: trimmed_opt(record.layer1),
        client: ChainClient::Detached,
    })
}
