//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapter::outbound::alert::LogAlerter;
#[cfg(feature = "telegram")]
use crate::adapter::outbound::alert::telegram::{TelegramAlerter, TelegramConfig};
use crate::adapter::outbound::rpc::RpcFactory;
use crate::adapter::outbound::sqlite::{create_pool, run_migrations, SqliteStore};
use crate::adapter::outbound::transport::ReqwestTransportFactory;
use crate::application::{
    AccountManager, ChainRegistry, ClientConnector, DtcManager, MakerAddressManager, Reload,
    Scheduler, SwapTokenInfoManager, TokenCache, TokenInfoManager,
};
use crate::error::{Error, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::{
    Alerter, AlerterRegistry, ChainRpc, ReferenceStore, RemoteConfig, TransportFactory,
};

/// Open the SQLite reference database and apply pending migrations.
///
/// # Errors
///
/// Returns an error if the pool cannot be created or a migration fails.
pub fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
    let pool = create_pool(&config.database.url, config.database.max_connections)?;
    run_migrations(&pool)?;
    Ok(Arc::new(SqliteStore::new(pool)))
}

/// Build the alerter registry from configuration.
///
/// Alerts always go to the log. Telegram is added when enabled and its
/// credentials are in the environment; it must be built inside a runtime.
#[cfg(feature = "telegram")]
pub fn build_alerter(config: &Config) -> AlerterRegistry {
    let mut registry = AlerterRegistry::new();
    registry.register(Box::new(LogAlerter));

    if config.alert.telegram {
        if let Some(tg_config) = TelegramConfig::from_env() {
            registry.register(Box::new(TelegramAlerter::new(tg_config)));
            info!("Telegram alerter enabled");
        } else {
            warn!("Telegram enabled but TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set");
        }
    }

    registry
}

/// Build the alerter registry from configuration (non-telegram variant).
#[cfg(not(feature = "telegram"))]
pub fn build_alerter(config: &Config) -> AlerterRegistry {
    let mut registry = AlerterRegistry::new();
    registry.register(Box::new(LogAlerter));
    if config.alert.telegram {
        warn!("Telegram alerts requested but the telegram feature is disabled");
    }
    registry
}

/// Every reference-data manager plus the RPC factory, sharing one store
/// and one alerter.
pub struct Hub {
    pub chains: Arc<ChainRegistry>,
    pub tokens: Arc<TokenInfoManager>,
    pub accounts: Arc<AccountManager>,
    pub makers: Arc<MakerAddressManager>,
    pub dtcs: Arc<DtcManager>,
    pub swap_tokens: Arc<SwapTokenInfoManager>,
    pub rpc: RpcFactory,
    alerter: Arc<dyn Alerter>,
}

impl Hub {
    /// Wire managers over explicit adapters. Nothing is loaded yet.
    pub fn new(
        config: &Config,
        store: Arc<dyn ReferenceStore>,
        alerter: Arc<dyn Alerter>,
        transports: Arc<dyn TransportFactory>,
        remote: Arc<dyn RemoteConfig>,
    ) -> Self {
        let connector = ClientConnector::new(Arc::clone(&transports), config.rpc.default_timeout());
        let chains = Arc::new(ChainRegistry::new(
            Arc::clone(&store),
            Arc::clone(&alerter),
            connector,
        ));
        Self {
            tokens: Arc::new(TokenInfoManager::new(
                Arc::clone(&store),
                Arc::clone(&alerter),
                Arc::clone(&chains),
            )),
            accounts: Arc::new(AccountManager::new(Arc::clone(&store), Arc::clone(&alerter))),
            makers: Arc::new(MakerAddressManager::new(Arc::clone(&store), Arc::clone(&alerter))),
            dtcs: Arc::new(DtcManager::new(Arc::clone(&store), Arc::clone(&alerter))),
            swap_tokens: Arc::new(SwapTokenInfoManager::new(
                Arc::clone(&store),
                config.swap_token.policy(),
            )),
            rpc: RpcFactory::new(Arc::new(TokenCache::new()), remote, transports),
            chains,
            alerter,
        }
    }

    /// Production wiring: SQLite store, reqwest transports, config-backed
    /// remote config and the configured alerters.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = open_store(config)?;
        let alerter: Arc<dyn Alerter> = Arc::new(build_alerter(config));
        Ok(Self::new(
            config,
            store,
            alerter,
            Arc::new(ReqwestTransportFactory),
            Arc::new(config.remote_config()),
        ))
    }

    /// First load of every manager. Chains go first since tokens read gas
    /// tokens from them.
    ///
    /// # Errors
    ///
    /// Returns the first query failure; a manager whose query failed has an
    /// empty generation.
    pub fn load_all(&self) -> Result<()> {
        for target in self.reloaders().into_iter().map(|(target, _)| target) {
            let report = target.reload()?;
            info!(
                task = target.name(),
                loaded = report.loaded,
                skipped = report.skipped,
                "Initial load finished"
            );
        }
        Ok(())
    }

    fn reloaders(&self) -> [(Arc<dyn Reload>, fn(&Config) -> u64); 5] {
        [
            (self.chains.clone(), |c: &Config| c.reload.chains_secs),
            (self.tokens.clone(), |c: &Config| c.reload.tokens_secs),
            (self.accounts.clone(), |c: &Config| c.reload.accounts_secs),
            (self.makers.clone(), |c: &Config| c.reload.makers_secs),
            (self.dtcs.clone(), |c: &Config| c.reload.dtcs_secs),
        ]
    }

    /// Spawn the periodic reload of every manager and the daily swap-token
    /// sweep. Tasks stop when `shutdown` flips to `true`.
    pub fn spawn_reloads(
        &self,
        config: &Config,
        shutdown: watch::Receiver<bool>,
    ) -> Vec<JoinHandle<()>> {
        let scheduler = Scheduler::new(Arc::clone(&self.alerter), shutdown);
        let mut handles: Vec<JoinHandle<()>> = self
            .reloaders()
            .into_iter()
            .map(|(target, secs)| {
                scheduler.spawn_periodic(target, Duration::from_secs(secs(config)))
            })
            .collect();

        let swap_tokens = Arc::clone(&self.swap_tokens);
        handles.push(scheduler.spawn_daily("swap_token_evict", config.swap_token.evict_at, move || {
            let evicted = swap_tokens.evict_idle();
            info!(evicted, "Idle swap tokens evicted");
        }));
        handles
    }

    /// Adapter for a loaded chain, looked up by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown chain and the factory error
    /// when the backend has no adapter.
    pub fn rpc_for(&self, chain_name: &str) -> Result<Arc<dyn ChainRpc>> {
        let chain = self
            .chains
            .get_chain_info_by_name(chain_name)
            .ok_or_else(|| Error::NotFound {
                kind: "chain",
                key: chain_name.to_string(),
            })?;
        self.rpc.get_rpc(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::config::StaticRemoteConfig;
    use crate::error::RpcError;
    use crate::port::NullAlerter;
    use crate::testkit::{chain_record, MemoryStore, ScriptedTransportFactory};

    fn hub(store: MemoryStore) -> Hub {
        Hub::new(
            &Config::default(),
            Arc::new(store),
            Arc::new(NullAlerter),
            Arc::new(ScriptedTransportFactory::new()),
            Arc::new(StaticRemoteConfig::default()),
        )
    }

    #[test]
    fn load_all_fills_every_manager() {
        let store = MemoryStore::new();
        let mut eth = chain_record(1, "1", "Ethereum", 1, 1);
        eth.gas_token_name = "ETH".into();
        eth.gas_token_address = "0x0000000000000000000000000000000000000000".into();
        eth.gas_token_decimal = 18;
        store.set_chains(vec![eth]);
        let hub = hub(store);

        hub.load_all().unwrap();
        assert!(hub.chains.get_chain_info_by_name("ethereum").is_some());
        assert!(hub.tokens.get_by_chain_name_token_name("Ethereum", "ETH").is_some());
    }

    #[test]
    fn load_all_stops_at_first_query_failure() {
        let store = MemoryStore::new();
        store.fail_queries(true);
        let err = hub(store).load_all().unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn rpc_for_unknown_chain_is_not_found() {
        let hub = hub(MemoryStore::new());
        hub.load_all().unwrap();
        let err = hub.rpc_for("Nowhere").err().unwrap();
        assert!(matches!(err, Error::NotFound { kind: "chain", .. }));
    }

    #[test]
    fn rpc_for_cosmos_is_unsupported() {
        let store = MemoryStore::new();
        store.set_chains(vec![chain_record(9, "cosmoshub-4", "Cosmos", 7, 9)]);
        let hub = hub(store);
        hub.load_all().unwrap();
        let err = hub.rpc_for("Cosmos").err().unwrap();
        assert!(matches!(err, Error::Rpc(RpcError::UnsupportedBackend { .. })));
    }

    #[test]
    fn alerter_always_logs() {
        assert_eq!(build_alerter(&Config::default()).len(), 1);
    }
}
