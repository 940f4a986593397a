//! Token reference data loaded from `t_token_info`.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::U256;
use tracing::info;

use super::chain::ChainRegistry;
use super::snapshot::{query_failed, Reload, ReloadReport, RowFailures, Snapshot};
use crate::domain::amount::parse_u256;
use crate::domain::TokenInfo;
use crate::error::{ConfigError, Result};
use crate::port::{Alerter, ReferenceStore, TokenRecord};

const TABLE: &str = "t_token_info";

type ByChain = HashMap<String, HashMap<String, Arc<TokenInfo>>>;

#[derive(Default, Clone)]
struct TokenIndex {
    by_address: ByChain,
    by_name: ByChain,
    all: Vec<Arc<TokenInfo>>,
}

impl TokenIndex {
    fn insert(&mut self, token: TokenInfo) {
        let chain = token.chain_name.to_lowercase();
        let token = Arc::new(token);
        self.by_address
            .entry(chain.clone())
            .or_default()
            .insert(token.token_address.to_lowercase(), Arc::clone(&token));
        self.by_name
            .entry(chain)
            .or_default()
            .insert(token.token_name.to_lowercase(), Arc::clone(&token));
        self.all.push(token);
    }

    fn has_name(&self, chain: &str, name: &str) -> bool {
        self.by_name
            .get(&chain.to_lowercase())
            .is_some_and(|names| names.contains_key(&name.to_lowercase()))
    }
}

/// Tokens indexed by chain name and by address or symbol, all case-insensitive.
///
/// Each chain's gas token is added when the table has no row with its name.
pub struct TokenInfoManager {
    store: Arc<dyn ReferenceStore>,
    alerter: Arc<dyn Alerter>,
    chains: Arc<ChainRegistry>,
    index: Snapshot<TokenIndex>,
}

impl TokenInfoManager {
    pub fn new(
        store: Arc<dyn ReferenceStore>,
        alerter: Arc<dyn Alerter>,
        chains: Arc<ChainRegistry>,
    ) -> Self {
        Self {
            store,
            alerter,
            chains,
            index: Snapshot::default(),
        }
    }

    /// # Errors
    ///
    /// Returns the store error when the table query fails; the previous
    /// generation keeps serving.
    pub fn load_all_tokens(&self) -> Result<ReloadReport> {
        let records = self
            .store
            .load_tokens()
            .map_err(|e| query_failed(TABLE, self.alerter.as_ref(), e))?;

        let mut failures = RowFailures::new(TABLE, self.alerter.as_ref());
        let mut next = TokenIndex::default();
        for record in records {
            match token_from_record(record) {
                Ok(token) => next.insert(token),
                Err((key, e)) => failures.skip(key, e),
            }
        }
        let loaded = next.all.len();

        for chain in self.chains.get_all_chains() {
            if !next.has_name(&chain.name, &chain.gas_token.name) {
                next.insert(TokenInfo::native(&chain));
            }
        }

        let report = failures.report(loaded);
        let total = next.all.len();
        self.index.publish(next);
        info!(
            table = TABLE,
            loaded = report.loaded,
            native = total - loaded,
            skipped = report.skipped,
            "Tokens reloaded"
        );
        Ok(report)
    }

    #[must_use]
    pub fn get_by_chain_name_token_addr(
        &self,
        chain_name: &str,
        token_address: &str,
    ) -> Option<Arc<TokenInfo>> {
        let chain = chain_name.trim().to_lowercase();
        let address = token_address.trim().to_lowercase();
        self.index.read(|idx| {
            idx.by_address
                .get(&chain)
                .and_then(|tokens| tokens.get(&address))
                .cloned()
        })
    }

    #[must_use]
    pub fn get_by_chain_name_token_name(
        &self,
        chain_name: &str,
        token_name: &str,
    ) -> Option<Arc<TokenInfo>> {
        let chain = chain_name.trim().to_lowercase();
        let name = token_name.trim().to_lowercase();
        self.index.read(|idx| {
            idx.by_name
                .get(&chain)
                .and_then(|tokens| tokens.get(&name))
                .cloned()
        })
    }

    /// Addresses of every token known on `chain_name`, in no particular order.
    #[must_use]
    pub fn get_token_addresses(&self, chain_name: &str) -> Vec<String> {
        let chain = chain_name.trim().to_lowercase();
        self.index.read(|idx| {
            idx.by_address
                .get(&chain)
                .map(|tokens| tokens.values().map(|t| t.token_address.clone()).collect())
                .unwrap_or_default()
        })
    }

    #[must_use]
    pub fn get_all_tokens(&self) -> Vec<Arc<TokenInfo>> {
        self.index.read(|idx| idx.all.clone())
    }

    /// Add or replace a token in the live generation. It is lost on the next
    /// reload unless it is also written to the store.
    pub fn add_token_info(&self, token: TokenInfo) {
        self.index.update(|idx| idx.insert(token));
    }

    pub fn add_token(&self, chain_name: &str, token_name: &str, token_address: &str, decimals: i32) {
        self.add_token_info(TokenInfo::new(
            chain_name.trim(),
            token_address.trim(),
            token_name.trim(),
            decimals,
        ));
    }

    /// Point lookup straight against the store, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub fn get_from_db(&self, chain_name: &str, token_address: &str) -> Result<Option<TokenInfo>> {
        self.store
            .find_token(chain_name, token_address)?
            .map(|record| token_from_record(record).map_err(|(_, e)| e.into()))
            .transpose()
    }

    /// Persist a token unless a row for the same chain and address exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_to_db(&self, token: &TokenInfo) -> Result<bool> {
        self.store.insert_token_ignore(token)
    }
}

impl Reload for TokenInfoManager {
    fn name(&self) -> &'static str {
        "tokens"
    }

    fn reload(&self) -> Result<ReloadReport> {
        self.load_all_tokens()
    }
}

/// Decode a token row; shared with the swap token manager.
pub(crate) fn token_from_record(
    record: TokenRecord,
) -> std::result::Result<TokenInfo, (String, ConfigError)> {
    let chain_name = record.chain_name.trim().to_string();
    let token_address = record.token_address.trim().to_string();
    let key = format!("{chain_name}/{token_address}");
    if chain_name.is_empty() {
        return Err((key, ConfigError::MissingField { field: "chain_name" }));
    }
    if token_address.is_empty() {
        return Err((key, ConfigError::MissingField { field: "token_address" }));
    }

    let total_supply = match record.total_supply.trim() {
        "" => U256::ZERO,
        text => parse_u256(text.split('.').next().unwrap_or(text)).map_err(|e| {
            (
                key.clone(),
                ConfigError::InvalidValue {
                    field: "total_supply",
                    reason: e.to_string(),
                },
            )
        })?,
    };
    let icon = record.icon.trim();

    Ok(TokenInfo {
        chain_name,
        token_address,
        token_name: record.token_name.trim().to_string(),
        decimals: record.decimals,
        full_name: record.full_name.trim().to_string(),
        total_supply,
        icon: (!icon.is_empty()).then(|| icon.to_string()),
        has_freeze_authority: false,
    })
}
