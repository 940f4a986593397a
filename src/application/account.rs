//! Internal accounts loaded from `t_account`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::snapshot::{query_failed, Reload, ReloadReport, RowFailures, Snapshot};
use crate::domain::Account;
use crate::error::{ConfigError, Result};
use crate::port::{Alerter, ReferenceStore};

const TABLE: &str = "t_account";

#[derive(Default)]
struct AccountIndex {
    by_id: HashMap<i64, Arc<Account>>,
    /// address -> chain id -> account
    by_address: HashMap<String, HashMap<i64, Arc<Account>>>,
    /// chain id -> address -> account
    by_chain: HashMap<i64, HashMap<String, Arc<Account>>>,
}

pub struct AccountManager {
    store: Arc<dyn ReferenceStore>,
    alerter: Arc<dyn Alerter>,
    index: Snapshot<AccountIndex>,
}

impl AccountManager {
    pub fn new(store: Arc<dyn ReferenceStore>, alerter: Arc<dyn Alerter>) -> Self {
        Self {
            store,
            alerter,
            index: Snapshot::default(),
        }
    }

    /// # Errors
    ///
    /// Returns the store error when the table query fails.
    pub fn load_all_accounts(&self) -> Result<ReloadReport> {
        let records = self
            .store
            .load_accounts()
            .map_err(|e| query_failed(TABLE, self.alerter.as_ref(), e))?;

        let mut failures = RowFailures::new(TABLE, self.alerter.as_ref());
        let mut next = AccountIndex::default();
        for record in records {
            let address = record.address.trim();
            if address.is_empty() {
                failures.skip(
                    record.id.to_string(),
                    ConfigError::MissingField { field: "address" },
                );
                continue;
            }
            let key = address.to_lowercase();
            let account = Arc::new(Account {
                id: record.id,
                chain_info_id: record.chain_id,
                address: address.to_string(),
            });
            next.by_address
                .entry(key.clone())
                .or_default()
                .insert(record.chain_id, Arc::clone(&account));
            next.by_chain
                .entry(record.chain_id)
                .or_default()
                .insert(key, Arc::clone(&account));
            next.by_id.insert(record.id, account);
        }

        let report = failures.report(next.by_id.len());
        self.index.publish(next);
        info!(table = TABLE, loaded = report.loaded, skipped = report.skipped, "Accounts reloaded");
        Ok(report)
    }

    #[must_use]
    pub fn get_account_by_id(&self, id: i64) -> Option<Arc<Account>> {
        self.index.read(|idx| idx.by_id.get(&id).cloned())
    }

    /// Whether `address` is an internal account on any chain.
    #[must_use]
    pub fn has_address(&self, address: &str) -> bool {
        let key = address.trim().to_lowercase();
        self.index.read(|idx| idx.by_address.contains_key(&key))
    }

    /// Addresses registered on `chain_info_id`, as stored.
    #[must_use]
    pub fn get_addresses(&self, chain_info_id: i64) -> Vec<String> {
        self.index.read(|idx| {
            idx.by_chain
                .get(&chain_info_id)
                .map(|accounts| accounts.values().map(|a| a.address.clone()).collect())
                .unwrap_or_default()
        })
    }

    #[must_use]
    pub fn get_account_by_address_chain_id(
        &self,
        address: &str,
        chain_info_id: i64,
    ) -> Option<Arc<Account>> {
        let key = address.trim().to_lowercase();
        self.index.read(|idx| {
            idx.by_address
                .get(&key)
                .and_then(|chains| chains.get(&chain_info_id))
                .cloned()
        })
    }
}

impl Reload for AccountManager {
    fn name(&self) -> &'static str {
        "accounts"
    }

    fn reload(&self) -> Result<ReloadReport> {
        self.load_all_accounts()
    }
}
