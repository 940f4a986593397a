//! Maker address groups and their addresses.
//!
//! Built from three tables. Unlike the other managers a failure in any of the
//! three queries aborts the reload, since a group without its addresses would
//! misroute funds.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::snapshot::{query_failed, Reload, ReloadReport, RowFailures, Snapshot};
use crate::domain::{Backend, MakerAddress, MakerAddressGroup};
use crate::error::{ConfigError, Result};
use crate::port::{Alerter, MakerAddressRecord, ReferenceStore};

const GROUPS: &str = "t_maker_address_groups";
const ADDRESSES: &str = "t_maker_addresses";
const SECURITY: &str = "t_security_addresses";

#[derive(Default)]
struct MakerIndex {
    by_env: HashMap<String, Vec<Arc<MakerAddressGroup>>>,
    by_group_id: HashMap<i64, Arc<MakerAddressGroup>>,
    group_by_address: HashMap<(Backend, String), i64>,
}

pub struct MakerAddressManager {
    store: Arc<dyn ReferenceStore>,
    alerter: Arc<dyn Alerter>,
    index: Snapshot<MakerIndex>,
}

impl MakerAddressManager {
    pub fn new(store: Arc<dyn ReferenceStore>, alerter: Arc<dyn Alerter>) -> Self {
        Self {
            store,
            alerter,
            index: Snapshot::default(),
        }
    }

    /// # Errors
    ///
    /// Returns the first failing query; nothing is published in that case.
    pub fn load_all_maker_addresses(&self) -> Result<ReloadReport> {
        let alerter = self.alerter.as_ref();
        let groups = self
            .store
            .load_maker_groups()
            .map_err(|e| query_failed(GROUPS, alerter, e))?;
        let addresses = self
            .store
            .load_maker_addresses()
            .map_err(|e| query_failed(ADDRESSES, alerter, e))?;
        let security = self
            .store
            .load_security_addresses()
            .map_err(|e| query_failed(SECURITY, alerter, e))?;

        let mut building: HashMap<i64, MakerAddressGroup> = groups
            .into_iter()
            .map(|g| {
                let group = MakerAddressGroup::new(g.id, g.group_name.trim(), g.env.trim());
                (g.id, group)
            })
            .collect();

        let mut group_by_address = HashMap::new();
        let mut failures = RowFailures::new(ADDRESSES, alerter);
        for record in addresses {
            if let Some(address) = attach(&mut building, record, &mut failures) {
                group_by_address.insert(
                    (address.backend, address.backend.address_key(&address.address)),
                    address.group_id,
                );
                if let Some(group) = building.get_mut(&address.group_id) {
                    group.addresses.push(address);
                }
            }
        }
        let mut skipped = failures.report(0).skipped;

        let mut failures = RowFailures::new(SECURITY, alerter);
        for record in security {
            if let Some(address) = attach(&mut building, record, &mut failures) {
                if let Some(group) = building.get_mut(&address.group_id) {
                    group.security_addresses.push(address);
                }
            }
        }
        skipped += failures.report(0).skipped;

        let mut next = MakerIndex {
            group_by_address,
            ..MakerIndex::default()
        };
        let mut ids: Vec<i64> = building.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            if let Some(group) = building.remove(&id) {
                let group = Arc::new(group);
                next.by_env
                    .entry(group.env.to_lowercase())
                    .or_default()
                    .push(Arc::clone(&group));
                next.by_group_id.insert(id, group);
            }
        }

        let report = ReloadReport {
            loaded: next.by_group_id.len(),
            skipped,
        };
        self.index.publish(next);
        info!(table = GROUPS, loaded = report.loaded, skipped = report.skipped, "Maker groups reloaded");
        Ok(report)
    }

    /// Groups deployed in `env`, ordered by id.
    #[must_use]
    pub fn get_maker_addresses_by_env(&self, env: &str) -> Vec<Arc<MakerAddressGroup>> {
        let key = env.trim().to_lowercase();
        self.index
            .read(|idx| idx.by_env.get(&key).cloned().unwrap_or_default())
    }

    #[must_use]
    pub fn get_maker_address_by_group_id(&self, group_id: i64) -> Option<Arc<MakerAddressGroup>> {
        self.index.read(|idx| idx.by_group_id.get(&group_id).cloned())
    }

    /// Group owning an ordinary maker address. Security addresses are not indexed.
    #[must_use]
    pub fn get_group_id_by_backend_and_address(&self, backend: Backend, address: &str) -> Option<i64> {
        let key = (backend, backend.address_key(address));
        self.index.read(|idx| idx.group_by_address.get(&key).copied())
    }
}

fn attach(
    groups: &mut HashMap<i64, MakerAddressGroup>,
    record: MakerAddressRecord,
    failures: &mut RowFailures<'_>,
) -> Option<MakerAddress> {
    let address = record.address.trim();
    if address.is_empty() {
        failures.skip(record.id.to_string(), ConfigError::MissingField { field: "address" });
        return None;
    }
    if !groups.contains_key(&record.group_id) {
        failures.skip(
            record.id.to_string(),
            ConfigError::InvalidValue {
                field: "group_id",
                reason: format!("no group {}", record.group_id),
            },
        );
        return None;
    }
    Some(MakerAddress {
        id: record.id,
        group_id: record.group_id,
        backend: Backend::from_code(record.backend),
        address: address.to_string(),
    })
}

impl Reload for MakerAddressManager {
    fn name(&self) -> &'static str {
        "maker_addresses"
    }

    fn reload(&self) -> Result<ReloadReport> {
        self.load_all_maker_addresses()
    }
}
