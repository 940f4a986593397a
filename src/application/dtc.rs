//! Cross-chain fee tables loaded from `t_dynamic_dtc`.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::U256;
use tracing::info;

use super::snapshot::{query_failed, Reload, ReloadReport, RowFailures, Snapshot};
use crate::domain::dtc::ui_units;
use crate::domain::{Dtc, SelectedFee, Tier};
use crate::error::{ConfigError, Error, Result};
use crate::port::{Alerter, DtcRecord, ReferenceStore};

const TABLE: &str = "t_dynamic_dtc";

type RouteKey = (String, String, String);

#[derive(Default)]
struct DtcIndex {
    by_route: HashMap<RouteKey, Arc<Dtc>>,
    all: Vec<Arc<Dtc>>,
}

fn route_key(token: &str, from_chain: &str, to_chain: &str) -> RouteKey {
    (
        token.trim().to_lowercase(),
        from_chain.trim().to_lowercase(),
        to_chain.trim().to_lowercase(),
    )
}

pub struct DtcManager {
    store: Arc<dyn ReferenceStore>,
    alerter: Arc<dyn Alerter>,
    index: Snapshot<DtcIndex>,
}

impl DtcManager {
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
    pub fn load_all_dtcs(&self) -> Result<ReloadReport> {
        let records = self
            .store
            .load_dtcs()
            .map_err(|e| query_failed(TABLE, self.alerter.as_ref(), e))?;

        let mut failures = RowFailures::new(TABLE, self.alerter.as_ref());
        let mut next = DtcIndex::default();
        for record in records {
            let key = route_key(&record.token_name, &record.from_chain, &record.to_chain);
            match dtc_from_record(record) {
                Ok(dtc) => {
                    let dtc = Arc::new(dtc);
                    // A repeated route replaces the earlier row in both views.
                    if next.by_route.insert(key, Arc::clone(&dtc)).is_some() {
                        let slot = next.all.iter_mut().find(|old| {
                            route_key(&old.token_name, &old.from_chain, &old.to_chain)
                                == route_key(&dtc.token_name, &dtc.from_chain, &dtc.to_chain)
                        });
                        if let Some(slot) = slot {
                            *slot = dtc;
                        }
                    } else {
                        next.all.push(dtc);
                    }
                }
                Err(e) => failures.skip(format!("{}/{}/{}", key.0, key.1, key.2), e),
            }
        }

        let report = failures.report(next.all.len());
        self.index.publish(next);
        info!(table = TABLE, loaded = report.loaded, skipped = report.skipped, "Fee tables reloaded");
        Ok(report)
    }

    #[must_use]
    pub fn get_dtc(&self, token: &str, from_chain: &str, to_chain: &str) -> Option<Arc<Dtc>> {
        let key = route_key(token, from_chain, to_chain);
        self.index.read(|idx| idx.by_route.get(&key).cloned())
    }

    #[must_use]
    pub fn get_all_dtcs(&self) -> Vec<Arc<Dtc>> {
        self.index.read(|idx| idx.all.clone())
    }

    fn require(&self, token: &str, from_chain: &str, to_chain: &str) -> Result<Arc<Dtc>> {
        self.get_dtc(token, from_chain, to_chain).ok_or_else(|| Error::NotFound {
            kind: "fee table",
            key: format!("{token}/{from_chain}/{to_chain}"),
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the route has no fee table.
    pub fn get_dtc_to_include(
        &self,
        token: &str,
        from_chain: &str,
        to_chain: &str,
        value: f64,
    ) -> Result<SelectedFee> {
        Ok(self.require(token, from_chain, to_chain)?.dtc_to_include(value))
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the route has no fee table.
    pub fn get_included_dtc(
        &self,
        token: &str,
        from_chain: &str,
        to_chain: &str,
        value: f64,
    ) -> Result<SelectedFee> {
        Ok(self.require(token, from_chain, to_chain)?.included_dtc(value))
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the route has no fee table.
    pub fn get_dtc_to_include_big_int(
        &self,
        token: &str,
        from_chain: &str,
        to_chain: &str,
        value: U256,
        decimals: i32,
    ) -> Result<U256> {
        Ok(self
            .require(token, from_chain, to_chain)?
            .dtc_to_include_units(value, decimals))
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the route has no fee table.
    pub fn get_included_dtc_big_int(
        &self,
        token: &str,
        from_chain: &str,
        to_chain: &str,
        value: U256,
        decimals: i32,
    ) -> Result<U256> {
        Ok(self
            .require(token, from_chain, to_chain)?
            .included_dtc_units(value, decimals))
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the route has no fee table or no tier
    /// fee covers itself.
    pub fn min_value_including_fee(
        &self,
        token: &str,
        from_chain: &str,
        to_chain: &str,
        decimals: i32,
    ) -> Result<String> {
        let dtc = self.require(token, from_chain, to_chain)?;
        dtc.min_value_including_fee(decimals)
            .map(str::to_string)
            .ok_or_else(|| Error::NotFound {
                kind: "minimum fee",
                key: format!("{token}/{from_chain}/{to_chain}"),
            })
    }

    /// Scale a decimal string to base units; anything unparsable is zero.
    #[must_use]
    pub fn from_ui_string(amount: &str, decimals: i32) -> U256 {
        ui_units(amount, decimals)
    }
}

impl Reload for DtcManager {
    fn name(&self) -> &'static str {
        "dtcs"
    }

    fn reload(&self) -> Result<ReloadReport> {
        self.load_all_dtcs()
    }
}

fn parse_field(field: &'static str, text: &str) -> std::result::Result<f64, ConfigError> {
    text.trim()
        .parse::<f64>()
        .map_err(|e| ConfigError::InvalidValue {
            field,
            reason: format!("{text:?}: {e}"),
        })
}

const AMOUNT_FIELDS: [&str; 4] = ["amount_lv1", "amount_lv2", "amount_lv3", "amount_lv4"];
const FEE_FIELDS: [&str; 4] = ["dtc_lv1", "dtc_lv2", "dtc_lv3", "dtc_lv4"];

fn dtc_from_record(record: DtcRecord) -> std::result::Result<Dtc, ConfigError> {
    let mut tiers = Vec::with_capacity(4);
    for (i, (amount_str, fee_str)) in record.amount.iter().zip(&record.dtc).enumerate() {
        tiers.push(Tier {
            amount: parse_field(AMOUNT_FIELDS[i], amount_str)?,
            amount_str: amount_str.trim().to_string(),
            fee: parse_field(FEE_FIELDS[i], fee_str)?,
            fee_str: fee_str.trim().to_string(),
        });
    }
    let tiers: [Tier; 4] = tiers
        .try_into()
        .map_err(|_| ConfigError::Other("fee table must have four tiers".into()))?;

    Ok(Dtc {
        token_name: record.token_name.trim().to_string(),
        from_chain: record.from_chain.trim().to_string(),
        to_chain: record.to_chain.trim().to_string(),
        tiers,
    })
}
