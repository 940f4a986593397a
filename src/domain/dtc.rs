//! Four-level cross-chain transfer fee table.
//!
//! Each tier pairs an amount threshold with the fee charged up to it. The
//! table keeps the original decimal strings next to the parsed floats so fees
//! can be rescaled to a token's base units without float rounding.

use alloy_primitives::U256;
use serde::Serialize;

use super::amount::from_ui_string;

/// One `(threshold, fee)` level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tier {
    pub amount: f64,
    pub amount_str: String,
    pub fee: f64,
    pub fee_str: String,
}

impl Tier {
    fn fee_units(&self, decimals: i32) -> U256 {
        ui_units(&self.fee_str, decimals)
    }
}

/// A fee selected from the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedFee {
    pub fee: f64,
    pub fee_str: String,
}

impl From<&Tier> for SelectedFee {
    fn from(tier: &Tier) -> Self {
        Self {
            fee: tier.fee,
            fee_str: tier.fee_str.clone(),
        }
    }
}

/// Fee table for one `(token, from_chain, to_chain)` route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dtc {
    pub token_name: String,
    pub from_chain: String,
    pub to_chain: String,
    pub tiers: [Tier; 4],
}

impl Dtc {
    /// Fee for a `value` that does not yet include the fee.
    ///
    /// Walks from the top tier down with strict `>`, so a value equal to a
    /// threshold stays in the lower tier.
    #[must_use]
    pub fn dtc_to_include(&self, value: f64) -> SelectedFee {
        let [t1, t2, t3, t4] = &self.tiers;
        let tier = if value > t3.amount {
            t4
        } else if value > t2.amount {
            t3
        } else if value > t1.amount {
            t2
        } else {
            t1
        };
        tier.into()
    }

    /// Fee for a `value` that already includes the fee. Each threshold is
    /// shifted up by its own tier's fee.
    #[must_use]
    pub fn included_dtc(&self, value: f64) -> SelectedFee {
        let [t1, t2, t3, t4] = &self.tiers;
        let tier = if value > t3.amount + t3.fee {
            t4
        } else if value > t2.amount + t2.fee {
            t3
        } else if value > t1.amount + t1.fee {
            t2
        } else {
            t1
        };
        tier.into()
    }

    /// Base-unit fee for a base-unit `value` that does not include the fee.
    ///
    /// Walks upward and returns the first tier whose scaled threshold is
    /// `>= value`.
    #[must_use]
    pub fn dtc_to_include_units(&self, value: U256, decimals: i32) -> U256 {
        self.walk_units(value, decimals, |tier| ui_units(&tier.amount_str, decimals))
    }

    /// Base-unit fee for a base-unit `value` that already includes the fee.
    #[must_use]
    pub fn included_dtc_units(&self, value: U256, decimals: i32) -> U256 {
        self.walk_units(value, decimals, |tier| {
            ui_units(&tier.amount_str, decimals).saturating_add(tier.fee_units(decimals))
        })
    }

    /// Smallest tier fee that is enough to cover itself: the first fee string
    /// `f` for which the included-fee walk applied to `f` yields at most `f`.
    #[must_use]
    pub fn min_value_including_fee(&self, decimals: i32) -> Option<&str> {
        self.tiers.iter().find_map(|tier| {
            let value = tier.fee_units(decimals);
            (self.included_dtc_units(value, decimals) <= value).then_some(tier.fee_str.as_str())
        })
    }

    fn walk_units(&self, value: U256, decimals: i32, threshold: impl Fn(&Tier) -> U256) -> U256 {
        let [t1, t2, t3, t4] = &self.tiers;
        let tier = if value <= threshold(t1) {
            t1
        } else if value <= threshold(t2) {
            t2
        } else if value <= threshold(t3) {
            t3
        } else {
            t4
        };
        tier.fee_units(decimals)
    }
}

/// Scale a table string to base units. An empty or unparsable string
/// contributes zero.
#[must_use]
pub fn ui_units(text: &str, decimals: i32) -> U256 {
    if text.trim().is_empty() {
        return U256::ZERO;
    }
    from_ui_string(text, decimals).unwrap_or_else(|e| {
        tracing::warn!(value = text, error = %e, "fee table value is not a decimal, using zero");
        U256::ZERO
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(amount: f64, fee: f64) -> Tier {
        Tier {
            amount,
            amount_str: amount.to_string(),
            fee,
            fee_str: fee.to_string(),
        }
    }

    fn usdt_route() -> Dtc {
        Dtc {
            token_name: "usdt".into(),
            from_chain: "ethereum".into(),
            to_chain: "arbitrum".into(),
            tiers: [
                tier(100.0, 1.0),
                tier(1000.0, 5.0),
                tier(10000.0, 20.0),
                tier(100000.0, 50.0),
            ],
        }
    }

    #[test]
    fn to_include_picks_tier_above_threshold() {
        let dtc = usdt_route();
        assert_eq!(dtc.dtc_to_include(500.0).fee, 5.0);
        assert_eq!(dtc.dtc_to_include(5000.0).fee, 20.0);
        assert_eq!(dtc.dtc_to_include(20000.0).fee, 50.0);
        assert_eq!(dtc.dtc_to_include(1.0).fee, 1.0);
    }

    #[test]
    fn to_include_equal_threshold_stays_in_lower_tier() {
        let dtc = usdt_route();
        assert_eq!(dtc.dtc_to_include(100.0).fee, 1.0);
        assert_eq!(dtc.dtc_to_include(1000.0).fee, 5.0);
        assert_eq!(dtc.dtc_to_include(10000.0).fee, 20.0);
    }

    #[test]
    fn included_shifts_thresholds_by_fee() {
        let dtc = usdt_route();
        assert_eq!(dtc.included_dtc(101.0).fee, 1.0);
        assert_eq!(dtc.included_dtc(101.5).fee, 5.0);
        assert_eq!(dtc.included_dtc(1005.0).fee, 5.0);
        assert_eq!(dtc.included_dtc(1005.5).fee, 20.0);
    }

    #[test]
    fn zero_fees_make_both_walks_agree() {
        let dtc = Dtc {
            tiers: [
                tier(100.0, 0.0),
                tier(1000.0, 0.0),
                tier(10000.0, 0.0),
                tier(100000.0, 0.0),
            ],
            ..usdt_route()
        };
        for value in [0.0, 50.0, 100.0, 100.5, 1000.0, 9999.0, 10000.0, 1e9] {
            assert_eq!(dtc.dtc_to_include(value), dtc.included_dtc(value));
        }
    }

    #[test]
    fn unit_walk_is_inclusive_upward() {
        let dtc = usdt_route();
        let six = |v: u64| U256::from(v) * U256::from(1_000_000u64);
        assert_eq!(dtc.dtc_to_include_units(six(100), 6), six(1));
        assert_eq!(dtc.dtc_to_include_units(six(101), 6), six(5));
        assert_eq!(dtc.dtc_to_include_units(six(500), 6), six(5));
        assert_eq!(dtc.dtc_to_include_units(six(10_001), 6), six(50));
    }

    #[test]
    fn included_unit_walk_adds_fee_to_threshold() {
        let dtc = usdt_route();
        let six = |v: u64| U256::from(v) * U256::from(1_000_000u64);
        assert_eq!(dtc.included_dtc_units(six(101), 6), six(1));
        assert_eq!(dtc.included_dtc_units(six(102), 6), six(5));
    }

    #[test]
    fn min_value_including_fee_returns_first_covering_tier() {
        let dtc = usdt_route();
        assert_eq!(dtc.min_value_including_fee(6), Some("1"));
    }

    #[test]
    fn min_value_including_fee_with_zero_fees() {
        let dtc = Dtc {
            tiers: [
                tier(0.0, 0.0),
                tier(0.0, 0.0),
                tier(0.0, 0.0),
                tier(0.0, 0.0),
            ],
            ..usdt_route()
        };
        assert_eq!(dtc.min_value_including_fee(6), Some("0"));
    }

    #[test]
    fn unparsable_strings_count_as_zero() {
        assert_eq!(ui_units("n/a", 6), U256::ZERO);
        assert_eq!(ui_units("", 6), U256::ZERO);
    }
}
