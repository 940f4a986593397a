//! Fee tier selection for a loaded route.

use std::sync::Arc;

use alloy_primitives::U256;
use chainhub::application::DtcManager;
use chainhub::domain::amount::to_ui_string;
use chainhub::error::ErrorKind;
use chainhub::port::DtcRecord;
use chainhub::testkit::{usdt_route, MemoryStore, RecordingAlerter};

fn manager(rows: Vec<DtcRecord>) -> DtcManager {
    let store = Arc::new(MemoryStore::new());
    store.set_dtcs(rows);
    let dtcs = DtcManager::new(store, Arc::new(RecordingAlerter::new()));
    dtcs.load_all_dtcs().unwrap();
    dtcs
}

fn usdt(value: u64) -> U256 {
    U256::from(value) * U256::from(1_000_000u64)
}

#[test]
fn fee_to_include_follows_thresholds() {
    let dtcs = manager(vec![usdt_route()]);
    let fee = |value| {
        dtcs.get_dtc_to_include("USDT", "Ethereum", "Arbitrum", value)
            .unwrap()
            .fee_str
    };
    assert_eq!(fee(500.0), "5");
    assert_eq!(fee(100.0), "1");
    assert_eq!(fee(100.5), "5");
    assert_eq!(fee(1000.0), "5");
    assert_eq!(fee(250_000.0), "50");
    assert_eq!(fee(0.0), "1");
}

#[test]
fn included_fee_shifts_thresholds_by_tier_fee() {
    let dtcs = manager(vec![usdt_route()]);
    let fee = |value| {
        dtcs.get_included_dtc("USDT", "Ethereum", "Arbitrum", value)
            .unwrap()
            .fee
    };
    assert_eq!(fee(101.0), 1.0);
    assert_eq!(fee(102.0), 5.0);
    assert_eq!(fee(1005.0), 5.0);
    assert_eq!(fee(1006.0), 20.0);
}

#[test]
fn base_unit_walk_is_inclusive() {
    let dtcs = manager(vec![usdt_route()]);
    let fee = |value| {
        dtcs.get_dtc_to_include_big_int("USDT", "Ethereum", "Arbitrum", value, 6)
            .unwrap()
    };
    assert_eq!(fee(usdt(100)), usdt(1));
    assert_eq!(fee(usdt(100) + U256::from(1u64)), usdt(5));
    assert_eq!(fee(usdt(500)), usdt(5));
    assert_eq!(to_ui_string(fee(usdt(20_000)), 6), "50");

    let included = dtcs
        .get_included_dtc_big_int("USDT", "Ethereum", "Arbitrum", usdt(101), 6)
        .unwrap();
    assert_eq!(included, usdt(1));
}

#[test]
fn minimum_transfer_is_first_self_covering_fee() {
    let dtcs = manager(vec![usdt_route()]);
    let min = dtcs
        .min_value_including_fee("USDT", "Ethereum", "Arbitrum", 6)
        .unwrap();
    assert_eq!(min, "1");
}

#[test]
fn unknown_route_is_not_found() {
    let dtcs = manager(vec![usdt_route()]);
    let err = dtcs
        .get_dtc_to_include("USDT", "Arbitrum", "Ethereum", 10.0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(dtcs
        .min_value_including_fee("USDC", "Ethereum", "Arbitrum", 6)
        .is_err());
}

#[test]
fn route_lookup_ignores_case() {
    let dtcs = manager(vec![usdt_route()]);
    let fee = dtcs
        .get_dtc_to_include("usdt", "ETHEREUM", "arbitrum", 500.0)
        .unwrap();
    assert_eq!(fee.fee, 5.0);
}

#[test]
fn ui_strings_scale_to_base_units() {
    assert_eq!(DtcManager::from_ui_string("1.5", 6), U256::from(1_500_000u64));
    assert_eq!(DtcManager::from_ui_string("", 18), U256::ZERO);
    assert_eq!(DtcManager::from_ui_string("abc", 18), U256::ZERO);
}
