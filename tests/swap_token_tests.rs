//! On-demand swap token lookups with background refresh.

use std::sync::Arc;
use std::time::Duration;

use chainhub::application::{RefreshPolicy, SwapTokenInfoManager};
use chainhub::error::{Error, ErrorKind};
use chainhub::testkit::{token_record, MemoryStore};

const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

fn policy(refresh_after: Duration) -> RefreshPolicy {
    RefreshPolicy {
        refresh_after,
        expire_after_idle: Duration::from_secs(3600),
    }
}

fn store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.set_swap_tokens(vec![token_record("Ethereum", WETH, "WETH", 18)]);
    store
}

#[tokio::test]
async fn malformed_keys_are_rejected_without_a_query() {
    let store = store();
    let swaps = SwapTokenInfoManager::new(store.clone(), policy(Duration::from_secs(3600)));

    for key in ["Ethereum", "Ethereum#0xabc#extra"] {
        let err = swaps.get(key).await.unwrap_err();
        assert!(matches!(err, Error::InvalidKey(_)), "{key}");
        assert_eq!(err.kind(), ErrorKind::Config);
    }
    assert_eq!(store.swap_lookups(), 0);
}

#[tokio::test]
async fn hits_are_served_from_memory() {
    let store = store();
    let swaps = SwapTokenInfoManager::new(store.clone(), policy(Duration::from_secs(3600)));

    let first = swaps.get_by_chain_name_token_addr("Ethereum", WETH).await.unwrap();
    let second = swaps.get(&format!("Ethereum#{WETH}")).await.unwrap();
    assert_eq!(first.decimals, 18);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(store.swap_lookups(), 1);
}

#[tokio::test]
async fn missing_rows_are_not_cached() {
    let store = store();
    let swaps = SwapTokenInfoManager::new(store.clone(), policy(Duration::from_secs(3600)));

    for _ in 0..2 {
        let err = swaps
            .get_by_chain_name_token_addr("Ethereum", "0xdead")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
    assert_eq!(store.swap_lookups(), 2);
}

#[tokio::test]
async fn failed_refresh_keeps_stale_value() {
    let store = store();
    let swaps = SwapTokenInfoManager::new(store.clone(), policy(Duration::ZERO));
    swaps.get_by_chain_name_token_addr("Ethereum", WETH).await.unwrap();

    store.fail_queries(true);
    for _ in 0..3 {
        let stale = swaps.get_by_chain_name_token_addr("Ethereum", WETH).await.unwrap();
        assert_eq!(stale.token_name, "WETH");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(store.swap_lookups() >= 2);
}

#[tokio::test]
async fn refresh_replaces_value_in_background() {
    let store = store();
    let swaps = SwapTokenInfoManager::new(store.clone(), policy(Duration::ZERO));
    swaps.get_by_chain_name_token_addr("Ethereum", WETH).await.unwrap();

    store.set_swap_tokens(vec![token_record("Ethereum", WETH, "WETH", 8)]);
    let mut decimals = 18;
    for _ in 0..50 {
        decimals = swaps
            .get_by_chain_name_token_addr("Ethereum", WETH)
            .await
            .unwrap()
            .decimals;
        if decimals == 8 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(decimals, 8);
}
