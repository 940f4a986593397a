//! Swap token metadata served from `t_swap_token_info` through a
//! [`RefreshingCache`].

use std::sync::Arc;

use super::refresh_cache::{Fetcher, RefreshPolicy, RefreshingCache};
use super::token::token_from_record;
use crate::domain::TokenInfo;
use crate::error::{Error, Result};
use crate::port::ReferenceStore;

const SEPARATOR: char = '#';

pub struct SwapTokenInfoManager {
    cache: RefreshingCache<TokenInfo>,
}

impl SwapTokenInfoManager {
    pub fn new(store: Arc<dyn ReferenceStore>, policy: RefreshPolicy) -> Self {
        let fetcher: Fetcher<TokenInfo> = Arc::new(move |key| {
            let store = Arc::clone(&store);
            Box::pin(async move {
                let (chain, address) = split_key(&key)?;
                let (chain, address) = (chain.to_string(), address.to_string());
                let record = tokio::task::spawn_blocking(move || {
                    store.find_swap_token(&chain, &address)
                })
                .await
                .map_err(|e| Error::Database(e.to_string()))??;
                let record = record.ok_or_else(|| Error::NotFound {
                    kind: "swap token",
                    key: key.clone(),
                })?;
                token_from_record(record).map_err(|(_, e)| e.into())
            })
        });
        Self {
            cache: RefreshingCache::new(policy, fetcher),
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no row exists and the store error
    /// when the point query fails.
    pub async fn get_by_chain_name_token_addr(
        &self,
        chain_name: &str,
        token_address: &str,
    ) -> Result<Arc<TokenInfo>> {
        self.get(&format!("{chain_name}{SEPARATOR}{token_address}"))
            .await
    }

    /// Look up by raw `"{chain}#{address}"` key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] when the key does not split into exactly
    /// two parts.
    pub async fn get(&self, key: &str) -> Result<Arc<TokenInfo>> {
        self.cache.get(key).await
    }

    /// Drop entries idle past the expiry window.
    pub fn evict_idle(&self) -> usize {
        self.cache.evict_idle()
    }
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    let mut parts = key.split(SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(chain), Some(address), None) => Ok((chain, address)),
        _ => Err(Error::InvalidKey(key.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::ErrorKind;
    use crate::testkit::{token_record, MemoryStore};

    fn manager(store: Arc<MemoryStore>) -> SwapTokenInfoManager {
        SwapTokenInfoManager::new(
            store,
            RefreshPolicy {
                refresh_after: Duration::from_secs(3600),
                expire_after_idle: Duration::from_secs(1800),
            },
        )
    }

    #[test]
    fn keys_split_into_exactly_two_parts() {
        assert_eq!(split_key("Ethereum#0xabc").unwrap(), ("Ethereum", "0xabc"));
        assert!(matches!(split_key("Ethereum"), Err(Error::InvalidKey(_))));
        assert!(matches!(split_key("a#b#c"), Err(Error::InvalidKey(_))));
    }

    #[tokio::test]
    async fn fetches_once_then_serves_from_cache() {
        let store = Arc::new(MemoryStore::new());
        store.set_swap_tokens(vec![token_record("Ethereum", "0xabc", "ABC", 18)]);
        let swaps = manager(store.clone());

        let first = swaps.get_by_chain_name_token_addr("Ethereum", "0xabc").await.unwrap();
        let second = swaps.get_by_chain_name_token_addr("Ethereum", "0xabc").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.decimals, 18);
        assert_eq!(store.swap_lookups(), 1);
    }

    #[tokio::test]
    async fn invalid_key_is_a_config_error() {
        let swaps = manager(Arc::new(MemoryStore::new()));
        let err = swaps.get("no-separator").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[tokio::test]
    async fn missing_row_is_not_found() {
        let swaps = manager(Arc::new(MemoryStore::new()));
        let err = swaps
            .get_by_chain_name_token_addr("Ethereum", "0xnone")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let store = Arc::new(MemoryStore::new());
        store.fail_queries(true);
        let swaps = manager(store);
        assert!(swaps.get("Ethereum#0xabc").await.is_err());
    }
}
