//! Cache-aside store for token metadata fetched from chains.
//!
//! Entries never expire: token metadata does not change after mint. There is
//! no lock around fetch-then-add, so two concurrent misses for the same token
//! both fetch and the second write replaces the first with the same value.

use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::{Backend, TokenInfo};

#[derive(Default)]
pub struct TokenCache {
    entries: DashMap<(String, String), Arc<TokenInfo>>,
}

impl TokenCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(backend: Backend, chain_name: &str, address: &str) -> (String, String) {
        (
            chain_name.trim().to_lowercase(),
            backend.address_key(address),
        )
    }

    #[must_use]
    pub fn get(&self, backend: Backend, chain_name: &str, address: &str) -> Option<Arc<TokenInfo>> {
        self.entries
            .get(&Self::key(backend, chain_name, address))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn add(&self, backend: Backend, token: TokenInfo) -> Arc<TokenInfo> {
        let key = Self::key(backend, &token.chain_name, &token.token_address);
        let token = Arc::new(token);
        self.entries.insert(key, Arc::clone(&token));
        token
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
