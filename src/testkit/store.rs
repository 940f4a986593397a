//! In-memory reference store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::domain::TokenInfo;
use crate::error::{Error, Result};
use crate::port::{
    AccountRecord, ChainRecord, DtcRecord, MakerAddressRecord, MakerGroupRecord, ReferenceStore,
    TokenRecord,
};

/// Tables held in memory. Flip [`MemoryStore::fail_queries`] to make every
/// query return a database error.
#[derive(Default)]
pub struct MemoryStore {
    chains: Mutex<Vec<ChainRecord>>,
    tokens: Mutex<Vec<TokenRecord>>,
    accounts: Mutex<Vec<AccountRecord>>,
    maker_groups: Mutex<Vec<MakerGroupRecord>>,
    maker_addresses: Mutex<Vec<MakerAddressRecord>>,
    security_addresses: Mutex<Vec<MakerAddressRecord>>,
    dtcs: Mutex<Vec<DtcRecord>>,
    swap_tokens: Mutex<Vec<TokenRecord>>,
    failing: AtomicBool,
    swap_lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_chains(&self, rows: Vec<ChainRecord>) {
        *self.chains.lock() = rows;
    }

    pub fn set_tokens(&self, rows: Vec<TokenRecord>) {
        *self.tokens.lock() = rows;
    }

    pub fn set_accounts(&self, rows: Vec<AccountRecord>) {
        *self.accounts.lock() = rows;
    }

    pub fn set_maker_groups(&self, rows: Vec<MakerGroupRecord>) {
        *self.maker_groups.lock() = rows;
    }

    pub fn set_maker_addresses(&self, rows: Vec<MakerAddressRecord>) {
        *self.maker_addresses.lock() = rows;
    }

    pub fn set_security_addresses(&self, rows: Vec<MakerAddressRecord>) {
        *self.security_addresses.lock() = rows;
    }

    pub fn set_dtcs(&self, rows: Vec<DtcRecord>) {
        *self.dtcs.lock() = rows;
    }

    pub fn set_swap_tokens(&self, rows: Vec<TokenRecord>) {
        *self.swap_tokens.lock() = rows;
    }

    pub fn fail_queries(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of point queries made against the swap token table.
    pub fn swap_lookups(&self) -> usize {
        self.swap_lookups.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(Error::Database("injected failure".into()))
        } else {
            Ok(())
        }
    }

    fn load<T: Clone>(&self, table: &Mutex<Vec<T>>) -> Result<Vec<T>> {
        self.check()?;
        Ok(table.lock().clone())
    }
}

fn find(rows: &[TokenRecord], chain_name: &str, token_address: &str) -> Option<TokenRecord> {
    rows.iter()
        .find(|r| r.chain_name == chain_name && r.token_address == token_address)
        .cloned()
}

impl ReferenceStore for MemoryStore {
    fn load_chains(&self) -> Result<Vec<ChainRecord>> {
        self.load(&self.chains)
    }

    fn load_tokens(&self) -> Result<Vec<TokenRecord>> {
        self.load(&self.tokens)
    }

    fn load_accounts(&self) -> Result<Vec<AccountRecord>> {
        self.load(&self.accounts)
    }

    fn load_maker_groups(&self) -> Result<Vec<MakerGroupRecord>> {
        self.load(&self.maker_groups)
    }

    fn load_maker_addresses(&self) -> Result<Vec<MakerAddressRecord>> {
        self.load(&self.maker_addresses)
    }

    fn load_security_addresses(&self) -> Result<Vec<MakerAddressRecord>> {
        self.load(&self.security_addresses)
    }

    fn load_dtcs(&self) -> Result<Vec<DtcRecord>> {
        self.load(&self.dtcs)
    }

    fn find_token(&self, chain_name: &str, token_address: &str) -> Result<Option<TokenRecord>> {
        self.check()?;
        Ok(find(&self.tokens.lock(), chain_name, token_address))
    }

    fn find_swap_token(&self, chain_name: &str, token_address: &str) -> Result<Option<TokenRecord>> {
        self.swap_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(find(&self.swap_tokens.lock(), chain_name, token_address))
    }

    fn insert_token_ignore(&self, token: &TokenInfo) -> Result<bool> {
        self.check()?;
        let mut tokens = self.tokens.lock();
        if find(&tokens, &token.chain_name, &token.token_address).is_some() {
            return Ok(false);
        }
        tokens.push(TokenRecord {
            token_name: token.token_name.clone(),
            chain_name: token.chain_name.clone(),
            token_address: token.token_address.clone(),
            decimals: token.decimals,
            full_name: token.full_name.clone(),
            total_supply: token.total_supply.to_string(),
            icon: token.icon.clone().unwrap_or_default(),
        });
        Ok(true)
    }
}
