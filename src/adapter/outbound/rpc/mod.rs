//! Chain adapters behind the [`ChainRpc`] port.
//!
//! [`RpcFactory`] maps each [`Backend`] to a constructor. Every adapter it
//! hands out is wrapped so errors carry the chain name and operation.

mod benfen;
mod bitcoin;
mod evm;
mod fuel;
pub(crate) mod jsonrpc;
mod solana;
mod starknet;
mod sui;
mod ton;
mod zksync_lite;

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;

pub use self::benfen::BenfenRpc;
pub use self::bitcoin::BitcoinRpc;
pub use self::evm::EvmRpc;
pub use self::fuel::FuelRpc;
pub use self::solana::SolanaRpc;
pub use self::starknet::StarknetRpc;
pub use self::sui::SuiRpc;
pub use self::ton::TonRpc;
pub use self::zksync_lite::ZksyncLiteRpc;

use crate::application::TokenCache;
use crate::domain::{Backend, ChainInfo, TokenInfo};
use crate::error::{ConfigError, Result, RpcError};
use crate::port::{ChainClient, ChainRpc, HttpTransport, RemoteConfig, TransportFactory, TxOutcome};

/// Everything an adapter constructor may need.
pub struct RpcContext {
    pub chain: Arc<ChainInfo>,
    pub tokens: Arc<TokenCache>,
    pub remote: Arc<dyn RemoteConfig>,
    pub transports: Arc<dyn TransportFactory>,
}

impl RpcContext {
    /// The chain's long-lived transport.
    ///
    /// # Errors
    ///
    /// Returns a config error when the chain was loaded without one.
    pub fn require_transport(&self) -> Result<Arc<dyn HttpTransport>> {
        self.chain
            .client
            .transport()
            .cloned()
            .ok_or_else(|| ConfigError::MissingField { field: "client" }.into())
    }
}

pub type RpcConstructor = fn(&RpcContext) -> Result<Arc<dyn ChainRpc>>;

fn boxed<T: ChainRpc + 'static>(rpc: Result<T>) -> Result<Arc<dyn ChainRpc>> {
    rpc.map(|r| Arc::new(r) as Arc<dyn ChainRpc>)
}

/// Backend registry producing [`ChainRpc`] adapters for loaded chains.
pub struct RpcFactory {
    constructors: HashMap<Backend, RpcConstructor>,
    tokens: Arc<TokenCache>,
    remote: Arc<dyn RemoteConfig>,
    transports: Arc<dyn TransportFactory>,
}

impl RpcFactory {
    /// A factory with every built-in backend registered. Cosmos has no adapter.
    pub fn new(
        tokens: Arc<TokenCache>,
        remote: Arc<dyn RemoteConfig>,
        transports: Arc<dyn TransportFactory>,
    ) -> Self {
        let mut factory = Self {
            constructors: HashMap::new(),
            tokens,
            remote,
            transports,
        };
        factory.register(Backend::Evm, |ctx| boxed(EvmRpc::new(ctx)));
        factory.register(Backend::Starknet, |ctx| boxed(StarknetRpc::new(ctx)));
        factory.register(Backend::Solana, |ctx| boxed(SolanaRpc::new(ctx)));
        factory.register(Backend::Bitcoin, |ctx| boxed(BitcoinRpc::new(ctx)));
        factory.register(Backend::ZksyncLite, |ctx| boxed(ZksyncLiteRpc::new(ctx)));
        factory.register(Backend::Ton, |ctx| boxed(TonRpc::new(ctx)));
        factory.register(Backend::Benfen, |ctx| boxed(BenfenRpc::new(ctx)));
        factory.register(Backend::Sui, |ctx| boxed(SuiRpc::new(ctx)));
        factory.register(Backend::Fuel, |ctx| boxed(FuelRpc::new(ctx)));
        factory
    }

    /// Add or replace the constructor for a backend.
    pub fn register(&mut self, backend: Backend, constructor: RpcConstructor) {
        self.constructors.insert(backend, constructor);
    }

    #[must_use]
    pub fn supports(&self, backend: Backend) -> bool {
        self.constructors.contains_key(&backend)
    }

    #[must_use]
    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// # Errors
    ///
    /// Returns [`RpcError::UnsupportedBackend`] when no constructor is
    /// registered for the chain's backend.
    pub fn get_rpc(&self, chain: Arc<ChainInfo>) -> Result<Arc<dyn ChainRpc>> {
        let constructor = self
            .constructors
            .get(&chain.backend)
            .ok_or(RpcError::UnsupportedBackend {
                code: chain.backend.code(),
            })?;
        let ctx = RpcContext {
            chain: Arc::clone(&chain),
            tokens: Arc::clone(&self.tokens),
            remote: Arc::clone(&self.remote),
            transports: Arc::clone(&self.transports),
        };
        let inner = constructor(&ctx).map_err(|e| e.in_chain(chain.name.clone(), "get_rpc"))?;
        Ok(Arc::new(WithChainContext { inner }))
    }
}

/// Adds the chain name and operation to every error an adapter returns.
struct WithChainContext {
    inner: Arc<dyn ChainRpc>,
}

impl WithChainContext {
    fn wrap<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
        result.map_err(|e| e.in_chain(self.inner.chain().name.clone(), operation))
    }
}

#[async_trait]
impl ChainRpc for WithChainContext {
    fn chain(&self) -> &ChainInfo {
        self.inner.chain()
    }

    fn backend(&self) -> Backend {
        self.inner.backend()
    }

    fn client(&self) -> &ChainClient {
        self.inner.client()
    }

    fn is_address_valid(&self, address: &str) -> bool {
        self.inner.is_address_valid(address)
    }

    fn checksum_address(&self, address: &str) -> String {
        self.inner.checksum_address(address)
    }

    async fn get_latest_block_number(&self) -> Result<i64> {
        self.wrap("get_latest_block_number", self.inner.get_latest_block_number().await)
    }

    async fn is_tx_success(&self, hash: &str) -> Result<TxOutcome> {
        self.wrap("is_tx_success", self.inner.is_tx_success(hash).await)
    }

    async fn get_allowance(&self, owner: &str, token: &str, spender: &str) -> Result<U256> {
        self.wrap("get_allowance", self.inner.get_allowance(owner, token, spender).await)
    }

    async fn get_balance(&self, owner: &str, token: &str) -> Result<U256> {
        self.wrap("get_balance", self.inner.get_balance(owner, token).await)
    }

    async fn get_balance_at_block_number(&self, owner: &str, token: &str, block: i64) -> Result<U256> {
        self.wrap(
            "get_balance_at_block_number",
            self.inner.get_balance_at_block_number(owner, token, block).await,
        )
    }

    async fn get_token_info(&self, token: &str) -> Result<TokenInfo> {
        self.wrap("get_token_info", self.inner.get_token_info(token).await)
    }
}
