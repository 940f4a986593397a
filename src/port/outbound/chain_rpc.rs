//! Uniform chain access contract.
//!
//! One implementation per backend family. Balances and allowances are in
//! base units. The native sentinel address (see
//! [`crate::domain::address::is_native_address`]) selects the chain's own
//! coin wherever a token address is expected.

use alloy_primitives::U256;
use async_trait::async_trait;

use crate::domain::{Backend, ChainInfo, TokenInfo};
use crate::error::Result;

use super::transport::ChainClient;

/// Final state of a transaction as reported by the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOutcome {
    pub success: bool,
    /// Block, slot or checkpoint the transaction landed in.
    pub height: i64,
}

#[async_trait]
pub trait ChainRpc: Send + Sync {
    fn chain(&self) -> &ChainInfo;

    fn backend(&self) -> Backend;

    fn client(&self) -> &ChainClient {
        &self.chain().client
    }

    /// Syntactic check only; never touches the network.
    fn is_address_valid(&self, address: &str) -> bool;

    /// Canonical form of `address`. Idempotent. Backends without a checksum
    /// scheme, and inputs that do not parse, come back unchanged.
    fn checksum_address(&self, address: &str) -> String;

    async fn get_latest_block_number(&self) -> Result<i64>;

    /// A transaction that is not final yet is reported as
    /// [`RpcError::TxPending`](crate::error::RpcError::TxPending).
    async fn is_tx_success(&self, hash: &str) -> Result<TxOutcome>;

    async fn get_allowance(&self, owner: &str, token: &str, spender: &str) -> Result<U256>;

    async fn get_balance(&self, owner: &str, token: &str) -> Result<U256>;

    /// Historical balance. Only EVM chains honour `block`; everywhere else
    /// this is the current balance.
    async fn get_balance_at_block_number(
        &self,
        owner: &str,
        token: &str,
        block: i64,
    ) -> Result<U256> {
        let _ = block;
        self.get_balance(owner, token).await
    }

    async fn get_token_info(&self, token: &str) -> Result<TokenInfo>;
}
