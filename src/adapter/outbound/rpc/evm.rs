//! EVM chains over standard `eth_*` JSON-RPC.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::jsonrpc;
use super::RpcContext;
use crate::application::TokenCache;
use crate::domain::address::{evm_checksum, is_hex_zero};
use crate::domain::{Backend, ChainInfo, TokenInfo};
use crate::error::{Error, Result, RpcError};
use crate::port::{ChainRpc, HttpTransport, TxOutcome};

sol! {
    interface IERC20 {
        function symbol() external view returns (string);
        function name() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}

pub struct EvmRpc {
    chain: Arc<ChainInfo>,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<TokenCache>,
}

impl EvmRpc {
    /// # Errors
    ///
    /// Returns an error if the chain has no JSON-RPC client.
    pub fn new(ctx: &RpcContext) -> Result<Self> {
        Ok(Self {
            chain: Arc::clone(&ctx.chain),
            transport: ctx.require_transport()?,
            tokens: Arc::clone(&ctx.tokens),
        })
    }

    fn parse_address(address: &str) -> Result<Address> {
        address
            .trim()
            .parse::<Address>()
            .map_err(|_| {
                RpcError::InvalidAddress {
                    address: address.to_string(),
                }
                .into()
            })
    }

    fn call_params(to: Address, data: Vec<u8>, block: &str) -> Value {
        json!([{ "to": to, "data": Bytes::from(data) }, block])
    }

    async fn eth_call(&self, to: Address, data: Vec<u8>, block: &str) -> Result<Vec<u8>> {
        let result: Bytes = jsonrpc::call(
            self.transport.as_ref(),
            "eth_call",
            Self::call_params(to, data, block),
        )
        .await?;
        Ok(result.to_vec())
    }

    async fn balance_at(&self, owner: &str, token: &str, block: &str) -> Result<U256> {
        let owner = Self::parse_address(owner)?;
        let token = token.trim();
        if is_hex_zero(token) {
            return jsonrpc::call(
                self.transport.as_ref(),
                "eth_getBalance",
                json!([owner, block]),
            )
            .await;
        }
        let token = Self::parse_address(token)?;
        let data = IERC20::balanceOfCall { owner }.abi_encode();
        let out = self.eth_call(token, data, block).await?;
        decode_uint("balanceOf", &out)
    }
}

/// Left-padded 32-byte word. Accepts any integer return width.
fn decode_uint(method: &str, data: &[u8]) -> Result<U256> {
    if data.len() < 32 {
        return Err(Error::invalid_response(method, format!("{} bytes returned", data.len())));
    }
    Ok(U256::from_be_slice(&data[..32]))
}

/// ABI string, or a right-padded `bytes32` as some older tokens return.
fn decode_text(method: &str, data: &[u8]) -> Result<String> {
    if data.len() == 32 {
        let end = data.iter().position(|b| *b == 0).unwrap_or(32);
        return Ok(String::from_utf8_lossy(&data[..end]).trim().to_string());
    }
    IERC20::symbolCall::abi_decode_returns(data)
        .map(|s| s.trim().to_string())
        .map_err(|e| Error::invalid_response(method, e.to_string()))
}

fn hex_bytes(method: &str, value: Value) -> Result<Vec<u8>> {
    jsonrpc::decode::<Bytes>(method, value).map(|b| b.to_vec())
}

#[async_trait]
impl ChainRpc for EvmRpc {
    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    fn backend(&self) -> Backend {
        Backend::Evm
    }

    fn is_address_valid(&self, address: &str) -> bool {
        let digits = address.trim();
        let digits = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")).unwrap_or(digits);
        digits.len() == 40 && digits.bytes().all(|b| b.is_ascii_hexdigit())
    }

    fn checksum_address(&self, address: &str) -> String {
        evm_checksum(address).unwrap_or_else(|| address.to_string())
    }

    async fn get_latest_block_number(&self) -> Result<i64> {
        let value = jsonrpc::call_value(self.transport.as_ref(), "eth_blockNumber", json!([])).await?;
        let height = jsonrpc::parse_quantity("eth_blockNumber", &value)?;
        i64::try_from(height).map_err(|e| Error::invalid_response("eth_blockNumber", e.to_string()))
    }

    async fn is_tx_success(&self, hash: &str) -> Result<TxOutcome> {
        let hash = hash.trim();
        let receipt = jsonrpc::call_value(
            self.transport.as_ref(),
            "eth_getTransactionReceipt",
            json!([hash]),
        )
        .await?;
        if receipt.is_null() {
            return Err(RpcError::TxPending {
                hash: hash.to_string(),
            }
            .into());
        }
        let method = "eth_getTransactionReceipt";
        let status = jsonrpc::parse_quantity(method, &receipt["status"])?;
        let height = jsonrpc::parse_quantity(method, &receipt["blockNumber"])?;
        Ok(TxOutcome {
            success: status == 1,
            height: i64::try_from(height).map_err(|e| Error::invalid_response(method, e.to_string()))?,
        })
    }

    async fn get_allowance(&self, owner: &str, token: &str, spender: &str) -> Result<U256> {
        let data = IERC20::allowanceCall {
            owner: Self::parse_address(owner)?,
            spender: Self::parse_address(spender)?,
        }
        .abi_encode();
        let out = self.eth_call(Self::parse_address(token)?, data, "latest").await?;
        decode_uint("allowance", &out)
    }

    async fn get_balance(&self, owner: &str, token: &str) -> Result<U256> {
        self.balance_at(owner, token, "latest").await
    }

    async fn get_balance_at_block_number(&self, owner: &str, token: &str, block: i64) -> Result<U256> {
        let tag = format!("{block:#x}");
        self.balance_at(owner, token, &tag).await
    }

    async fn get_token_info(&self, token: &str) -> Result<TokenInfo> {
        let token = token.trim();
        if is_hex_zero(token) {
            let mut native = TokenInfo::native(&self.chain);
            native.token_address = token.to_string();
            native.full_name = self.chain.alias_name.clone();
            return Ok(native);
        }
        if let Some(hit) = self.tokens.get(Backend::Evm, &self.chain.name, token) {
            return Ok((*hit).clone());
        }

        let to = Self::parse_address(token)?;
        let calls = vec![
            ("eth_call", Self::call_params(to, IERC20::symbolCall {}.abi_encode(), "latest")),
            ("eth_call", Self::call_params(to, IERC20::decimalsCall {}.abi_encode(), "latest")),
            ("eth_call", Self::call_params(to, IERC20::nameCall {}.abi_encode(), "latest")),
            ("eth_call", Self::call_params(to, IERC20::totalSupplyCall {}.abi_encode(), "latest")),
        ];
        let mut results = jsonrpc::batch(self.transport.as_ref(), calls).await?.into_iter();
        let mut next = |method: &str| hex_bytes(method, results.next().unwrap_or(Value::Null));

        let symbol = next("symbol")?;
        let decimals = next("decimals")?;
        let name = next("name")?;
        let supply = next("totalSupply")?;

        let not_found = || -> Error {
            RpcError::TokenNotFound {
                chain: self.chain.name.clone(),
                address: token.to_string(),
            }
            .into()
        };
        if symbol.is_empty() || decimals.is_empty() {
            return Err(not_found());
        }
        let decimals = decode_uint("decimals", &decimals)?;
        let symbol = decode_text("symbol", &symbol)?;
        if decimals.is_zero() || decimals > U256::from(u8::MAX) || symbol.is_empty() {
            return Err(not_found());
        }

        let info = TokenInfo {
            full_name: if name.is_empty() { String::new() } else { decode_text("name", &name)? },
            total_supply: if supply.is_empty() { U256::ZERO } else { decode_uint("totalSupply", &supply)? },
            ..TokenInfo::new(&self.chain.name, token, symbol, decimals.to::<i32>())
        };
        Ok((*self.tokens.add(Backend::Evm, info)).clone())
    }
}
