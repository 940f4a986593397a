//! Solana over JSON-RPC, decoding SPL account layouts by hand.

use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use borsh::BorshDeserialize;
use serde_json::{json, Value};
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

use super::jsonrpc;
use super::RpcContext;
use crate::application::TokenCache;
use crate::domain::address::is_native_address;
use crate::domain::{Backend, ChainInfo, TokenInfo};
use crate::error::{Error, Result, RpcError};
use crate::port::{ChainRpc, HttpTransport, TxOutcome};

const TOKEN_PROGRAM: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
const TOKEN_2022_PROGRAM: Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");
const ASSOCIATED_TOKEN_PROGRAM: Pubkey = pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");
const METADATA_PROGRAM: Pubkey = pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

/// Base mint layout, padded to the account size in Token-2022 so the
/// account-type byte and extensions follow it.
const MINT_LEN: usize = 82;
const EXTENSIONS_OFFSET: usize = 166;
const TOKEN_METADATA_EXTENSION: u16 = 19;
const TOKEN_ACCOUNT_LEN: usize = 165;

const UNKNOWN: &str = "UNKNOWN";

/// Leading fields of a Metaplex metadata account.
#[derive(BorshDeserialize)]
struct MetaplexMetadata {
    _key: u8,
    _update_authority: [u8; 32],
    _mint: [u8; 32],
    name: String,
    symbol: String,
    _uri: String,
}

/// Leading fields of the Token-2022 metadata extension.
#[derive(BorshDeserialize)]
struct TokenMetadata {
    _update_authority: [u8; 32],
    _mint: [u8; 32],
    name: String,
    symbol: String,
    _uri: String,
}

#[derive(Debug, PartialEq, Eq)]
struct Mint {
    supply: u64,
    decimals: u8,
    has_freeze_authority: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct TokenAccount {
    amount: u64,
    delegated_amount: u64,
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(word)
}

impl Mint {
    fn unpack(data: &[u8]) -> Option<Self> {
        if data.len() < MINT_LEN {
            return None;
        }
        let freeze_tag = u32::from_le_bytes([data[46], data[47], data[48], data[49]]);
        Some(Self {
            supply: read_u64(data, 36),
            decimals: data[44],
            has_freeze_authority: freeze_tag == 1 && data[50..82].iter().any(|b| *b != 0),
        })
    }
}

impl TokenAccount {
    fn unpack(data: &[u8]) -> Option<Self> {
        if data.len() < TOKEN_ACCOUNT_LEN {
            return None;
        }
        Some(Self {
            amount: read_u64(data, 64),
            delegated_amount: read_u64(data, 121),
        })
    }
}

/// Value of the first TLV entry of `wanted` type, if complete.
fn extension(wanted: u16, tlv: &[u8]) -> Option<&[u8]> {
    let mut at = 0;
    while at + 4 <= tlv.len() {
        let kind = u16::from_le_bytes([tlv[at], tlv[at + 1]]);
        let len = usize::from(u16::from_le_bytes([tlv[at + 2], tlv[at + 3]]));
        let start = at + 4;
        if kind == wanted && start + len <= tlv.len() {
            return Some(&tlv[start..start + len]);
        }
        at = start + len;
    }
    None
}

fn clean(text: &str) -> String {
    text.trim_matches('\0').trim().to_string()
}

fn account_data(method: &str, account: &Value) -> Result<Option<Vec<u8>>> {
    if account.is_null() {
        return Ok(None);
    }
    let encoded = account["data"][0]
        .as_str()
        .ok_or_else(|| Error::invalid_response(method, "missing account data"))?;
    STANDARD
        .decode(encoded)
        .map(Some)
        .map_err(|e| Error::invalid_response(method, e.to_string()))
}

fn associated_token_address(owner: &Pubkey, mint: &Pubkey, program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), program.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM,
    )
    .0
}

fn metadata_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[b"metadata", METADATA_PROGRAM.as_ref(), mint.as_ref()],
        &METADATA_PROGRAM,
    )
    .0
}

pub struct SolanaRpc {
    chain: Arc<ChainInfo>,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<TokenCache>,
}

impl SolanaRpc {
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

    fn parse_pubkey(address: &str) -> Result<Pubkey> {
        Pubkey::from_str(address.trim()).map_err(|_| {
            RpcError::InvalidAddress {
                address: address.to_string(),
            }
            .into()
        })
    }

    async fn account(&self, key: &Pubkey) -> Result<Option<Vec<u8>>> {
        let method = "getAccountInfo";
        let result = jsonrpc::call_value(
            self.transport.as_ref(),
            method,
            json!([key.to_string(), { "encoding": "base64", "commitment": "confirmed" }]),
        )
        .await?;
        account_data(method, &result["value"])
    }

    /// The owner's token account for `mint`, looked up under both token
    /// programs. `None` when neither exists.
    async fn token_account(&self, owner: &str, mint: &str) -> Result<Option<TokenAccount>> {
        let method = "getMultipleAccounts";
        let owner = Self::parse_pubkey(owner)?;
        let mint = Self::parse_pubkey(mint)?;
        let candidates = [
            associated_token_address(&owner, &mint, &TOKEN_PROGRAM).to_string(),
            associated_token_address(&owner, &mint, &TOKEN_2022_PROGRAM).to_string(),
        ];
        let result = jsonrpc::call_value(
            self.transport.as_ref(),
            method,
            json!([candidates, { "encoding": "base64", "commitment": "confirmed" }]),
        )
        .await?;
        let accounts = result["value"]
            .as_array()
            .ok_or_else(|| Error::invalid_response(method, "expected an account list"))?;
        for account in accounts {
            if let Some(found) = account_data(method, account)?.and_then(|d| TokenAccount::unpack(&d)) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    fn native_token(&self, address: &str) -> TokenInfo {
        TokenInfo {
            full_name: "Solana".to_string(),
            ..TokenInfo::new(&self.chain.name, address, "SOL", 9)
        }
    }
}

#[async_trait]
impl ChainRpc for SolanaRpc {
    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    fn backend(&self) -> Backend {
        Backend::Solana
    }

    fn is_address_valid(&self, address: &str) -> bool {
        Pubkey::from_str(address).is_ok()
    }

    fn checksum_address(&self, address: &str) -> String {
        address.to_string()
    }

    async fn get_latest_block_number(&self) -> Result<i64> {
        jsonrpc::call(
            self.transport.as_ref(),
            "getSlot",
            json!([{ "commitment": "confirmed" }]),
        )
        .await
    }

    async fn is_tx_success(&self, hash: &str) -> Result<TxOutcome> {
        let method = "getTransaction";
        let signature = hash.trim();
        let decoded = bs58::decode(signature).into_vec().unwrap_or_default();
        if decoded.len() != 64 {
            return Err(Error::Parse(format!("invalid signature {signature:?}")));
        }
        let tx = jsonrpc::call_value(
            self.transport.as_ref(),
            method,
            json!([signature, {
                "encoding": "json",
                "commitment": "confirmed",
                "maxSupportedTransactionVersion": 0,
            }]),
        )
        .await?;
        if tx.is_null() {
            return Err(RpcError::TxPending {
                hash: signature.to_string(),
            }
            .into());
        }
        let slot = tx["slot"]
            .as_i64()
            .ok_or_else(|| Error::invalid_response(method, "missing slot"))?;
        Ok(TxOutcome {
            success: tx["meta"]["err"].is_null(),
            height: slot,
        })
    }

    /// Amount delegated out of the owner's token account; the spender is
    /// whichever delegate the account names.
    async fn get_allowance(&self, owner: &str, token: &str, _spender: &str) -> Result<U256> {
        let account = self.token_account(owner, token).await?;
        Ok(U256::from(account.map_or(0, |a| a.delegated_amount)))
    }

    async fn get_balance(&self, owner: &str, token: &str) -> Result<U256> {
        let token = token.trim();
        if is_native_address(token) {
            let owner = Self::parse_pubkey(owner)?;
            let result = jsonrpc::call_value(
                self.transport.as_ref(),
                "getBalance",
                json!([owner.to_string(), { "commitment": "confirmed" }]),
            )
            .await?;
            let lamports = result["value"]
                .as_u64()
                .ok_or_else(|| Error::invalid_response("getBalance", "missing value"))?;
            return Ok(U256::from(lamports));
        }
        let account = self.token_account(owner, token).await?;
        Ok(U256::from(account.map_or(0, |a| a.amount)))
    }

    async fn get_token_info(&self, token: &str) -> Result<TokenInfo> {
        let token = token.trim();
        if is_native_address(token) {
            return Ok(self.native_token(token));
        }
        if let Some(hit) = self.tokens.get(Backend::Solana, &self.chain.name, token) {
            return Ok((*hit).clone());
        }

        let mint_key = Self::parse_pubkey(token)?;
        let mut symbol = UNKNOWN.to_string();
        let mut full_name = UNKNOWN.to_string();
        if let Some(data) = self.account(&metadata_address(&mint_key)).await? {
            let meta = MetaplexMetadata::deserialize(&mut data.as_slice())
                .map_err(|e| Error::invalid_response("metaplex metadata", e.to_string()))?;
            symbol = clean(&meta.symbol);
            full_name = clean(&meta.name);
        }

        let data = self.account(&mint_key).await?.ok_or_else(|| RpcError::TokenNotFound {
            chain: self.chain.name.clone(),
            address: token.to_string(),
        })?;
        let mint = Mint::unpack(&data)
            .ok_or_else(|| Error::invalid_response("mint", format!("{} bytes", data.len())))?;
        if data.len() > EXTENSIONS_OFFSET {
            if let Some(meta) = extension(TOKEN_METADATA_EXTENSION, &data[EXTENSIONS_OFFSET..])
                .and_then(|mut value| TokenMetadata::deserialize(&mut value).ok())
            {
                symbol = clean(&meta.symbol);
                full_name = clean(&meta.name);
            }
        }

        let info = TokenInfo {
            full_name,
            total_supply: U256::from(mint.supply),
            has_freeze_authority: mint.has_freeze_authority,
            ..TokenInfo::new(&self.chain.name, token, symbol, i32::from(mint.decimals))
        };
        Ok((*self.tokens.add(Backend::Solana, info)).clone())
    }
}
