//! Ton reads through a toncenter v3 indexer.

use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use crc::{Crc, CRC_16_XMODEM};
use serde_json::Value;

use super::RpcContext;
use crate::domain::address::is_native_address;
use crate::domain::amount::parse_u256;
use crate::domain::{Backend, ChainInfo, TokenInfo};
use crate::error::{Error, Result, RpcError};
use crate::port::{ChainRpc, HttpTransport, TxOutcome};

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

const BOUNCEABLE: u8 = 0x11;

/// Workchain plus account hash, with the tag byte of the friendly form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TonAddress {
    flags: u8,
    workchain: i8,
    hash: [u8; 32],
}

impl TonAddress {
    /// Accepts the 48-character friendly form (either base64 alphabet) or
    /// the raw `workchain:hex` form.
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some((wc, hex_hash)) = text.split_once(':') {
            let workchain = wc.parse::<i8>().ok()?;
            let hash: [u8; 32] = hex::decode(hex_hash).ok()?.try_into().ok()?;
            return Some(Self {
                flags: BOUNCEABLE,
                workchain,
                hash,
            });
        }
        if text.len() != 48 {
            return None;
        }
        let bytes = URL_SAFE.decode(text).or_else(|_| STANDARD.decode(text)).ok()?;
        let bytes: [u8; 36] = bytes.try_into().ok()?;
        let crc = u16::from_be_bytes([bytes[34], bytes[35]]);
        if CRC16.checksum(&bytes[..34]) != crc {
            return None;
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[2..34]);
        Some(Self {
            flags: bytes[0],
            workchain: bytes[1] as i8,
            hash,
        })
    }

    /// URL-safe friendly form.
    fn to_friendly(self) -> String {
        let mut bytes = Vec::with_capacity(36);
        bytes.push(self.flags);
        bytes.push(self.workchain as u8);
        bytes.extend_from_slice(&self.hash);
        let crc = CRC16.checksum(&bytes);
        bytes.extend_from_slice(&crc.to_be_bytes());
        URL_SAFE.encode(bytes)
    }
}

pub struct TonRpc {
    chain: Arc<ChainInfo>,
    transport: Arc<dyn HttpTransport>,
}

impl TonRpc {
    /// # Errors
    ///
    /// Returns an error if the chain has no Ton client.
    pub fn new(ctx: &RpcContext) -> Result<Self> {
        Ok(Self {
            chain: Arc::clone(&ctx.chain),
            transport: ctx.require_transport()?,
        })
    }

    fn parse_address(address: &str) -> Result<TonAddress> {
        TonAddress::parse(address).ok_or_else(|| {
            RpcError::InvalidAddress {
                address: address.to_string(),
            }
            .into()
        })
    }

    fn amount(path: &str, value: &Value) -> Result<U256> {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return Err(Error::invalid_response(path, "missing balance")),
        };
        parse_u256(&text).map_err(|e| Error::invalid_response(path, e.to_string()))
    }
}

#[async_trait]
impl ChainRpc for TonRpc {
    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    fn backend(&self) -> Backend {
        Backend::Ton
    }

    fn is_address_valid(&self, address: &str) -> bool {
        TonAddress::parse(address).is_some()
    }

    fn checksum_address(&self, address: &str) -> String {
        TonAddress::parse(address).map_or_else(|| address.to_string(), TonAddress::to_friendly)
    }

    async fn get_latest_block_number(&self) -> Result<i64> {
        let path = "/api/v3/masterchainInfo";
        let info = self.transport.get_json(path, &[]).await?;
        info["last"]["seqno"]
            .as_i64()
            .ok_or_else(|| Error::invalid_response(path, "missing last.seqno"))
    }

    async fn is_tx_success(&self, _hash: &str) -> Result<TxOutcome> {
        Err(Error::unsupported(Backend::Ton, "is_tx_success"))
    }

    async fn get_allowance(&self, _owner: &str, _token: &str, _spender: &str) -> Result<U256> {
        Err(Error::unsupported(Backend::Ton, "get_allowance"))
    }

    /// Native balance from the account state, jetton balance from the
    /// owner's jetton wallet. A missing jetton wallet holds nothing.
    async fn get_balance(&self, owner: &str, token: &str) -> Result<U256> {
        let owner = Self::parse_address(owner)?.to_friendly();
        let token = token.trim();
        if is_native_address(token) {
            let path = "/api/v3/account";
            let account = self.transport.get_json(path, &[("address", owner.as_str())]).await?;
            return Self::amount(path, &account["balance"]);
        }

        let minter = Self::parse_address(token)?.to_friendly();
        let path = "/api/v3/jetton/wallets";
        let wallets = self
            .transport
            .get_json(
                path,
                &[
                    ("owner_address", owner.as_str()),
                    ("jetton_address", minter.as_str()),
                    ("limit", "1"),
                ],
            )
            .await?;
        match wallets["jetton_wallets"].as_array().and_then(|w| w.first()) {
            Some(wallet) => Self::amount(path, &wallet["balance"]),
            None => Ok(U256::ZERO),
        }
    }

    /// Only the gas token is known without an indexer.
    async fn get_token_info(&self, token: &str) -> Result<TokenInfo> {
        if is_native_address(token) {
            return Ok(TokenInfo::native(&self.chain));
        }
        Err(Error::unsupported(Backend::Ton, "get_token_info"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testkit::{chain_info, ScriptedTransport};

    const RAW: &str = "0:83dfd552e63729b472fcbcc8c45ebcc6691702558b68ec7527e1ba403a0f31a8";

    fn rpc(transport: Arc<ScriptedTransport>) -> TonRpc {
        TonRpc {
            chain: Arc::new(chain_info("Ton", Backend::Ton, transport.clone())),
            transport,
        }
    }

    #[test]
    fn friendly_form_round_trips_and_keeps_flags() {
        let parsed = TonAddress::parse(RAW).unwrap();
        let friendly = parsed.to_friendly();
        assert_eq!(friendly.len(), 48);
        assert_eq!(TonAddress::parse(&friendly), Some(parsed));

        let non_bounceable = TonAddress { flags: 0x51, ..parsed }.to_friendly();
        assert_eq!(TonAddress::parse(&non_bounceable).unwrap().flags, 0x51);
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let friendly = TonAddress::parse(RAW).unwrap().to_friendly();
        let mut chars: Vec<char> = friendly.chars().collect();
        chars[10] = if chars[10] == 'A' { 'B' } else { 'A' };
        let corrupted: String = chars.into_iter().collect();
        assert!(TonAddress::parse(&corrupted).is_none());
    }

    #[test]
    fn checksum_is_idempotent() {
        let rpc = rpc(Arc::new(ScriptedTransport::new("http://ton.test")));
        let once = rpc.checksum_address(RAW);
        assert_eq!(rpc.checksum_address(&once), once);
        assert!(rpc.is_address_valid(RAW));
        assert!(!rpc.is_address_valid("EQ-not-an-address"));
    }

    #[tokio::test]
    async fn jetton_balance_reads_first_wallet() {
        let transport = Arc::new(ScriptedTransport::new("http://ton.test"));
        transport.on_get("/api/v3/jetton/wallets", |query| {
            assert_eq!(query["limit"], "1");
            json!({ "jetton_wallets": [{ "balance": "123456" }] })
        });
        let minter = "0:b113a994b5024a16719f69139328eb759596c38a25f59028b146fecdc3621dfe";
        let balance = rpc(transport).get_balance(RAW, minter).await.unwrap();
        assert_eq!(balance, U256::from(123_456u64));
    }

    #[tokio::test]
    async fn native_balance_and_seqno() {
        let transport = Arc::new(ScriptedTransport::new("http://ton.test"));
        transport.on_get("/api/v3/account", |_| json!({ "balance": "5000000000", "status": "active" }));
        transport.on_get("/api/v3/masterchainInfo", |_| json!({ "last": { "seqno": 41000000 } }));
        let rpc = rpc(transport);
        assert_eq!(rpc.get_balance(RAW, "0x0").await.unwrap(), U256::from(5_000_000_000u64));
        assert_eq!(rpc.get_latest_block_number().await.unwrap(), 41_000_000);
    }
}
