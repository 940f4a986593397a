//! Address helpers shared by several chain families.

use alloy_primitives::{keccak256, Address};
use sha2::{Digest, Sha256};

/// System program id, used as the native SOL sentinel.
pub const SOLANA_NATIVE_ADDRESS: &str = "11111111111111111111111111111111";

/// zkSync Era's ETH token contract, also accepted as a native sentinel.
pub const ZKSYNC_ERA_NATIVE_ADDRESS: &str = "0x000000000000000000000000000000000000800A";

/// True when `text`, after an optional `0x` prefix, is made only of `'0'`.
///
/// An empty string is not treated as zero.
#[must_use]
pub fn is_hex_zero(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    strip_hex_prefix(text).chars().all(|c| c == '0')
}

/// True for any reserved address meaning "the chain's own coin".
#[must_use]
pub fn is_native_address(address: &str) -> bool {
    let address = address.trim();
    is_hex_zero(address)
        || address == SOLANA_NATIVE_ADDRESS
        || address.eq_ignore_ascii_case(ZKSYNC_ERA_NATIVE_ADDRESS)
}

#[must_use]
pub fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

/// Even-length string of hex digits.
#[must_use]
pub fn is_hex(text: &str) -> bool {
    text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_hexdigit())
}

/// `0x` followed by exactly `digits` hex characters.
#[must_use]
pub fn is_prefixed_hex(text: &str, digits: usize) -> bool {
    text.len() == digits + 2 && text.starts_with("0x") && is_hex(&text[2..])
}

/// EIP-55 mixed-case form of a 20-byte address, or `None` if it does not parse.
#[must_use]
pub fn evm_checksum(address: &str) -> Option<String> {
    address
        .trim()
        .parse::<Address>()
        .ok()
        .map(|addr| addr.to_checksum(None))
}

/// Mixed-case form of a 32-byte Starknet felt address.
///
/// Leading zeros are dropped and the value is re-padded to 64 digits. The
/// letter case of each digit comes from the matching nibble of the
/// 250-bit Starknet keccak of the address bytes.
#[must_use]
pub fn starknet_checksum(address: &str) -> Option<String> {
    let lowered = address.trim().to_lowercase();
    let mut digits = strip_hex_prefix(&lowered).trim_start_matches('0').to_string();
    if digits.len() % 2 != 0 {
        digits.insert(0, '0');
    }
    if digits.len() > 64 {
        return None;
    }
    let bytes = hex::decode(&digits).ok()?;
    let mut hash = keccak256(&bytes).0;
    hash[0] &= 0x03;

    let padded = format!("{digits:0>64}");
    Some(format!("0x{}", apply_case(&padded, &hash)))
}

/// Mixed-case form of a Fuel B256 address, driven by SHA-256 of the
/// lowercase hex digits.
#[must_use]
pub fn fuel_checksum(address: &str) -> Option<String> {
    let address = address.trim();
    if !is_prefixed_hex(address, 64) {
        return None;
    }
    let digits = address[2..].to_lowercase();
    let hash = Sha256::digest(digits.as_bytes());
    Some(format!("0x{}", apply_case(&digits, &hash)))
}

/// Uppercase hex letters whose nibble in `hash` is 8 or more. Digit `2i`
/// uses the high nibble of byte `i`, digit `2i + 1` the low nibble.
fn apply_case(digits: &str, hash: &[u8]) -> String {
    digits
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let byte = hash.get(i / 2).copied().unwrap_or(0);
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if nibble >= 8 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_native_sentinels() {
        assert!(is_native_address("0x0000000000000000000000000000000000000000"));
        assert!(is_native_address("0x0"));
        assert!(is_native_address(SOLANA_NATIVE_ADDRESS));
        assert!(is_native_address("0x000000000000000000000000000000000000800a"));
        assert!(!is_native_address(""));
        assert!(!is_native_address("0xdAC17F958D2ee523a2206206994597C13D831ec7"));
    }

    #[test]
    fn evm_checksum_matches_eip55() {
        let lower = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
        assert_eq!(
            evm_checksum(lower).as_deref(),
            Some("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")
        );
        assert!(evm_checksum("0x1234").is_none());
    }

    #[test]
    fn starknet_checksum_is_idempotent_and_padded() {
        let input = "0x49d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7";
        let once = starknet_checksum(input).unwrap();
        assert_eq!(once.len(), 66);
        assert_eq!(once.to_lowercase(), format!("0x0{}", &input[2..]));
        assert_eq!(starknet_checksum(&once).unwrap(), once);
    }

    #[test]
    fn fuel_checksum_is_idempotent() {
        let input = format!("0x{}", "ab".repeat(32));
        let once = fuel_checksum(&input).unwrap();
        assert_eq!(once.to_lowercase(), input);
        assert_eq!(fuel_checksum(&once).unwrap(), once);
        assert!(fuel_checksum("0x1234").is_none());
    }
}
