//! Chain family tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Chain family a chain row belongs to.
///
/// Stored as a small integer in the backing store. Codes outside the known
/// range still load as [`Backend::Unrecognized`] so a single bad row cannot
/// block the registry; the RPC factory then rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Backend {
    Evm,
    Starknet,
    Solana,
    Bitcoin,
    ZksyncLite,
    Ton,
    Cosmos,
    Benfen,
    Sui,
    Fuel,
    Unrecognized(i32),
}

impl Backend {
    /// Every known backend, in code order.
    pub const KNOWN: [Backend; 10] = [
        Backend::Evm,
        Backend::Starknet,
        Backend::Solana,
        Backend::Bitcoin,
        Backend::ZksyncLite,
        Backend::Ton,
        Backend::Cosmos,
        Backend::Benfen,
        Backend::Sui,
        Backend::Fuel,
    ];

    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Backend::Evm,
            2 => Backend::Starknet,
            3 => Backend::Solana,
            4 => Backend::Bitcoin,
            5 => Backend::ZksyncLite,
            6 => Backend::Ton,
            7 => Backend::Cosmos,
            8 => Backend::Benfen,
            9 => Backend::Sui,
            10 => Backend::Fuel,
            other => Backend::Unrecognized(other),
        }
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Backend::Evm => 1,
            Backend::Starknet => 2,
            Backend::Solana => 3,
            Backend::Bitcoin => 4,
            Backend::ZksyncLite => 5,
            Backend::Ton => 6,
            Backend::Cosmos => 7,
            Backend::Benfen => 8,
            Backend::Sui => 9,
            Backend::Fuel => 10,
            Backend::Unrecognized(code) => code,
        }
    }

    /// Whether addresses on this backend are hex strings that compare
    /// case-insensitively.
    #[must_use]
    pub const fn has_case_insensitive_addresses(self) -> bool {
        matches!(
            self,
            Backend::Evm | Backend::Starknet | Backend::ZksyncLite | Backend::Fuel
        )
    }

    /// Normalize an address for use as a cache key. Never used for the value
    /// sent on the wire.
    #[must_use]
    pub fn address_key(self, address: &str) -> String {
        let trimmed = address.trim();
        if self.has_case_insensitive_addresses() {
            trimmed.to_lowercase()
        } else {
            trimmed.to_string()
        }
    }
}

impl From<i32> for Backend {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl From<Backend> for i32 {
    fn from(backend: Backend) -> Self {
        backend.code()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Evm => write!(f, "evm"),
            Backend::Starknet => write!(f, "starknet"),
            Backend::Solana => write!(f, "solana"),
            Backend::Bitcoin => write!(f, "bitcoin"),
            Backend::ZksyncLite => write!(f, "zksync-lite"),
            Backend::Ton => write!(f, "ton"),
            Backend::Cosmos => write!(f, "cosmos"),
            Backend::Benfen => write!(f, "benfen"),
            Backend::Sui => write!(f, "sui"),
            Backend::Fuel => write!(f, "fuel"),
            Backend::Unrecognized(code) => write!(f, "unrecognized({code})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_for_known_backends() {
        for backend in Backend::KNOWN {
            assert_eq!(Backend::from_code(backend.code()), backend);
        }
    }

    #[test]
    fn unknown_code_is_kept() {
        let backend = Backend::from_code(77);
        assert_eq!(backend, Backend::Unrecognized(77));
        assert_eq!(backend.code(), 77);
    }

    #[test]
    fn address_key_respects_case_rules() {
        assert_eq!(Backend::Evm.address_key(" 0xAbC "), "0xabc");
        assert_eq!(
            Backend::Solana.address_key("So11111111111111111111111111111111111111112"),
            "So11111111111111111111111111111111111111112"
        );
    }
}
