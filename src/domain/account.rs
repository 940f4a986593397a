use serde::Serialize;

/// An internal account bound to one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: i64,
    pub chain_info_id: i64,
    /// Trimmed address as stored. Indexes use the lowercased form.
    pub address: String,
}
