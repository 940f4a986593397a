use serde::Serialize;

use super::Backend;

/// A maker address or a security address belonging to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MakerAddress {
    pub id: i64,
    pub group_id: i64,
    pub backend: Backend,
    pub address: String,
}

/// A named group of maker addresses deployed in one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MakerAddressGroup {
    pub id: i64,
    pub group_name: String,
    pub env: String,
    pub addresses: Vec<MakerAddress>,
    pub security_addresses: Vec<MakerAddress>,
}

impl MakerAddressGroup {
    #[must_use]
    pub fn new(id: i64, group_name: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            id,
            group_name: group_name.into(),
            env: env.into(),
            addresses: Vec::new(),
            security_addresses: Vec::new(),
        }
    }
}
