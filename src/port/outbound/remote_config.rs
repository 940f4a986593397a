//! Remote configuration lookups.

/// Namespaced key/value configuration owned by another system.
pub trait RemoteConfig: Send + Sync {
    /// Value for `key` in `namespace`, or `None` if unset.
    fn get(&self, namespace: &str, key: &str) -> Option<String>;
}
