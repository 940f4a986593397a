//! Remote configuration backed by the `[remote.<namespace>]` tables of the
//! config file.

use std::collections::HashMap;

use crate::port::RemoteConfig;

/// Fixed namespace/key/value map, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticRemoteConfig {
    namespaces: HashMap<String, HashMap<String, String>>,
}

impl StaticRemoteConfig {
    #[must_use]
    pub fn new(namespaces: HashMap<String, HashMap<String, String>>) -> Self {
        Self { namespaces }
    }

    /// Set one value, replacing any previous one.
    #[must_use]
    pub fn with(mut self, namespace: &str, key: &str, value: impl Into<String>) -> Self {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn namespaces(&self) -> usize {
        self.namespaces.len()
    }
}

impl RemoteConfig for StaticRemoteConfig {
    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        self.namespaces.get(namespace)?.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_scoped_by_namespace() {
        let config = StaticRemoteConfig::default()
            .with("base_config", "unisat_api_config", "{}")
            .with("other", "unisat_api_config", "[]");
        assert_eq!(config.get("base_config", "unisat_api_config").as_deref(), Some("{}"));
        assert_eq!(config.get("other", "unisat_api_config").as_deref(), Some("[]"));
        assert_eq!(config.get("base_config", "missing"), None);
        assert_eq!(config.get("missing", "unisat_api_config"), None);
        assert_eq!(config.namespaces(), 2);
    }
}
