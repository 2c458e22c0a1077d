//! Engine configuration types

use fieldkit_fields::{ContextPolicy, StoreKeys, DEFAULT_KEY_PREFIX, DEFAULT_SHARED_CONTEXTS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};

/// Default store root, relative to the working directory
pub const DEFAULT_STORE_ROOT: &str = ".fieldkit/data";

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub policy: PolicyConfig,
    pub store: StoreConfig,
    pub log: LogConfig,
}

impl EngineConfig {
    /// Check values figment cannot check by type alone
    pub fn validate(&self) -> ConfigResult<()> {
        let prefix = &self.store.key_prefix;
        if prefix.is_empty() {
            return Err(ConfigError::invalid_value(
                "store.key_prefix",
                "must not be empty",
            ));
        }
        if !prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::invalid_value(
                "store.key_prefix",
                format!("'{prefix}' may only contain ASCII letters, digits, '_' and '-'"),
            ));
        }
        if self.store.root.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value("store.root", "must not be empty"));
        }
        Ok(())
    }
}

/// Schema policy settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Glob patterns naming shared (partial and archive) contexts
    pub shared_contexts: Vec<String>,
}

impl PolicyConfig {
    pub fn context_policy(&self) -> ContextPolicy {
        ContextPolicy::new(&self.shared_contexts)
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            shared_contexts: DEFAULT_SHARED_CONTEXTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Store location and key layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub key_prefix: String,
}

impl StoreConfig {
    pub fn keys(&self) -> StoreKeys {
        StoreKeys::new(self.key_prefix.clone())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_STORE_ROOT),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives, e.g. `fieldkit_fields=debug`
    pub filter: Option<String>,
}
