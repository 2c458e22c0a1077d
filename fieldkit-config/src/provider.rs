//! Configuration provider using Figment

use crate::{
    discovery::{ConfigFile, ConfigFormat, ConfigScope, FileDiscovery},
    error::{ConfigError, ConfigResult},
    types::EngineConfig,
};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use std::path::PathBuf;
use tracing::{debug, trace};

/// Prefix for environment overrides; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "FIELDKIT_";

/// Loads [`EngineConfig`] from all sources.
///
/// Sources are merged in precedence order (later sources override earlier ones):
/// 1. Default values
/// 2. Discovered configuration files (global, then project)
/// 3. Explicit configuration files, in the order given
/// 4. Environment variables (`FIELDKIT_STORE__ROOT` → `store.root`)
///
/// Nothing is cached; every load reads the sources afresh.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvider {
    discovery: FileDiscovery,
    explicit_files: Vec<PathBuf>,
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific discovery, e.g. with fixed directories
    pub fn with_discovery(mut self, discovery: FileDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    /// Merge an explicitly named file above the discovered ones
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_files.push(path.into());
        self
    }

    /// Load and validate the engine configuration
    pub fn load(&self) -> ConfigResult<EngineConfig> {
        let config: EngineConfig = self.build_figment()?.extract()?;
        config.validate()?;
        debug!(
            store_root = %config.store.root.display(),
            key_prefix = %config.store.key_prefix,
            shared_contexts = config.policy.shared_contexts.len(),
            "loaded engine configuration"
        );
        Ok(config)
    }

    /// Build the figment with all sources in precedence order
    pub fn build_figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));

        for file in self.discovery.discover_all() {
            figment = figment.merge(self.load_config_file(&file));
        }

        for path in &self.explicit_files {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound { path: path.clone() });
            }
            let format = ConfigFormat::from_path(path)
                .ok_or_else(|| ConfigError::UnsupportedFormat { path: path.clone() })?;
            let file = ConfigFile::new(path.clone(), format, ConfigScope::Explicit);
            figment = figment.merge(self.load_config_file(&file));
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Provider for a single configuration file based on its format
    fn load_config_file(&self, config_file: &ConfigFile) -> Figment {
        trace!(
            path = %config_file.path.display(),
            format = ?config_file.format,
            scope = ?config_file.scope,
            "merging config file"
        );
        let path = &config_file.path;
        match config_file.format {
            ConfigFormat::Toml => Figment::from(Toml::file(path)),
            ConfigFormat::Yaml => Figment::from(Yaml::file(path)),
            ConfigFormat::Json => Figment::from(Json::file(path)),
        }
    }
}
