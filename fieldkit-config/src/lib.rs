//! fieldkit configuration management using Figment
//!
//! Loads the [`EngineConfig`] that tells the fieldkit engine where its store
//! lives, how store keys are prefixed, which contexts count as shared for
//! schema policy, and how verbosely to log.
//!
//! # Configuration Files
//!
//! - Global: `~/.fieldkit/fieldkit.{toml,yaml,yml,json}`
//! - Project: `./.fieldkit/fieldkit.{toml,yaml,yml,json}`
//!
//! ```toml
//! [policy]
//! shared_contexts = ["header.php", "footer-*.php", "archive*.php"]
//!
//! [store]
//! root = ".fieldkit/data"
//! key_prefix = "fieldkit"
//!
//! [log]
//! filter = "fieldkit_fields=debug"
//! ```
//!
//! # Environment Variables
//!
//! ```bash
//! export FIELDKIT_STORE__ROOT=/srv/content     # → store.root
//! export FIELDKIT_STORE__KEY_PREFIX=site       # → store.key_prefix
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use fieldkit_config::load_configuration;
//!
//! let config = load_configuration()?;
//! println!("store at {}", config.store.root.display());
//! # Ok::<(), fieldkit_config::ConfigError>(())
//! ```

pub mod discovery;
pub mod error;
pub mod provider;
pub mod types;

pub use discovery::{ConfigFile, ConfigFormat, ConfigScope, FileDiscovery, CONFIG_DIR_NAME};
pub use error::{ConfigError, ConfigResult};
pub use provider::{ConfigProvider, ENV_PREFIX};
pub use types::{EngineConfig, LogConfig, PolicyConfig, StoreConfig, DEFAULT_STORE_ROOT};

/// Load configuration from all discovered sources
pub fn load_configuration() -> ConfigResult<EngineConfig> {
    ConfigProvider::new().load()
}
