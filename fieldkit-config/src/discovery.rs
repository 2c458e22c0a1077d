//! Configuration file discovery
//!
//! Finds fieldkit configuration files in the global (`~/.fieldkit/`) and
//! project (`./.fieldkit/`) directories. Files are returned lowest priority
//! first so that figment merges later files over earlier ones.

use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Name of the configuration directory in both scopes
pub const CONFIG_DIR_NAME: &str = ".fieldkit";

/// Accepted configuration file names, in merge order within one directory
const CONFIG_FILE_NAMES: [&str; 4] = [
    "fieldkit.toml",
    "fieldkit.yaml",
    "fieldkit.yml",
    "fieldkit.json",
];

/// A discovered configuration file with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Full path to the configuration file
    pub path: PathBuf,
    /// Detected format of the file
    pub format: ConfigFormat,
    /// Where the file was found
    pub scope: ConfigScope,
    /// Priority for ordering (higher values take precedence)
    pub priority: u8,
}

impl ConfigFile {
    pub fn new(path: PathBuf, format: ConfigFormat, scope: ConfigScope) -> Self {
        let priority = scope.priority();
        Self {
            path,
            format,
            scope,
            priority,
        }
    }
}

/// Configuration file format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Where a configuration file was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// `~/.fieldkit/`
    Global,
    /// `./.fieldkit/`
    Project,
    /// A file named explicitly by the caller
    Explicit,
}

impl ConfigScope {
    /// Priority value for this scope (higher values override lower ones)
    pub fn priority(self) -> u8 {
        match self {
            Self::Global => 10,
            Self::Project => 20,
            Self::Explicit => 30,
        }
    }
}

/// File discovery service for finding configuration files
#[derive(Debug, Clone, Default)]
pub struct FileDiscovery {
    /// Project configuration directory; resolved from the current directory when unset
    project_dir: Option<PathBuf>,
    /// Global configuration directory; resolved from the home directory when unset
    global_dir: Option<PathBuf>,
}

impl FileDiscovery {
    /// Discovery that resolves both directories when [`discover_all`](Self::discover_all) runs
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovery over fixed directories
    pub fn with_directories(project_dir: Option<PathBuf>, global_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            global_dir,
        }
    }

    /// Discover all configuration files, lowest priority first
    pub fn discover_all(&self) -> Vec<ConfigFile> {
        let project_dir = self.project_dir.clone().or_else(Self::resolve_project_dir);
        let global_dir = self.global_dir.clone().or_else(Self::resolve_global_dir);

        let mut files = Vec::new();
        if let Some(ref dir) = global_dir {
            files.extend(self.search_directory(dir, ConfigScope::Global));
        }
        if let Some(ref dir) = project_dir {
            files.extend(self.search_directory(dir, ConfigScope::Project));
        }

        // Stable sort keeps file-name order within a scope
        files.sort_by_key(|f| f.priority);

        debug!(count = files.len(), "discovered configuration files");
        for file in &files {
            trace!(path = %file.path.display(), format = ?file.format, "found config");
        }
        files
    }

    /// Search a single directory for configuration files
    fn search_directory(&self, dir: &Path, scope: ConfigScope) -> Vec<ConfigFile> {
        if !dir.exists() {
            debug!(dir = %dir.display(), "config directory does not exist");
            return Vec::new();
        }
        if !dir.is_dir() {
            warn!(path = %dir.display(), "config path exists but is not a directory");
            return Vec::new();
        }

        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .filter(|candidate| candidate.is_file())
            .filter_map(|candidate| {
                let format = ConfigFormat::from_path(&candidate)?;
                Some(ConfigFile::new(candidate, format, scope))
            })
            .collect()
    }

    /// `./.fieldkit/` if it exists
    fn resolve_project_dir() -> Option<PathBuf> {
        let dir = std::env::current_dir().ok()?.join(CONFIG_DIR_NAME);
        dir.is_dir().then_some(dir)
    }

    /// `~/.fieldkit/` if it exists
    fn resolve_global_dir() -> Option<PathBuf> {
        let dir = dirs::home_dir()?.join(CONFIG_DIR_NAME);
        dir.is_dir().then_some(dir)
    }
}
