//! File-backed stores.
//!
//! One YAML file per key:
//!
//! ```text
//! <root>/
//!   options/<key>.yaml            ← FileStore
//!   documents/<doc>/<key>.yaml    ← FileMetaStore
//! ```
//!
//! Key and document ids are escaped into file names, so any string is a valid
//! key. Writes go to a temporary file in the same directory and are renamed
//! into place, so readers never see a half-written value.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::trace;
use ulid::Ulid;

use crate::error::{FieldsError, Result};
use crate::store::{DocumentMetaStore, Store};

const OPTIONS_DIR: &str = "options";
const DOCUMENTS_DIR: &str = "documents";

/// Require `root` to be an existing directory.
fn require_dir(root: &Path) -> Result<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(FieldsError::NotInitialized {
            path: root.to_path_buf(),
        })
    }
}

/// [`Store`] persisting each key as a YAML file under `<root>/options`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store under an existing root directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        require_dir(root)?;
        Ok(Self {
            dir: root.join(OPTIONS_DIR),
        })
    }

    /// Open a store, creating the root directory if needed.
    pub fn create(root: impl AsRef<Path>) -> Result<Self> {
        fs::create_dir_all(root.as_ref())?;
        Self::open(root)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.yaml", escape_component(key)))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        read_value(&self.path_for(key), key)
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        write_value(&path, &value)?;
        trace!(%key, path = %path.display(), "stored value");
        Ok(())
    }
}

/// [`DocumentMetaStore`] persisting each document's keys under
/// `<root>/documents/<doc>`.
#[derive(Debug, Clone)]
pub struct FileMetaStore {
    dir: PathBuf,
}

impl FileMetaStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        require_dir(root)?;
        Ok(Self {
            dir: root.join(DOCUMENTS_DIR),
        })
    }

    pub fn create(root: impl AsRef<Path>) -> Result<Self> {
        fs::create_dir_all(root.as_ref())?;
        Self::open(root)
    }

    fn document_dir(&self, document: &str) -> PathBuf {
        self.dir.join(escape_component(document))
    }
}

impl DocumentMetaStore for FileMetaStore {
    fn get(&self, document: &str, key: &str) -> Result<Option<Value>> {
        let path = self
            .document_dir(document)
            .join(format!("{}.yaml", escape_component(key)));
        read_value(&path, key)
    }

    fn put(&mut self, document: &str, key: &str, value: Value) -> Result<()> {
        let dir = self.document_dir(document);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.yaml", escape_component(key)));
        write_value(&path, &value)?;
        trace!(%document, %key, "stored document value");
        Ok(())
    }
}

fn read_value(path: &Path, key: &str) -> Result<Option<Value>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_yaml_ng::from_str::<Value>(&content)
        .map(Some)
        .map_err(|e| FieldsError::corrupt(key, e))
}

fn write_value(path: &Path, value: &Value) -> Result<()> {
    let yaml = serde_yaml_ng::to_string(value)?;
    atomic_write(path, yaml.as_bytes())
}

/// Write via a temp file in the same directory and rename into place.
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
    fs::write(&tmp, data)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Escape a key into a single file name component.
///
/// ASCII letters, digits, `_` and `-` are kept; every other byte becomes
/// `%XX`. The mapping is injective, so distinct keys never share a file.
fn escape_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
