//! Bound fingerprint persistence
//!
//! Keeps the fingerprint a license was issued against, so later checks can
//! validate it without the caller passing it in.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::paths;
use crate::error::{HwidError, Result};
use crate::fingerprint::Fingerprint;

/// On-disk record of a bound fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingStore {
    pub version: u32,
    pub fingerprint: Fingerprint,
    /// Unix epoch seconds
    #[serde(default)]
    pub created_at: u64,
}

impl BindingStore {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(fingerprint: Fingerprint) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            fingerprint,
            created_at: current_timestamp(),
        }
    }
}

/// Get the path to the default binding store
pub fn get_binding_path() -> PathBuf {
    paths::user_config_dir()
        .unwrap_or_else(|| PathBuf::from(".").join(paths::CONFIG_DIR_NAME))
        .join(paths::BINDING_FILE)
}

/// Load a binding; `Ok(None)` if the file does not exist
pub fn load_binding(path: &Path) -> Result<Option<BindingStore>> {
    if !path.exists() {
        debug!("No binding file at {:?}", path);
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|e| HwidError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let store: BindingStore = serde_json::from_str(&contents)?;

    if store.version > BindingStore::CURRENT_VERSION {
        return Err(HwidError::config(format!(
            "binding file {:?} has unsupported version {}",
            path, store.version
        )));
    }

    Ok(Some(store))
}

/// Save a binding atomically (temp file, fsync, rename)
pub fn save_binding(path: &Path, store: &BindingStore) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(store)?;
    let temp_path = path.with_extension("json.tmp");

    let mut file = fs::File::create(&temp_path)
        .map_err(|e| HwidError::FileWrite { path: temp_path.clone(), source: e })?;

    file.write_all(json.as_bytes())
        .map_err(|e| HwidError::FileWrite { path: temp_path.clone(), source: e })?;

    file.sync_all()
        .map_err(|e| HwidError::FileWrite { path: temp_path.clone(), source: e })?;

    drop(file);

    fs::rename(&temp_path, path)
        .map_err(|e| HwidError::FileWrite { path: path.to_path_buf(), source: e })?;

    info!("Saved fingerprint binding to {:?}", path);
    Ok(())
}

fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
