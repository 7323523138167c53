//! Engine configuration
//!
//! The reference configuration reproduces the legacy fingerprint format. A
//! JSON file may override it, which only makes sense for deployments that
//! issue their own fingerprints.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{format, paths};
use crate::error::{HwidError, Result};

/// Parameters shared by the obfuscator, the checksum generator and the comparator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Output symbols; duplicates are ignored after their first occurrence
    pub alphabet: String,
    /// Characters per encoded part
    pub part_length: usize,
    /// Characters in the trailing checksum
    pub checksum_length: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            alphabet: format::ALPHABET.to_string(),
            part_length: format::PART_LENGTH,
            checksum_length: format::CHECKSUM_LENGTH,
        }
    }
}

impl FingerprintConfig {
    /// Reject configurations that could not produce a parseable fingerprint
    pub fn validate(&self) -> Result<()> {
        if self.alphabet.is_empty() {
            return Err(HwidError::invalid_config("alphabet", "must not be empty"));
        }
        if let Some(c) = self
            .alphabet
            .chars()
            .find(|c| !c.is_ascii_graphic() || *c == format::SEPARATOR)
        {
            return Err(HwidError::invalid_config(
                "alphabet",
                format!("symbol {:?} is not allowed", c),
            ));
        }
        if unique_symbols(&self.alphabet).len() > 256 {
            return Err(HwidError::invalid_config(
                "alphabet",
                "more than 256 unique symbols",
            ));
        }
        if self.part_length == 0 {
            return Err(HwidError::invalid_config("part_length", "must be positive"));
        }
        if self.checksum_length == 0 {
            return Err(HwidError::invalid_config(
                "checksum_length",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Alphabet with repeated symbols removed, first occurrence wins
    pub fn symbols(&self) -> Vec<u8> {
        unique_symbols(&self.alphabet)
    }
}

/// Deduplicate an alphabet while keeping first-seen order
pub(crate) fn unique_symbols(alphabet: &str) -> Vec<u8> {
    let mut seen = HashSet::new();
    alphabet.bytes().filter(|b| seen.insert(*b)).collect()
}

/// Get the path to the user's config file
pub fn get_config_path() -> PathBuf {
    paths::user_config_dir()
        .unwrap_or_else(|| PathBuf::from(".").join(paths::CONFIG_DIR_NAME))
        .join(paths::CONFIG_FILE)
}

/// Load and validate a configuration file
pub fn load_config(path: &Path) -> Result<FingerprintConfig> {
    let contents = fs::read_to_string(path).map_err(|e| HwidError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: FingerprintConfig = serde_json::from_str(&contents)?;
    config.validate()?;

    info!("Loaded fingerprint configuration from {:?}", path);
    Ok(config)
}

/// Load the user's config file, or the reference configuration if there is none
pub fn load_config_or_default() -> Result<FingerprintConfig> {
    let path = get_config_path();
    if !path.exists() {
        debug!("No config file at {:?}, using reference configuration", path);
        return Ok(FingerprintConfig::default());
    }
    load_config(&path)
}
