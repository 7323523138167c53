//! Fingerprint engine
//!
//! Bundles the validated configuration with the obfuscator and checksum
//! appender built from it. Construct once and share behind an `Arc`; nothing
//! inside is mutated after construction.

use md5::{Digest, Md5};
use std::sync::{Arc, OnceLock};

use crate::codec::{ChecksumAppender, ChecksumGenerator, Obfuscator};
use crate::config::FingerprintConfig;
use crate::error::Result;

/// Digest size of one characteristic
pub const DIGEST_LEN: usize = 16;

/// 128-bit content digest of a characteristic value
pub type ContentDigest = [u8; DIGEST_LEN];

/// PERFORMANCE: seeding the generator is the only non-trivial setup cost
static REFERENCE_ENGINE: OnceLock<Arc<FingerprintEngine>> = OnceLock::new();

/// Encoding machinery for one fingerprint configuration
#[derive(Debug)]
pub struct FingerprintEngine {
    config: FingerprintConfig,
    obfuscator: Obfuscator,
    appender: ChecksumAppender,
}

impl FingerprintEngine {
    /// Validate `config` and build the engine
    pub fn new(config: FingerprintConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Assemble the components of an already validated configuration
    fn build(config: FingerprintConfig) -> Self {
        let symbols = config.symbols();
        let generator = ChecksumGenerator::from_symbols(symbols.clone(), config.checksum_length);
        Self {
            obfuscator: Obfuscator::from_symbols(symbols),
            appender: ChecksumAppender::new(generator),
            config,
        }
    }

    /// Shared engine for the reference configuration
    pub fn reference() -> Arc<FingerprintEngine> {
        REFERENCE_ENGINE
            .get_or_init(|| Arc::new(FingerprintEngine::build(FingerprintConfig::default())))
            .clone()
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    pub fn obfuscator(&self) -> &Obfuscator {
        &self.obfuscator
    }

    pub fn appender(&self) -> &ChecksumAppender {
        &self.appender
    }

    /// Encode one characteristic value into a part
    pub fn encode_characteristic(&self, value: &str) -> Result<String> {
        self.obfuscator
            .encode(&content_digest(value), self.config.part_length)
    }
}

/// MD5 of the UTF-8 bytes of `value`
pub fn content_digest(value: &str) -> ContentDigest {
    Md5::digest(value.as_bytes()).into()
}
