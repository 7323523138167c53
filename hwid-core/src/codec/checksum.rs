//! Checksum generation and the payload/checksum combiner

use tracing::debug;

use crate::config::unique_symbols;
use crate::constants::format::SEPARATOR;
use crate::error::{HwidError, Result};

/// Maps arbitrary byte strings to a fixed-length alphabet checksum
#[derive(Debug, Clone)]
pub struct ChecksumGenerator {
    symbols: Vec<u8>,
    length: usize,
}

impl ChecksumGenerator {
    /// Build a generator; repeated alphabet symbols do not change the modulus
    pub fn new(alphabet: &str, length: usize) -> Result<Self> {
        let symbols = unique_symbols(alphabet);
        if symbols.is_empty() {
            return Err(HwidError::invalid_argument("checksum alphabet is empty"));
        }
        if length == 0 {
            return Err(HwidError::invalid_argument("checksum length must be positive"));
        }
        Ok(Self::from_symbols(symbols, length))
    }

    pub(crate) fn from_symbols(symbols: Vec<u8>, length: usize) -> Self {
        Self { symbols, length }
    }

    /// Checksum length in characters
    pub fn length(&self) -> usize {
        self.length
    }

    /// Checksum of `bytes`
    pub fn checksum(&self, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(HwidError::invalid_argument("cannot checksum an empty byte string"));
        }
        let modulus = self.symbols.len();
        Ok(self
            .resize(bytes)
            .into_iter()
            .map(|b| self.symbols[b as usize % modulus] as char)
            .collect())
    }

    /// XOR-fold long inputs, cycle short ones, pass exact ones through
    fn resize(&self, bytes: &[u8]) -> Vec<u8> {
        let len = self.length;
        if bytes.len() > len {
            let mut folded = vec![0u8; len];
            for (i, b) in bytes.iter().enumerate() {
                folded[i % len] ^= b;
            }
            folded
        } else if bytes.len() < len {
            (0..len).map(|i| bytes[i % bytes.len()]).collect()
        } else {
            bytes.to_vec()
        }
    }
}

/// Appends a checksum to a payload and verifies the result
#[derive(Debug, Clone)]
pub struct ChecksumAppender {
    generator: ChecksumGenerator,
}

impl ChecksumAppender {
    pub fn new(generator: ChecksumGenerator) -> Self {
        Self { generator }
    }

    /// `payload` + separator + checksum(payload)
    pub fn append(&self, payload: &str) -> Result<String> {
        if payload.is_empty() {
            return Err(HwidError::invalid_argument("payload must not be empty"));
        }
        let checksum = self.generator.checksum(payload.as_bytes())?;
        Ok(format!("{}{}{}", payload, SEPARATOR, checksum))
    }

    /// Whether `combined` ends with the checksum of its own prefix
    pub fn verify(&self, combined: &str) -> bool {
        let suffix = self.generator.length() + SEPARATOR.len_utf8();
        let Some(prefix_len) = combined.len().checked_sub(suffix).filter(|n| *n > 0) else {
            debug!("Checksum verification failed: input too short");
            return false;
        };
        let Some(payload) = combined.get(..prefix_len) else {
            return false;
        };

        match self.append(payload) {
            Ok(expected) => expected == combined,
            Err(_) => false,
        }
    }
}
