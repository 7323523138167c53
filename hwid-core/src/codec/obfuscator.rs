//! Deterministic byte obfuscator
//!
//! XORs the input bytes against a pad drawn from a fixed-seed subtractive
//! generator and maps each result onto the alphabet. The seed is public, so
//! this hides digests from casual inspection and nothing more.

use tracing::trace;

use super::random::SubtractiveGenerator;
use crate::config::unique_symbols;
use crate::constants::codec::{DISCARDED_DRAWS, OBFUSCATOR_SEED};
use crate::error::{HwidError, Result};

/// Encodes byte strings into fixed-length alphabet strings
#[derive(Debug, Clone)]
pub struct Obfuscator {
    seeded: SubtractiveGenerator,
    symbols: Vec<u8>,
}

impl Obfuscator {
    /// Build an obfuscator; repeated alphabet symbols do not change the modulus
    pub fn new(alphabet: &str) -> Result<Self> {
        let symbols = unique_symbols(alphabet);
        if symbols.is_empty() {
            return Err(HwidError::invalid_argument("obfuscator alphabet is empty"));
        }
        Ok(Self::from_symbols(symbols))
    }

    pub(crate) fn from_symbols(symbols: Vec<u8>) -> Self {
        Self {
            seeded: SubtractiveGenerator::new(OBFUSCATOR_SEED),
            symbols,
        }
    }

    /// Pseudo-random pad of `length` bytes; identical on every call
    pub fn pad(&self, length: usize) -> Vec<u8> {
        let mut rng = self.seeded.clone();
        for _ in 0..DISCARDED_DRAWS {
            rng.next_sample();
        }
        (0..length).map(|_| rng.next_byte()).collect()
    }

    /// Encode `input` into exactly `output_length` alphabet symbols
    pub fn encode(&self, input: &[u8], output_length: usize) -> Result<String> {
        if output_length == 0 {
            return Ok(String::new());
        }
        if input.is_empty() {
            return Err(HwidError::invalid_argument("cannot encode an empty byte string"));
        }

        let modulus = self.symbols.len();
        let encoded: String = self
            .pad(output_length)
            .into_iter()
            .enumerate()
            .map(|(i, b)| {
                let mixed = b ^ input[i % input.len()];
                self.symbols[mixed as usize % modulus] as char
            })
            .collect();

        trace!("Encoded {} input bytes into {:?}", input.len(), encoded);
        Ok(encoded)
    }
}
