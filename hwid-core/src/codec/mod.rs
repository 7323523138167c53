//! Encoding primitives
//!
//! - `random` - seeded subtractive generator
//! - `obfuscator` - digest to encoded part
//! - `checksum` - checksum generator and appender

pub mod checksum;
pub mod obfuscator;
pub mod random;

pub use checksum::{ChecksumAppender, ChecksumGenerator};
pub use obfuscator::Obfuscator;
pub use random::SubtractiveGenerator;
