//! hwid Core Library
//!
//! Tolerant hardware fingerprints for binding a license to a machine.
//!
//! # Features
//!
//! - **Collection**: Per-platform hardware characteristics (DMI, kenv, ioreg) with fallbacks
//! - **Encoding**: Fixed-seed obfuscation of each characteristic digest into a short part
//! - **Checksum**: Fixed-length suffix that catches corrupted or hand-edited fingerprints
//! - **Tolerance**: Positional partial matching so a few replaced components still validate
//!
//! # Module Structure
//!
//! - `codec/` - Subtractive generator, obfuscator, checksum
//! - `characteristics/` - Sources, sanitizing, fallbacks
//! - `fingerprint/` - Builder, comparator, `HardwareId` facade
//!
//! # Example
//!
//! ```no_run
//! use hwid_core::HardwareId;
//!
//! let hwid = HardwareId::for_current_platform();
//! let fingerprint = hwid.generate_fingerprint().unwrap();
//! println!("{}", fingerprint);
//! ```

// Grouped modules
pub mod characteristics;
pub mod codec;
pub mod fingerprint;

// Standalone modules
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod store;

// Re-export error types
pub use error::{HwidError, Result};

// Re-export configuration
pub use config::{get_config_path, load_config, load_config_or_default, FingerprintConfig};
pub use engine::{content_digest, ContentDigest, FingerprintEngine};

// Re-export encoding primitives
pub use codec::{ChecksumAppender, ChecksumGenerator, Obfuscator, SubtractiveGenerator};

// Re-export characteristic collection
pub use characteristics::{
    detect_platform_source, normalize, BsdSource, CharacteristicSet, CharacteristicSource,
    CharacteristicStream, FallbackProvider, GenericSource, LinuxSource, MacOsSource,
    PlatformFallback, PlatformKind, StaticSource,
};

// Re-export fingerprint types and operations
pub use fingerprint::{
    compare, is_partial_match, is_well_formed, BuildStage, Fingerprint, FingerprintBuilder,
    FingerprintMatch, HardwareId, VerificationReport,
};

// Re-export binding persistence
pub use store::{get_binding_path, load_binding, save_binding, BindingStore};

pub use constants::format::NO_HARDWARE_ID;
