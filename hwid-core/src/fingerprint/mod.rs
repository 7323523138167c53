//! Hardware fingerprints
//!
//! A fingerprint is `PART(-PART)*-CHECKSUM`: one encoded part per
//! characteristic, in collection order, followed by a checksum over
//! everything before it. `NO_HARDWARE_ID` stands in for "not bound to any
//! hardware" and passes every check.
//!
//! # Example
//!
//! ```no_run
//! use hwid_core::HardwareId;
//!
//! let hwid = HardwareId::for_current_platform();
//! let issued = hwid.generate_fingerprint().unwrap();
//!
//! // Later, possibly after a hardware change
//! assert!(hwid.is_checksum_valid(issued.as_str()));
//! assert!(hwid.is_valid(issued.as_str()).unwrap());
//! ```

pub mod builder;
pub mod matcher;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::characteristics::{
    detect_platform_source, CharacteristicSet, CharacteristicSource, FallbackProvider,
    PlatformFallback,
};
use crate::constants::format::{NO_HARDWARE_ID, SEPARATOR};
use crate::engine::FingerprintEngine;
use crate::error::Result;

pub use builder::{BuildStage, FingerprintBuilder};
pub use matcher::{compare, is_partial_match, is_well_formed, FingerprintMatch};

/// An issued or freshly generated fingerprint string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The "no hardware binding" value
    pub fn sentinel() -> Self {
        Self(NO_HARDWARE_ID.to_string())
    }

    pub fn is_sentinel(&self) -> bool {
        self.0 == NO_HARDWARE_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encoded parts, checksum excluded
    pub fn parts(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.0.split(SEPARATOR).collect();
        segments.pop();
        segments
    }

    pub fn part_count(&self) -> usize {
        self.0.matches(SEPARATOR).count()
    }

    /// Trailing checksum segment, if there is a separator at all
    pub fn checksum(&self) -> Option<&str> {
        self.0.rsplit_once(SEPARATOR).map(|(_, checksum)| checksum)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Outcome of validating a candidate against the current machine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub candidate: String,
    pub sentinel: bool,
    pub well_formed: bool,
    pub checksum_valid: bool,
    /// Segment-aligned comparison; `None` when counts differ or for the sentinel
    pub matching_parts: Option<usize>,
    pub total_parts: Option<usize>,
    pub accepted: bool,
}

/// Fingerprint generation and validation for one machine
pub struct HardwareId {
    engine: Arc<FingerprintEngine>,
    source: Box<dyn CharacteristicSource>,
    fallback: Box<dyn FallbackProvider>,
}

impl HardwareId {
    pub fn new(
        engine: Arc<FingerprintEngine>,
        source: Box<dyn CharacteristicSource>,
        fallback: Box<dyn FallbackProvider>,
    ) -> Self {
        Self {
            engine,
            source,
            fallback,
        }
    }

    /// Reference engine with the detected platform source
    pub fn for_current_platform() -> Self {
        Self::with_engine(FingerprintEngine::reference())
    }

    /// Given engine with the detected platform source
    pub fn with_engine(engine: Arc<FingerprintEngine>) -> Self {
        Self::new(
            engine,
            detect_platform_source(),
            Box::new(PlatformFallback::new()),
        )
    }

    pub fn engine(&self) -> &FingerprintEngine {
        &self.engine
    }

    fn builder(&self) -> FingerprintBuilder<'_> {
        FingerprintBuilder::new(&self.engine, self.source.as_ref(), self.fallback.as_ref())
    }

    /// Fingerprint of the current machine
    pub fn generate_fingerprint(&self) -> Result<Fingerprint> {
        self.builder().build()
    }

    /// Sanitized characteristics the fingerprint would be built from
    pub fn characteristics(&self) -> Result<CharacteristicSet> {
        self.builder().collect()
    }

    /// Whether `candidate` still matches this machine
    pub fn is_valid(&self, candidate: &str) -> Result<bool> {
        if candidate == NO_HARDWARE_ID {
            return Ok(true);
        }
        let current = self.generate_fingerprint()?;
        Ok(is_partial_match(candidate, current.as_str()))
    }

    pub fn is_partial_match(&self, a: &str, b: &str) -> bool {
        is_partial_match(a, b)
    }

    /// Whether the trailing checksum of `candidate` is intact
    pub fn is_checksum_valid(&self, candidate: &str) -> bool {
        candidate == NO_HARDWARE_ID || self.engine.appender().verify(candidate)
    }

    /// Full check: checksum intact and partial match against this machine
    pub fn verify(&self, candidate: &str) -> Result<VerificationReport> {
        if candidate == NO_HARDWARE_ID {
            return Ok(VerificationReport {
                candidate: candidate.to_string(),
                sentinel: true,
                well_formed: true,
                checksum_valid: true,
                matching_parts: None,
                total_parts: None,
                accepted: true,
            });
        }

        let current = self.generate_fingerprint()?;
        let comparison = compare(candidate, current.as_str());
        let checksum_valid = self.is_checksum_valid(candidate);
        let accepted = checksum_valid && comparison.map_or(false, |m| m.is_accepted());

        let report = VerificationReport {
            candidate: candidate.to_string(),
            sentinel: false,
            well_formed: is_well_formed(candidate, self.engine.config()),
            checksum_valid,
            matching_parts: comparison.map(|m| m.matching_parts),
            total_parts: comparison.map(|m| m.total_parts),
            accepted,
        };

        if report.accepted {
            debug!("Fingerprint accepted: {:?}", report);
        } else {
            info!(
                "Fingerprint rejected (checksum_valid={}, matching={:?}/{:?})",
                report.checksum_valid, report.matching_parts, report.total_parts
            );
        }
        Ok(report)
    }
}
