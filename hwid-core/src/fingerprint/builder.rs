//! Fingerprint assembly
//!
//! idle -> collecting -> sanitizing -> encoding -> assembled, or failed from
//! any stage. A failure never yields a partial fingerprint.

use tracing::{debug, trace, warn};

use super::Fingerprint;
use crate::characteristics::{CharacteristicSet, CharacteristicSource, FallbackProvider};
use crate::constants::characteristics::{LAST_RESORT, MIN_UNIQUE};
use crate::constants::format::SEPARATOR;
use crate::engine::FingerprintEngine;
use crate::error::Result;

/// Stage of a single build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Idle,
    Collecting,
    Sanitizing,
    Encoding,
    Assembled,
    Failed,
}

/// Builds fingerprints from a source, a fallback provider and an engine
pub struct FingerprintBuilder<'a> {
    engine: &'a FingerprintEngine,
    source: &'a dyn CharacteristicSource,
    fallback: &'a dyn FallbackProvider,
    stage: BuildStage,
}

impl<'a> FingerprintBuilder<'a> {
    pub fn new(
        engine: &'a FingerprintEngine,
        source: &'a dyn CharacteristicSource,
        fallback: &'a dyn FallbackProvider,
    ) -> Self {
        Self {
            engine,
            source,
            fallback,
            stage: BuildStage::Idle,
        }
    }

    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    fn enter(&mut self, stage: BuildStage) {
        trace!("Fingerprint build: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Run the whole pipeline
    pub fn build(&mut self) -> Result<Fingerprint> {
        let result = self.run();
        match &result {
            Ok(fingerprint) => {
                self.enter(BuildStage::Assembled);
                debug!("Fingerprint assembled with {} parts", fingerprint.part_count());
            }
            Err(e) => {
                self.enter(BuildStage::Failed);
                warn!("Fingerprint generation failed: {}", e);
            }
        }
        result
    }

    fn run(&mut self) -> Result<Fingerprint> {
        let characteristics = self.collect()?;

        self.enter(BuildStage::Encoding);
        let parts = characteristics
            .iter()
            .map(|value| self.engine.encode_characteristic(value))
            .collect::<Result<Vec<_>>>()?;

        let payload = parts.join(&SEPARATOR.to_string());
        let combined = self.engine.appender().append(&payload)?;
        Ok(Fingerprint::new(combined))
    }

    /// Collect, sanitize, deduplicate and pad the characteristics
    pub fn collect(&mut self) -> Result<CharacteristicSet> {
        self.enter(BuildStage::Collecting);
        let raw: Vec<String> = self.source.characteristics()?.collect();
        debug!("Source {} produced {} raw values", self.source.name(), raw.len());

        self.enter(BuildStage::Sanitizing);
        let mut set = CharacteristicSet::new();
        set.extend(&raw);

        if set.len() < MIN_UNIQUE {
            let before = set.len();
            for candidate in self.fallback.candidates() {
                if set.is_full() {
                    break;
                }
                set.insert(&candidate);
            }
            debug!(
                "Added {} fallback characteristics ({} unique from source)",
                set.len() - before,
                before
            );
        }

        if set.is_empty() {
            let value = self
                .fallback
                .host_name()
                .unwrap_or_else(|| LAST_RESORT.to_string());
            warn!("No usable characteristics found, fingerprint bound to host name only");
            set.insert_normalized(value);
        }

        Ok(set)
    }
}
