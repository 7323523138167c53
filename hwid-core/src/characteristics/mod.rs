//! Hardware characteristic collection
//!
//! A characteristic is one raw string describing a trait of the machine
//! (board serial, CPU model, platform UUID, ...). Sources produce them in a
//! stable order; this module cleans them up and bounds how many are kept.
//!
//! - `platform` - per-OS sources and runtime selection
//! - `fallback` - supplementary values used when a source yields too few

pub mod fallback;
pub mod platform;

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::trace;

use crate::constants::characteristics::{MAX_UNIQUE, MIN_VALUE_CHARS, PLACEHOLDERS};
use crate::engine::{content_digest, ContentDigest};
use crate::error::Result;

pub use fallback::{FallbackProvider, PlatformFallback};
pub use platform::{
    detect_platform_source, BsdSource, GenericSource, LinuxSource, MacOsSource, PlatformKind,
};

/// Lazily produced characteristic values; always drained completely
pub type CharacteristicStream = Box<dyn Iterator<Item = String> + Send>;

/// Capability: produce the raw characteristics of the current machine
#[cfg_attr(test, mockall::automock)]
pub trait CharacteristicSource: Send + Sync {
    /// Short identifier used in logs and errors
    fn name(&self) -> &'static str;

    /// Start collection. Errors here abort fingerprint generation.
    fn characteristics(&self) -> Result<CharacteristicStream>;
}

/// Source with a fixed list of values
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    values: Vec<String>,
}

impl StaticSource {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl CharacteristicSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    fn characteristics(&self) -> Result<CharacteristicStream> {
        Ok(Box::new(self.values.clone().into_iter()))
    }
}

fn unavailable_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)not\s+(available|specified)").ok())
        .as_ref()
}

/// Clean one raw value, or `None` if it carries no usable information
pub fn normalize(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let lower = value.to_lowercase();
    let unavailable = unavailable_pattern().map_or(false, |re| re.is_match(value));
    if unavailable || PLACEHOLDERS.contains(&lower.as_str()) {
        trace!("Dropping placeholder characteristic");
        return None;
    }

    if value.chars().count() < MIN_VALUE_CHARS {
        trace!("Dropping characteristic shorter than {} chars", MIN_VALUE_CHARS);
        return None;
    }

    Some(value.to_string())
}

/// Ordered characteristics, unique by content digest, capped in size
#[derive(Debug, Clone, Default)]
pub struct CharacteristicSet {
    values: Vec<String>,
    digests: HashSet<ContentDigest>,
}

impl CharacteristicSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize and add `raw`; returns false if it was dropped, seen, or the set is full
    pub fn insert(&mut self, raw: &str) -> bool {
        if self.is_full() {
            return false;
        }
        let Some(value) = normalize(raw) else {
            return false;
        };
        self.insert_normalized(value)
    }

    /// Add a value without normalizing it
    pub(crate) fn insert_normalized(&mut self, value: String) -> bool {
        if self.is_full() || !self.digests.insert(content_digest(&value)) {
            return false;
        }
        self.values.push(value);
        true
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() >= MAX_UNIQUE
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> Extend<S> for CharacteristicSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        for raw in iter {
            self.insert(raw.as_ref());
        }
    }
}
