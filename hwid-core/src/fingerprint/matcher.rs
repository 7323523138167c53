//! Tolerant fingerprint comparison
//!
//! Two fingerprints refer to the same machine when enough parts agree
//! position by position. The acceptance rule is `total / matching <= 2.1`,
//! kept in exactly that form: with an odd part count it does not reduce to a
//! fixed percentage.

use tracing::debug;

use crate::config::FingerprintConfig;
use crate::constants::format::{NO_HARDWARE_ID, SEPARATOR};
use crate::constants::matching::MAX_MISMATCH_RATIO;

/// Positional comparison of two fingerprints with equal segment counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintMatch {
    /// Encoded parts compared (checksum excluded)
    pub total_parts: usize,
    /// Parts equal at the same position
    pub matching_parts: usize,
}

impl FingerprintMatch {
    /// `total / matching`, `None` when nothing matched
    pub fn ratio(&self) -> Option<f64> {
        (self.matching_parts > 0).then(|| self.total_parts as f64 / self.matching_parts as f64)
    }

    pub fn is_accepted(&self) -> bool {
        self.ratio().map_or(false, |ratio| ratio <= MAX_MISMATCH_RATIO)
    }

    pub fn is_exact(&self) -> bool {
        self.total_parts > 0 && self.matching_parts == self.total_parts
    }
}

/// Compare part by part; `None` if the segment counts differ
pub fn compare(a: &str, b: &str) -> Option<FingerprintMatch> {
    let left: Vec<&str> = a.split(SEPARATOR).collect();
    let right: Vec<&str> = b.split(SEPARATOR).collect();
    if left.len() != right.len() {
        debug!(
            "Segment count mismatch: {} vs {}",
            left.len(),
            right.len()
        );
        return None;
    }

    let total_parts = left.len() - 1;
    let matching_parts = left
        .iter()
        .zip(&right)
        .take(total_parts)
        .filter(|(l, r)| l == r)
        .count();

    Some(FingerprintMatch {
        total_parts,
        matching_parts,
    })
}

/// Whether `a` and `b` identify the same machine despite partial changes
pub fn is_partial_match(a: &str, b: &str) -> bool {
    if a == NO_HARDWARE_ID || b == NO_HARDWARE_ID {
        return true;
    }
    match compare(a, b) {
        Some(m) => {
            let accepted = m.is_accepted();
            debug!(
                "Partial match: {}/{} parts equal, accepted={}",
                m.matching_parts, m.total_parts, accepted
            );
            accepted
        }
        None => false,
    }
}

/// Whether `candidate` has the shape `<part>(-<part>)*-<checksum>` over the alphabet
pub fn is_well_formed(candidate: &str, config: &FingerprintConfig) -> bool {
    let segments: Vec<&str> = candidate.split(SEPARATOR).collect();
    let Some((checksum, parts)) = segments.split_last() else {
        return false;
    };
    if parts.is_empty() || checksum.len() != config.checksum_length {
        return false;
    }
    if parts.iter().any(|part| part.len() != config.part_length) {
        return false;
    }
    candidate
        .chars()
        .filter(|c| *c != SEPARATOR)
        .all(|c| config.alphabet.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT: &str = "RY4F0M3M-Z3PCG0YS-BTCE74OR-KDSFKYRD-GOW0";

    #[test]
    fn test_four_part_boundaries() {
        // all four equal
        assert!(is_partial_match(CURRENT, CURRENT));
        // three equal, checksum differs
        assert!(is_partial_match(CURRENT, "RY4F0M3M-Z3PCG0YS-BTCE74OR-AAAAAAAA-ZZZZ"));
        // two equal
        assert!(is_partial_match(CURRENT, "RY4F0M3M-AAAAAAAA-BTCE74OR-BBBBBBBB-ZZZZ"));
        // one equal
        assert!(!is_partial_match(CURRENT, "RY4F0M3M-AAAAAAAA-CCCCCCCC-BBBBBBBB-ZZZZ"));
        // none equal
        assert!(!is_partial_match(CURRENT, "DDDDDDDD-AAAAAAAA-CCCCCCCC-BBBBBBBB-GOW0"));
    }

    #[test]
    fn test_positional_not_set_based() {
        assert!(!is_partial_match(CURRENT, "KDSFKYRD-BTCE74OR-Z3PCG0YS-RY4F0M3M-GOW0"));
    }

    #[test]
    fn test_segment_count_mismatch() {
        assert_eq!(compare(CURRENT, "RY4F0M3M-Z3PCG0YS-GOW0"), None);
        assert!(!is_partial_match(CURRENT, "RY4F0M3M-Z3PCG0YS-BTCE74OR-GOW0"));
    }

    #[test]
    fn test_odd_part_counts() {
        // 3 parts: 2/3 -> 1.5 accepted, 1/3 -> 3.0 rejected
        assert!(is_partial_match("AAAAAAAA-BBBBBBBB-CCCCCCCC-XXXX", "AAAAAAAA-BBBBBBBB-DDDDDDDD-YYYY"));
        assert!(!is_partial_match("AAAAAAAA-BBBBBBBB-CCCCCCCC-XXXX", "AAAAAAAA-EEEEEEEE-DDDDDDDD-YYYY"));
        // 5 parts: 2/5 -> 2.5 rejected, 3/5 -> 1.67 accepted
        let five = "AAAAAAAA-BBBBBBBB-CCCCCCCC-DDDDDDDD-EEEEEEEE-XXXX";
        assert!(!is_partial_match(five, "AAAAAAAA-BBBBBBBB-11111111-22222222-33333333-XXXX"));
        assert!(is_partial_match(five, "AAAAAAAA-BBBBBBBB-CCCCCCCC-22222222-33333333-XXXX"));
    }

    #[test]
    fn test_ratio() {
        let m = compare(CURRENT, "RY4F0M3M-AAAAAAAA-BTCE74OR-BBBBBBBB-ZZZZ").unwrap();
        assert_eq!(m.total_parts, 4);
        assert_eq!(m.matching_parts, 2);
        assert_eq!(m.ratio(), Some(2.0));
        assert!(!m.is_exact());
        assert!(compare(CURRENT, CURRENT).unwrap().is_exact());
    }

    #[test]
    fn test_single_segment_never_matches() {
        assert!(!is_partial_match("ABCD", "ABCD"));
    }

    #[test]
    fn test_sentinel_short_circuits() {
        assert!(is_partial_match(NO_HARDWARE_ID, CURRENT));
        assert!(is_partial_match(CURRENT, NO_HARDWARE_ID));
    }

    #[test]
    fn test_is_well_formed() {
        let config = FingerprintConfig::default();
        assert!(is_well_formed(CURRENT, &config));
        assert!(is_well_formed("Q6V23H6N-0SYQ", &config));
        assert!(!is_well_formed("Q6V23H6N", &config));
        assert!(!is_well_formed("Q6V23H6-0SYQ", &config));
        assert!(!is_well_formed("Q6V23H6N-0SY", &config));
        assert!(!is_well_formed("q6v23h6n-0SYQ", &config));
        assert!(!is_well_formed(NO_HARDWARE_ID, &config));
    }
}
