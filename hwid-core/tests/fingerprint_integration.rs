/*
 * Integration tests for hwid-core
 *
 * These exercise the public API the way a license checker uses it:
 * issue a fingerprint, persist it, then validate it after hardware changes.
 */

use hwid_core::{
    is_partial_match, load_binding, save_binding, BindingStore, CharacteristicSource,
    FallbackProvider, Fingerprint, FingerprintConfig, FingerprintEngine, HardwareId, HwidError,
    LinuxSource, Result, StaticSource, NO_HARDWARE_ID,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;

const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

struct FixedFallback(Vec<&'static str>);

impl FallbackProvider for FixedFallback {
    fn candidates(&self) -> Vec<String> {
        self.0.iter().map(|s| s.to_string()).collect()
    }

    fn host_name(&self) -> Option<String> {
        self.0.first().map(|s| s.to_string())
    }
}

struct BrokenSource;

impl CharacteristicSource for BrokenSource {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn characteristics(&self) -> Result<hwid_core::CharacteristicStream> {
        Err(HwidError::collection(self.name(), "dmidecode exited with status 1"))
    }
}

fn machine(values: &[&'static str]) -> HardwareId {
    HardwareId::new(
        FingerprintEngine::reference(),
        Box::new(StaticSource::new(values.iter().copied())),
        Box::new(FixedFallback(vec!["build-host-07", "x86_64", "6.8.0-45-generic"])),
    )
}

fn assert_format(fingerprint: &Fingerprint, parts: usize) {
    let segments: Vec<&str> = fingerprint.as_str().split('-').collect();
    assert_eq!(segments.len(), parts + 1);
    for part in &segments[..parts] {
        assert_eq!(part.len(), 8);
    }
    assert_eq!(segments[parts].len(), 4);
    assert!(fingerprint
        .as_str()
        .chars()
        .all(|c| c == '-' || ALPHABET.contains(c)));
}

#[test]
fn test_issue_and_revalidate() {
    let original = machine(&["cpu-model-A", "board-serial-B", "disk-serial-C", "uuid-D"]);
    let issued = original.generate_fingerprint().unwrap();
    assert_format(&issued, 4);
    assert!(original.is_checksum_valid(issued.as_str()));
    assert!(original.is_valid(issued.as_str()).unwrap());

    // Disk and board swapped out: two of four parts still agree
    let upgraded = machine(&["cpu-model-A", "board-serial-X", "disk-serial-Y", "uuid-D"]);
    assert!(upgraded.is_valid(issued.as_str()).unwrap());

    // A different machine sharing only the CPU model
    let other = machine(&["cpu-model-A", "board-serial-X", "disk-serial-Y", "uuid-Z"]);
    assert!(!other.is_valid(issued.as_str()).unwrap());
}

#[test]
fn test_fallback_padding_keeps_minimum_parts() {
    let sparse = machine(&["board-serial-B", "To be filled by OEM"]);
    let fingerprint = sparse.generate_fingerprint().unwrap();
    assert_format(&fingerprint, 4);

    let set = sparse.characteristics().unwrap();
    assert_eq!(
        set.values(),
        &["board-serial-B", "build-host-07", "x86_64", "6.8.0-45-generic"]
    );
}

#[test]
fn test_duplicate_source_values_are_stable() {
    let once = machine(&["a-trait", "b-trait", "c-trait", "d-trait"]);
    let twice = machine(&["a-trait", "a-trait", "b-trait", "c-trait", "b-trait", "d-trait"]);
    assert_eq!(
        once.generate_fingerprint().unwrap(),
        twice.generate_fingerprint().unwrap()
    );
}

#[test]
fn test_generation_is_deterministic() {
    let hwid = machine(&["a-trait", "b-trait", "c-trait", "d-trait", "e-trait"]);
    let first = hwid.generate_fingerprint().unwrap();
    let second = hwid.generate_fingerprint().unwrap();
    assert_eq!(first, second);
    assert_format(&first, 5);
}

#[test]
fn test_collection_failure_is_recoverable_error() {
    let hwid = HardwareId::new(
        FingerprintEngine::reference(),
        Box::new(BrokenSource),
        Box::new(FixedFallback(vec!["build-host-07"])),
    );
    let err = hwid.generate_fingerprint().unwrap_err();
    assert!(err.is_recoverable());
    assert!(hwid.is_valid("Q6V23H6N-0SYQ").is_err());

    // The sentinel never needs the machine
    assert!(hwid.is_valid(NO_HARDWARE_ID).unwrap());
}

#[test]
fn test_tampered_fingerprint_fails_checksum() {
    let hwid = machine(&["cpu-model-A", "board-serial-B", "disk-serial-C", "uuid-D"]);
    let issued = hwid.generate_fingerprint().unwrap();
    let s = issued.as_str();

    let mut tampered: Vec<char> = s.chars().collect();
    let last = tampered.len() - 1;
    tampered[last] = if tampered[last] == 'A' { 'B' } else { 'A' };
    let tampered: String = tampered.into_iter().collect();

    assert!(!hwid.is_checksum_valid(&tampered));
    // Parts untouched, so the fuzzy comparison alone still accepts it
    assert!(is_partial_match(&tampered, s));
    assert!(!hwid.verify(&tampered).unwrap().accepted);
}

#[test]
fn test_custom_configuration() {
    let config = FingerprintConfig {
        alphabet: "0123456789ABCDEF".to_string(),
        part_length: 6,
        checksum_length: 2,
    };
    let engine = Arc::new(FingerprintEngine::new(config).unwrap());
    let hwid = HardwareId::new(
        engine,
        Box::new(StaticSource::new(["a-trait", "b-trait", "c-trait", "d-trait"])),
        Box::new(FixedFallback(vec![])),
    );

    let fingerprint = hwid.generate_fingerprint().unwrap();
    let segments: Vec<&str> = fingerprint.as_str().split('-').collect();
    assert_eq!(segments.len(), 5);
    assert!(segments[..4].iter().all(|p| p.len() == 6));
    assert_eq!(segments[4].len(), 2);
    assert!(hwid.is_checksum_valid(fingerprint.as_str()));
    assert!(hwid.verify(fingerprint.as_str()).unwrap().well_formed);
}

#[test]
fn test_bound_fingerprint_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bound.json");
    let hwid = machine(&["cpu-model-A", "board-serial-B", "disk-serial-C", "uuid-D"]);

    let issued = hwid.generate_fingerprint().unwrap();
    save_binding(&path, &BindingStore::new(issued.clone())).unwrap();

    let stored = load_binding(&path).unwrap().unwrap();
    assert_eq!(stored.fingerprint, issued);
    assert!(hwid.verify(stored.fingerprint.as_str()).unwrap().accepted);
}

/// sysfs/procfs tree as seen by one user; `serials` adds the root-only files
fn linux_tree(root: &Path, serials: bool) -> HardwareId {
    let dmi = root.join("dmi");
    fs::create_dir_all(&dmi).unwrap();
    for (name, value) in [
        ("sys_vendor", "Dell Inc."),
        ("product_name", "Precision 5540"),
        ("board_vendor", "Dell Inc."),
        ("board_name", "0CND7N"),
    ] {
        fs::write(dmi.join(name), value).unwrap();
    }
    if serials {
        for (name, value) in [
            ("product_uuid", "4C4C4544-0042-3510-8051-B4C04F5A4B32"),
            ("board_serial", "/5KQ4Z23/CNCMK0009K00B8/"),
            ("product_serial", "5KQ4Z23"),
            ("chassis_serial", "5KQ4Z23"),
        ] {
            fs::write(dmi.join(name), value).unwrap();
        }
    }
    fs::write(
        root.join("cpuinfo"),
        "processor\t: 0\nmodel name\t: Intel(R) Core(TM) i7-9850H CPU @ 2.60GHz\n",
    )
    .unwrap();
    fs::write(root.join("machine-id"), "b08dfa6083e7567a1921a715000001fb\n").unwrap();

    HardwareId::new(
        FingerprintEngine::reference(),
        Box::new(
            LinuxSource::with_paths(&dmi, root.join("cpuinfo"))
                .with_machine_id_files([root.join("machine-id")]),
        ),
        Box::new(FixedFallback(vec!["build-host-07", "x86_64", "6.8.0-45-generic"])),
    )
}

#[test]
fn test_bind_as_root_check_as_user() {
    let root_view = tempfile::tempdir().unwrap();
    let user_view = tempfile::tempdir().unwrap();
    let as_root = linux_tree(root_view.path(), true);
    let as_user = linux_tree(user_view.path(), false);

    let issued = as_root.generate_fingerprint().unwrap();
    assert_format(&issued, 4);
    assert_eq!(as_user.generate_fingerprint().unwrap(), issued);
    assert!(as_user.is_valid(issued.as_str()).unwrap());
    assert!(as_user.verify(issued.as_str()).unwrap().accepted);
}
