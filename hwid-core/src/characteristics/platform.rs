//! Platform characteristic sources
//!
//! - Linux: world-readable DMI attributes, /proc/cpuinfo and the machine id
//! - BSD: kenv SMBIOS keys and sysctl
//! - macOS: ioreg platform expert device and sysctl
//! - Generic: yields nothing, so the builder relies on fallbacks
//!
//! The source is picked once at startup by `detect_platform_source`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, trace};

use super::{CharacteristicSource, CharacteristicStream};
use crate::constants::paths;
use crate::error::{HwidError, Result};

/// DMI attribute pairs read on Linux, in fingerprint order
///
/// Only world-readable attributes are used. The serial and UUID files are
/// root-only on most distributions, so reading them would make the
/// fingerprint depend on the invoking user.
const LINUX_DMI_PAIRS: &[(&str, &str)] = &[
    ("sys_vendor", "product_name"),
    ("board_vendor", "board_name"),
];

/// kenv keys read on BSD, in fingerprint order
const BSD_KENV_KEYS: &[&str] = &[
    "smbios.system.uuid",
    "smbios.planar.serial",
    "smbios.system.serial",
    "smbios.chassis.serial",
];

/// Operating system family the process runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    Linux,
    Bsd,
    MacOs,
    Generic,
}

impl PlatformKind {
    /// Family of the compilation target
    pub fn detect() -> Self {
        if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(any(
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "netbsd",
            target_os = "dragonfly"
        )) {
            Self::Bsd
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Generic
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linux => write!(f, "Linux"),
            Self::Bsd => write!(f, "BSD"),
            Self::MacOs => write!(f, "macOS"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// Source for the platform this process runs on
pub fn detect_platform_source() -> Box<dyn CharacteristicSource> {
    let kind = PlatformKind::detect();
    debug!("Using {} characteristic source", kind);
    match kind {
        PlatformKind::Linux => Box::new(LinuxSource::new()),
        PlatformKind::Bsd => Box::new(BsdSource),
        PlatformKind::MacOs => Box::new(MacOsSource),
        PlatformKind::Generic => Box::new(GenericSource),
    }
}

// ============================================================================
// Linux
// ============================================================================

/// Reads DMI attributes from sysfs, the CPU model from procfs and the
/// install-time machine id
#[derive(Debug, Clone)]
pub struct LinuxSource {
    dmi_dir: PathBuf,
    cpuinfo: PathBuf,
    machine_id_files: Vec<PathBuf>,
}

impl Default for LinuxSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LinuxSource {
    pub fn new() -> Self {
        Self::with_paths(paths::DMI_ID_DIR, paths::CPUINFO)
            .with_machine_id_files(paths::MACHINE_ID_FILES.iter().copied())
    }

    /// Read from alternative locations (used by tests and chroots)
    ///
    /// No machine id is read until `with_machine_id_files` is called.
    pub fn with_paths(dmi_dir: impl Into<PathBuf>, cpuinfo: impl Into<PathBuf>) -> Self {
        Self {
            dmi_dir: dmi_dir.into(),
            cpuinfo: cpuinfo.into(),
            machine_id_files: Vec::new(),
        }
    }

    /// Machine id candidates, first readable one wins
    pub fn with_machine_id_files<P: Into<PathBuf>>(
        mut self,
        files: impl IntoIterator<Item = P>,
    ) -> Self {
        self.machine_id_files = files.into_iter().map(Into::into).collect();
        self
    }
}

impl CharacteristicSource for LinuxSource {
    fn name(&self) -> &'static str {
        "linux-dmi"
    }

    fn characteristics(&self) -> Result<CharacteristicStream> {
        if !self.dmi_dir.is_dir() && !self.cpuinfo.is_file() {
            return Err(HwidError::collection(
                self.name(),
                format!(
                    "neither {:?} nor {:?} is available",
                    self.dmi_dir, self.cpuinfo
                ),
            ));
        }

        let dmi_dir = self.dmi_dir.clone();
        let cpuinfo = self.cpuinfo.clone();
        let machine_id_files = self.machine_id_files.clone();

        let dmi = LINUX_DMI_PAIRS
            .iter()
            .filter_map(move |(vendor, name)| read_joined(&dmi_dir, vendor, name));
        let cpu = std::iter::once_with(move || read_cpu_model(&cpuinfo)).flatten();
        let machine_id = std::iter::once_with(move || {
            machine_id_files.iter().find_map(|path| read_trimmed(path))
        })
        .flatten();

        Ok(Box::new(dmi.chain(cpu).chain(machine_id)))
    }
}

/// Two DMI attributes joined, e.g. "Micro-Star International MS-7C02"
fn read_joined(dmi_dir: &Path, first: &str, second: &str) -> Option<String> {
    let first = read_trimmed(&dmi_dir.join(first)).unwrap_or_default();
    let second = read_trimmed(&dmi_dir.join(second)).unwrap_or_default();
    let combined = format!("{} {}", first, second).trim().to_string();
    (!combined.is_empty()).then_some(combined)
}

fn read_cpu_model(cpuinfo: &Path) -> Option<String> {
    let contents = fs::read_to_string(cpuinfo).ok()?;
    contents
        .lines()
        .find(|line| line.to_ascii_lowercase().starts_with("model name"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, model)| model.trim().to_string())
        .filter(|model| !model.is_empty())
}

/// Trimmed file contents, `None` if unreadable or blank
pub(crate) fn read_trimmed(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Err(e) => {
            trace!("Skipping {:?}: {}", path, e);
            None
        }
    }
}

// ============================================================================
// BSD
// ============================================================================

/// Reads SMBIOS data through kenv and the CPU model through sysctl
#[derive(Debug, Clone, Copy, Default)]
pub struct BsdSource;

impl CharacteristicSource for BsdSource {
    fn name(&self) -> &'static str {
        "bsd-kenv"
    }

    fn characteristics(&self) -> Result<CharacteristicStream> {
        let mut values = Vec::new();
        for key in BSD_KENV_KEYS {
            let value = command_output("kenv", &[key])
                .map_err(|e| HwidError::collection(self.name(), format!("kenv: {}", e)))?;
            values.extend(value);
        }

        let maker = command_output("kenv", &["smbios.planar.maker"]).ok().flatten();
        let product = command_output("kenv", &["smbios.planar.product"]).ok().flatten();
        if let (Some(maker), Some(product)) = (maker, product) {
            values.push(format!("{} {}", maker, product));
        }

        values.extend(command_output("sysctl", &["-n", "hw.model"]).ok().flatten());
        Ok(Box::new(values.into_iter()))
    }
}

// ============================================================================
// macOS
// ============================================================================

/// Reads the platform UUID and serial from ioreg
#[derive(Debug, Clone, Copy, Default)]
pub struct MacOsSource;

impl CharacteristicSource for MacOsSource {
    fn name(&self) -> &'static str {
        "macos-ioreg"
    }

    fn characteristics(&self) -> Result<CharacteristicStream> {
        let registry = command_output("ioreg", &["-rd1", "-c", "IOPlatformExpertDevice"])
            .map_err(|e| HwidError::collection(self.name(), format!("ioreg: {}", e)))?
            .unwrap_or_default();

        let mut values: Vec<String> = ["IOPlatformUUID", "IOPlatformSerialNumber"]
            .iter()
            .filter_map(|key| ioreg_value(&registry, key))
            .collect();

        values.extend(
            command_output("sysctl", &["-n", "machdep.cpu.brand_string"])
                .ok()
                .flatten(),
        );
        Ok(Box::new(values.into_iter()))
    }
}

/// Value of `"key" = "value"` in ioreg output
fn ioreg_value(registry: &str, key: &str) -> Option<String> {
    let quoted = format!("\"{}\"", key);
    registry
        .lines()
        .find(|line| line.contains(&quoted))
        .and_then(|line| line.split_once('='))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

// ============================================================================
// Generic
// ============================================================================

/// Source for platforms without a dedicated implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericSource;

impl CharacteristicSource for GenericSource {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn characteristics(&self) -> Result<CharacteristicStream> {
        Ok(Box::new(std::iter::empty()))
    }
}

/// Trimmed stdout of a command; `Err` only if it could not be spawned
pub(crate) fn command_output(program: &str, args: &[&str]) -> io::Result<Option<String>> {
    let output = Command::new(program).args(args).output()?;
    if !output.status.success() {
        return Ok(None);
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok((!stdout.is_empty()).then_some(stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    fn linux_machine(root: &Path) -> LinuxSource {
        let dmi = root.join("dmi");
        fs::create_dir(&dmi).unwrap();
        write(&dmi, "sys_vendor", "Micro-Star International Co., Ltd.\n");
        write(&dmi, "product_name", "MS-7C02\n");
        write(&dmi, "board_vendor", "Micro-Star International\n");
        write(&dmi, "board_name", "MS-7C02\n");
        write(
            root,
            "cpuinfo",
            "processor\t: 0\nmodel name\t: Intel(R) Core(TM) i7-9750H\n",
        );
        write(root, "machine-id", "3f1c0a9e5b2d4c6f8e7a9b0c1d2e3f40\n");
        LinuxSource::with_paths(&dmi, root.join("cpuinfo"))
            .with_machine_id_files([root.join("missing-id"), root.join("machine-id")])
    }

    #[test]
    fn test_linux_source_reads_fields_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = linux_machine(dir.path());
        let values: Vec<String> = source.characteristics().unwrap().collect();
        assert_eq!(
            values,
            vec![
                "Micro-Star International Co., Ltd. MS-7C02",
                "Micro-Star International MS-7C02",
                "Intel(R) Core(TM) i7-9750H",
                "3f1c0a9e5b2d4c6f8e7a9b0c1d2e3f40",
            ]
        );
    }

    #[test]
    fn test_linux_source_ignores_root_only_attributes() {
        let dir = tempfile::tempdir().unwrap();
        let source = linux_machine(dir.path());
        let unprivileged: Vec<String> = source.characteristics().unwrap().collect();

        let dmi = dir.path().join("dmi");
        write(&dmi, "product_uuid", "4C4C4544-0042-3510-8051-B4C04F5A4B32\n");
        write(&dmi, "board_serial", "PF2ABCDE\n");
        write(&dmi, "product_serial", "9S7-7C0211-012\n");
        write(&dmi, "chassis_serial", "CH0000001\n");
        let privileged: Vec<String> = source.characteristics().unwrap().collect();

        assert_eq!(privileged, unprivileged);
    }

    #[test]
    fn test_linux_source_without_machine_id() {
        let dir = tempfile::tempdir().unwrap();
        let dmi = dir.path().join("dmi");
        fs::create_dir(&dmi).unwrap();
        write(&dmi, "board_name", "MS-7C02\n");
        let source = LinuxSource::with_paths(&dmi, dir.path().join("cpuinfo"));
        let values: Vec<String> = source.characteristics().unwrap().collect();
        assert_eq!(values, vec!["MS-7C02"]);
    }

    #[test]
    fn test_linux_source_missing_roots_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = LinuxSource::with_paths(dir.path().join("nope"), dir.path().join("nada"));
        let err = source.characteristics().err().unwrap();
        assert!(matches!(err, HwidError::CollectionFailure { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_ioreg_value() {
        let registry = r#"
    | "IOPlatformSerialNumber" = "C02XL0GZJGH5"
    | "IOPlatformUUID" = "5A2D9C11-7B1E-4F3A-9D2B-2B6F0E8C1A77"
"#;
        assert_eq!(
            ioreg_value(registry, "IOPlatformUUID").as_deref(),
            Some("5A2D9C11-7B1E-4F3A-9D2B-2B6F0E8C1A77")
        );
        assert_eq!(
            ioreg_value(registry, "IOPlatformSerialNumber").as_deref(),
            Some("C02XL0GZJGH5")
        );
        assert_eq!(ioreg_value(registry, "Missing"), None);
    }

    #[test]
    fn test_generic_source_is_empty() {
        assert_eq!(GenericSource.characteristics().unwrap().count(), 0);
    }
}
