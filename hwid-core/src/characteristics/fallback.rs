//! Fallback characteristics
//!
//! Used when the platform source yields fewer unique values than a
//! fingerprint needs. Lookups here never fail; missing values are skipped.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

use super::platform::read_trimmed;
use crate::constants::paths;

/// Supplies supplementary characteristics in priority order
pub trait FallbackProvider: Send + Sync {
    /// Candidate values, highest priority first
    fn candidates(&self) -> Vec<String>;

    /// Host name used when nothing else is available
    fn host_name(&self) -> Option<String>;
}

/// Fallbacks drawn from the running system
#[derive(Debug, Clone)]
pub struct PlatformFallback {
    net_dir: PathBuf,
    machine_id_files: Vec<PathBuf>,
}

impl Default for PlatformFallback {
    fn default() -> Self {
        Self {
            net_dir: PathBuf::from(paths::NET_CLASS_DIR),
            machine_id_files: paths::MACHINE_ID_FILES.iter().map(PathBuf::from).collect(),
        }
    }
}

impl PlatformFallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// First non-loopback interface with a real hardware address
    ///
    /// Interfaces are visited by name so the choice is stable across boots.
    pub fn first_mac_address(&self) -> Option<String> {
        let mut names: Vec<String> = fs::read_dir(&self.net_dir)
            .ok()?
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name != "lo")
            .collect();
        names.sort();

        names.into_iter().find_map(|name| {
            read_trimmed(&self.net_dir.join(&name).join("address"))
                .filter(|mac| !mac.is_empty() && mac.chars().any(|c| c != '0' && c != ':'))
        })
    }

    /// Persistent machine identity written at OS install time
    pub fn server_identity(&self) -> Option<String> {
        self.machine_id_files.iter().find_map(|path| read_trimmed(path))
    }
}

impl FallbackProvider for PlatformFallback {
    fn candidates(&self) -> Vec<String> {
        let uname = uname();
        let mut candidates = Vec::new();

        candidates.extend(self.host_name());
        if let Some(info) = uname {
            candidates.push(info.nodename);
            candidates.push(info.machine);
            candidates.push(info.release);
        }
        candidates.extend(self.first_mac_address());
        candidates.extend(self.server_identity());

        trace!("Collected {} fallback candidates", candidates.len());
        candidates
    }

    fn host_name(&self) -> Option<String> {
        paths::HOSTNAME_FILES
            .iter()
            .find_map(|path| read_trimmed(Path::new(path)))
            .or_else(|| uname().map(|info| info.nodename))
            .filter(|name| !name.is_empty())
    }
}

/// Subset of `struct utsname`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnameInfo {
    pub nodename: String,
    pub machine: String,
    pub release: String,
}

#[cfg(unix)]
pub fn uname() -> Option<UnameInfo> {
    // SAFETY: utsname is plain old data; all-zero is a valid initial value.
    let mut buf: libc::utsname = unsafe { std::mem::zeroed() };
    // SAFETY: buf is a valid, writable utsname for the duration of the call.
    if unsafe { libc::uname(&mut buf) } != 0 {
        return None;
    }
    Some(UnameInfo {
        nodename: c_field(&buf.nodename),
        machine: c_field(&buf.machine),
        release: c_field(&buf.release),
    })
}

#[cfg(not(unix))]
pub fn uname() -> Option<UnameInfo> {
    None
}

#[cfg(unix)]
fn c_field(field: &[libc::c_char]) -> String {
    let bytes: Vec<u8> = field
        .iter()
        .take_while(|c| **c != 0)
        .map(|c| *c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback_in(dir: &std::path::Path) -> PlatformFallback {
        PlatformFallback {
            net_dir: dir.join("net"),
            machine_id_files: vec![dir.join("machine-id"), dir.join("dbus-machine-id")],
        }
    }

    fn add_iface(dir: &std::path::Path, name: &str, mac: &str) {
        let iface = dir.join("net").join(name);
        fs::create_dir_all(&iface).unwrap();
        fs::write(iface.join("address"), format!("{}\n", mac)).unwrap();
    }

    #[test]
    fn test_first_mac_skips_loopback_and_zero() {
        let dir = tempfile::tempdir().unwrap();
        add_iface(dir.path(), "lo", "00:00:00:00:00:00");
        add_iface(dir.path(), "dummy0", "00:00:00:00:00:00");
        add_iface(dir.path(), "wlp2s0", "3c:22:fb:aa:bb:cc");
        add_iface(dir.path(), "enp3s0", "d8:bb:c1:01:02:03");

        let fallback = fallback_in(dir.path());
        assert_eq!(fallback.first_mac_address().as_deref(), Some("d8:bb:c1:01:02:03"));
    }

    #[test]
    fn test_server_identity_priority() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = fallback_in(dir.path());
        assert_eq!(fallback.server_identity(), None);

        fs::write(dir.path().join("dbus-machine-id"), "bbbb\n").unwrap();
        assert_eq!(fallback.server_identity().as_deref(), Some("bbbb"));

        fs::write(dir.path().join("machine-id"), "aaaa\n").unwrap();
        assert_eq!(fallback.server_identity().as_deref(), Some("aaaa"));
    }

    #[cfg(unix)]
    #[test]
    fn test_uname_populated() {
        let info = uname().unwrap();
        assert!(!info.machine.is_empty());
        assert!(!info.release.is_empty());
    }
}
