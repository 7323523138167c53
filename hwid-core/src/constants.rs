//! Constants and configuration values for hwid
//!
//! Centralizes all magic numbers, paths, and configuration defaults.
//! Values in `codec` and `matching` are part of the issued fingerprint format:
//! changing any of them invalidates every fingerprint already handed out.

/// Fingerprint string format
pub mod format {
    /// Symbols used for encoded parts and checksums
    pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Separator between encoded parts and before the checksum
    pub const SEPARATOR: char = '-';

    /// Length of one encoded part in characters
    pub const PART_LENGTH: usize = 8;

    /// Length of the trailing checksum in characters
    pub const CHECKSUM_LENGTH: usize = 4;

    /// Reserved value meaning "no hardware binding requested"
    pub const NO_HARDWARE_ID: &str = "NO_HARDWARE_ID";
}

/// Subtractive generator parameters
pub mod codec {
    /// Fixed public seed of the part obfuscator
    pub const OBFUSCATOR_SEED: i32 = 99;

    /// Modulus of the subtractive generator (i32::MAX)
    pub const MBIG: i32 = i32::MAX;

    /// Knuth's seed constant
    pub const MSEED: i32 = 161_803_398;

    /// Size of the generator state array
    pub const STATE_SIZE: usize = 56;

    /// Initial distance between the two generator cursors
    pub const CURSOR_LAG: usize = 21;

    /// Number of mixing sweeps after the initial fill
    pub const MIXING_SWEEPS: usize = 4;

    /// Draws thrown away before the pad bytes are taken
    pub const DISCARDED_DRAWS: usize = 1;
}

/// Characteristic set limits
pub mod characteristics {
    /// Below this many unique characteristics, platform fallbacks are appended
    pub const MIN_UNIQUE: usize = 4;

    /// Hard cap on characteristics per fingerprint
    pub const MAX_UNIQUE: usize = 6;

    /// Shorter values carry too little information to be kept
    pub const MIN_VALUE_CHARS: usize = 3;

    /// Vendor placeholders found in unpopulated SMBIOS fields (compared lowercase)
    ///
    /// "not available" and "not specified" are matched by pattern instead.
    /// Extending this list changes the parts produced on affected machines.
    pub const PLACEHOLDERS: &[&str] = &["to be filled by oem", "default string"];

    /// Value synthesized when nothing at all can be collected
    pub const LAST_RESORT: &str = "unknown";
}

/// Partial match policy
pub mod matching {
    /// Upper bound for `total_parts / matching_parts`
    pub const MAX_MISMATCH_RATIO: f64 = 2.1;
}

/// System paths read by the platform sources
pub mod paths {
    /// Linux DMI/SMBIOS attributes
    pub const DMI_ID_DIR: &str = "/sys/class/dmi/id";

    /// Linux CPU description
    pub const CPUINFO: &str = "/proc/cpuinfo";

    /// Linux network interfaces
    pub const NET_CLASS_DIR: &str = "/sys/class/net";

    /// Candidate machine identity files, in priority order
    pub const MACHINE_ID_FILES: &[&str] = &["/etc/machine-id", "/var/lib/dbus/machine-id"];

    /// Host name files, in priority order
    pub const HOSTNAME_FILES: &[&str] = &["/proc/sys/kernel/hostname", "/etc/hostname"];

    /// Configuration directory name below the user config dir
    pub const CONFIG_DIR_NAME: &str = "hwid";

    /// Engine configuration file
    pub const CONFIG_FILE: &str = "config.json";

    /// Bound fingerprint store file
    pub const BINDING_FILE: &str = "bound.json";

    /// Per-user configuration directory (e.g. ~/.config/hwid)
    pub fn user_config_dir() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME))
    }
}
