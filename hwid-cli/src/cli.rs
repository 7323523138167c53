//! Command Line Interface
//!
//! Exposes fingerprint generation, validation and binding management.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hwid_core::{
    compare, get_binding_path, load_binding, load_config, load_config_or_default, save_binding,
    BindingStore, Fingerprint, FingerprintConfig, FingerprintEngine, HardwareId,
    PlatformFallback, StaticSource,
};
use hwid_error::HwidError;

#[derive(Parser)]
#[command(name = "hwid")]
#[command(version)]
#[command(about = "hwid - tolerant hardware fingerprints for license binding")]
#[command(long_about = "hwid - tolerant hardware fingerprints for license binding

Builds a short fingerprint from this machine's hardware characteristics and
checks previously issued fingerprints against it. A fingerprint keeps
validating after some components are replaced.

EXAMPLES:
    hwid generate                      Print this machine's fingerprint
    hwid generate --json               Fingerprint with its parts as JSON
    hwid check RY4F0M3M-Z3PCG0YS-BTCE74OR-KDSFKYRD-GOW0
    hwid bind                          Store the current fingerprint
    hwid check                         Check the stored fingerprint
    hwid compare <A> <B>               Compare two fingerprints
    hwid checksum <FINGERPRINT>        Verify only the checksum
    hwid traits                        Show the characteristics in use

EXIT STATUS:
    0  accepted / valid
    1  rejected / invalid
    2  error

ENVIRONMENT VARIABLES:
    RUST_LOG=debug         Enable debug logging

FILES:
    ~/.config/hwid/config.json    Engine configuration (alphabet, lengths)
    ~/.config/hwid/bound.json     Stored fingerprint")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Engine configuration file (defaults to ~/.config/hwid/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the fingerprint of this machine
    Generate(GenerateArgs),

    /// Validate a fingerprint (or the stored one) against this machine
    Check(CheckArgs),

    /// Compare two fingerprints part by part
    Compare {
        /// First fingerprint
        a: String,
        /// Second fingerprint
        b: String,
    },

    /// Verify the checksum of a fingerprint
    Checksum {
        /// Fingerprint to verify
        fingerprint: String,
    },

    /// List the characteristics the fingerprint is built from
    Traits(TraitsArgs),

    /// Store the current fingerprint for later checks
    Bind(BindArgs),
}

/// Replace the platform source with fixed values
#[derive(Args, Clone, Default)]
pub struct SourceArgs {
    /// Use this characteristic instead of probing the hardware (repeatable)
    #[arg(long = "trait", value_name = "VALUE")]
    pub traits: Vec<String>,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print JSON instead of the bare fingerprint
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Fingerprint to check; the stored one is used when omitted
    pub fingerprint: Option<String>,

    /// Binding store to read when no fingerprint is given
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the verification report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TraitsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Show values unmasked
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args)]
pub struct BindArgs {
    /// Binding store to write
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Result of a command that has a yes/no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected,
}

impl From<bool> for Outcome {
    fn from(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }
}

#[derive(Serialize)]
struct GenerateOutput<'a> {
    fingerprint: &'a Fingerprint,
    parts: Vec<&'a str>,
    checksum: Option<&'a str>,
}

pub fn run_cli(cli: &Cli) -> anyhow::Result<Outcome> {
    // `compare` is purely positional and never touches the configuration
    let engine = || load_engine(cli.config.as_deref());
    match &cli.command {
        Commands::Generate(args) => cmd_generate(engine()?, args),
        Commands::Check(args) => cmd_check(engine()?, args),
        Commands::Compare { a, b } => cmd_compare(a, b),
        Commands::Checksum { fingerprint } => cmd_checksum(engine()?, fingerprint),
        Commands::Traits(args) => cmd_traits(engine()?, args),
        Commands::Bind(args) => cmd_bind(engine()?, args),
    }
}

fn load_engine(path: Option<&Path>) -> anyhow::Result<Arc<FingerprintEngine>> {
    match path {
        Some(path) => {
            let config = load_config(path)
                .with_context(|| format!("loading configuration {}", path.display()))?;
            Ok(Arc::new(FingerprintEngine::new(config)?))
        }
        None => {
            let config = load_config_or_default()?;
            if config == FingerprintConfig::default() {
                Ok(FingerprintEngine::reference())
            } else {
                Ok(Arc::new(FingerprintEngine::new(config)?))
            }
        }
    }
}

fn hardware_id(engine: Arc<FingerprintEngine>, source: &SourceArgs) -> HardwareId {
    if source.traits.is_empty() {
        HardwareId::with_engine(engine)
    } else {
        HardwareId::new(
            engine,
            Box::new(StaticSource::new(source.traits.clone())),
            Box::new(PlatformFallback::new()),
        )
    }
}

fn generate(hwid: &HardwareId) -> anyhow::Result<Fingerprint> {
    hwid.generate_fingerprint().map_err(|e| match e {
        HwidError::CollectionFailure { .. } => {
            anyhow::Error::new(e).context("hardware probing failed; retrying may help")
        }
        other => other.into(),
    })
}

// ============================================================================
// Generate / Bind
// ============================================================================

fn cmd_generate(engine: Arc<FingerprintEngine>, args: &GenerateArgs) -> anyhow::Result<Outcome> {
    let hwid = hardware_id(engine, &args.source);
    let fingerprint = generate(&hwid)?;

    if args.json {
        let output = GenerateOutput {
            fingerprint: &fingerprint,
            parts: fingerprint.parts(),
            checksum: fingerprint.checksum(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", fingerprint);
    }
    Ok(Outcome::Accepted)
}

fn cmd_bind(engine: Arc<FingerprintEngine>, args: &BindArgs) -> anyhow::Result<Outcome> {
    let hwid = hardware_id(engine, &args.source);
    let fingerprint = generate(&hwid)?;
    let path = args.store.clone().unwrap_or_else(get_binding_path);

    save_binding(&path, &BindingStore::new(fingerprint.clone()))?;
    println!("{}", fingerprint);
    eprintln!("Bound to {}", path.display());
    Ok(Outcome::Accepted)
}

// ============================================================================
// Check / Compare / Checksum
// ============================================================================

fn cmd_check(engine: Arc<FingerprintEngine>, args: &CheckArgs) -> anyhow::Result<Outcome> {
    let candidate = match &args.fingerprint {
        Some(fingerprint) => fingerprint.clone(),
        None => {
            let path = args.store.clone().unwrap_or_else(get_binding_path);
            match load_binding(&path)? {
                Some(store) => store.fingerprint.to_string(),
                None => bail!(
                    "no fingerprint given and no binding at {}; run `hwid bind` first",
                    path.display()
                ),
            }
        }
    };

    let hwid = hardware_id(engine, &args.source);
    let report = hwid.verify(&candidate)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.sentinel {
        println!("valid (no hardware binding)");
    } else {
        println!("checksum: {}", if report.checksum_valid { "ok" } else { "INVALID" });
        match (report.matching_parts, report.total_parts) {
            (Some(matching), Some(total)) => println!("parts:    {}/{} match", matching, total),
            _ => println!("parts:    different part count"),
        }
        println!("result:   {}", if report.accepted { "valid" } else { "INVALID" });
    }
    Ok(report.accepted.into())
}

fn cmd_compare(a: &str, b: &str) -> anyhow::Result<Outcome> {
    let accepted = hwid_core::is_partial_match(a, b);
    match compare(a, b) {
        Some(m) => println!(
            "{}/{} parts match: {}",
            m.matching_parts,
            m.total_parts,
            if accepted { "same machine" } else { "different machine" }
        ),
        None if accepted => println!("same machine (no hardware binding)"),
        None => println!("different part count: different machine"),
    }
    Ok(accepted.into())
}

fn cmd_checksum(engine: Arc<FingerprintEngine>, fingerprint: &str) -> anyhow::Result<Outcome> {
    let hwid = hardware_id(engine, &SourceArgs::default());
    let valid = hwid.is_checksum_valid(fingerprint);
    println!("{}", if valid { "checksum ok" } else { "checksum INVALID" });
    Ok(valid.into())
}

// ============================================================================
// Traits
// ============================================================================

fn cmd_traits(engine: Arc<FingerprintEngine>, args: &TraitsArgs) -> anyhow::Result<Outcome> {
    let hwid = hardware_id(engine, &args.source);
    let set = hwid.characteristics()?;

    for (i, value) in set.iter().enumerate() {
        let part = hwid.engine().encode_characteristic(value)?;
        let shown = if args.raw { value.to_string() } else { mask(value) };
        println!("{}. {}  {}", i + 1, part, shown);
    }
    Ok(Outcome::Accepted)
}

/// Keep the first two characters, hide the rest
fn mask(value: &str) -> String {
    let visible: String = value.chars().take(2).collect();
    let hidden = value.chars().count().saturating_sub(2);
    format!("{}{}", visible, "*".repeat(hidden))
}
