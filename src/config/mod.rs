use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Top-level configuration from `pkgscope.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub scan: ScanSettings,
}

/// Per-file work budgets. Source files are untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// How many times a decoded payload may itself contain a payload.
    pub max_decode_depth: usize,
    /// Total decoded payload bytes re-scanned for one file.
    pub max_decoded_bytes: usize,
    /// Syntax nodes visited for one file, nested payloads included.
    pub max_nodes_per_file: usize,
    /// Files larger than this are skipped.
    pub max_file_size: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_decode_depth: 8,
            max_decoded_bytes: 4 * 1024 * 1024,
            max_nodes_per_file: 2_000_000,
            max_file_size: 8 * 1024 * 1024,
        }
    }
}

/// Where `os.system`/`os.exec*`/`os.popen`/`os.spawn*` calls outside the
/// install script are recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsProcessRouting {
    /// `use_operating_system_in_py_file`, as the reference extractor does.
    #[default]
    Legacy,
    /// `use_process_in_py_file`, alongside the subprocess calls.
    Corrected,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ClassifierSettings {
    #[serde(default)]
    pub os_process_routing: OsProcessRouting,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Classify files on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_parallel() -> bool {
    true
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.limits.max_nodes_per_file == 0 {
            return Err(ScanError::Config(
                "limits.max_nodes_per_file must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# pkgscope configuration

[limits]
# Nesting depth of base64 payloads that are decoded and re-scanned.
max_decode_depth = 8
# Total decoded payload bytes re-scanned per file.
max_decoded_bytes = 4194304
# Syntax nodes visited per file, nested payloads included.
max_nodes_per_file = 2000000
# Files larger than this (bytes) are skipped.
max_file_size = 8388608

[classifier]
# Where os.system / os.exec* / os.popen / os.spawn* outside setup.py land:
# "legacy" -> use_operating_system_in_py_file, "corrected" -> use_process_in_py_file
os_process_routing = "legacy"

[scan]
# Classify files in parallel.
parallel = true
"#
    }
}
