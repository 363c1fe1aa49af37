use serde::{Deserialize, Serialize};

use super::FileContext;

/// Kinds of risk indicators recognized in Python source.
///
/// Every indicator exists once per [`FileContext`]; the pair is a [`Feature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    IncludeIp,
    UseBase64Conversion,
    IncludeBase64String,
    DecodeBase64String,
    IncludeDomain,
    IncludeByteString,
    UseOperatingSystem,
    UseProcess,
    UseFs,
    UseNetwork,
    UseEnv,
    IncludeSuspiciousString,
    UseCryptoAndZip,
    UseEval,
    UseExec,
    UseObfuscation,
}

impl Indicator {
    pub const ALL: [Indicator; 16] = [
        Indicator::IncludeIp,
        Indicator::UseBase64Conversion,
        Indicator::IncludeBase64String,
        Indicator::DecodeBase64String,
        Indicator::IncludeDomain,
        Indicator::IncludeByteString,
        Indicator::UseOperatingSystem,
        Indicator::UseProcess,
        Indicator::UseFs,
        Indicator::UseNetwork,
        Indicator::UseEnv,
        Indicator::IncludeSuspiciousString,
        Indicator::UseCryptoAndZip,
        Indicator::UseEval,
        Indicator::UseExec,
        Indicator::UseObfuscation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::IncludeIp => "include_ip",
            Self::UseBase64Conversion => "use_base64_conversion",
            Self::IncludeBase64String => "include_base64_string",
            Self::DecodeBase64String => "decode_base64_string",
            Self::IncludeDomain => "include_domain",
            Self::IncludeByteString => "include_byte_string",
            Self::UseOperatingSystem => "use_operating_system",
            Self::UseProcess => "use_process",
            Self::UseFs => "use_fs",
            Self::UseNetwork => "use_network",
            Self::UseEnv => "use_env",
            Self::IncludeSuspiciousString => "include_suspicious_string",
            Self::UseCryptoAndZip => "use_crypto_and_zip",
            Self::UseEval => "use_eval",
            Self::UseExec => "use_exec",
            Self::UseObfuscation => "use_obfuscation",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::IncludeIp => "String literal containing an IPv4-shaped address",
            Self::UseBase64Conversion => "Imports the base64 module",
            Self::IncludeBase64String => "String literal that decodes as base64",
            Self::DecodeBase64String => "Calls base64.b64decode",
            Self::IncludeDomain => "Domain-shaped string literal or DNS resolver import",
            Self::IncludeByteString => "Bytes literal",
            Self::UseOperatingSystem => "Spawns processes through the os module",
            Self::UseProcess => "Spawns processes (subprocess or os)",
            Self::UseFs => "Filesystem module import or open/read/write call",
            Self::UseNetwork => "Network module import",
            Self::UseEnv => "Reads or writes environment variables through os",
            Self::IncludeSuspiciousString => "Sensitive filesystem path in a string literal",
            Self::UseCryptoAndZip => "Compression or archive module import",
            Self::UseEval => "Calls eval",
            Self::UseExec => "Calls exec",
            Self::UseObfuscation => "Calls an obfuscator runtime marker",
        }
    }

    pub fn in_context(self, context: FileContext) -> Feature {
        Feature {
            indicator: self,
            context,
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An indicator bound to the context it was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Feature {
    pub indicator: Indicator,
    pub context: FileContext,
}

impl Feature {
    /// All 32 features: every install-script feature first, then every
    /// py-file feature, each block in [`Indicator::ALL`] order.
    pub fn all() -> impl Iterator<Item = Feature> {
        FileContext::ALL
            .into_iter()
            .flat_map(|ctx| Indicator::ALL.into_iter().map(move |i| i.in_context(ctx)))
    }

    /// Flat name, e.g. `use_fs_in_install_script`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.indicator.as_str(), self.context.suffix())
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.indicator.as_str(), self.context.suffix())
    }
}
