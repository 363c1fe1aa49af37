//! Shape patterns and name tables the classifier matches against.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ir::Indicator;

/// Dotted host name: labels of 1-63 alphanumerics/hyphens that neither start
/// nor end with a hyphen, followed by a 2-6 letter top-level label.
pub static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,6}").unwrap()
});

pub static IP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\d{1,3}\.){3}\d{1,3}").unwrap());

/// Whole-string match: standard alphabet, length a multiple of four, canonical
/// padding. The empty string matches.
pub static BASE64_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$").unwrap()
});

pub static SENSITIVE_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/etc/shadow|\.bashrc|\.zshrc|/etc/hosts|/etc/passwd|/bin/sh").unwrap()
});

pub const FS_MODULES: &[&str] = &["os", "shutil", "tempfile", "glob", "pathlib"];

pub const NETWORK_MODULES: &[&str] = &[
    "httplib", "urllib", "urllib2", "socket", "requests", "aiohttp", "selenium",
];

pub const COMPRESSION_MODULES: &[&str] = &["zlib", "gzip", "bz2", "tarfile"];

/// Matched on the full dotted name, not the top-level segment.
pub const QUALIFIED_NETWORK_MODULE: &str = "http.client";
pub const QUALIFIED_RESOLVER_MODULE: &str = "dns.resolver";

/// Bare builtins that touch the filesystem.
pub const FS_CALLS: &[&str] = &["open", "read", "write"];

/// Runtime entry point injected by PyArmor-obfuscated modules.
pub const OBFUSCATION_MARKER: &str = "__pyarmor__";

pub const OS_PROCESS_CALLS: &[&str] = &[
    "system", "execl", "execle", "execlp", "execlpe", "execv", "execvp", "execvpe", "popen",
    "spawnl", "spawnle", "spawnlp", "spawnlpe", "spawnv", "spawnve", "spawnvp", "spawnvpe",
];

pub const OS_ENV_CALLS: &[&str] = &["getenv", "putenv", "unsetenv"];

pub const SUBPROCESS_CALLS: &[&str] = &[
    "call",
    "check_call",
    "check_output",
    "run",
    "getoutput",
    "getstatusoutput",
];

/// Map an imported module's dotted name to the indicator it implies.
///
/// Categories are tried in a fixed order and the first hit wins.
pub fn module_indicator(qualified: &str) -> Option<Indicator> {
    let top = qualified.split('.').next().unwrap_or(qualified);

    if top == "base64" {
        Some(Indicator::UseBase64Conversion)
    } else if FS_MODULES.contains(&top) {
        Some(Indicator::UseFs)
    } else if top == "subprocess" {
        Some(Indicator::UseProcess)
    } else if NETWORK_MODULES.contains(&top) || qualified == QUALIFIED_NETWORK_MODULE {
        Some(Indicator::UseNetwork)
    } else if qualified == QUALIFIED_RESOLVER_MODULE {
        Some(Indicator::IncludeDomain)
    } else if COMPRESSION_MODULES.contains(&top) {
        Some(Indicator::UseCryptoAndZip)
    } else {
        None
    }
}

/// Indicator for `from <module> import <names>`.
///
/// The module itself is tried first; otherwise `module.name` pairs are tried
/// so that `from http import client` counts as `http.client`.
pub fn from_import_indicator(module: &str, names: &[String]) -> Option<Indicator> {
    module_indicator(module).or_else(|| {
        names
            .iter()
            .find_map(|name| module_indicator(&format!("{module}.{name}")))
    })
}
