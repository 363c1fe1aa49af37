//! pkgscope: static feature extractor for Python packages.
//!
//! Walks the sources of an unpacked package, classifies imports, call sites,
//! and literals into risk indicators, and reports a flat feature vector plus
//! the exact source spans that triggered each indicator.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use pkgscope::{scan, ScanOptions};
//!
//! let options = ScanOptions::default();
//! let report = scan(Path::new("./unpacked/some-package"), &options).unwrap();
//! for feature in report.features.triggered() {
//!     println!("{feature}");
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod ir;
pub mod output;
pub mod package;
pub mod parser;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use analysis::{statistics, Classifier};
use config::Config;
use error::Result;
use ir::{FeatureVector, PackageMetadata, ProvenanceRecorder};
use output::OutputFormat;
use package::FileRecord;

/// Default config file name, looked up in the scanned directory.
pub const CONFIG_FILE_NAME: &str = "pkgscope.toml";

/// Options for a scan invocation.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Path to config file (defaults to `pkgscope.toml` in the scan dir).
    pub config_path: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            format: OutputFormat::Console,
        }
    }
}

/// Everything learned about one package.
#[derive(Debug)]
pub struct PackageReport {
    pub package_name: String,
    pub root: PathBuf,
    pub install_script: Option<PathBuf>,
    pub metadata: Option<PackageMetadata>,
    pub features: FeatureVector,
    pub provenance: ProvenanceRecorder,
    /// Every `.py` file found, scanned or skipped, in discovery order.
    pub files: Vec<FileRecord>,
    pub scanned_at: DateTime<Utc>,
}

impl PackageReport {
    pub fn scanned_files(&self) -> usize {
        self.files.iter().filter(|f| f.is_scanned()).count()
    }
}

/// Run a complete scan: discover, classify, fold, then metadata and
/// install-script statistics.
pub fn scan(path: &Path, options: &ScanOptions) -> Result<PackageReport> {
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| path.join(CONFIG_FILE_NAME));
    let config = Config::load(&config_path)?;

    let layout = package::discover(path, &config.limits)?;
    tracing::debug!(
        root = %path.display(),
        files = layout.sources.len(),
        skipped = layout.skipped.len(),
        "discovered package sources"
    );

    let classifier = Classifier::new(&config);
    let outcomes = package::classify_files(&classifier, &layout, config.scan.parallel);

    // Folding in discovery order keeps the provenance cap deterministic.
    let mut features = FeatureVector::new();
    let mut provenance = ProvenanceRecorder::new();
    let mut files = Vec::with_capacity(outcomes.len() + layout.skipped.len());
    for outcome in outcomes {
        features.merge(&outcome.features);
        provenance.absorb(outcome.provenance);
        files.push(outcome.record);
    }
    files.extend(layout.skipped.iter().cloned());

    let metadata = package::metadata::read_metadata(path);
    if let Some(meta) = &metadata {
        features.metadata.merge(&meta.flags());
    }

    if let Some(script) = &layout.install_script {
        match std::fs::read(script) {
            Ok(bytes) => {
                features.entropy = statistics::text_entropy(&bytes);
                features.compression_ratio = statistics::compression_ratio(&bytes);
            }
            Err(e) => {
                tracing::warn!(file = %script.display(), error = %e, "failed to read install script for statistics");
            }
        }
    }

    let package_name = metadata
        .as_ref()
        .and_then(|m| m.name.clone())
        .or_else(|| {
            path.canonicalize()
                .ok()
                .as_deref()
                .unwrap_or(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "unknown".into());

    Ok(PackageReport {
        package_name,
        root: path.to_path_buf(),
        install_script: layout.install_script,
        metadata,
        features,
        provenance,
        files,
        scanned_at: Utc::now(),
    })
}

/// Render a package report in the specified format.
pub fn render_report(report: &PackageReport, format: OutputFormat) -> Result<String> {
    output::render(report, format)
}

/// Render the positions document (feature name to source spans).
pub fn render_positions(report: &PackageReport) -> Result<String> {
    output::positions::render(&report.provenance)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::ir::{FileContext, Indicator};
    use std::path::Path;

    const BENIGN: &str = "tests/fixtures/packages/tidy_calc";
    const MALICIOUS: &str = "tests/fixtures/packages/evilpkg";

    #[test]
    fn benign_package_has_no_indicators() {
        let report = scan(Path::new(BENIGN), &ScanOptions::default()).unwrap();
        assert_eq!(report.package_name, "tidy_calc");
        assert!(report.features.triggered().next().is_none());
        assert!(report.provenance.is_empty());

        let meta = report.features.metadata;
        assert!(meta.exist_author);
        assert!(meta.exist_home_page);
        assert!(meta.exist_license);
        assert!(meta.is_package_name_in_home_page);

        assert!(report.features.entropy > 0.0 && report.features.entropy <= 8.0);
        assert!(report.features.compression_ratio > 0.0);
        assert_eq!(report.scanned_files(), 2);
    }

    #[test]
    fn malicious_install_script_detected() {
        let report = scan(Path::new(MALICIOUS), &ScanOptions::default()).unwrap();
        let f = &report.features;
        let setup = FileContext::InstallScript;

        assert!(f.has(Indicator::UseBase64Conversion, setup));
        assert!(f.has(Indicator::DecodeBase64String, setup));
        assert!(f.has(Indicator::IncludeBase64String, setup));
        assert!(f.has(Indicator::UseExec, setup));
        assert!(f.has(Indicator::UseProcess, setup));
        assert!(f.has(Indicator::IncludeIp, setup));
        // From the decoded payload.
        assert!(f.has(Indicator::UseNetwork, setup));
    }

    #[test]
    fn decoded_payload_is_attributed_to_the_literal() {
        let report = scan(Path::new(MALICIOUS), &ScanOptions::default()).unwrap();
        let records = report
            .provenance
            .records(Indicator::UseNetwork.in_context(FileContext::InstallScript));
        assert_eq!(records.len(), 1);
        let loc = &records[0];
        assert!(loc.file.ends_with("setup.py"));
        assert_eq!(
            (loc.line, loc.column, loc.end_line, loc.end_column),
            (5, 10, 5, 32)
        );
    }

    #[test]
    fn malicious_module_and_broken_file() {
        let report = scan(Path::new(MALICIOUS), &ScanOptions::default()).unwrap();
        let f = &report.features;
        let py = FileContext::PyFile;
        assert!(f.has(Indicator::UseNetwork, py));
        assert!(f.has(Indicator::UseFs, py));
        assert!(f.has(Indicator::IncludeSuspiciousString, py));

        let broken = report
            .files
            .iter()
            .find(|r| r.path.ends_with("broken.py"))
            .unwrap();
        assert!(!broken.is_scanned());
    }

    #[test]
    fn unlicense_and_missing_author_clear_flags() {
        let report = scan(Path::new(MALICIOUS), &ScanOptions::default()).unwrap();
        let meta = report.features.metadata;
        assert!(!meta.exist_author);
        assert!(!meta.exist_license);
        assert!(!meta.is_package_name_in_home_page);
    }

    #[test]
    fn crlf_install_script_has_the_same_entropy() {
        let lf = tempfile::tempdir().unwrap();
        let crlf = tempfile::tempdir().unwrap();
        let script = "from setuptools import setup\n\nsetup(name=\"demo_pkg\")\n";
        std::fs::write(lf.path().join("setup.py"), script).unwrap();
        std::fs::write(crlf.path().join("setup.py"), script.replace('\n', "\r\n")).unwrap();

        let lf_report = scan(lf.path(), &ScanOptions::default()).unwrap();
        let crlf_report = scan(crlf.path(), &ScanOptions::default()).unwrap();
        assert!(lf_report.features.entropy > 0.0);
        assert_eq!(lf_report.features.entropy, crlf_report.features.entropy);
    }

    #[test]
    fn missing_directory_is_fatal() {
        let err = scan(Path::new("tests/fixtures/packages/nope"), &ScanOptions::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn parallel_and_sequential_reports_match() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("setup.py"), "import os\nos.system('id')\n").unwrap();
        // 20 files x 80 calls overflows the per-feature cap.
        for i in 0..20 {
            std::fs::write(
                dir.path().join(format!("m{i:02}.py")),
                "open('x')\n".repeat(80),
            )
            .unwrap();
        }

        let seq_cfg = dir.path().join("seq.toml");
        std::fs::write(&seq_cfg, "[scan]\nparallel = false\n").unwrap();
        let par_cfg = dir.path().join("par.toml");
        std::fs::write(&par_cfg, "[scan]\nparallel = true\n").unwrap();

        let seq = scan(
            dir.path(),
            &ScanOptions {
                config_path: Some(seq_cfg),
                ..ScanOptions::default()
            },
        )
        .unwrap();
        let par = scan(
            dir.path(),
            &ScanOptions {
                config_path: Some(par_cfg),
                ..ScanOptions::default()
            },
        )
        .unwrap();

        let fs_py = Indicator::UseFs.in_context(FileContext::PyFile);
        assert_eq!(seq.provenance.count(fs_py), crate::ir::MAX_RECORDS_PER_FEATURE);
        assert!(seq.provenance.records(fs_py)[0].file.ends_with("m00.py"));
        assert_eq!(seq.features, par.features);
        assert_eq!(seq.provenance, par.provenance);
        assert_eq!(seq.files, par.files);
        assert_eq!(render_positions(&seq).unwrap(), render_positions(&par).unwrap());
    }

    #[test]
    fn json_and_csv_renderings() {
        let report = scan(Path::new(MALICIOUS), &ScanOptions::default()).unwrap();

        let json = render_report(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["package"], "evilpkg");
        assert_eq!(value["features"]["use_exec_in_install_script"], true);

        let csv = render_report(&report, OutputFormat::Csv).unwrap();
        assert!(csv.starts_with("key,value\n"));
        assert!(csv.contains("use_exec_in_install_script,true\n"));

        let positions: serde_json::Value =
            serde_json::from_str(&render_positions(&report).unwrap()).unwrap();
        assert_eq!(positions.as_object().unwrap().len(), 32);
    }
}
