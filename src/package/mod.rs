//! Package layer: finds the Python sources and install script of an unpacked
//! package, classifies each file, and reads declared metadata.

pub mod metadata;

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::analysis::{BudgetExhausted, Classifier};
use crate::config::Limits;
use crate::error::{Result, ScanError};
use crate::ir::{FeatureVector, FileContext, ProvenanceRecorder, SourceFile};

/// File name that marks a package's install script.
pub const INSTALL_SCRIPT_NAME: &str = "setup.py";

/// Python sources of one package, in discovery order.
#[derive(Debug, Clone)]
pub struct PackageLayout {
    pub sources: Vec<SourceFile>,
    /// Shallowest `setup.py`; the only file measured for entropy and
    /// compression ratio.
    pub install_script: Option<PathBuf>,
    /// Files excluded before classification (oversized, unreadable entries).
    pub skipped: Vec<FileRecord>,
}

/// What happened to one file during a package scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub context: FileContext,
    pub sha256: Option<String>,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Scanned { exhausted: Vec<BudgetExhausted> },
    Skipped { reason: String },
}

impl FileRecord {
    fn skipped(path: &Path, context: FileContext, sha256: Option<String>, reason: String) -> Self {
        Self {
            path: path.to_path_buf(),
            context,
            sha256,
            status: FileStatus::Skipped { reason },
        }
    }

    pub fn is_scanned(&self) -> bool {
        matches!(self.status, FileStatus::Scanned { .. })
    }
}

/// Per-file classification output, before it is folded into the package.
#[derive(Debug)]
pub struct FileOutcome {
    pub record: FileRecord,
    pub features: FeatureVector,
    pub provenance: ProvenanceRecorder,
}

/// Walk `root` for `.py` files. Every `setup.py`, at any depth, is classified
/// in install-script context.
pub fn discover(root: &Path, limits: &Limits) -> Result<PackageLayout> {
    if !root.is_dir() {
        return Err(ScanError::NotAPackage(root.display().to_string()));
    }

    let mut sources = Vec::new();
    let mut skipped = Vec::new();
    let mut install_script: Option<(usize, PathBuf)> = None;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().map_or(true, |ext| ext != "py") {
            continue;
        }

        let is_install_script = entry.file_name() == INSTALL_SCRIPT_NAME;
        let context = FileContext::from_install_flag(is_install_script);
        if is_install_script
            && install_script
                .as_ref()
                .map_or(true, |(depth, _)| entry.depth() < *depth)
        {
            install_script = Some((entry.depth(), path.to_path_buf()));
        }

        let size_bytes = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                skipped.push(FileRecord::skipped(path, context, None, e.to_string()));
                continue;
            }
        };
        if size_bytes > limits.max_file_size {
            tracing::debug!(file = %path.display(), size_bytes, "skipping oversized file");
            skipped.push(FileRecord::skipped(
                path,
                context,
                None,
                format!("file exceeds {} bytes", limits.max_file_size),
            ));
            continue;
        }

        sources.push(SourceFile {
            path: path.to_path_buf(),
            context,
        });
    }

    Ok(PackageLayout {
        sources,
        install_script: install_script.map(|(_, path)| path),
        skipped,
    })
}

/// Classify every source of `layout`, in parallel when asked. Outcomes come
/// back in discovery order either way.
pub fn classify_files(
    classifier: &Classifier,
    layout: &PackageLayout,
    parallel: bool,
) -> Vec<FileOutcome> {
    if parallel {
        layout
            .sources
            .par_iter()
            .map(|sf| classify_file(classifier, sf))
            .collect()
    } else {
        layout
            .sources
            .iter()
            .map(|sf| classify_file(classifier, sf))
            .collect()
    }
}

/// Read and classify one file. Never fails: unreadable, non-UTF-8, and
/// unparsable files come back as skipped records with empty features.
pub fn classify_file(classifier: &Classifier, source: &SourceFile) -> FileOutcome {
    let mut provenance = ProvenanceRecorder::new();
    let path = source.path.as_path();

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "failed to read file, skipping");
            return empty_outcome(FileRecord::skipped(path, source.context, None, e.to_string()));
        }
    };
    let sha256 = Some(hex::encode(Sha256::digest(&bytes)));

    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(_) => {
            tracing::debug!(file = %path.display(), "skipping file that is not valid UTF-8");
            return empty_outcome(FileRecord::skipped(
                path,
                source.context,
                sha256,
                "not valid UTF-8".into(),
            ));
        }
    };

    match classifier.classify_source(path, &content, source.context, &mut provenance) {
        Ok(scan) => FileOutcome {
            record: FileRecord {
                path: path.to_path_buf(),
                context: source.context,
                sha256,
                status: FileStatus::Scanned {
                    exhausted: scan.exhausted.into_iter().collect(),
                },
            },
            features: scan.features,
            provenance,
        },
        Err(e) => {
            tracing::debug!(file = %path.display(), error = %e, "skipping unparsable file");
            empty_outcome(FileRecord::skipped(path, source.context, sha256, e.to_string()))
        }
    }
}

fn empty_outcome(record: FileRecord) -> FileOutcome {
    FileOutcome {
        record,
        features: FeatureVector::new(),
        provenance: ProvenanceRecorder::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Indicator;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn discovers_python_files_and_shallowest_setup() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "setup.py", b"import os\n");
        write(dir.path(), "pkg/__init__.py", b"");
        write(dir.path(), "pkg/vendor/setup.py", b"");
        write(dir.path(), "README.md", b"# readme\n");

        let layout = discover(dir.path(), &Limits::default()).unwrap();
        assert_eq!(layout.sources.len(), 3);
        assert_eq!(layout.install_script, Some(dir.path().join("setup.py")));

        let install_scripts = layout
            .sources
            .iter()
            .filter(|s| s.context == FileContext::InstallScript)
            .count();
        assert_eq!(install_scripts, 2);
    }

    #[test]
    fn missing_directory_is_not_a_package() {
        let err = discover(Path::new("/definitely/not/here"), &Limits::default()).unwrap_err();
        assert!(matches!(err, ScanError::NotAPackage(_)));
    }

    #[test]
    fn oversized_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "big.py", &vec![b'#'; 64]);
        let limits = Limits {
            max_file_size: 16,
            ..Limits::default()
        };
        let layout = discover(dir.path(), &limits).unwrap();
        assert!(layout.sources.is_empty());
        assert_eq!(layout.skipped.len(), 1);
        assert!(!layout.skipped[0].is_scanned());
    }

    #[test]
    fn unparsable_and_binary_files_degrade_to_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.py", b"import os\nclass (:\n");
        write(dir.path(), "bin.py", &[0xff, 0xfe, 0x00]);
        write(dir.path(), "good.py", b"import socket\n");

        let layout = discover(dir.path(), &Limits::default()).unwrap();
        let outcomes = classify_files(&Classifier::default(), &layout, false);
        assert_eq!(outcomes.len(), 3);

        let bad = &outcomes[0];
        assert!(matches!(bad.record.status, FileStatus::Skipped { .. }));
        assert!(bad.features.is_empty());
        assert!(bad.provenance.is_empty());
        assert!(bad.record.sha256.is_some());

        let bin = &outcomes[1];
        assert_eq!(
            bin.record.status,
            FileStatus::Skipped {
                reason: "not valid UTF-8".into()
            }
        );

        let good = &outcomes[2];
        assert!(good.record.is_scanned());
        assert!(good.features.has(Indicator::UseNetwork, FileContext::PyFile));
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..12 {
            write(
                dir.path(),
                &format!("m{i:02}.py"),
                format!("import os\nopen('f{i}')\nx = 'host{i}.example.com'\n").as_bytes(),
            );
        }
        let layout = discover(dir.path(), &Limits::default()).unwrap();
        let classifier = Classifier::default();
        let seq = classify_files(&classifier, &layout, false);
        let par = classify_files(&classifier, &layout, true);
        assert_eq!(seq.len(), par.len());
        for (a, b) in seq.iter().zip(&par) {
            assert_eq!(a.record, b.record);
            assert_eq!(a.features, b.features);
            assert_eq!(a.provenance, b.provenance);
        }
    }
}
