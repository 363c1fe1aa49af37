//! Data model shared by the classifier, the package layer, and the renderers.
//!
//! The classifier produces a `FeatureVector` per file plus provenance records;
//! the package layer folds them into one package-level vector and recorder.

pub mod feature_vector;
pub mod indicator;
pub mod metadata;
pub mod provenance;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use feature_vector::{FeatureValue, FeatureVector, MetadataFlags};
pub use indicator::{Feature, Indicator};
pub use metadata::PackageMetadata;
pub use provenance::{ProvenanceRecorder, MAX_RECORDS_PER_FEATURE};

/// Whether a file is the package's install script or an ordinary module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileContext {
    InstallScript,
    PyFile,
}

impl FileContext {
    pub const ALL: [FileContext; 2] = [FileContext::InstallScript, FileContext::PyFile];

    /// Suffix used in flat feature names, e.g. `in_install_script`.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::InstallScript => "in_install_script",
            Self::PyFile => "in_py_file",
        }
    }

    pub fn from_install_flag(is_install_script: bool) -> Self {
        if is_install_script {
            Self::InstallScript
        } else {
            Self::PyFile
        }
    }
}

impl std::fmt::Display for FileContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InstallScript => write!(f, "install script"),
            Self::PyFile => write!(f, "py file"),
        }
    }
}

/// A Python source file discovered inside a package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub context: FileContext,
}

/// Span of a syntax construct. Lines are 1-based, columns are 0-based byte
/// offsets into the line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourceLocation {
    /// Span of a tree-sitter node (whose rows are 0-based).
    pub fn from_node(file: &std::path::Path, node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            file: file.to_path_buf(),
            line: start.row + 1,
            column: start.column,
            end_line: end.row + 1,
            end_column: end.column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}
