use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::Result;
use crate::ir::{FeatureVector, PackageMetadata};
use crate::package::FileRecord;
use crate::PackageReport;

/// Feature table as a JSON object, keys in table order.
struct FeatureTable<'a>(&'a FeatureVector);

impl Serialize for FeatureTable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let rows = self.0.rows();
        let mut map = serializer.serialize_map(Some(rows.len()))?;
        for (key, value) in &rows {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    package: &'a str,
    root: &'a PathBuf,
    install_script: Option<&'a PathBuf>,
    scanned_at: &'a DateTime<Utc>,
    metadata: Option<&'a PackageMetadata>,
    features: FeatureTable<'a>,
    files: &'a [FileRecord],
}

/// Render a package report as JSON. Provenance has its own document, see
/// [`super::positions`].
pub fn render(report: &PackageReport) -> Result<String> {
    let json = JsonReport {
        package: &report.package_name,
        root: &report.root,
        install_script: report.install_script.as_ref(),
        scanned_at: &report.scanned_at,
        metadata: report.metadata.as_ref(),
        features: FeatureTable(&report.features),
        files: &report.files,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}
