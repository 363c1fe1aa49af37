pub mod console;
pub mod csv;
pub mod json;
pub mod positions;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::PackageReport;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render a package report into the specified format.
pub fn render(report: &PackageReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(report)),
        OutputFormat::Csv => Ok(csv::render(&report.features)),
        OutputFormat::Json => json::render(report),
    }
}
