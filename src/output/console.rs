use crate::package::FileStatus;
use crate::PackageReport;

/// How many spans to list under each triggered feature.
const SPANS_SHOWN: usize = 3;

/// Render a report for a terminal: triggered features with their first
/// spans, statistics, then any files that were not fully scanned.
pub fn render(report: &PackageReport) -> String {
    let mut output = String::new();
    let features = &report.features;

    output.push_str(&format!(
        "\n  Package: {} ({} of {} file(s) scanned)\n",
        report.package_name,
        report.scanned_files(),
        report.files.len()
    ));
    if let Some(script) = &report.install_script {
        output.push_str(&format!("  Install script: {}\n", script.display()));
    }
    output.push('\n');

    let triggered: Vec<_> = features.triggered().collect();
    if triggered.is_empty() {
        output.push_str("  No indicators triggered.\n\n");
    } else {
        output.push_str(&format!("  {} indicator(s) triggered:\n\n", triggered.len()));
        for feature in &triggered {
            let spans = report.provenance.records(*feature);
            output.push_str(&format!(
                "  {:<44} {}\n",
                feature.name(),
                feature.indicator.description()
            ));
            for span in spans.iter().take(SPANS_SHOWN) {
                output.push_str(&format!("           at {span}\n"));
            }
            if spans.len() > SPANS_SHOWN {
                output.push_str(&format!(
                    "           ... and {} more\n",
                    spans.len() - SPANS_SHOWN
                ));
            }
        }
        output.push('\n');
    }

    let meta = &features.metadata;
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    output.push_str(&format!(
        "  Metadata: author {}, home page {}, license {}, name in home page {}\n",
        yes_no(meta.exist_author),
        yes_no(meta.exist_home_page),
        yes_no(meta.exist_license),
        yes_no(meta.is_package_name_in_home_page),
    ));
    output.push_str(&format!(
        "  Longest string: {}  Entropy: {:.4}  Compression ratio: {:.4}\n",
        features.longest_string_length, features.entropy, features.compression_ratio
    ));

    let mut notes = Vec::new();
    for file in &report.files {
        match &file.status {
            FileStatus::Skipped { reason } => {
                notes.push(format!("  [SKIPPED]  {}: {}", file.path.display(), reason));
            }
            FileStatus::Scanned { exhausted } if !exhausted.is_empty() => {
                let budgets: Vec<String> = exhausted.iter().map(|b| b.to_string()).collect();
                notes.push(format!(
                    "  [PARTIAL]  {}: {} budget exhausted",
                    file.path.display(),
                    budgets.join(", ")
                ));
            }
            FileStatus::Scanned { .. } => {}
        }
    }
    if !notes.is_empty() {
        output.push('\n');
        for note in notes {
            output.push_str(&note);
            output.push('\n');
        }
    }
    output.push('\n');

    output
}
