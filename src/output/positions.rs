use crate::error::Result;
use crate::ir::ProvenanceRecorder;

/// Render the positions document: every feature name, in table order, mapped
/// to the spans that triggered it.
pub fn render(provenance: &ProvenanceRecorder) -> Result<String> {
    Ok(serde_json::to_string_pretty(provenance)?)
}
