use crate::ir::FeatureVector;

/// Render the flat feature table as two-column CSV with a `key,value` header.
///
/// Keys are fixed identifiers and values are booleans or numbers, so no field
/// ever needs quoting.
pub fn render(features: &FeatureVector) -> String {
    let mut output = String::from("key,value\n");
    for (key, value) in features.rows() {
        output.push_str(&format!("{key},{value}\n"));
    }
    output
}
