use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::{Feature, SourceLocation};

/// Upper bound on recorded spans per feature. Later triggers are dropped.
pub const MAX_RECORDS_PER_FEATURE: usize = 1000;

/// Where each feature was triggered, keyed by feature, in trigger order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvenanceRecorder {
    records: BTreeMap<Feature, Vec<SourceLocation>>,
}

impl ProvenanceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a span. Returns `false` when the feature is already at the cap.
    pub fn add_record(&mut self, feature: Feature, location: SourceLocation) -> bool {
        let list = self.records.entry(feature).or_default();
        if list.len() >= MAX_RECORDS_PER_FEATURE {
            return false;
        }
        list.push(location);
        true
    }

    pub fn records(&self, feature: Feature) -> &[SourceLocation] {
        self.records.get(&feature).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, feature: Feature) -> usize {
        self.records(feature).len()
    }

    pub fn total(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Append every record of `other` after this recorder's own, honoring
    /// the cap. Absorbing per-file recorders in file order gives the same
    /// result as recording into one shared recorder file by file.
    pub fn absorb(&mut self, other: ProvenanceRecorder) {
        for (feature, locations) in other.records {
            let list = self.records.entry(feature).or_default();
            let room = MAX_RECORDS_PER_FEATURE.saturating_sub(list.len());
            list.extend(locations.into_iter().take(room));
        }
    }
}

#[derive(Serialize)]
struct Point {
    line: usize,
    column: usize,
}

#[derive(Serialize)]
struct SpanContent {
    start: Point,
    end: Point,
}

#[derive(Serialize)]
struct PositionRecord<'a> {
    file_path: &'a PathBuf,
    content: SpanContent,
}

impl<'a> From<&'a SourceLocation> for PositionRecord<'a> {
    fn from(loc: &'a SourceLocation) -> Self {
        Self {
            file_path: &loc.file,
            content: SpanContent {
                start: Point {
                    line: loc.line,
                    column: loc.column,
                },
                end: Point {
                    line: loc.end_line,
                    column: loc.end_column,
                },
            },
        }
    }
}

/// Serializes as the positions document: one key per feature (all of them,
/// empty lists included) mapping to `{file_path, content: {start, end}}`.
impl Serialize for ProvenanceRecorder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(32))?;
        for feature in Feature::all() {
            let records: Vec<PositionRecord<'_>> =
                self.records(feature).iter().map(PositionRecord::from).collect();
            map.serialize_entry(&feature.name(), &records)?;
        }
        map.end()
    }
}
