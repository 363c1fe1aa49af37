use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Feature, FileContext, Indicator};

/// Package metadata indicators. Filled in by the package layer, never by the
/// classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFlags {
    pub exist_author: bool,
    pub exist_home_page: bool,
    pub exist_license: bool,
    pub is_package_name_in_home_page: bool,
}

impl MetadataFlags {
    pub fn merge(&mut self, other: &MetadataFlags) {
        self.exist_author |= other.exist_author;
        self.exist_home_page |= other.exist_home_page;
        self.exist_license |= other.exist_license;
        self.is_package_name_in_home_page |= other.is_package_name_in_home_page;
    }

    fn rows(&self) -> [(&'static str, bool); 4] {
        [
            ("exist_author", self.exist_author),
            ("exist_home_page", self.exist_home_page),
            ("exist_license", self.exist_license),
            ("is_package_name_in_home_page", self.is_package_name_in_home_page),
        ]
    }
}

/// Accumulated indicators for one file or a whole package.
///
/// Features only ever go from unset to set, and numeric statistics only ever
/// grow, so [`FeatureVector::merge`] is associative, commutative, and
/// idempotent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    triggered: BTreeSet<Feature>,
    pub metadata: MetadataFlags,
    /// Longest text literal seen, in characters.
    pub longest_string_length: usize,
    pub entropy: f64,
    pub compression_ratio: f64,
}

/// Value of one row in the flat feature table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Flag(bool),
    Count(usize),
    Ratio(f64),
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Count(n) => write!(f, "{n}"),
            Self::Ratio(r) => write!(f, "{r}"),
        }
    }
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a feature as observed. Returns `true` if it was not set before.
    pub fn set(&mut self, feature: Feature) -> bool {
        self.triggered.insert(feature)
    }

    pub fn is_set(&self, feature: Feature) -> bool {
        self.triggered.contains(&feature)
    }

    /// Shorthand for `is_set(indicator.in_context(context))`.
    pub fn has(&self, indicator: Indicator, context: FileContext) -> bool {
        self.is_set(indicator.in_context(context))
    }

    pub fn triggered(&self) -> impl Iterator<Item = Feature> + '_ {
        self.triggered.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.triggered.is_empty()
            && self.metadata == MetadataFlags::default()
            && self.longest_string_length == 0
            && self.entropy == 0.0
            && self.compression_ratio == 0.0
    }

    pub fn observe_string_length(&mut self, len: usize) {
        self.longest_string_length = self.longest_string_length.max(len);
    }

    /// OR every flag, take the max of every statistic.
    pub fn merge(&mut self, other: &FeatureVector) {
        self.triggered.extend(other.triggered.iter().copied());
        self.metadata.merge(&other.metadata);
        self.longest_string_length = self.longest_string_length.max(other.longest_string_length);
        self.entropy = self.entropy.max(other.entropy);
        self.compression_ratio = self.compression_ratio.max(other.compression_ratio);
    }

    /// Consuming form of [`FeatureVector::merge`], handy for folds.
    pub fn merged(mut self, other: &FeatureVector) -> Self {
        self.merge(other);
        self
    }

    /// Flat key/value table: every feature in canonical order, then metadata
    /// flags, then statistics.
    pub fn rows(&self) -> Vec<(String, FeatureValue)> {
        let mut rows: Vec<(String, FeatureValue)> = Feature::all()
            .map(|f| (f.name(), FeatureValue::Flag(self.is_set(f))))
            .collect();
        rows.extend(
            self.metadata
                .rows()
                .into_iter()
                .map(|(name, v)| (name.to_string(), FeatureValue::Flag(v))),
        );
        rows.push((
            "longest_string_length".into(),
            FeatureValue::Count(self.longest_string_length),
        ));
        rows.push(("entropy".into(), FeatureValue::Ratio(self.entropy)));
        rows.push((
            "compression_ratio".into(),
            FeatureValue::Ratio(self.compression_ratio),
        ));
        rows
    }
}
