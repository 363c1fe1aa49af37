//! Single-pass syntax-tree classifier.
//!
//! Walks one parsed Python file, maps imports, call sites, and literals to
//! indicators, records where each indicator fired, and re-scans base64
//! payloads found in string literals as if they were source files of their
//! own.

use std::collections::BTreeSet;
use std::path::Path;

use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Tree};

use super::patterns::{
    self, BASE64_RE, DOMAIN_RE, FS_CALLS, IP_RE, OBFUSCATION_MARKER, OS_ENV_CALLS,
    OS_PROCESS_CALLS, SENSITIVE_PATH_RE, SUBPROCESS_CALLS,
};
use crate::config::{Config, Limits, OsProcessRouting};
use crate::error::Result;
use crate::ir::{Feature, FeatureVector, FileContext, Indicator, ProvenanceRecorder, SourceLocation};
use crate::parser::python::{self as py, PyLiteral};

/// Standard alphabet, canonical padding, non-zero trailing bits tolerated
/// (CPython's `b64decode` accepts them too).
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// A per-file work budget that ran out. The file's features are still
/// reported, minus whatever the skipped work would have found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetExhausted {
    /// A payload nested deeper than `max_decode_depth` was not re-scanned.
    DecodeDepth,
    /// Decoded payloads exceeded `max_decoded_bytes`; the rest were not re-scanned.
    DecodedBytes,
    /// The walk stopped after `max_nodes_per_file` nodes.
    NodeCount,
}

impl std::fmt::Display for BudgetExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecodeDepth => write!(f, "decode depth"),
            Self::DecodedBytes => write!(f, "decoded bytes"),
            Self::NodeCount => write!(f, "node count"),
        }
    }
}

/// Result of classifying one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileScan {
    pub features: FeatureVector,
    pub exhausted: BTreeSet<BudgetExhausted>,
}

pub struct Classifier {
    limits: Limits,
    os_process_routing: OsProcessRouting,
}

impl Classifier {
    pub fn new(config: &Config) -> Self {
        Self {
            limits: config.limits,
            os_process_routing: config.classifier.os_process_routing,
        }
    }

    /// Parse `content` and classify it. Unparsable source is an error and
    /// leaves `recorder` untouched.
    pub fn classify_source(
        &self,
        path: &Path,
        content: &str,
        context: FileContext,
        recorder: &mut ProvenanceRecorder,
    ) -> Result<FileScan> {
        let tree = py::parse(path, content)?;
        Ok(self.classify_tree(path, &tree, content, context, recorder))
    }

    /// Classify an already parsed file. `source` must be the text `tree`
    /// was parsed from.
    pub fn classify_tree(
        &self,
        path: &Path,
        tree: &Tree,
        source: &str,
        context: FileContext,
        recorder: &mut ProvenanceRecorder,
    ) -> FileScan {
        let mut budget = Budget::default();
        let features = Pass {
            classifier: self,
            path,
            source: source.as_bytes(),
            context,
            anchor: None,
            depth: 0,
            recorder,
            budget: &mut budget,
            features: FeatureVector::new(),
        }
        .run(tree.root_node());

        FileScan {
            features,
            exhausted: budget.exhausted,
        }
    }

    fn os_process_feature(&self, context: FileContext) -> Feature {
        match (context, self.os_process_routing) {
            (FileContext::InstallScript, _) => Indicator::UseProcess.in_context(context),
            (FileContext::PyFile, OsProcessRouting::Legacy) => {
                Indicator::UseOperatingSystem.in_context(context)
            }
            (FileContext::PyFile, OsProcessRouting::Corrected) => {
                Indicator::UseProcess.in_context(context)
            }
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// Work done so far for one file, shared by the outer pass and every nested
/// payload pass.
#[derive(Default)]
struct Budget {
    nodes: usize,
    decoded_bytes: usize,
    exhausted: BTreeSet<BudgetExhausted>,
}

impl Budget {
    fn exhaust(&mut self, kind: BudgetExhausted, path: &Path) {
        if self.exhausted.insert(kind) {
            tracing::debug!(file = %path.display(), budget = %kind, "scan budget exhausted");
        }
    }
}

/// One walk over one tree: the file itself, or a decoded payload inside it.
struct Pass<'a> {
    classifier: &'a Classifier,
    path: &'a Path,
    source: &'a [u8],
    context: FileContext,
    /// Span of the outermost literal a payload came from. Every record of a
    /// nested pass points here instead of into the decoded text.
    anchor: Option<SourceLocation>,
    depth: usize,
    recorder: &'a mut ProvenanceRecorder,
    budget: &'a mut Budget,
    features: FeatureVector,
}

impl<'a> Pass<'a> {
    fn run(mut self, root: Node) -> FeatureVector {
        let max_nodes = self.classifier.limits.max_nodes_per_file;
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if self.budget.nodes >= max_nodes {
                self.budget.exhaust(BudgetExhausted::NodeCount, self.path);
                break;
            }
            self.budget.nodes += 1;

            match node.kind() {
                "import_statement" => self.import(node),
                "import_from_statement" => self.import_from(node),
                "call" => self.call(node),
                "string" => {
                    if let Some(literal) = py::string_literal(node, self.source) {
                        self.literal(literal, node);
                    }
                    stack.extend(py::interpolations(node).into_iter().rev());
                    continue;
                }
                "concatenated_string" => {
                    if let Some(literal) = py::concatenated_literal(node, self.source) {
                        self.literal(literal, node);
                    }
                    stack.extend(py::interpolations(node).into_iter().rev());
                    continue;
                }
                _ => {}
            }

            for i in (0..node.named_child_count()).rev() {
                if let Some(child) = node.named_child(i) {
                    stack.push(child);
                }
            }
        }

        self.features
    }

    fn hit(&mut self, indicator: Indicator, node: Node) {
        self.hit_feature(indicator.in_context(self.context), node);
    }

    fn hit_feature(&mut self, feature: Feature, node: Node) {
        self.features.set(feature);
        let location = match &self.anchor {
            Some(anchor) => anchor.clone(),
            None => SourceLocation::from_node(self.path, node),
        };
        self.recorder.add_record(feature, location);
    }

    /// `import a.b, c as d`: every imported name is checked on its own.
    fn import(&mut self, node: Node) {
        let mut cursor = node.walk();
        let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();
        for name in names {
            let module = if name.kind() == "aliased_import" {
                name.child_by_field_name("name")
                    .map(|n| py::dotted_name(n, self.source))
            } else {
                Some(py::dotted_name(name, self.source))
            };
            if let Some(indicator) = module.as_deref().and_then(patterns::module_indicator) {
                self.hit(indicator, node);
            }
        }
    }

    /// `from a.b import c, d`: one check per statement.
    fn import_from(&mut self, node: Node) {
        let Some(module_node) = node.child_by_field_name("module_name") else {
            return;
        };
        let module = match module_node.kind() {
            // `from .pkg import x` names `pkg`; `from . import x` names nothing.
            "relative_import" => {
                let mut found = None;
                for i in 0..module_node.named_child_count() {
                    if let Some(child) = module_node.named_child(i) {
                        if child.kind() == "dotted_name" {
                            found = Some(py::dotted_name(child, self.source));
                        }
                    }
                }
                match found {
                    Some(m) => m,
                    None => return,
                }
            }
            _ => py::dotted_name(module_node, self.source),
        };

        let mut cursor = node.walk();
        let names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .filter_map(|n| {
                let target = if n.kind() == "aliased_import" {
                    n.child_by_field_name("name")?
                } else {
                    n
                };
                Some(py::dotted_name(target, self.source))
            })
            .collect();

        if let Some(indicator) = patterns::from_import_indicator(&module, &names) {
            self.hit(indicator, node);
        }
    }

    fn call(&mut self, node: Node) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };

        match function.kind() {
            "identifier" => {
                let name = py::node_text(function, self.source);
                if FS_CALLS.contains(&name) {
                    self.hit(Indicator::UseFs, node);
                }
                match name {
                    "eval" => self.hit(Indicator::UseEval, node),
                    "exec" => self.hit(Indicator::UseExec, node),
                    OBFUSCATION_MARKER => self.hit(Indicator::UseObfuscation, node),
                    _ => {}
                }
            }
            "attribute" => {
                let (Some(object), Some(attribute)) = (
                    function.child_by_field_name("object"),
                    function.child_by_field_name("attribute"),
                ) else {
                    return;
                };
                if object.kind() != "identifier" {
                    return;
                }
                let receiver = py::node_text(object, self.source);
                let attr = py::node_text(attribute, self.source);

                match receiver {
                    "os" if OS_PROCESS_CALLS.contains(&attr) => {
                        let feature = self.classifier.os_process_feature(self.context);
                        self.hit_feature(feature, node);
                    }
                    "os" if OS_ENV_CALLS.contains(&attr) => self.hit(Indicator::UseEnv, node),
                    "subprocess" if SUBPROCESS_CALLS.contains(&attr) => {
                        self.hit(Indicator::UseProcess, node)
                    }
                    "base64" if attr == "b64decode" => {
                        self.hit(Indicator::DecodeBase64String, node)
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn literal(&mut self, literal: PyLiteral, node: Node) {
        match literal {
            PyLiteral::Text(value) => self.text(&value, node),
            PyLiteral::Formatted(segments) => {
                for segment in &segments {
                    self.text(segment, node);
                }
            }
            // Recorded under the py-file variant whatever the context.
            PyLiteral::Bytes => {
                self.hit_feature(
                    Indicator::IncludeByteString.in_context(FileContext::PyFile),
                    node,
                );
            }
        }
    }

    fn text(&mut self, value: &str, node: Node) {
        self.features.observe_string_length(value.chars().count());

        if DOMAIN_RE.is_match(value) {
            self.hit(Indicator::IncludeDomain, node);
        }

        if BASE64_RE.is_match(value) {
            // Plenty of ordinary words are base64-shaped; a failed decode
            // ends the checks for this literal.
            let Ok(decoded) = PAYLOAD_ENGINE.decode(value) else {
                return;
            };
            self.hit(Indicator::IncludeBase64String, node);
            self.rescan(decoded, node);
        }

        if IP_RE.is_match(value) {
            self.hit(Indicator::IncludeIp, node);
        }

        if SENSITIVE_PATH_RE.is_match(value) {
            self.hit(Indicator::IncludeSuspiciousString, node);
        }
    }

    /// Classify a decoded payload as a source file of its own and merge the
    /// result into this pass.
    fn rescan(&mut self, decoded: Vec<u8>, node: Node) {
        let Ok(text) = String::from_utf8(decoded) else {
            return;
        };

        let limits = &self.classifier.limits;
        if self.depth >= limits.max_decode_depth {
            self.budget.exhaust(BudgetExhausted::DecodeDepth, self.path);
            return;
        }
        if self.budget.decoded_bytes + text.len() > limits.max_decoded_bytes {
            self.budget.exhaust(BudgetExhausted::DecodedBytes, self.path);
            return;
        }
        self.budget.decoded_bytes += text.len();

        let tree = match py::parse(self.path, &text) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::trace!(file = %self.path.display(), error = %e, "decoded payload is not Python");
                return;
            }
        };

        let anchor = self
            .anchor
            .clone()
            .unwrap_or_else(|| SourceLocation::from_node(self.path, node));

        let nested = Pass {
            classifier: self.classifier,
            path: self.path,
            source: text.as_bytes(),
            context: self.context,
            anchor: Some(anchor),
            depth: self.depth + 1,
            recorder: &mut *self.recorder,
            budget: &mut *self.budget,
            features: FeatureVector::new(),
        }
        .run(tree.root_node());

        self.features.merge(&nested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::MAX_RECORDS_PER_FEATURE;
    use pretty_assertions::assert_eq;

    const PY: FileContext = FileContext::PyFile;
    const SETUP: FileContext = FileContext::InstallScript;

    fn classify_with(
        classifier: &Classifier,
        code: &str,
        context: FileContext,
    ) -> (FileScan, ProvenanceRecorder) {
        let mut recorder = ProvenanceRecorder::new();
        let scan = classifier
            .classify_source(Path::new("pkg/mod.py"), code, context, &mut recorder)
            .unwrap();
        (scan, recorder)
    }

    fn classify(code: &str, context: FileContext) -> (FeatureVector, ProvenanceRecorder) {
        let (scan, recorder) = classify_with(&Classifier::default(), code, context);
        (scan.features, recorder)
    }

    fn with_limits(limits: Limits) -> Classifier {
        let mut config = Config::default();
        config.limits = limits;
        Classifier::new(&config)
    }

    #[test]
    fn import_os_in_module_sets_py_file_variant() {
        let (features, recorder) = classify("import os\n", PY);
        assert!(features.has(Indicator::UseFs, PY));
        assert!(!features.has(Indicator::UseFs, SETUP));
        let records = recorder.records(Indicator::UseFs.in_context(PY));
        assert_eq!(records.len(), 1);
        assert_eq!(
            (records[0].line, records[0].column, records[0].end_line, records[0].end_column),
            (1, 0, 1, 9)
        );
        assert_eq!(records[0].file, Path::new("pkg/mod.py"));
    }

    #[test]
    fn import_os_in_install_script_sets_install_variant_only() {
        let (features, recorder) = classify("import os\n", SETUP);
        assert!(features.has(Indicator::UseFs, SETUP));
        assert!(!features.has(Indicator::UseFs, PY));
        assert_eq!(recorder.count(Indicator::UseFs.in_context(PY)), 0);
    }

    #[test]
    fn import_categories() {
        let (f, _) = classify(
            "import base64\nimport subprocess as sp\nimport urllib.request\nimport http.client\nimport dns.resolver\nimport gzip\nimport json\n",
            PY,
        );
        assert!(f.has(Indicator::UseBase64Conversion, PY));
        assert!(f.has(Indicator::UseProcess, PY));
        assert!(f.has(Indicator::UseNetwork, PY));
        assert!(f.has(Indicator::IncludeDomain, PY));
        assert!(f.has(Indicator::UseCryptoAndZip, PY));
    }

    #[test]
    fn bare_http_and_dns_imports_do_not_count() {
        let (f, recorder) = classify("import http\nimport dns\nimport http.server\n", PY);
        assert!(f.triggered().next().is_none());
        assert!(recorder.is_empty());
    }

    #[test]
    fn multi_name_import_records_each_match() {
        let (_, recorder) = classify("import os, shutil, json\n", PY);
        assert_eq!(recorder.count(Indicator::UseFs.in_context(PY)), 2);
    }

    #[test]
    fn from_imports() {
        let (f, _) = classify("from base64 import b64decode\n", PY);
        assert!(f.has(Indicator::UseBase64Conversion, PY));

        let (f, _) = classify("from http import client\n", PY);
        assert!(f.has(Indicator::UseNetwork, PY));

        let (f, _) = classify("from dns import resolver as r\n", SETUP);
        assert!(f.has(Indicator::IncludeDomain, SETUP));

        let (f, _) = classify("from os.path import join\n", PY);
        assert!(f.has(Indicator::UseFs, PY));
    }

    #[test]
    fn relative_imports() {
        let (f, recorder) = classify("from . import socket\n", PY);
        assert!(f.triggered().next().is_none());
        assert!(recorder.is_empty());

        let (f, _) = classify("from .requests import get\n", PY);
        assert!(f.has(Indicator::UseNetwork, PY));
    }

    #[test]
    fn os_system_routing_legacy() {
        let (f, _) = classify("import os\nos.system('ls')\n", PY);
        assert!(f.has(Indicator::UseOperatingSystem, PY));
        assert!(!f.has(Indicator::UseProcess, PY));

        let (f, _) = classify("os.system('ls')\n", SETUP);
        assert!(f.has(Indicator::UseProcess, SETUP));
        assert!(!f.has(Indicator::UseOperatingSystem, SETUP));
    }

    #[test]
    fn os_system_routing_corrected() {
        let mut config = Config::default();
        config.classifier.os_process_routing = OsProcessRouting::Corrected;
        let classifier = Classifier::new(&config);
        let (scan, _) = classify_with(&classifier, "os.popen('id')\n", PY);
        assert!(scan.features.has(Indicator::UseProcess, PY));
        assert!(!scan.features.has(Indicator::UseOperatingSystem, PY));
    }

    #[test]
    fn call_classification() {
        let (f, _) = classify(
            "subprocess.check_output(['id'])\nos.getenv('HOME')\nbase64.b64decode('aGVsbG8=')\neval('1+1')\nexec('x = 1')\n__pyarmor__(__name__, __file__, b'')\nopen('f')\n",
            PY,
        );
        assert!(f.has(Indicator::UseProcess, PY));
        assert!(f.has(Indicator::UseEnv, PY));
        assert!(f.has(Indicator::DecodeBase64String, PY));
        assert!(f.has(Indicator::IncludeBase64String, PY));
        assert!(f.has(Indicator::UseEval, PY));
        assert!(f.has(Indicator::UseExec, PY));
        assert!(f.has(Indicator::UseObfuscation, PY));
        assert!(f.has(Indicator::UseFs, PY));
    }

    #[test]
    fn method_calls_on_other_receivers_ignored() {
        let (f, _) = classify("fh.read()\nself.os.system('x')\nsp.run('x')\n", PY);
        assert!(!f.has(Indicator::UseFs, PY));
        assert!(!f.has(Indicator::UseOperatingSystem, PY));
        assert!(!f.has(Indicator::UseProcess, PY));
    }

    #[test]
    fn string_shapes() {
        let (f, recorder) = classify(
            "URL = 'https://evil.example.com/x'\nHOST = 'connect 10.0.0.1'\nP = '/etc/passwd'\n",
            PY,
        );
        assert!(f.has(Indicator::IncludeDomain, PY));
        assert!(f.has(Indicator::IncludeIp, PY));
        assert!(f.has(Indicator::IncludeSuspiciousString, PY));
        let ip = recorder.records(Indicator::IncludeIp.in_context(PY));
        assert_eq!(ip.len(), 1);
        assert_eq!(ip[0].line, 2);
    }

    #[test]
    fn longest_string_counts_characters() {
        let (f, _) = classify("a = 'héllo'\nb = 'xy'\n", PY);
        assert_eq!(f.longest_string_length, 5);
    }

    #[test]
    fn byte_literal_always_uses_py_file_variant() {
        let (f, _) = classify("data = b'\\x90\\x90'\n", SETUP);
        assert!(f.has(Indicator::IncludeByteString, PY));
        assert!(!f.has(Indicator::IncludeByteString, SETUP));
    }

    #[test]
    fn fstring_interpolations_are_walked() {
        let (f, _) = classify("x = f\"{eval('1')} at evil.example.com\"\n", PY);
        assert!(f.has(Indicator::UseEval, PY));
        assert!(f.has(Indicator::IncludeDomain, PY));
    }

    #[test]
    fn base64_payload_is_rescanned_and_attributed_to_literal() {
        let (f, recorder) = classify("payload = \"aW1wb3J0IHNvY2tldA==\"\n", PY);
        assert!(f.has(Indicator::IncludeBase64String, PY));
        assert!(f.has(Indicator::UseNetwork, PY));

        let network = recorder.records(Indicator::UseNetwork.in_context(PY));
        assert_eq!(network.len(), 1);
        assert_eq!(network[0].file, Path::new("pkg/mod.py"));
        assert_eq!(
            (network[0].line, network[0].column, network[0].end_line, network[0].end_column),
            (1, 10, 1, 32)
        );
    }

    #[test]
    fn nested_payloads_keep_outermost_span() {
        let (f, recorder) = classify("\n\nx = 'eCA9ICJhVzF3YjNKMElITnZZMnRsZEE9PSI='\n", SETUP);
        assert!(f.has(Indicator::UseNetwork, SETUP));
        let network = recorder.records(Indicator::UseNetwork.in_context(SETUP));
        assert_eq!(network[0].line, 3);
        assert_eq!(network[0].column, 4);
    }

    #[test]
    fn payload_that_is_not_python_is_not_rescanned() {
        let (f, recorder) = classify("x = 'ZGVmICg='\ny = '////'\n", PY);
        assert!(f.has(Indicator::IncludeBase64String, PY));
        assert_eq!(recorder.count(Indicator::IncludeBase64String.in_context(PY)), 2);
        assert_eq!(f.triggered().count(), 1);
    }

    #[test]
    fn decode_depth_budget_is_reported() {
        let classifier = with_limits(Limits {
            max_decode_depth: 0,
            ..Limits::default()
        });
        let (scan, _) = classify_with(&classifier, "x = 'aW1wb3J0IHNvY2tldA=='\n", PY);
        assert!(scan.features.has(Indicator::IncludeBase64String, PY));
        assert!(!scan.features.has(Indicator::UseNetwork, PY));
        assert!(scan.exhausted.contains(&BudgetExhausted::DecodeDepth));
    }

    #[test]
    fn decoded_bytes_budget_is_reported() {
        let classifier = with_limits(Limits {
            max_decoded_bytes: 4,
            ..Limits::default()
        });
        let (scan, _) = classify_with(&classifier, "x = 'aW1wb3J0IHNvY2tldA=='\n", PY);
        assert!(!scan.features.has(Indicator::UseNetwork, PY));
        assert_eq!(
            scan.exhausted.iter().copied().collect::<Vec<_>>(),
            vec![BudgetExhausted::DecodedBytes]
        );
    }

    #[test]
    fn node_budget_stops_the_walk() {
        let classifier = with_limits(Limits {
            max_nodes_per_file: 3,
            ..Limits::default()
        });
        let code = "x = 1\ny = 2\nz = 3\nimport socket\n";
        let (scan, _) = classify_with(&classifier, code, PY);
        assert!(scan.exhausted.contains(&BudgetExhausted::NodeCount));
        assert!(!scan.features.has(Indicator::UseNetwork, PY));
    }

    #[test]
    fn within_budget_reports_nothing_exhausted() {
        let (scan, _) = classify_with(&Classifier::default(), "import socket\n", PY);
        assert!(scan.exhausted.is_empty());
    }

    #[test]
    fn unparsable_source_is_an_error_and_records_nothing() {
        let mut recorder = ProvenanceRecorder::new();
        let result = Classifier::default().classify_source(
            Path::new("broken.py"),
            "import os\ndef oops(:\n",
            PY,
            &mut recorder,
        );
        assert!(matches!(result, Err(crate::error::ScanError::Parse { .. })));
        assert!(recorder.is_empty());
    }

    #[test]
    fn python2_source_is_an_error_and_records_nothing() {
        for code in [
            "import socket\nprint \"hello\"\n",
            "import socket\nexec \"x=1\"\n",
        ] {
            let mut recorder = ProvenanceRecorder::new();
            let result = Classifier::default().classify_source(
                Path::new("legacy.py"),
                code,
                PY,
                &mut recorder,
            );
            assert!(matches!(result, Err(crate::error::ScanError::Parse { .. })));
            assert!(recorder.is_empty());
        }
    }

    #[test]
    fn print_chevron_is_still_classified() {
        let (f, _) = classify("import socket\nprint >>f, 'x'\n", PY);
        assert!(f.has(Indicator::UseNetwork, PY));
    }

    #[test]
    fn fstring_folding_and_format_specs_count_towards_longest_string() {
        let (f, _) = classify("x = 'abc' f'def{y}'\n", PY);
        assert_eq!(f.longest_string_length, 6);

        let (f, _) = classify("x = f'{a:>10}'\n", PY);
        assert_eq!(f.longest_string_length, 3);
    }

    #[test]
    fn provenance_is_capped_per_feature() {
        let code = "open('f')\n".repeat(1500);
        let (f, recorder) = classify(&code, PY);
        assert!(f.has(Indicator::UseFs, PY));
        assert_eq!(
            recorder.count(Indicator::UseFs.in_context(PY)),
            MAX_RECORDS_PER_FEATURE
        );
    }
}
