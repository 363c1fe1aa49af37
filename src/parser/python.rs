use std::path::Path;

use tree_sitter::{Node, Tree};

use crate::error::{Result, ScanError};

/// A Python string literal after prefix handling and escape decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PyLiteral {
    /// `str` value; implicit concatenation already joined.
    Text(String),
    /// `bytes` literal. The value itself is never inspected.
    Bytes,
    /// Literal segments of an f-string, interpolations removed.
    Formatted(Vec<String>),
}

/// Parse Python source with tree-sitter.
///
/// tree-sitter recovers from syntax errors; a tree that needed recovery is
/// reported as a parse error so callers treat the file as unparsable.
pub fn parse(path: &Path, content: &str) -> Result<Tree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ScanError::Parse {
            file: path.display().to_string(),
            message: format!("Failed to load Python grammar: {e}"),
        })?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| ScanError::Parse {
            file: path.display().to_string(),
            message: "tree-sitter failed to parse Python".into(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        let message = match first_error(root) {
            Some(node) => format!(
                "syntax error at line {}, column {}",
                node.start_position().row + 1,
                node.start_position().column
            ),
            None => "syntax error".into(),
        };
        return Err(ScanError::Parse {
            file: path.display().to_string(),
            message,
        });
    }

    // The grammar still accepts Python 2 statements; a Python 3 compiler
    // does not.
    if let Some(node) = first_python2_statement(root) {
        return Err(ScanError::Parse {
            file: path.display().to_string(),
            message: format!(
                "Python 2 {} at line {}, column {}",
                node.kind().replace('_', " "),
                node.start_position().row + 1,
                node.start_position().column
            ),
        });
    }

    Ok(tree)
}

/// `print x` and `exec code`. A chevron form (`print >>f, x`) is still a
/// valid Python 3 expression statement, a shift inside a tuple.
fn first_python2_statement(root: Node) -> Option<Node> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "exec_statement" => return Some(node),
            "print_statement" if !has_named_child(node, "chevron") => return Some(node),
            _ => {}
        }
        for i in (0..node.named_child_count()).rev() {
            if let Some(child) = node.named_child(i) {
                stack.push(child);
            }
        }
    }
    None
}

fn first_error(root: Node) -> Option<Node> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }
    None
}

fn has_named_child(node: Node, kind: &str) -> bool {
    (0..node.named_child_count())
        .filter_map(|i| node.named_child(i))
        .any(|child| child.kind() == kind)
}

/// Get the text of a node from source bytes.
pub fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Normalized dotted name (`os . path` → `os.path`).
pub fn dotted_name(node: Node, source: &[u8]) -> String {
    if node.kind() != "dotted_name" {
        return node_text(node, source).to_string();
    }
    let mut parts = Vec::new();
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i) {
            parts.push(node_text(child, source));
        }
    }
    parts.join(".")
}

/// Evaluate a `string` node.
pub fn string_literal(node: Node, source: &[u8]) -> Option<PyLiteral> {
    let parts = StringParts::of(node, source)?;
    Some(parts.literal(node, source))
}

/// Evaluate a `concatenated_string` node the way the Python compiler folds
/// adjacent literals: all-`str` parts join into one value, any `bytes` part
/// makes it bytes, and with any f-string part the literal text between
/// interpolations is joined across part boundaries.
pub fn concatenated_literal(node: Node, source: &[u8]) -> Option<PyLiteral> {
    let mut parts = Vec::new();
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i) {
            if child.kind() == "string" {
                parts.push((StringParts::of(child, source)?, child));
            }
        }
    }

    if parts.iter().any(|(p, _)| p.bytes) {
        return Some(PyLiteral::Bytes);
    }
    if parts.iter().any(|(p, _)| p.formatted) {
        let mut pieces = Vec::new();
        for (part, child) in &parts {
            if part.formatted {
                pieces.extend(part.formatted_pieces(*child, source));
            } else {
                pieces.push(Piece::Text(part.decode(part.body_start, part.body_end, source)));
            }
        }
        return Some(PyLiteral::Formatted(join_pieces(pieces)));
    }

    let mut joined = String::new();
    for (part, _) in &parts {
        joined.push_str(&part.decode(part.body_start, part.body_end, source));
    }
    Some(PyLiteral::Text(joined))
}

/// `interpolation` children of a `string` or `concatenated_string`. Their
/// expressions still need classifying.
pub fn interpolations(node: Node) -> Vec<Node> {
    let mut found = Vec::new();
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i) {
            match child.kind() {
                "interpolation" => found.push(child),
                "string" => found.extend(interpolations(child)),
                _ => {}
            }
        }
    }
    found
}

/// Literal text or an interpolation boundary inside an f-string.
enum Piece {
    Text(String),
    Break,
}

/// Join adjacent text pieces and drop empty results.
fn join_pieces(pieces: Vec<Piece>) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    for piece in pieces {
        match piece {
            Piece::Text(text) => current.push_str(&text),
            Piece::Break => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Prefix flags and body range of one `string` node.
struct StringParts {
    raw: bool,
    bytes: bool,
    formatted: bool,
    body_start: usize,
    body_end: usize,
}

impl StringParts {
    fn of(node: Node, source: &[u8]) -> Option<Self> {
        let text = node_text(node, source);
        let prefix_len = text.find(['\'', '"'])?;
        let prefix = text[..prefix_len].to_ascii_lowercase();
        let rest = &text[prefix_len..];
        let quote_len = if rest.starts_with("'''") || rest.starts_with("\"\"\"") {
            3
        } else {
            1
        };
        if rest.len() < quote_len * 2 {
            return None;
        }
        Some(Self {
            raw: prefix.contains('r'),
            bytes: prefix.contains('b'),
            formatted: prefix.contains('f'),
            body_start: node.start_byte() + prefix_len + quote_len,
            body_end: node.end_byte() - quote_len,
        })
    }

    fn literal(&self, node: Node, source: &[u8]) -> PyLiteral {
        if self.bytes {
            return PyLiteral::Bytes;
        }
        if !self.formatted {
            return PyLiteral::Text(self.decode(self.body_start, self.body_end, source));
        }
        PyLiteral::Formatted(join_pieces(self.formatted_pieces(node, source)))
    }

    /// Literal text of an f-string: the gaps between interpolations, each
    /// interpolation a break, and format specs as literals of their own.
    fn formatted_pieces(&self, node: Node, source: &[u8]) -> Vec<Piece> {
        let mut pieces = Vec::new();
        let mut cursor = self.body_start;
        for interp in interpolations(node) {
            if interp.start_byte() > cursor {
                pieces.push(Piece::Text(self.decode_segment(cursor, interp.start_byte(), source)));
            }
            pieces.push(Piece::Break);
            for spec in self.format_spec_segments(interp, source) {
                pieces.push(Piece::Text(spec));
                pieces.push(Piece::Break);
            }
            cursor = cursor.max(interp.end_byte());
        }
        if self.body_end > cursor {
            pieces.push(Piece::Text(self.decode_segment(cursor, self.body_end, source)));
        }
        pieces
    }

    /// `{value:>10}` carries the literal `>10`; nested `{width}` fields
    /// split it.
    fn format_spec_segments(&self, interp: Node, source: &[u8]) -> Vec<String> {
        let mut segments = Vec::new();
        for i in 0..interp.named_child_count() {
            let Some(spec) = interp.named_child(i) else {
                continue;
            };
            if spec.kind() != "format_specifier" {
                continue;
            }
            let mut cursor = spec.start_byte();
            if source.get(cursor) == Some(&b':') {
                cursor += 1;
            }
            for j in 0..spec.named_child_count() {
                if let Some(inner) = spec.named_child(j) {
                    if inner.kind() == "interpolation" {
                        if inner.start_byte() > cursor {
                            segments.push(self.decode_segment(cursor, inner.start_byte(), source));
                        }
                        cursor = cursor.max(inner.end_byte());
                    }
                }
            }
            if spec.end_byte() > cursor {
                segments.push(self.decode_segment(cursor, spec.end_byte(), source));
            }
        }
        segments
    }

    fn decode(&self, start: usize, end: usize, source: &[u8]) -> String {
        let body = String::from_utf8_lossy(&source[start..end]);
        if self.raw {
            body.into_owned()
        } else {
            unescape(&body)
        }
    }

    fn decode_segment(&self, start: usize, end: usize, source: &[u8]) -> String {
        self.decode(start, end, source)
            .replace("{{", "{")
            .replace("}}", "}")
    }
}

/// Decode the backslash escapes of a non-raw `str` literal body.
///
/// `\N{...}` is not resolved against the Unicode name table; it becomes a
/// single U+FFFD so character counts stay right.
pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.clone().take(width).collect();
                match u32::from_str_radix(&digits, 16) {
                    Ok(value) if digits.len() == width => {
                        for _ in 0..width {
                            chars.next();
                        }
                        out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
                    }
                    _ => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            }
            'N' if chars.peek() == Some(&'{') => {
                for d in chars.by_ref() {
                    if d == '}' {
                        break;
                    }
                }
                out.push('\u{fffd}');
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}
