//! Whole-file statistics over the install script.

use std::borrow::Cow;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Order-0 Shannon entropy of `text` in bits per symbol, spaces removed.
///
/// Symbols are the code points `0..=255`; any other character still counts
/// towards the length. Returns a value in `0.0..=8.0`, and `0.0` when nothing
/// is left after stripping spaces.
pub fn entropy(text: &str) -> f64 {
    let mut counts = [0usize; 256];
    let mut total = 0usize;
    for ch in text.chars().filter(|&c| c != ' ') {
        total += 1;
        if let Ok(byte) = u8::try_from(u32::from(ch)) {
            counts[byte as usize] += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }

    let len = total as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let c = c as f64;
            (c / len) * (len / c).log2()
        })
        .sum()
}

/// Translate `\r\n` and lone `\r` to `\n`, as a text-mode read does.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Entropy of a file's content read as text: lossy UTF-8, universal newlines.
pub fn text_entropy(bytes: &[u8]) -> f64 {
    entropy(&normalize_newlines(&String::from_utf8_lossy(bytes)))
}

/// Raw length divided by zlib-compressed length at the default level.
/// Empty input yields `0.0`.
pub fn compression_ratio(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    let compressed = match encoder.write_all(data).and_then(|_| encoder.finish()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "zlib compression failed");
            return 0.0;
        }
    };
    data.len() as f64 / compressed.len() as f64
}
