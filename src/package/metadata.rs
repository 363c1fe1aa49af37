//! Declared package metadata: `PKG-INFO` first, `pyproject.toml` as fallback.

use std::path::{Path, PathBuf};

use crate::ir::PackageMetadata;

/// Read the package's declared metadata. Returns `None` when the package
/// declares none in a form we understand; that is not an error.
pub fn read_metadata(root: &Path) -> Option<PackageMetadata> {
    if let Some(path) = find_pkg_info(root) {
        match std::fs::read_to_string(&path) {
            Ok(content) => return Some(parse_pkg_info(&content)),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "failed to read PKG-INFO");
            }
        }
    }

    let pyproject = root.join("pyproject.toml");
    if pyproject.exists() {
        match std::fs::read_to_string(&pyproject) {
            Ok(content) => return parse_pyproject(&content),
            Err(e) => {
                tracing::warn!(file = %pyproject.display(), error = %e, "failed to read pyproject.toml");
            }
        }
    }

    None
}

/// `PKG-INFO` at the root, else the first `*.egg-info/PKG-INFO` beside it.
fn find_pkg_info(root: &Path) -> Option<PathBuf> {
    let direct = root.join("PKG-INFO");
    if direct.is_file() {
        return Some(direct);
    }

    let mut egg_infos: Vec<PathBuf> = std::fs::read_dir(root)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_dir() && p.extension().is_some_and(|e| e == "egg-info"))
        .collect();
    egg_infos.sort();

    egg_infos
        .into_iter()
        .map(|dir| dir.join("PKG-INFO"))
        .find(|p| p.is_file())
}

/// Parse the RFC 822 style header block of a core metadata file.
///
/// Header names are case-insensitive; continuation lines start with
/// whitespace. Only the header block (up to the first blank line) is read.
pub fn parse_pkg_info(content: &str) -> PackageMetadata {
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            break;
        }
        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = headers.last_mut() {
                value.push('\n');
                value.push_str(line.trim());
            }
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    let header = |name: &str| {
        headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };

    PackageMetadata {
        name: header("name"),
        author: header("author"),
        home_page: header("home-page"),
        license: header("license"),
    }
}

/// PEP 621 `[project]` table.
pub fn parse_pyproject(content: &str) -> Option<PackageMetadata> {
    let value = match content.parse::<toml::Value>() {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "pyproject.toml is not valid TOML");
            return None;
        }
    };
    let project = value.get("project")?;

    let as_string = |v: &toml::Value| v.as_str().map(|s| s.to_string());

    let author = project
        .get("authors")
        .and_then(|v| v.as_array())
        .and_then(|authors| authors.first())
        .and_then(|first| first.get("name").or_else(|| first.get("email")))
        .and_then(as_string);

    let home_page = project.get("urls").and_then(|urls| {
        ["Homepage", "homepage", "Home-page", "Home"]
            .iter()
            .find_map(|key| urls.get(*key))
            .and_then(as_string)
    });

    let license = project
        .get("license")
        .and_then(|v| v.get("text").or(Some(v)))
        .and_then(as_string);

    Some(PackageMetadata {
        name: project.get("name").and_then(as_string),
        author,
        home_page,
        license,
    })
}
