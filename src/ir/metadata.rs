use serde::{Deserialize, Serialize};

use super::MetadataFlags;

/// Declared package metadata (from PKG-INFO, pyproject.toml, etc.)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: Option<String>,
    pub author: Option<String>,
    pub home_page: Option<String>,
    pub license: Option<String>,
}

impl PackageMetadata {
    pub fn flags(&self) -> MetadataFlags {
        let exist_home_page = self.home_page.is_some();
        let is_package_name_in_home_page = match (&self.name, &self.home_page) {
            (Some(name), Some(home)) => home.contains(name.as_str()),
            _ => false,
        };
        MetadataFlags {
            exist_author: self.author.is_some(),
            exist_home_page,
            exist_license: self
                .license
                .as_deref()
                .is_some_and(|l| !l.eq_ignore_ascii_case("unlicense")),
            is_package_name_in_home_page,
        }
    }
}
