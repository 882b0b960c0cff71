//! Identities for quality items.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized, case-sensitive item path.
///
/// Backslashes become `/`, repeated separators collapse and trailing
/// separators are dropped. Two paths are equal iff their normalized text is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemPath(String);

impl ItemPath {
    /// Normalize a raw path string.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the normalized path is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ItemPath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ItemPath {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl AsRef<str> for ItemPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize separators of a path or pattern string.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        let ch = if ch == '\\' { '/' } else { ch };
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }
    // A lone root keeps its separator.
    while out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

/// The kind of a quality item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A source file from a coverage report.
    File,
    /// A package from a coverage report.
    Package,
    /// A documentation warning.
    Documentation,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemKind::File => "file",
            ItemKind::Package => "package",
            ItemKind::Documentation => "documentation",
        };
        f.write_str(label)
    }
}

/// Stable identity of an item within one report.
///
/// Ordering is by kind, then path, then qualifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemIdentity {
    /// Item kind
    pub kind: ItemKind,

    /// Normalized path used for pattern matching
    pub path: ItemPath,

    /// Distinguishes several items sharing a path (documentation entries)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl ItemIdentity {
    /// Identity without a qualifier.
    pub fn new(kind: ItemKind, path: ItemPath) -> Self {
        Self {
            kind,
            path,
            qualifier: None,
        }
    }

    /// Identity with a qualifier.
    pub fn qualified(kind: ItemKind, path: ItemPath, qualifier: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            qualifier: Some(qualifier.into()),
        }
    }
}

impl fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path)?;
        if let Some(qualifier) = &self.qualifier {
            write!(f, " ({})", qualifier)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_separators() {
        assert_eq!(ItemPath::new("src\\lib\\mod.rs").as_str(), "src/lib/mod.rs");
        assert_eq!(ItemPath::new("src//lib///mod.rs").as_str(), "src/lib/mod.rs");
    }

    #[test]
    fn test_normalize_trailing_slash() {
        assert_eq!(ItemPath::new("pkg/").as_str(), "pkg");
        assert_eq!(ItemPath::new("pkg\\\\").as_str(), "pkg");
        assert_eq!(ItemPath::new("/").as_str(), "/");
    }

    #[test]
    fn test_paths_are_case_sensitive() {
        assert_ne!(ItemPath::new("Src/A.rs"), ItemPath::new("src/a.rs"));
        assert_eq!(ItemPath::new("src\\a.rs"), ItemPath::new("src/a.rs"));
    }

    #[test]
    fn test_identity_display() {
        let id = ItemIdentity::new(ItemKind::File, ItemPath::new("pkg/A.ext"));
        assert_eq!(id.to_string(), "file pkg/A.ext");

        let pkg = ItemIdentity::new(ItemKind::Package, ItemPath::new("core"));
        assert_eq!(pkg.to_string(), "package core");

        let doc = ItemIdentity::qualified(ItemKind::Documentation, ItemPath::new("a.h"), "3:bad");
        assert_eq!(doc.to_string(), "documentation a.h (3:bad)");
    }

    #[test]
    fn test_identity_ordering() {
        let a = ItemIdentity::new(ItemKind::File, ItemPath::new("a"));
        let b = ItemIdentity::new(ItemKind::File, ItemPath::new("b"));
        let p = ItemIdentity::new(ItemKind::Package, ItemPath::new("a"));
        assert!(a < b);
        assert!(b < p);
    }
}
