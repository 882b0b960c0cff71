//! Glob patterns over item paths.
//!
//! Patterns are matched against the path strings already embedded in items;
//! the filesystem is never consulted.
//!
//! - `**` as a whole segment matches any number of segments
//! - `*` matches any run of characters inside one segment
//! - `?` matches a single character inside one segment
//! - everything else is literal
//!
//! The empty pattern matches nothing.

use regex::Regex;
use std::fmt;
use vigilance_core::{normalize, ItemPath, QualityError, QualityItem, Result};

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Option<Regex>,
}

impl PathPattern {
    /// Compile a glob pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        let source = normalize(pattern.trim());
        if source.is_empty() {
            return Ok(Self { source, regex: None });
        }

        let translated = translate(&source);
        let regex = Regex::new(&translated).map_err(|e| QualityError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source,
            regex: Some(regex),
        })
    }

    /// The normalized pattern text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether this pattern can never match.
    pub fn is_inert(&self) -> bool {
        self.regex.is_none()
    }

    /// Whether a path matches.
    pub fn matches(&self, path: &ItemPath) -> bool {
        match &self.regex {
            Some(re) => re.is_match(path.as_str()),
            None => false,
        }
    }

    /// Items whose path matches, in report order.
    pub fn select<'a>(&self, items: &'a [QualityItem]) -> Vec<&'a QualityItem> {
        items.iter().filter(|item| self.matches(item.path())).collect()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Translate a normalized glob into an anchored regular expression.
fn translate(glob: &str) -> String {
    let segments: Vec<&str> = glob.split('/').collect();
    let mut re = String::from("^");

    for (i, segment) in segments.iter().enumerate() {
        let last = i + 1 == segments.len();

        if *segment == "**" {
            if last {
                re.push_str(".+");
            } else {
                re.push_str("(?:[^/]+/)*");
            }
            continue;
        }

        for ch in segment.chars() {
            match ch {
                '*' => re.push_str("[^/]*"),
                '?' => re.push_str("[^/]"),
                other => re.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
            }
        }
        if !last {
            re.push('/');
        }
    }

    re.push('$');
    re
}
