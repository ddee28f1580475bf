//! In-file package declarations.
//!
//! A script can list its packages explicitly with a comment such as
//! `# requirements: requests, python-dateutil` near the top of the file.
//! Only the first matching line within the scanned window is honored.

use std::collections::BTreeSet;

/// Default marker that introduces a declaration line.
pub const DEFAULT_MARKER: &str = "requirements:";

/// Default number of leading lines searched for the marker.
pub const DEFAULT_SCAN_LINES: usize = 15;

/// Where and how to look for a declaration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationRule {
    /// Literal marker text.
    pub marker: String,
    /// Number of leading lines to search.
    pub scan_lines: usize,
}

impl Default for DeclarationRule {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            scan_lines: DEFAULT_SCAN_LINES,
        }
    }
}

impl DeclarationRule {
    /// Parse the declared package names from `source`.
    ///
    /// Returns an empty set when no line within the window carries the
    /// marker.
    pub fn parse(&self, source: &str) -> BTreeSet<String> {
        source
            .lines()
            .take(self.scan_lines)
            .find_map(|line| {
                line.find(&self.marker)
                    .map(|idx| &line[idx + self.marker.len()..])
            })
            .map(parse_package_list)
            .unwrap_or_default()
    }
}

/// Split a comma-separated package list, trimming blanks.
pub fn parse_package_list(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}
