//! Dependency classification results.

use crate::requirements::scanner::ScanError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Dependencies found in one script, computed once per launch attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    /// Packages named on the declaration line.
    pub declared: BTreeSet<String>,

    /// Top-level modules found by the import scanner.
    pub detected_modules: BTreeSet<String>,

    /// Set when the scanner gave up; `detected_modules` is then empty.
    pub scan_error: Option<ScanError>,
}

impl DependencySet {
    /// Whether the script declares nothing and imports nothing.
    pub fn is_empty(&self) -> bool {
        self.declared.is_empty() && self.detected_modules.is_empty()
    }
}

/// Packages that must be installed before a script can run.
///
/// Always sorted lexicographically and free of duplicates, so prompts and
/// installer invocations are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissingPackageList(Vec<String>);

impl MissingPackageList {
    /// Build a list from any collection of names.
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = packages.into_iter().map(Into::into).collect();
        Self(set.into_iter().collect())
    }

    /// Whether nothing needs installing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The package names, in order.
    pub fn packages(&self) -> &[String] {
        &self.0
    }

    /// Iterate over package names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for MissingPackageList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

impl<'a> IntoIterator for &'a MissingPackageList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
