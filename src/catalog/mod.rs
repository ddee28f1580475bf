//! Script catalog: categorized scripts and their supervision keys.
//!
//! The catalog is supplied by configuration rather than discovered from
//! the filesystem. It keeps the declared order of categories and scripts
//! so front-ends can render it as-is.

use crate::config::{CategoryConfig, KeyPolicy};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// One runnable script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptDescriptor {
    /// Category the script is listed under.
    pub category: String,
    /// Display name.
    pub name: String,
    /// Path to the script source.
    pub path: PathBuf,
}

impl ScriptDescriptor {
    /// Create a descriptor.
    pub fn new(category: impl Into<String>, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            path: path.into(),
        }
    }

    /// Supervision key for this script under `policy`.
    pub fn key(&self, policy: KeyPolicy) -> ScriptKey {
        match policy {
            KeyPolicy::Name => ScriptKey(self.name.clone()),
            KeyPolicy::Qualified => ScriptKey(format!("{}/{}", self.category, self.name)),
        }
    }

    /// Directory that holds the script.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Identifier used to index running-process state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScriptKey(String);

impl ScriptKey {
    /// Wrap a raw key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A category and its scripts, in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Category name.
    pub name: String,
    /// Scripts listed under it.
    pub scripts: Vec<ScriptDescriptor>,
}

/// Ordered collection of categorized scripts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Build from config categories; relative paths resolve against `root`.
    pub fn from_config(categories: &[CategoryConfig], root: &Path) -> Self {
        let categories = categories
            .iter()
            .map(|cat| Category {
                name: cat.name.clone(),
                scripts: cat
                    .scripts
                    .iter()
                    .map(|script| {
                        let path = if script.path.is_absolute() {
                            script.path.clone()
                        } else {
                            root.join(&script.path)
                        };
                        ScriptDescriptor::new(&cat.name, &script.name, path)
                    })
                    .collect(),
            })
            .collect();
        Self { categories }
    }

    /// Build directly from `(category, name, path)` tuples, preserving order.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ScriptDescriptor>,
    {
        let mut categories: Vec<Category> = Vec::new();
        for script in entries {
            match categories.iter_mut().find(|c| c.name == script.category) {
                Some(cat) => cat.scripts.push(script),
                None => categories.push(Category {
                    name: script.category.clone(),
                    scripts: vec![script],
                }),
            }
        }
        Self { categories }
    }

    /// Rebuild in place from reloaded config categories.
    pub fn refresh(&mut self, categories: &[CategoryConfig], root: &Path) {
        *self = Self::from_config(categories, root);
    }

    /// Categories in declared order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// All scripts in declared order.
    pub fn scripts(&self) -> impl Iterator<Item = &ScriptDescriptor> {
        self.categories.iter().flat_map(|c| c.scripts.iter())
    }

    /// Total number of scripts.
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.scripts.len()).sum()
    }

    /// Whether the catalog has no scripts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find a script by `name` or `category/name`.
    ///
    /// A bare name matching scripts in several categories resolves to the
    /// first one in catalog order.
    pub fn find(&self, query: &str) -> Option<&ScriptDescriptor> {
        if let Some((category, name)) = query.split_once('/') {
            if let Some(found) = self
                .scripts()
                .find(|s| s.category == category && s.name == name)
            {
                return Some(found);
            }
        }
        self.scripts().find(|s| s.name == query)
    }

    /// Case-insensitive name filter; categories without matches are dropped.
    pub fn filter(&self, query: &str) -> Catalog {
        let needle = query.to_lowercase();
        let categories = self
            .categories
            .iter()
            .filter_map(|cat| {
                let scripts: Vec<_> = cat
                    .scripts
                    .iter()
                    .filter(|s| s.name.to_lowercase().contains(&needle))
                    .cloned()
                    .collect();
                (!scripts.is_empty()).then(|| Category {
                    name: cat.name.clone(),
                    scripts,
                })
            })
            .collect();
        Catalog { categories }
    }

    /// Keys shared by more than one script under `policy`.
    pub fn colliding_keys(&self, policy: KeyPolicy) -> Vec<ScriptKey> {
        let mut counts: HashMap<ScriptKey, usize> = HashMap::new();
        for script in self.scripts() {
            *counts.entry(script.key(policy)).or_default() += 1;
        }
        let mut collisions: Vec<_> = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(k, _)| k)
            .collect();
        collisions.sort();
        collisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::from_entries([
            ScriptDescriptor::new("Catégorie 1", "Script A", "/s/a.py"),
            ScriptDescriptor::new("Catégorie 1", "Script B", "/s/b.py"),
            ScriptDescriptor::new("Catégorie 2", "Script C", "/s/c.py"),
            ScriptDescriptor::new("Catégorie 3", "Script A", "/s/a2.py"),
        ])
    }

    #[test]
    fn refresh_replaces_contents() {
        use crate::config::ScriptConfig;

        let mut catalog = sample();
        let reloaded = vec![CategoryConfig {
            name: "Tools".to_string(),
            scripts: vec![ScriptConfig {
                name: "hello".to_string(),
                path: PathBuf::from("scripts/hello.py"),
            }],
        }];
        catalog.refresh(&reloaded, Path::new("/project"));

        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.find("hello").map(|s| s.path.clone()),
            Some(PathBuf::from("/project/scripts/hello.py"))
        );
    }

    #[test]
    fn from_entries_groups_in_order() {
        let catalog = sample();
        let names: Vec<_> = catalog.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Catégorie 1", "Catégorie 2", "Catégorie 3"]);
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn key_policy_name_vs_qualified() {
        let script = ScriptDescriptor::new("Tools", "hello", "/x.py");
        assert_eq!(script.key(KeyPolicy::Name).as_str(), "hello");
        assert_eq!(script.key(KeyPolicy::Qualified).as_str(), "Tools/hello");
    }

    #[test]
    fn find_by_name_returns_first_match() {
        let catalog = sample();
        assert_eq!(catalog.find("Script A").unwrap().category, "Catégorie 1");
    }

    #[test]
    fn find_by_qualified_name() {
        let catalog = sample();
        let found = catalog.find("Catégorie 3/Script A").unwrap();
        assert_eq!(found.path, PathBuf::from("/s/a2.py"));
        assert!(catalog.find("Script Z").is_none());
    }

    #[test]
    fn filter_is_case_insensitive_and_hides_empty_categories() {
        let filtered = sample().filter("script c");
        assert_eq!(filtered.categories().len(), 1);
        assert_eq!(filtered.categories()[0].name, "Catégorie 2");
    }

    #[test]
    fn empty_filter_keeps_everything() {
        assert_eq!(sample().filter("").len(), 4);
    }

    #[test]
    fn colliding_keys_depend_on_policy() {
        let catalog = sample();
        assert_eq!(
            catalog.colliding_keys(KeyPolicy::Name),
            vec![ScriptKey::new("Script A")]
        );
        assert!(catalog.colliding_keys(KeyPolicy::Qualified).is_empty());
    }

    #[test]
    fn from_config_resolves_relative_paths() {
        let categories = vec![CategoryConfig {
            name: "Tools".to_string(),
            scripts: vec![crate::config::ScriptConfig {
                name: "hello".to_string(),
                path: PathBuf::from("scripts/hello.py"),
            }],
        }];
        let catalog = Catalog::from_config(&categories, Path::new("/project"));
        let script = catalog.find("hello").unwrap();
        assert_eq!(script.path, PathBuf::from("/project/scripts/hello.py"));
        assert_eq!(script.directory(), Path::new("/project/scripts"));
    }
}
