//! Dependency classification for a single script.
//!
//! `DependencyClassifier` turns a script file into the sorted list of
//! packages that have to be installed before it can run:
//!
//! 1. the declaration line (if any) contributes packages verbatim,
//! 2. detected imports are filtered down to third-party modules that are
//!    not importable right now, then mapped to package names,
//! 3. the union is checked against the installed-package probe.

use crate::catalog::ScriptDescriptor;
use crate::error::{Result, ScriptoriumError};
use crate::requirements::declaration::DeclarationRule;
use crate::requirements::probe::{ModuleProbe, PackageProbe};
use crate::requirements::registry::{is_ignored_module, PackageRegistry};
use crate::requirements::scanner::scan_imports;
use crate::requirements::status::{DependencySet, MissingPackageList};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Computes the missing packages of a script.
pub struct DependencyClassifier<'a> {
    registry: &'a PackageRegistry,
    modules: &'a dyn ModuleProbe,
    packages: &'a dyn PackageProbe,
    rule: DeclarationRule,
}

impl<'a> DependencyClassifier<'a> {
    /// Create a classifier over the given resolver and probes.
    pub fn new(
        registry: &'a PackageRegistry,
        modules: &'a dyn ModuleProbe,
        packages: &'a dyn PackageProbe,
    ) -> Self {
        Self {
            registry,
            modules,
            packages,
            rule: DeclarationRule::default(),
        }
    }

    /// Use a non-default declaration marker or window.
    pub fn with_rule(mut self, rule: DeclarationRule) -> Self {
        self.rule = rule;
        self
    }

    /// Read the script and extract its declared and detected dependencies.
    ///
    /// A scan failure is logged and leaves `detected_modules` empty; only
    /// an unreadable file is an error.
    pub fn dependency_set(&self, script: &ScriptDescriptor) -> Result<DependencySet> {
        let source = fs::read(&script.path).map_err(|e| ScriptoriumError::ScriptRead {
            path: script.path.clone(),
            source: e,
        })?;
        let source = String::from_utf8_lossy(&source);
        Ok(self.dependency_set_from_source(&source))
    }

    /// Same as [`dependency_set`](Self::dependency_set) for in-memory source.
    pub fn dependency_set_from_source(&self, source: &str) -> DependencySet {
        let declared = self.rule.parse(source);
        match scan_imports(source) {
            Ok(detected_modules) => DependencySet {
                declared,
                detected_modules,
                scan_error: None,
            },
            Err(e) => {
                tracing::warn!("{}; import detection skipped", e);
                DependencySet {
                    declared,
                    detected_modules: BTreeSet::new(),
                    scan_error: Some(e),
                }
            }
        }
    }

    /// Packages the script needs that are not installed.
    pub fn classify(&self, script: &ScriptDescriptor) -> Result<MissingPackageList> {
        let deps = self.dependency_set(script)?;
        let missing = self.missing_packages(&deps, Some(script.directory()));
        tracing::debug!(
            "{}: declared {:?}, detected {:?}, missing [{}]",
            script.name,
            deps.declared,
            deps.detected_modules,
            missing
        );
        Ok(missing)
    }

    /// Resolve a dependency set against the probes.
    ///
    /// `script_dir` enables skipping modules that are sibling files or
    /// packages of the script.
    pub fn missing_packages(
        &self,
        deps: &DependencySet,
        script_dir: Option<&Path>,
    ) -> MissingPackageList {
        let mut candidates: BTreeSet<String> = deps.declared.clone();

        for module in &deps.detected_modules {
            if !self.needs_package(module, script_dir) {
                continue;
            }
            candidates.insert(self.registry.resolve(module));
        }

        MissingPackageList::new(
            candidates
                .into_iter()
                .filter(|package| !self.packages.is_installed(package)),
        )
    }

    /// Whether an imported module points at a third-party package that is
    /// not currently importable.
    fn needs_package(&self, module: &str, script_dir: Option<&Path>) -> bool {
        if is_ignored_module(module) {
            return false;
        }
        if script_dir.is_some_and(|dir| is_local_module(dir, module)) {
            tracing::debug!("'{}' is a local module", module);
            return false;
        }
        if self.modules.is_base_runtime(module) {
            return false;
        }
        !self.modules.is_importable(module)
    }
}

/// `module.py` or a `module/` package next to the script.
fn is_local_module(dir: &Path, module: &str) -> bool {
    dir.join(format!("{}.py", module)).is_file() || dir.join(module).is_dir()
}
