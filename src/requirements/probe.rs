//! Interpreter probes: installed packages and base-runtime modules.
//!
//! Everything here answers questions by asking the target interpreter in a
//! short-lived child process, never by importing anything into our own
//! process. Probe failures of any kind (interpreter missing, crash, bad
//! output) count as "no", which errs toward offering an install rather
//! than running a script with missing dependencies.
//!
//! # Example
//!
//! ```no_run
//! use scriptorium::requirements::probe::{InterpreterProbe, PackageProbe};
//!
//! let probe = InterpreterProbe::new("python3");
//! if !probe.is_installed("requests") {
//!     println!("requests is missing");
//! }
//! ```

use crate::shell::{execute_check, execute_quiet, CommandSpec};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Answers "is this package already satisfied in the environment".
pub trait PackageProbe {
    /// Whether `package` is installed. Never fails; errors mean `false`.
    fn is_installed(&self, package: &str) -> bool;
}

/// Classifies import-time module names.
///
/// Kept separate from [`PackageProbe`] so the base-runtime heuristic can be
/// swapped without touching classification.
pub trait ModuleProbe {
    /// Whether `module` ships with the interpreter itself.
    fn is_base_runtime(&self, module: &str) -> bool;

    /// Whether `module` can be imported right now.
    fn is_importable(&self, module: &str) -> bool;
}

/// Both probe roles in one object.
pub trait Probe: ModuleProbe + PackageProbe {}

impl<T: ModuleProbe + PackageProbe> Probe for T {}

const METADATA_SNIPPET: &str = "\
import sys
from importlib import metadata
metadata.version(sys.argv[1])
";

const IMPORT_SNIPPET: &str = "\
import importlib, sys
importlib.import_module(sys.argv[1])
";

const RUNTIME_MODULES_SNIPPET: &str = "\
import sys
names = set(getattr(sys, 'stdlib_module_names', ())) | set(sys.builtin_module_names)
print('\\n'.join(sorted(names)))
";

const ORIGIN_SNIPPET: &str = "\
import importlib.util, sys
spec = importlib.util.find_spec(sys.argv[1])
if spec is None:
    sys.exit(1)
print(spec.origin or '')
";

/// Directory names that hold third-party installs.
const THIRD_PARTY_DIRS: &[&str] = &["site-packages", "dist-packages"];

/// Probe backed by a real interpreter.
///
/// The set of modules bundled with the interpreter is fetched on first use
/// and kept for the lifetime of the probe; it is never invalidated since
/// the standard library does not change under a running process.
#[derive(Debug)]
pub struct InterpreterProbe {
    interpreter: String,
    runtime_modules: OnceLock<HashSet<String>>,
}

impl InterpreterProbe {
    /// Create a probe for the given interpreter executable.
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            runtime_modules: OnceLock::new(),
        }
    }

    /// The interpreter this probe runs.
    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// Modules bundled with the interpreter (stdlib + builtins).
    pub fn runtime_modules(&self) -> &HashSet<String> {
        self.runtime_modules
            .get_or_init(|| self.fetch_runtime_modules())
    }

    fn fetch_runtime_modules(&self) -> HashSet<String> {
        match self.run_snippet(RUNTIME_MODULES_SNIPPET, None) {
            Some(stdout) => stdout
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
            None => {
                tracing::warn!(
                    "Could not list runtime modules from '{}'; relying on origin checks",
                    self.interpreter
                );
                HashSet::new()
            }
        }
    }

    fn snippet_spec(&self, snippet: &str, arg: Option<&str>) -> CommandSpec {
        let spec = CommandSpec::interpreter(&self.interpreter)
            .arg("-c")
            .arg(snippet);
        match arg {
            Some(arg) => spec.arg(arg),
            None => spec,
        }
    }

    /// Run a snippet with an optional argument; `Some(stdout)` on exit 0.
    fn run_snippet(&self, snippet: &str, arg: Option<&str>) -> Option<String> {
        let spec = self.snippet_spec(snippet, arg);
        match execute_quiet(&spec) {
            Ok(result) if result.success => Some(result.stdout),
            Ok(result) => {
                tracing::debug!(
                    "Probe {:?} exited with {:?}: {}",
                    arg,
                    result.exit_code,
                    result.stderr.lines().last().unwrap_or_default()
                );
                None
            }
            Err(e) => {
                tracing::debug!("Probe {:?} could not run: {}", arg, e);
                None
            }
        }
    }

    fn module_origin(&self, module: &str) -> Option<String> {
        self.run_snippet(ORIGIN_SNIPPET, Some(module))
            .map(|out| out.trim().to_string())
    }
}

impl PackageProbe for InterpreterProbe {
    fn is_installed(&self, package: &str) -> bool {
        if self.run_snippet(METADATA_SNIPPET, Some(package)).is_some() {
            return true;
        }
        let module = normalize_module_name(package);
        self.is_importable(&module)
    }
}

impl ModuleProbe for InterpreterProbe {
    fn is_base_runtime(&self, module: &str) -> bool {
        if self.runtime_modules().contains(module) {
            return true;
        }
        match self.module_origin(module) {
            Some(origin) => origin_is_base_runtime(&origin),
            None => false,
        }
    }

    fn is_importable(&self, module: &str) -> bool {
        execute_check(&self.snippet_spec(IMPORT_SNIPPET, Some(module)))
    }
}

/// Module name a distribution is most likely importable as.
pub fn normalize_module_name(package: &str) -> String {
    package.replace('-', "_")
}

/// Classify a module spec origin reported by the interpreter.
///
/// `built-in` and `frozen` modules are part of the runtime; file origins
/// count as runtime unless they live under a third-party install directory.
/// An empty origin (namespace package) is not classified as runtime.
pub fn origin_is_base_runtime(origin: &str) -> bool {
    match origin {
        "" => false,
        "built-in" | "frozen" => true,
        path => !path
            .split(['/', '\\'])
            .any(|component| THIRD_PARTY_DIRS.contains(&component)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_replaces_hyphens() {
        assert_eq!(normalize_module_name("python-dateutil"), "python_dateutil");
        assert_eq!(normalize_module_name("requests"), "requests");
    }

    #[test]
    fn builtin_and_frozen_origins_are_runtime() {
        assert!(origin_is_base_runtime("built-in"));
        assert!(origin_is_base_runtime("frozen"));
    }

    #[test]
    fn stdlib_file_origin_is_runtime() {
        assert!(origin_is_base_runtime("/usr/lib/python3.12/json/__init__.py"));
    }

    #[test]
    fn site_packages_origin_is_third_party() {
        assert!(!origin_is_base_runtime(
            "/home/u/.venv/lib/python3.12/site-packages/requests/__init__.py"
        ));
        assert!(!origin_is_base_runtime(
            "/usr/lib/python3/dist-packages/yaml/__init__.py"
        ));
        assert!(!origin_is_base_runtime(
            r"C:\Python312\Lib\site-packages\numpy\__init__.py"
        ));
    }

    #[test]
    fn empty_origin_is_not_runtime() {
        assert!(!origin_is_base_runtime(""));
    }

    #[test]
    fn missing_interpreter_means_not_installed() {
        let probe = InterpreterProbe::new("definitely-not-a-python-xyz");
        assert!(!probe.is_installed("requests"));
        assert!(!probe.is_importable("requests"));
        assert!(!probe.is_base_runtime("requests"));
        assert!(probe.runtime_modules().is_empty());
    }

    #[cfg(unix)]
    mod fake_interpreter {
        use super::super::*;
        use std::fs;
        use std::path::Path;
        use tempfile::TempDir;

        /// Write an executable `sh` script that stands in for python.
        ///
        /// It dispatches on the snippet text (`$2`) and the probe argument
        /// (`$3`), and appends one line per runtime-module listing to
        /// `calls.log`.
        fn fake_python(dir: &Path) -> String {
            let log = dir.join("calls.log");
            let script = format!(
                r#"#!/bin/sh
case "$2" in
  *metadata*) [ "$3" = "requests" ] ;;
  *import_module*) [ "$3" = "yaml_compat" ] || [ "$3" = "already_here" ] ;;
  *stdlib_module_names*) echo runtime >> "{log}"; printf 'os\nsys\n' ;;
  *find_spec*)
    case "$3" in
      localstd) echo /usr/lib/python3.12/localstd.py ;;
      requests) echo /venv/lib/python3.12/site-packages/requests/__init__.py ;;
      *) exit 1 ;;
    esac ;;
  *) exit 9 ;;
esac
"#,
                log = log.display()
            );
            let path = dir.join("python");
            fs::write(&path, script).unwrap();
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().to_string()
        }

        #[test]
        fn metadata_hit_is_installed() {
            let temp = TempDir::new().unwrap();
            let probe = InterpreterProbe::new(fake_python(temp.path()));
            assert!(probe.is_installed("requests"));
        }

        #[test]
        fn import_fallback_normalizes_hyphens() {
            let temp = TempDir::new().unwrap();
            let probe = InterpreterProbe::new(fake_python(temp.path()));
            assert!(probe.is_installed("yaml-compat"));
        }

        #[test]
        fn both_paths_failing_is_not_installed() {
            let temp = TempDir::new().unwrap();
            let probe = InterpreterProbe::new(fake_python(temp.path()));
            assert!(!probe.is_installed("bar"));
        }

        #[test]
        fn runtime_modules_are_fetched_once() {
            let temp = TempDir::new().unwrap();
            let probe = InterpreterProbe::new(fake_python(temp.path()));

            assert!(probe.is_base_runtime("os"));
            assert!(probe.is_base_runtime("sys"));
            assert!(probe.is_base_runtime("localstd"));

            let log = fs::read_to_string(temp.path().join("calls.log")).unwrap();
            assert_eq!(log.lines().count(), 1);
        }

        #[test]
        fn third_party_origin_is_not_runtime() {
            let temp = TempDir::new().unwrap();
            let probe = InterpreterProbe::new(fake_python(temp.path()));
            assert!(!probe.is_base_runtime("requests"));
            assert!(!probe.is_base_runtime("unknown_mod"));
        }

        #[test]
        fn importable_module() {
            let temp = TempDir::new().unwrap();
            let probe = InterpreterProbe::new(fake_python(temp.path()));
            assert!(probe.is_importable("already_here"));
            assert!(!probe.is_importable("nothere"));
        }
    }
}
