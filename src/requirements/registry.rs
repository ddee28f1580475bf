//! Package registry: module → package mapping and the fixed stdlib list.
//!
//! Most Python distributions install a module with the same name as the
//! package, but a well-known handful do not (`cv2` comes from
//! `opencv-python`, `yaml` from `PyYAML`, ...). The registry holds those
//! aliases and falls back to identity for everything else. Projects can
//! add or override aliases from config.

use std::collections::HashMap;

/// Built-in module → package aliases.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("Crypto", "pycryptodome"),
    ("Levenshtein", "python-Levenshtein"),
    ("OpenSSL", "pyOpenSSL"),
    ("PIL", "Pillow"),
    ("attr", "attrs"),
    ("bs4", "beautifulsoup4"),
    ("cv2", "opencv-python"),
    ("dateutil", "python-dateutil"),
    ("docx", "python-docx"),
    ("dotenv", "python-dotenv"),
    ("fitz", "PyMuPDF"),
    ("jwt", "PyJWT"),
    ("magic", "python-magic"),
    ("pptx", "python-pptx"),
    ("serial", "pyserial"),
    ("skimage", "scikit-image"),
    ("sklearn", "scikit-learn"),
    ("telegram", "python-telegram-bot"),
    ("usb", "pyusb"),
    ("win32api", "pywin32"),
    ("win32con", "pywin32"),
    ("yaml", "PyYAML"),
];

/// Modules that never need installing, whatever the interpreter reports.
///
/// The base-runtime probe catches the rest of the standard library; this
/// list keeps the common cases from spawning a probe at all.
pub const STDLIB_IGNORE: &[&str] = &[
    "__future__",
    "abc",
    "argparse",
    "array",
    "ast",
    "asyncio",
    "base64",
    "binascii",
    "bisect",
    "builtins",
    "calendar",
    "collections",
    "concurrent",
    "configparser",
    "contextlib",
    "copy",
    "csv",
    "ctypes",
    "dataclasses",
    "datetime",
    "decimal",
    "difflib",
    "email",
    "enum",
    "errno",
    "fnmatch",
    "fractions",
    "functools",
    "gc",
    "getpass",
    "glob",
    "gzip",
    "hashlib",
    "heapq",
    "hmac",
    "html",
    "http",
    "importlib",
    "inspect",
    "io",
    "ipaddress",
    "itertools",
    "json",
    "logging",
    "math",
    "mimetypes",
    "multiprocessing",
    "operator",
    "os",
    "pathlib",
    "pickle",
    "platform",
    "pprint",
    "queue",
    "random",
    "re",
    "secrets",
    "select",
    "shlex",
    "shutil",
    "signal",
    "socket",
    "sqlite3",
    "ssl",
    "statistics",
    "string",
    "struct",
    "subprocess",
    "sys",
    "tempfile",
    "textwrap",
    "threading",
    "time",
    "timeit",
    "tkinter",
    "traceback",
    "types",
    "typing",
    "unicodedata",
    "unittest",
    "urllib",
    "uuid",
    "warnings",
    "weakref",
    "xml",
    "zipfile",
    "zlib",
];

/// Whether `module` is on the fixed standard-library ignore list.
pub fn is_ignored_module(module: &str) -> bool {
    STDLIB_IGNORE.binary_search(&module).is_ok()
}

/// Maps import-time module names to installable package names.
#[derive(Debug, Clone)]
pub struct PackageRegistry {
    aliases: HashMap<String, String>,
}

impl Default for PackageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageRegistry {
    /// Create a registry with the built-in aliases.
    pub fn new() -> Self {
        let aliases = BUILTIN_ALIASES
            .iter()
            .map(|(module, package)| (module.to_string(), package.to_string()))
            .collect();
        Self { aliases }
    }

    /// Create a registry with built-ins plus project aliases.
    ///
    /// Project aliases win over built-ins for the same module.
    pub fn with_aliases(extra: &HashMap<String, String>) -> Self {
        let mut registry = Self::new();
        for (module, package) in extra {
            registry.aliases.insert(module.clone(), package.clone());
        }
        registry
    }

    /// Look up the alias for a module, if any.
    pub fn get(&self, module: &str) -> Option<&str> {
        self.aliases.get(module).map(String::as_str)
    }

    /// Package name that provides `module` (identity when unaliased).
    pub fn resolve(&self, module: &str) -> String {
        self.get(module).unwrap_or(module).to_string()
    }

    /// Number of known aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether the registry has no aliases.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
