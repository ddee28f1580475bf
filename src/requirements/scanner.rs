//! Static import scanning for Python sources.
//!
//! The scanner never executes the script. It walks the source once,
//! stripping comments and string literals, joins logical lines (bracket
//! and backslash continuations), splits `;`-separated statements, and
//! extracts the top-level module of every absolute `import` / `from ...
//! import` statement.
//!
//! Only what the extraction depends on is checked: string literals must
//! terminate, brackets must balance, and import statements must be well
//! formed. Any other statement is skipped unread, so a script with a
//! syntax error elsewhere still reports its imports; the interpreter
//! rejects it when it runs.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use thiserror::Error;

/// Source that could not be scanned for imports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Import scan failed at line {line}: {message}")]
pub struct ScanError {
    /// 1-based line where the problem was detected.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

impl ScanError {
    /// Create a scan error at the given line.
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

fn identifier() -> &'static Regex {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT.get_or_init(|| Regex::new(r"^[^\d\W]\w*$").expect("valid identifier regex"))
}

/// A logical line with string contents and comments removed.
struct LogicalLine {
    text: String,
    line: usize,
}

/// Collect the top-level module names imported by `source`.
///
/// Relative imports (`from . import x`, `from .pkg import y`) are local to
/// the script's directory and are not reported.
pub fn scan_imports(source: &str) -> Result<BTreeSet<String>, ScanError> {
    let mut modules = BTreeSet::new();

    for logical in logical_lines(source)? {
        for statement in logical.text.split(';') {
            parse_statement(statement.trim(), logical.line, &mut modules)?;
        }
    }

    Ok(modules)
}

fn parse_statement(
    statement: &str,
    line: usize,
    modules: &mut BTreeSet<String>,
) -> Result<(), ScanError> {
    // One-line block headers like `try: import x` carry the import after
    // the colon.
    let statement = strip_compound_prefix(statement);

    if let Some(rest) = keyword_rest(statement, "import") {
        let names = rest.replace(['(', ')'], " ");
        let mut seen_any = false;
        for part in names.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let dotted = part.split_whitespace().next().unwrap_or_default();
            let top = top_level(dotted, line)?;
            modules.insert(top);
            seen_any = true;
        }
        if !seen_any {
            return Err(ScanError::new(line, "import statement without a module"));
        }
    } else if let Some(rest) = keyword_rest(statement, "from") {
        let mut words = rest.split_whitespace();
        let source = words
            .next()
            .ok_or_else(|| ScanError::new(line, "from statement without a module"))?;
        if words.next() != Some("import") {
            return Err(ScanError::new(
                line,
                format!("expected 'import' after 'from {}'", source),
            ));
        }
        if words.next().is_none() {
            return Err(ScanError::new(line, "from-import without names"));
        }
        if source.starts_with('.') {
            return Ok(());
        }
        modules.insert(top_level(source, line)?);
    }

    Ok(())
}

/// Return the text after `keyword` when the statement starts with it.
fn keyword_rest<'a>(statement: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = statement.strip_prefix(keyword)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() || c == '(' => Some(rest),
        _ => None,
    }
}

/// Keywords that open a block; a one-line header carries its body after
/// the colon.
const BLOCK_KEYWORDS: &[&str] = &[
    "async", "class", "def", "elif", "else", "except", "finally", "for", "if", "try", "while",
    "with",
];

fn strip_compound_prefix(statement: &str) -> &str {
    let opens_block = BLOCK_KEYWORDS.iter().any(|keyword| {
        statement.strip_prefix(keyword).is_some_and(|rest| {
            rest.starts_with(|c: char| c.is_whitespace() || c == ':' || c == '(')
        })
    });
    if !opens_block {
        return statement;
    }
    match header_colon(statement) {
        // `if a: for b in c: import x` is not valid Python, but peeling
        // repeatedly costs nothing.
        Some(idx) => strip_compound_prefix(statement[idx + 1..].trim()),
        None => statement,
    }
}

/// Position of the colon that ends a block header.
///
/// Colons inside brackets (annotations, slices, dicts, lambdas in
/// arguments) and the `:=` operator do not count.
fn header_colon(statement: &str) -> Option<usize> {
    let bytes = statement.as_bytes();
    let mut depth: usize = 0;
    for (idx, c) in statement.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ':' if depth == 0 && bytes.get(idx + 1) != Some(&b'=') => return Some(idx),
            _ => {}
        }
    }
    None
}

fn top_level(dotted: &str, line: usize) -> Result<String, ScanError> {
    let top = dotted.split('.').next().unwrap_or_default();
    if identifier().is_match(top) {
        Ok(top.to_string())
    } else {
        Err(ScanError::new(
            line,
            format!("invalid module name '{}'", dotted),
        ))
    }
}

/// Split source into logical lines, dropping comments and string bodies.
fn logical_lines(source: &str) -> Result<Vec<LogicalLine>, ScanError> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut start_line = 1;
    let mut depth: usize = 0;
    let mut line_no = 1;

    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '\'' | '"' => {
                let triple = i + 2 < chars.len() && chars[i + 1] == c && chars[i + 2] == c;
                let opened_at = line_no;
                i += if triple { 3 } else { 1 };
                let mut closed = false;
                while i < chars.len() {
                    let d = chars[i];
                    if d == '\\' {
                        if chars.get(i + 1) == Some(&'\n') {
                            line_no += 1;
                        }
                        i += 2;
                        continue;
                    }
                    if d == '\n' {
                        if !triple {
                            break;
                        }
                        line_no += 1;
                    }
                    if d == c
                        && (!triple
                            || (i + 2 < chars.len() && chars[i + 1] == c && chars[i + 2] == c))
                    {
                        i += if triple { 3 } else { 1 };
                        closed = true;
                        break;
                    }
                    i += 1;
                }
                if !closed {
                    return Err(ScanError::new(opened_at, "unterminated string literal"));
                }
                current.push_str("\"\"");
                continue;
            }
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ScanError::new(line_no, format!("unmatched '{}'", c)))?;
            }
            '\r' => {
                i += 1;
                continue;
            }
            '\\' if chars.get(i + 1) == Some(&'\n') => {
                current.push(' ');
                line_no += 1;
                i += 2;
                continue;
            }
            '\n' => {
                line_no += 1;
                if depth == 0 {
                    flush(&mut lines, &mut current, start_line);
                    start_line = line_no;
                } else {
                    current.push(' ');
                }
                i += 1;
                continue;
            }
            _ => {}
        }
        current.push(c);
        i += 1;
    }

    if depth > 0 {
        return Err(ScanError::new(start_line, "unclosed bracket at end of file"));
    }
    flush(&mut lines, &mut current, start_line);
    Ok(lines)
}

fn flush(lines: &mut Vec<LogicalLine>, current: &mut String, line: usize) {
    let text = current.trim();
    if !text.is_empty() {
        lines.push(LogicalLine {
            text: text.to_string(),
            line,
        });
    }
    current.clear();
}
