//! Child process construction and quiet execution.
//!
//! Every process scriptorium starts (scripts, probes, installers) is an
//! interpreter or package-manager invocation with explicit arguments; no
//! shell sits in between, so package names and script paths are never
//! re-parsed.

use crate::error::{Result, ScriptoriumError};
use std::collections::HashMap;
use std::io::{self, PipeReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Environment forced on interpreter children so their output decodes as
/// UTF-8 and is flushed as it is produced.
pub const INTERPRETER_ENV: &[(&str, &str)] = &[
    ("PYTHONUNBUFFERED", "1"),
    ("PYTHONIOENCODING", "utf-8"),
    ("PYTHONUTF8", "1"),
];

/// A program plus arguments to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable name or path.
    pub program: String,

    /// Arguments, passed verbatim.
    pub args: Vec<String>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Extra environment variables (merged with the inherited env).
    pub env: HashMap<String, String>,
}

impl CommandSpec {
    /// Create a spec for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: HashMap::new(),
        }
    }

    /// Create a spec for an interpreter, with the UTF-8 environment applied.
    pub fn interpreter(program: impl Into<String>) -> Self {
        let mut spec = Self::new(program);
        for (key, value) in INTERPRETER_ENV {
            spec.env.insert(key.to_string(), value.to_string());
        }
        spec
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Human-readable command line, for logs and error messages.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(char::is_whitespace) {
                line.push_str(&format!("{:?}", arg));
            } else {
                line.push_str(arg);
            }
        }
        line
    }

    /// Build a `std::process::Command`; callers decide how to wire stdio.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Result of executing a command to completion.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

/// Run a command to completion, capturing its output.
///
/// Output is decoded lossily. Failing to start the process is an error;
/// a non-zero exit is reported through [`CommandResult::success`].
pub fn execute_quiet(spec: &CommandSpec) -> Result<CommandResult> {
    let start = Instant::now();

    let output = spec
        .to_command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| ScriptoriumError::LaunchFailed {
            script: spec.display(),
            message: e.to_string(),
        })?;

    Ok(CommandResult {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration: start.elapsed(),
        success: output.status.success(),
    })
}

/// Start `spec` with stdout and stderr writing into one pipe.
///
/// Both streams share a single write end, so the returned reader yields
/// the child's output in the order it was written.
pub fn spawn_merged(spec: &CommandSpec, stdin: Stdio) -> io::Result<(Child, PipeReader)> {
    let (reader, writer) = io::pipe()?;
    let mut cmd = spec.to_command();
    cmd.stdin(stdin).stdout(writer.try_clone()?).stderr(writer);
    let child = cmd.spawn()?;
    // Our copies of the write end live in `cmd`; the reader only sees EOF
    // once they are closed.
    drop(cmd);
    Ok((child, reader))
}

/// Run a command and report only whether it exited 0.
pub fn execute_check(spec: &CommandSpec) -> bool {
    execute_quiet(spec).map(|r| r.success).unwrap_or(false)
}
