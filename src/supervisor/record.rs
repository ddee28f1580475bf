//! Per-script process state.

use crate::catalog::ScriptKey;
use crate::supervisor::event::LaunchId;
use std::process::{Child, ChildStdin, ExitStatus};
use std::time::{Duration, Instant};

/// Lifecycle status of a script key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptStatus {
    /// Never launched.
    Idle,

    /// Child process alive.
    Running,

    /// Exited with code 0.
    Finished,

    /// Exited non-zero, killed by a signal, or failed to start.
    Failed,

    /// Killed on request.
    Stopped,
}

impl ScriptStatus {
    /// Check if this is a terminal state (no more changes for this launch).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScriptStatus::Finished | ScriptStatus::Failed | ScriptStatus::Stopped
        )
    }

    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            ScriptStatus::Idle => '○',
            ScriptStatus::Running => '◉',
            ScriptStatus::Finished => '✓',
            ScriptStatus::Failed => '✗',
            ScriptStatus::Stopped => '■',
        }
    }

    /// Status for a natural exit.
    pub fn from_exit(status: ExitStatus) -> Self {
        if status.success() {
            ScriptStatus::Finished
        } else {
            ScriptStatus::Failed
        }
    }
}

impl std::fmt::Display for ScriptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScriptStatus::Idle => "idle",
            ScriptStatus::Running => "running",
            ScriptStatus::Finished => "finished",
            ScriptStatus::Failed => "failed",
            ScriptStatus::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}

/// Supervisor-owned state for one script key.
///
/// Terminal records stay in the table so their status remains observable
/// until the key is launched again.
#[derive(Debug)]
pub struct ProcessRecord {
    pub(crate) key: ScriptKey,
    pub(crate) launch: LaunchId,
    pub(crate) status: ScriptStatus,
    pub(crate) child: Option<Child>,
    pub(crate) stdin: Option<ChildStdin>,
    pub(crate) open_streams: usize,
    pub(crate) exited: Option<(ExitStatus, Instant)>,
    pub(crate) started: Instant,
}

impl ProcessRecord {
    pub(crate) fn running(
        key: ScriptKey,
        launch: LaunchId,
        child: Child,
        stdin: Option<ChildStdin>,
        open_streams: usize,
    ) -> Self {
        Self {
            key,
            launch,
            status: ScriptStatus::Running,
            child: Some(child),
            stdin,
            open_streams,
            exited: None,
            started: Instant::now(),
        }
    }

    pub(crate) fn failed_to_start(key: ScriptKey, launch: LaunchId) -> Self {
        Self {
            key,
            launch,
            status: ScriptStatus::Failed,
            child: None,
            stdin: None,
            open_streams: 0,
            exited: None,
            started: Instant::now(),
        }
    }

    /// Key this record supervises.
    pub fn key(&self) -> &ScriptKey {
        &self.key
    }

    /// Launch this record belongs to.
    pub fn launch(&self) -> LaunchId {
        self.launch
    }

    /// Current status.
    pub fn status(&self) -> ScriptStatus {
        self.status
    }

    /// OS process id while the child is held.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Time since launch.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whether an exited child may be finalized: all streams drained, or
    /// the grace period since exit has passed.
    pub(crate) fn ready_to_finalize(&self, grace: Duration) -> bool {
        match self.exited {
            Some((_, at)) => self.open_streams == 0 || at.elapsed() >= grace,
            None => false,
        }
    }

    /// Move to a terminal status and release process handles.
    pub(crate) fn finish(&mut self, status: ScriptStatus) {
        self.status = status;
        self.stdin = None;
        self.child = None;
    }
}
