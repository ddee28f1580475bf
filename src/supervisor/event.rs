//! Messages sent from worker threads to the control thread.

use crate::catalog::ScriptKey;
use std::fmt;

/// Identifies one launch of a script key.
///
/// A key can be launched again after its previous process ended; events
/// tagged with an older id are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaunchId(pub(crate) u64);

/// Identifies one install batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub(crate) u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "install#{}", self.0)
    }
}

/// Work completed off the control thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A decoded chunk of merged script output.
    Output {
        key: ScriptKey,
        launch: LaunchId,
        text: String,
    },
    /// One of a script's output streams reached end of file.
    StreamClosed { key: ScriptKey, launch: LaunchId },
    /// A decoded chunk of installer output.
    InstallLog { job: JobId, text: String },
    /// An install batch ended; sent after all of its output.
    InstallFinished {
        job: JobId,
        success: bool,
        exit_code: Option<i32>,
    },
}
