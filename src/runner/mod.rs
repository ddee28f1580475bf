//! Run orchestration: from a run request to a supervised script.

pub mod orchestrator;

pub use orchestrator::{
    InstallResult, Orchestrator, OrchestratorOptions, RunOutcome, DEFAULT_POLL,
};
