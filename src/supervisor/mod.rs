//! Script process supervision.
//!
//! The [`Supervisor`] owns one [`ProcessRecord`] per script key and drives
//! each through `Idle → Running → {Finished | Failed | Stopped}`. It never
//! blocks on a child except for the bounded wait after a kill: output
//! arrives as [`Event`]s from relay threads and exits are detected by
//! [`Supervisor::reap`], both called from the control thread.
//!
//! - [`event`] - Messages from worker threads
//! - [`record`] - Per-key state and [`ScriptStatus`]
//! - [`relay`] - Stream reader threads and incremental decoding

pub mod event;
pub mod record;
pub mod relay;

pub use event::{Event, JobId, LaunchId};
pub use record::{ProcessRecord, ScriptStatus};

use crate::catalog::ScriptKey;
use crate::shell::{spawn_merged, CommandSpec};
use crate::ui::UserInterface;
use relay::spawn_reader;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::process::{Child, ExitStatus, Stdio};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

/// Default bound on the wait after killing a child.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default time an exited child's streams get to drain.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_millis(500);

const KILL_POLL: Duration = Duration::from_millis(10);

/// What a launch request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// A child was started.
    Launched(LaunchId),
    /// The key already has a running child; nothing happened.
    AlreadyRunning,
    /// The child could not be started; the key is now `Failed`.
    SpawnFailed,
}

/// Table of supervised script processes.
pub struct Supervisor {
    records: HashMap<ScriptKey, ProcessRecord>,
    tx: Sender<Event>,
    next_launch: u64,
    stop_timeout: Duration,
    drain_grace: Duration,
}

impl Supervisor {
    /// Create a supervisor whose relay threads report on `tx`.
    pub fn new(tx: Sender<Event>) -> Self {
        Self {
            records: HashMap::new(),
            tx,
            next_launch: 1,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }

    /// Set the bound on the wait after a kill.
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Set how long an exited child's output may keep draining.
    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    /// Status of `key`; `Idle` when it has no record.
    pub fn status(&self, key: &ScriptKey) -> ScriptStatus {
        self.records
            .get(key)
            .map_or(ScriptStatus::Idle, ProcessRecord::status)
    }

    /// Whether `key` has a live child.
    pub fn is_running(&self, key: &ScriptKey) -> bool {
        self.status(key) == ScriptStatus::Running
    }

    /// Whether any key has a live child.
    pub fn has_running(&self) -> bool {
        self.records
            .values()
            .any(|r| r.status() == ScriptStatus::Running)
    }

    /// Keys with live children, sorted.
    pub fn running_keys(&self) -> Vec<ScriptKey> {
        let mut keys: Vec<_> = self
            .records
            .values()
            .filter(|r| r.status() == ScriptStatus::Running)
            .map(|r| r.key().clone())
            .collect();
        keys.sort();
        keys
    }

    /// The record for `key`, if any.
    pub fn record(&self, key: &ScriptKey) -> Option<&ProcessRecord> {
        self.records.get(key)
    }

    /// Owned copy of every key's status, sorted by key.
    pub fn snapshot(&self) -> Vec<(ScriptKey, ScriptStatus)> {
        let mut all: Vec<_> = self
            .records
            .values()
            .map(|r| (r.key().clone(), r.status()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Start `spec` under `key`.
    ///
    /// Rejected while `key` is `Running`. A terminal record for the key is
    /// replaced, and events from its launch are ignored from then on.
    pub fn launch(
        &mut self,
        key: ScriptKey,
        spec: &CommandSpec,
        ui: &mut dyn UserInterface,
    ) -> LaunchOutcome {
        if self.is_running(&key) {
            tracing::warn!("'{}' is already running; launch ignored", key);
            return LaunchOutcome::AlreadyRunning;
        }

        let launch = LaunchId(self.next_launch);
        self.next_launch += 1;

        let (mut child, output) = match spawn_merged(spec, Stdio::piped()) {
            Ok(spawned) => spawned,
            Err(e) => {
                tracing::warn!("Failed to start '{}': {}", spec.display(), e);
                self.records.insert(
                    key.clone(),
                    ProcessRecord::failed_to_start(key.clone(), launch),
                );
                ui.script_output(&key, &format!("Failed to start {}: {}", spec.display(), e));
                ui.status_changed(&key, ScriptStatus::Failed);
                return LaunchOutcome::SpawnFailed;
            }
        };

        tracing::debug!("Launched '{}' as pid {} ({})", key, child.id(), spec.display());

        let stdin = child.stdin.take();
        let open_streams = self.relay(&key, launch, output);

        self.records.insert(
            key.clone(),
            ProcessRecord::running(key.clone(), launch, child, stdin, open_streams),
        );
        ui.status_changed(&key, ScriptStatus::Running);
        LaunchOutcome::Launched(launch)
    }

    /// Start the relay thread for the merged output; returns how many
    /// streams it will report closed (0 if the thread could not start).
    fn relay<R>(&self, key: &ScriptKey, launch: LaunchId, reader: R) -> usize
    where
        R: Read + Send + 'static,
    {
        let output_key = key.clone();
        let spawned = spawn_reader(
            format!("{}-output", key),
            reader,
            self.tx.clone(),
            move |text| Event::Output {
                key: output_key.clone(),
                launch,
                text,
            },
            Some(Event::StreamClosed {
                key: key.clone(),
                launch,
            }),
        );
        match spawned {
            Ok(_) => 1,
            Err(e) => {
                tracing::warn!("Could not relay output of '{}': {}", key, e);
                0
            }
        }
    }

    /// Write one line to the script's stdin.
    ///
    /// Returns `false` without side effects when the key is not running or
    /// `text` is empty.
    pub fn send_input(&mut self, key: &ScriptKey, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let Some(record) = self.records.get_mut(key) else {
            return false;
        };
        if record.status() != ScriptStatus::Running {
            return false;
        }
        let Some(stdin) = record.stdin.as_mut() else {
            return false;
        };

        let line = format!("{}\n", text);
        match stdin.write_all(line.as_bytes()).and_then(|()| stdin.flush()) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Could not write to '{}': {}", key, e);
                false
            }
        }
    }

    /// Kill a running script and mark it `Stopped`.
    ///
    /// Returns `false` (and emits nothing) when the key is not running.
    pub fn stop(&mut self, key: &ScriptKey, ui: &mut dyn UserInterface) -> bool {
        let Some(record) = self.records.get_mut(key) else {
            return false;
        };
        if record.status() != ScriptStatus::Running {
            return false;
        }

        if let Some(child) = record.child.as_mut() {
            if let Err(e) = child.kill() {
                tracing::debug!("Kill of '{}' reported: {}", key, e);
            }
            if wait_bounded(child, self.stop_timeout).is_none() {
                tracing::warn!(
                    "'{}' did not exit within {:?} of being killed",
                    key,
                    self.stop_timeout
                );
            }
        }

        record.finish(ScriptStatus::Stopped);
        tracing::debug!("Stopped '{}'", key);
        ui.status_changed(key, ScriptStatus::Stopped);
        true
    }

    /// Stop every running script.
    pub fn stop_all(&mut self, ui: &mut dyn UserInterface) {
        for key in self.running_keys() {
            self.stop(&key, ui);
        }
    }

    /// Apply a relay event.
    ///
    /// Output is forwarded only for the key's current launch while it is
    /// running; anything else is stale and dropped.
    pub fn handle_event(&mut self, event: Event, ui: &mut dyn UserInterface) {
        match event {
            Event::Output { key, launch, text } => match self.records.get(&key) {
                Some(record)
                    if record.launch() == launch && record.status() == ScriptStatus::Running =>
                {
                    ui.script_output(&key, &text);
                }
                _ => tracing::debug!("Dropping stale output for '{}'", key),
            },
            Event::StreamClosed { key, launch } => {
                if let Some(record) = self.records.get_mut(&key) {
                    if record.launch() == launch {
                        record.open_streams = record.open_streams.saturating_sub(1);
                    }
                }
            }
            other => tracing::debug!("Supervisor ignoring {:?}", other),
        }
    }

    /// Detect exited children and fire their terminal status once their
    /// output has drained.
    pub fn reap(&mut self, ui: &mut dyn UserInterface) {
        let grace = self.drain_grace;
        let mut finished = Vec::new();

        for record in self.records.values_mut() {
            if record.status() != ScriptStatus::Running {
                continue;
            }

            // Exit is noted once; the record stays Running until its
            // output stream closes or the drain grace runs out
            if record.exited.is_none() {
                if let Some(child) = record.child.as_mut() {
                    match child.try_wait() {
                        Ok(Some(status)) => record.exited = Some((status, Instant::now())),
                        Ok(None) => {}
                        Err(e) => {
                            tracing::warn!("Could not poll '{}': {}", record.key(), e);
                            record.finish(ScriptStatus::Failed);
                            finished.push((record.key().clone(), ScriptStatus::Failed, None));
                            continue;
                        }
                    }
                }
            }

            if record.ready_to_finalize(grace) {
                if let Some((exit, _)) = record.exited {
                    let status = ScriptStatus::from_exit(exit);
                    record.finish(status);
                    finished.push((record.key().clone(), status, exit.code()));
                }
            }
        }

        // HashMap order is arbitrary
        finished.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, status, code) in finished {
            tracing::debug!("'{}' {} (exit code {:?})", key, status, code);
            ui.status_changed(&key, status);
        }
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        for record in self.records.values_mut() {
            if let Some(child) = record.child.as_mut() {
                let _ = child.kill();
                let _ = child.try_wait();
            }
        }
    }
}

/// Poll `child` until it exits or `timeout` passes.
fn wait_bounded(child: &mut Child, timeout: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) if Instant::now() < deadline => thread::sleep(KILL_POLL),
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!("Wait failed: {}", e);
                return None;
            }
        }
    }
}
