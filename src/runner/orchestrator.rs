//! Run requests from classification to a supervised process.
//!
//! [`Orchestrator::run_script`] classifies a script, asks before
//! installing anything, and either launches immediately or parks the launch
//! until its install batch reports back. Everything happens on the thread
//! that calls [`Orchestrator::pump`]; worker threads only produce events.

use crate::catalog::{ScriptDescriptor, ScriptKey};
use crate::config::{KeyPolicy, ScriptoriumConfig};
use crate::error::{Result, ScriptoriumError};
use crate::requirements::declaration::DeclarationRule;
use crate::requirements::installer::{confirm_install, InstallCoordinator};
use crate::requirements::probe::{InterpreterProbe, Probe};
use crate::requirements::registry::PackageRegistry;
use crate::requirements::status::MissingPackageList;
use crate::requirements::DependencyClassifier;
use crate::shell::{default_interpreter, CommandSpec};
use crate::supervisor::{
    Event, JobId, LaunchOutcome, ScriptStatus, Supervisor, DEFAULT_DRAIN_GRACE,
    DEFAULT_STOP_TIMEOUT,
};
use crate::ui::UserInterface;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

/// Default wait per [`Orchestrator::pump`] in [`Orchestrator::run_until_idle`].
pub const DEFAULT_POLL: Duration = Duration::from_millis(50);

/// What a run request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing was missing; the script was started.
    Launched,
    /// The key is running or waiting on an install.
    AlreadyRunning,
    /// Packages were missing and the install was declined.
    Declined,
    /// Packages are installing; the script starts when the batch succeeds.
    InstallPending(JobId),
    /// The interpreter could not be started.
    SpawnFailed,
}

/// How a finished install batch went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    /// Packages in the batch.
    pub packages: MissingPackageList,
    /// Whether the installer exited 0.
    pub success: bool,
    /// Installer exit code, when there was a process to exit.
    pub exit_code: Option<i32>,
}

/// Settings the orchestrator is built from.
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Interpreter for scripts and probes.
    pub interpreter: String,
    /// Installer prefix; `<interpreter> -m pip install` when unset.
    pub install_command: Option<Vec<String>>,
    /// Supervision key derivation.
    pub key_policy: KeyPolicy,
    /// Declaration marker and window.
    pub declaration: DeclarationRule,
    /// Project aliases layered over the builtins.
    pub aliases: HashMap<String, String>,
    /// Bound on the wait after a kill.
    pub stop_timeout: Duration,
    /// Drain period for output of exited scripts.
    pub drain_grace: Duration,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter().to_string(),
            install_command: None,
            key_policy: KeyPolicy::default(),
            declaration: DeclarationRule::default(),
            aliases: HashMap::new(),
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }
}

impl OrchestratorOptions {
    /// Options from loaded configuration.
    pub fn from_config(config: &ScriptoriumConfig) -> Self {
        let settings = &config.settings;
        Self {
            interpreter: settings
                .interpreter
                .clone()
                .unwrap_or_else(|| default_interpreter().to_string()),
            install_command: settings.install_command.clone(),
            key_policy: settings.key_policy,
            declaration: DeclarationRule {
                marker: settings.declaration_marker.clone(),
                scan_lines: settings.declaration_scan_lines,
            },
            aliases: config.aliases.clone(),
            stop_timeout: Duration::from_millis(settings.stop_timeout_ms),
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }
}

/// A run request waiting on its install batch.
struct PendingInstall {
    key: ScriptKey,
    script: ScriptDescriptor,
    packages: MissingPackageList,
    launch_after: bool,
}

/// Composition root for scanning, probing, installing and supervising.
pub struct Orchestrator<P: Probe = InterpreterProbe> {
    interpreter: String,
    key_policy: KeyPolicy,
    declaration: DeclarationRule,
    registry: PackageRegistry,
    probe: P,
    installer: InstallCoordinator,
    supervisor: Supervisor,
    events: Receiver<Event>,
    pending: HashMap<JobId, PendingInstall>,
    completed: HashMap<JobId, InstallResult>,
}

impl Orchestrator<InterpreterProbe> {
    /// Orchestrator probing the configured interpreter.
    pub fn from_config(config: &ScriptoriumConfig) -> Self {
        let options = OrchestratorOptions::from_config(config);
        let probe = InterpreterProbe::new(&options.interpreter);
        Self::new(options, probe)
    }
}

impl<P: Probe> Orchestrator<P> {
    /// Build an orchestrator around `probe`.
    pub fn new(options: OrchestratorOptions, probe: P) -> Self {
        let (tx, events) = mpsc::channel();

        let installer = match options.install_command {
            Some(command) => InstallCoordinator::new(command, tx.clone()),
            None => InstallCoordinator::pip(&options.interpreter, tx.clone()),
        };
        let supervisor = Supervisor::new(tx)
            .with_stop_timeout(options.stop_timeout)
            .with_drain_grace(options.drain_grace);

        Self {
            interpreter: options.interpreter,
            key_policy: options.key_policy,
            declaration: options.declaration,
            registry: PackageRegistry::with_aliases(&options.aliases),
            probe,
            installer,
            supervisor,
            events,
            pending: HashMap::new(),
            completed: HashMap::new(),
        }
    }

    /// Supervision key for `script`.
    pub fn key_for(&self, script: &ScriptDescriptor) -> ScriptKey {
        script.key(self.key_policy)
    }

    /// Status of `key`.
    pub fn status(&self, key: &ScriptKey) -> ScriptStatus {
        self.supervisor.status(key)
    }

    /// Owned copy of every launched key's status.
    pub fn snapshot(&self) -> Vec<(ScriptKey, ScriptStatus)> {
        self.supervisor.snapshot()
    }

    /// Keys with live children, sorted.
    pub fn running_keys(&self) -> Vec<ScriptKey> {
        self.supervisor.running_keys()
    }

    /// Whether `key` is running or waiting on an install.
    pub fn is_busy(&self, key: &ScriptKey) -> bool {
        self.supervisor.is_running(key) || self.pending.values().any(|p| &p.key == key)
    }

    /// Whether anything is running or installing.
    pub fn has_work(&self) -> bool {
        self.supervisor.has_running() || !self.pending.is_empty()
    }

    /// Outcome of a finished install batch.
    pub fn install_result(&self, job: JobId) -> Option<&InstallResult> {
        self.completed.get(&job)
    }

    /// How `script` is started.
    pub fn script_command(&self, script: &ScriptDescriptor) -> CommandSpec {
        CommandSpec::interpreter(&self.interpreter).arg(script.path.to_string_lossy())
    }

    /// Packages `script` needs that are not installed.
    pub fn check(&self, script: &ScriptDescriptor) -> Result<MissingPackageList> {
        DependencyClassifier::new(&self.registry, &self.probe, &self.probe)
            .with_rule(self.declaration.clone())
            .classify(script)
    }

    /// Resolve dependencies for `script` and start it.
    ///
    /// Missing packages are only installed after the user confirms; the
    /// launch then waits for [`pump`](Self::pump) to see the install
    /// succeed.
    pub fn run_script(
        &mut self,
        script: &ScriptDescriptor,
        ui: &mut dyn UserInterface,
    ) -> Result<RunOutcome> {
        let key = self.key_for(script);
        if self.is_busy(&key) {
            tracing::warn!("Run of '{}' ignored; already running", key);
            ui.warning(&format!("'{}' is already running", key));
            return Ok(RunOutcome::AlreadyRunning);
        }

        let missing = self.check(script)?;
        if missing.is_empty() {
            return Ok(self.launch(key, script, ui));
        }

        if !confirm_install(ui, &script.name, &missing) {
            ui.message(&format!("Not running '{}': missing {}", script.name, missing));
            return Ok(RunOutcome::Declined);
        }

        ui.message(&format!("Installing {}...", missing));
        let job = self.start_install(key, script, missing, true);
        Ok(RunOutcome::InstallPending(job))
    }

    /// Install whatever `script` is missing without running it.
    ///
    /// Returns `None` when nothing is missing.
    pub fn install_missing(
        &mut self,
        script: &ScriptDescriptor,
        ui: &mut dyn UserInterface,
    ) -> Result<Option<JobId>> {
        let missing = self.check(script)?;
        if missing.is_empty() {
            ui.success(&format!("'{}' has everything it needs", script.name));
            return Ok(None);
        }
        ui.message(&format!("Installing {}...", missing));
        let key = self.key_for(script);
        Ok(Some(self.start_install(key, script, missing, false)))
    }

    fn start_install(
        &mut self,
        key: ScriptKey,
        script: &ScriptDescriptor,
        packages: MissingPackageList,
        launch_after: bool,
    ) -> JobId {
        tracing::info!("Installing {} for '{}'", packages, script.name);
        let job = self.installer.install(&packages);
        self.pending.insert(
            job,
            PendingInstall {
                key,
                script: script.clone(),
                packages,
                launch_after,
            },
        );
        job
    }

    fn launch(
        &mut self,
        key: ScriptKey,
        script: &ScriptDescriptor,
        ui: &mut dyn UserInterface,
    ) -> RunOutcome {
        let spec = self.script_command(script);
        match self.supervisor.launch(key, &spec, ui) {
            LaunchOutcome::Launched(_) => RunOutcome::Launched,
            LaunchOutcome::AlreadyRunning => RunOutcome::AlreadyRunning,
            LaunchOutcome::SpawnFailed => RunOutcome::SpawnFailed,
        }
    }

    /// Forward one line to a running script's stdin.
    pub fn send_input(&mut self, key: &ScriptKey, text: &str) -> bool {
        self.supervisor.send_input(key, text)
    }

    /// Kill a running script.
    pub fn stop(&mut self, key: &ScriptKey, ui: &mut dyn UserInterface) -> bool {
        self.supervisor.stop(key, ui)
    }

    /// Kill everything that is running and forget pending launches.
    pub fn stop_all(&mut self, ui: &mut dyn UserInterface) {
        for pending in self.pending.values_mut() {
            pending.launch_after = false;
        }
        self.supervisor.stop_all(ui);
    }

    /// Wait up to `timeout` for events, apply everything queued, and reap
    /// exited scripts. Returns the number of events applied.
    pub fn pump(&mut self, timeout: Duration, ui: &mut dyn UserInterface) -> usize {
        let mut applied = 0;

        match self.events.recv_timeout(timeout) {
            Ok(event) => {
                self.apply(event, ui);
                applied += 1;
            }
            // The orchestrator holds a sender, so Disconnected cannot happen
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {}
        }
        // Drain whatever else is queued before reaping, so output that
        // arrived with an exit is relayed ahead of the terminal status
        while let Ok(event) = self.events.try_recv() {
            self.apply(event, ui);
            applied += 1;
        }

        self.supervisor.reap(ui);
        applied
    }

    /// Pump until nothing is running or installing.
    pub fn run_until_idle(&mut self, ui: &mut dyn UserInterface) {
        while self.has_work() {
            self.pump(DEFAULT_POLL, ui);
        }
    }

    fn apply(&mut self, event: Event, ui: &mut dyn UserInterface) {
        match event {
            Event::InstallLog { text, .. } => ui.install_log(&text),
            Event::InstallFinished {
                job,
                success,
                exit_code,
            } => self.finish_install(job, success, exit_code, ui),
            other => self.supervisor.handle_event(other, ui),
        }
    }

    fn finish_install(
        &mut self,
        job: JobId,
        success: bool,
        exit_code: Option<i32>,
        ui: &mut dyn UserInterface,
    ) {
        // Already finished, or the job was never ours
        let Some(pending) = self.pending.remove(&job) else {
            tracing::debug!("No pending launch for {}", job);
            return;
        };

        // Recorded even when the launch was cancelled
        self.completed.insert(
            job,
            InstallResult {
                packages: pending.packages.clone(),
                success,
                exit_code,
            },
        );

        if !success {
            let error = ScriptoriumError::InstallFailed {
                packages: pending.packages.to_string(),
                code: exit_code,
            };
            tracing::warn!("{} for '{}'", error, pending.script.name);
            // No record is created, so the key stays Idle
            if pending.launch_after {
                ui.error(&format!("{}; '{}' was not started", error, pending.script.name));
            } else {
                ui.error(&error.to_string());
            }
            return;
        }

        ui.success(&format!("Installed {}", pending.packages));
        // launch_after is cleared by stop_all and unset for install-only jobs
        if pending.launch_after {
            self.launch(pending.key, &pending.script, ui);
        }
    }
}
