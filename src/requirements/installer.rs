//! Package installation for missing script dependencies.
//!
//! An install batch is one package-manager child with every missing
//! package on its command line. The [`InstallCoordinator`] starts it and
//! returns immediately; output and the final result arrive on the event
//! channel as [`Event::InstallLog`] and [`Event::InstallFinished`].

use crate::requirements::status::MissingPackageList;
use crate::shell::{spawn_merged, CommandSpec};
use crate::supervisor::relay::spawn_reader;
use crate::supervisor::{Event, JobId};
use crate::ui::{Prompt, PromptType, UserInterface};
use std::process::Stdio;
use std::sync::mpsc::Sender;
use std::thread;

/// Installer arguments that follow the interpreter by default.
pub const PIP_INSTALL: &[&str] = &["-m", "pip", "install"];

/// Starts install batches and reports their completion as events.
pub struct InstallCoordinator {
    command: Vec<String>,
    tx: Sender<Event>,
    next_job: u64,
}

impl InstallCoordinator {
    /// Use `command` as the installer prefix; packages are appended.
    pub fn new(command: Vec<String>, tx: Sender<Event>) -> Self {
        Self {
            command,
            tx,
            next_job: 1,
        }
    }

    /// `<interpreter> -m pip install`.
    pub fn pip(interpreter: &str, tx: Sender<Event>) -> Self {
        let mut command = vec![interpreter.to_string()];
        command.extend(PIP_INSTALL.iter().map(|s| s.to_string()));
        Self::new(command, tx)
    }

    /// The installer prefix.
    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Full command line for installing `packages`.
    pub fn command_for(&self, packages: &MissingPackageList) -> CommandSpec {
        let (program, prefix) = match self.command.split_first() {
            Some((program, prefix)) => (program.as_str(), prefix),
            None => ("pip", &[][..]),
        };
        CommandSpec::interpreter(program)
            .args(prefix.iter().cloned())
            .args(packages.iter())
    }

    /// Start installing `packages`.
    ///
    /// An empty list completes successfully without starting a process.
    /// Otherwise the child runs in the background; its merged output is
    /// sent as `InstallLog` and its outcome as `InstallFinished`, always
    /// after the last log chunk.
    pub fn install(&mut self, packages: &MissingPackageList) -> JobId {
        let job = JobId(self.next_job);
        self.next_job += 1;

        if packages.is_empty() {
            let _ = self.tx.send(Event::InstallFinished {
                job,
                success: true,
                exit_code: None,
            });
            return job;
        }

        let spec = self.command_for(packages);
        tracing::debug!("{} running: {}", job, spec.display());

        let (mut child, output) = match spawn_merged(&spec, Stdio::null()) {
            Ok(spawned) => spawned,
            Err(e) => {
                tracing::warn!("Could not start installer '{}': {}", spec.display(), e);
                let _ = self.tx.send(Event::InstallLog {
                    job,
                    text: format!("Failed to start {}: {}", spec.display(), e),
                });
                let _ = self.tx.send(Event::InstallFinished {
                    job,
                    success: false,
                    exit_code: None,
                });
                return job;
            }
        };

        let reader = match spawn_reader(
            format!("{}-output", job),
            output,
            self.tx.clone(),
            move |text| Event::InstallLog { job, text },
            None,
        ) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("Could not relay installer output: {}", e);
                None
            }
        };

        let tx = self.tx.clone();
        let waiter = thread::Builder::new()
            .name(format!("{}-wait", job))
            .spawn(move || {
                // Every log chunk goes out before the result.
                if let Some(reader) = reader {
                    let _ = reader.join();
                }
                let (success, exit_code) = match child.wait() {
                    Ok(status) => (status.success(), status.code()),
                    Err(e) => {
                        tracing::warn!("Waiting on installer failed: {}", e);
                        (false, None)
                    }
                };
                let _ = tx.send(Event::InstallFinished {
                    job,
                    success,
                    exit_code,
                });
            });

        if let Err(e) = waiter {
            tracing::warn!("Could not watch installer: {}", e);
            let _ = self.tx.send(Event::InstallFinished {
                job,
                success: false,
                exit_code: None,
            });
        }

        job
    }
}

/// Ask whether to install `packages` for `script`.
///
/// The prompt key is `install_<script>`; a failed prompt counts as "no".
pub fn confirm_install(
    ui: &mut dyn UserInterface,
    script: &str,
    packages: &MissingPackageList,
) -> bool {
    let prompt = Prompt {
        key: format!("install_{}", script),
        question: format!(
            "'{}' needs packages that are not installed: {}. Install them now?",
            script, packages
        ),
        prompt_type: PromptType::Confirm,
        default: Some("yes".to_string()),
    };

    ui.prompt(&prompt)
        .ok()
        .and_then(|r| r.as_bool())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::sync::mpsc::{self, Receiver};
    use std::time::Duration;

    fn collect_until_finished(rx: &Receiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = rx.recv_timeout(Duration::from_secs(10)) {
            let done = matches!(event, Event::InstallFinished { .. });
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    fn logs(events: &[Event]) -> String {
        events
            .iter()
            .filter_map(|e| match e {
                Event::InstallLog { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn pip_command_line() {
        let (tx, _rx) = mpsc::channel();
        let coordinator = InstallCoordinator::pip("python3", tx);
        let spec = coordinator.command_for(&MissingPackageList::new(["requests", "attrs"]));

        assert_eq!(spec.program, "python3");
        assert_eq!(spec.args, vec!["-m", "pip", "install", "attrs", "requests"]);
    }

    #[test]
    fn custom_prefix_gets_packages_appended() {
        let (tx, _rx) = mpsc::channel();
        let coordinator = InstallCoordinator::new(
            vec!["uv".to_string(), "pip".to_string(), "install".to_string()],
            tx,
        );
        let spec = coordinator.command_for(&MissingPackageList::new(["rich"]));
        assert_eq!(spec.display(), "uv pip install rich");
    }

    #[test]
    fn empty_list_finishes_without_a_process() {
        let (tx, rx) = mpsc::channel();
        let mut coordinator =
            InstallCoordinator::new(vec!["definitely-not-a-program-xyz".to_string()], tx);

        let job = coordinator.install(&MissingPackageList::default());
        assert_eq!(
            rx.try_recv().unwrap(),
            Event::InstallFinished {
                job,
                success: true,
                exit_code: None
            }
        );
    }

    #[test]
    fn missing_installer_reports_failure() {
        let (tx, rx) = mpsc::channel();
        let mut coordinator =
            InstallCoordinator::new(vec!["definitely-not-a-program-xyz".to_string()], tx);

        let job = coordinator.install(&MissingPackageList::new(["foo"]));
        let events = collect_until_finished(&rx);
        assert!(logs(&events).starts_with("Failed to start"));
        assert_eq!(
            events.last(),
            Some(&Event::InstallFinished {
                job,
                success: false,
                exit_code: None
            })
        );
    }

    #[cfg(unix)]
    fn fake_installer(body: &str) -> Vec<String> {
        ["sh", "-c", body, "sh"].iter().map(|s| s.to_string()).collect()
    }

    #[cfg(unix)]
    #[test]
    fn successful_install_relays_output_then_finishes() {
        let (tx, rx) = mpsc::channel();
        let mut coordinator =
            InstallCoordinator::new(fake_installer(r#"echo "Installing $*"; exit 0"#), tx);

        let job = coordinator.install(&MissingPackageList::new(["foo", "bar"]));
        let events = collect_until_finished(&rx);

        assert_eq!(logs(&events), "Installing bar foo");
        assert_eq!(
            events.last(),
            Some(&Event::InstallFinished {
                job,
                success: true,
                exit_code: Some(0)
            })
        );
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_failure() {
        let (tx, rx) = mpsc::channel();
        let mut coordinator =
            InstallCoordinator::new(fake_installer("echo 'no such package' 1>&2; exit 2"), tx);

        let job = coordinator.install(&MissingPackageList::new(["nope"]));
        let events = collect_until_finished(&rx);

        assert!(logs(&events).contains("no such package"));
        assert_eq!(
            events.last(),
            Some(&Event::InstallFinished {
                job,
                success: false,
                exit_code: Some(2)
            })
        );
    }

    #[cfg(unix)]
    #[test]
    fn installer_streams_arrive_in_write_order() {
        let (tx, rx) = mpsc::channel();
        let mut coordinator = InstallCoordinator::new(
            fake_installer("for p in \"$@\"; do echo \"get $p\"; echo \"warn $p\" 1>&2; done"),
            tx,
        );

        coordinator.install(&MissingPackageList::new(["a", "b", "c"]));
        let events = collect_until_finished(&rx);

        assert_eq!(
            logs(&events),
            "get a\nwarn a\nget b\nwarn b\nget c\nwarn c"
        );
    }

    #[test]
    fn job_ids_are_distinct() {
        let (tx, _rx) = mpsc::channel();
        let mut coordinator = InstallCoordinator::pip("python3", tx);
        let a = coordinator.install(&MissingPackageList::default());
        let b = coordinator.install(&MissingPackageList::default());
        assert_ne!(a, b);
    }

    #[test]
    fn confirm_uses_script_prompt_key() {
        let mut ui = MockUI::new();
        ui.set_prompt_response("install_report", "no");

        let confirmed = confirm_install(&mut ui, "report", &MissingPackageList::new(["x"]));
        assert!(!confirmed);
        assert_eq!(ui.prompts_shown(), ["install_report".to_string()]);
    }

    #[test]
    fn confirm_accepts_yes() {
        let mut ui = MockUI::new();
        ui.set_prompt_response("install_report", "yes");
        assert!(confirm_install(&mut ui, "report", &MissingPackageList::new(["x"])));
    }
}
