//! Scripted collaborators shared by the pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use recon_core::{AppConfig, Subdomain};
use recon_scanner::{ProbeOutcome, ProcessRunner, Prober};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// One scripted tool answer.
#[derive(Debug, Clone, Default)]
pub struct ToolReply {
    pub lines: Vec<String>,
    pub delay_ms: u64,
    /// Never returns unless cancelled
    pub hang: bool,
}

impl ToolReply {
    pub fn lines(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn delayed(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }
}

/// Runner answering from a script keyed by (program, last argument).
///
/// The `paramspider` program also writes its lines to `<results_dir>/<target>.txt`,
/// like the real tool does.
#[derive(Default)]
pub struct ScriptedRunner {
    replies: HashMap<(String, String), ToolReply>,
    results_dir: Option<PathBuf>,
    file_extras: HashMap<String, Vec<String>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, program: &str, target: &str, reply: ToolReply) -> Self {
        self.replies
            .insert((program.to_string(), target.to_string()), reply);
        self
    }

    pub fn writing_results_to(mut self, dir: &Path) -> Self {
        self.results_dir = Some(dir.to_path_buf());
        self
    }

    /// Extra lines `target`'s side-effect file holds beyond what stdout showed.
    pub fn with_file_extra(mut self, target: &str, lines: &[&str]) -> Self {
        self.file_extras.insert(
            target.to_string(),
            lines.iter().map(ToString::to_string).collect(),
        );
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn targets_of(&self, program: &str) -> Vec<String> {
        let mut targets: Vec<_> = self
            .calls()
            .into_iter()
            .filter(|(p, _)| p == program)
            .map(|(_, t)| t)
            .collect();
        targets.sort();
        targets
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[String], cancel: &CancellationToken) -> Vec<String> {
        let target = args.last().cloned().unwrap_or_default();
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), target.clone()));

        let reply = self
            .replies
            .get(&(program.to_string(), target.clone()))
            .cloned()
            .unwrap_or_default();

        if cancel.is_cancelled() {
            return Vec::new();
        }

        if reply.hang {
            cancel.cancelled().await;
            return Vec::new();
        }

        tokio::select! {
            () = tokio::time::sleep(Duration::from_millis(reply.delay_ms)) => {}
            () = cancel.cancelled() => return Vec::new(),
        }

        if program == "paramspider" {
            if let Some(dir) = &self.results_dir {
                std::fs::create_dir_all(dir).unwrap();
                let mut contents = reply.lines.clone();
                if let Some(extra) = self.file_extras.get(&target) {
                    contents.extend(extra.iter().cloned());
                }
                std::fs::write(dir.join(format!("{target}.txt")), contents.join("\n")).unwrap();
            }
        }

        reply.lines
    }
}

/// Prober answering from a script and counting probes per host.
#[derive(Default)]
pub struct ScriptedProber {
    outcomes: HashMap<String, (ProbeOutcome, u64)>,
    probes: Mutex<HashMap<String, usize>>,
}

impl ScriptedProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(mut self, host: &str, outcome: ProbeOutcome) -> Self {
        self.outcomes.insert(host.to_string(), (outcome, 0));
        self
    }

    pub fn delayed_outcome(mut self, host: &str, outcome: ProbeOutcome, delay_ms: u64) -> Self {
        self.outcomes.insert(host.to_string(), (outcome, delay_ms));
        self
    }

    pub fn probe_counts(&self) -> HashMap<String, usize> {
        self.probes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, subdomain: &Subdomain) -> ProbeOutcome {
        *self
            .probes
            .lock()
            .unwrap()
            .entry(subdomain.to_string())
            .or_default() += 1;

        let (outcome, delay) = self
            .outcomes
            .get(subdomain.as_str())
            .cloned()
            .unwrap_or((ProbeOutcome::Error("dns error".to_string()), 0));
        tokio::time::sleep(Duration::from_millis(delay)).await;
        outcome
    }
}

/// Config pointing the report and results directories into `tmp`.
pub fn test_config(tmp: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.output.work_dir = tmp.path().join("reports");
    config.tools.results_dir = tmp.path().join("results");
    config
}
