//! Step event reporting
//!
//! The runner never logs on its own behalf; it tells an observer what
//! happened and the observer decides where that goes.

use colored::Colorize;
use std::fmt;
use std::time::Duration;

use crate::common::Error;

/// Position and label of a scene within its playbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepInfo {
    /// 1-based position
    pub position: usize,
    /// Number of scenes in the playbook
    pub total: usize,
    pub label: String,
}

impl StepInfo {
    pub fn new(position: usize, total: usize, label: impl Into<String>) -> Self {
        Self {
            position,
            total,
            label: label.into(),
        }
    }
}

impl fmt::Display for StepInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.position, self.total, self.label)
    }
}

/// Summary of a finished scene
#[derive(Debug, Clone, Copy)]
pub struct StepReport {
    /// Number of `attempt` calls made
    pub attempts: usize,
    /// Wall time spent on the scene, including backoff waits
    pub elapsed: Duration,
}

/// Receives structured step events from the runner
pub trait PlaybookObserver: Send + Sync {
    fn scene_started(&self, _step: &StepInfo) {}

    /// A recoverable failure; the scene will be retried if budget remains
    fn attempt_failed(&self, _step: &StepInfo, _attempt: usize, _error: &Error) {}

    /// `error` is `None` when the scene completed
    fn scene_finished(&self, _step: &StepInfo, _report: &StepReport, _error: Option<&Error>) {}
}

/// Emits step events as `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PlaybookObserver for TracingObserver {
    fn scene_started(&self, step: &StepInfo) {
        tracing::info!(
            position = step.position,
            total = step.total,
            label = %step.label,
            "Scene started"
        );
    }

    fn attempt_failed(&self, step: &StepInfo, attempt: usize, error: &Error) {
        tracing::warn!(
            position = step.position,
            label = %step.label,
            attempt,
            error = %error,
            "Scene attempt failed, will retry"
        );
    }

    fn scene_finished(&self, step: &StepInfo, report: &StepReport, error: Option<&Error>) {
        match error {
            None => tracing::info!(
                position = step.position,
                label = %step.label,
                attempts = report.attempts,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "Scene done"
            ),
            Some(e) => tracing::error!(
                position = step.position,
                label = %step.label,
                attempts = report.attempts,
                error = %e,
                "Scene failed"
            ),
        }
    }
}

/// Human oriented step report on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver {
    verbose: bool,
}

impl ConsoleObserver {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl PlaybookObserver for ConsoleObserver {
    fn scene_started(&self, step: &StepInfo) {
        if self.verbose {
            println!("  {} {}", "→".cyan(), step.to_string().dimmed());
        }
    }

    fn attempt_failed(&self, step: &StepInfo, attempt: usize, error: &Error) {
        if self.verbose {
            println!(
                "    {} Step {} attempt {}: {}",
                "…".yellow(),
                step.position,
                attempt,
                error.to_string().dimmed()
            );
        }
    }

    fn scene_finished(&self, step: &StepInfo, report: &StepReport, error: Option<&Error>) {
        match error {
            None => {
                let retries = if report.attempts > 1 {
                    format!(" ({} attempts)", report.attempts)
                } else {
                    String::new()
                };
                println!(
                    "  {} Step {}: {}{}",
                    "✓".green(),
                    step.position,
                    step.label.dimmed(),
                    retries.dimmed()
                );
            }
            Some(e) => println!("  {} Step {}: {}", "✗".red(), step.position, e),
        }
    }
}
