//! Scenes driven by YAML playbook steps

use async_trait::async_trait;
use colored::Colorize;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use super::config::OutputExpectation;
use super::template::Template;
use crate::common::{Error, Result};
use crate::playbook::{retry_unless_fatal, Outcome, Scene};
use crate::stack::{ResourceRegistry, Target};

/// Captured result of one `sh -c` run
#[derive(Debug)]
struct ShellOutput {
    success: bool,
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

async fn run_shell(command: &str) -> Result<ShellOutput> {
    debug!(command, "Running shell command");
    let output = TokioCommand::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::operation("shell", format!("failed to execute '{command}': {e}")))?;

    Ok(ShellOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a command once; a non-zero exit fails the playbook
pub struct ShellAction {
    command: Template,
    verbose: bool,
}

impl ShellAction {
    pub fn new(command: Template, verbose: bool) -> Self {
        Self { command, verbose }
    }
}

#[async_trait]
impl Scene for ShellAction {
    fn label(&self) -> String {
        format!("$ {}", self.command.as_str())
    }

    async fn attempt(&mut self, registry: &ResourceRegistry) -> Result<Outcome> {
        let command = self.command.render(registry)?;
        let output = run_shell(&command).await?;
        if self.verbose && !output.stdout.is_empty() {
            print!("{}", output.stdout.dimmed());
        }
        if !output.success {
            return Err(Error::operation(
                "shell",
                format!(
                    "'{}' failed with exit code {:?}: {}",
                    command,
                    output.code,
                    output.stderr.trim()
                ),
            ));
        }
        Ok(Outcome::Done)
    }
}

/// Re-run a command until its output meets an expectation
pub struct ShellPoll {
    command: Template,
    expect: OutputExpectation,
}

impl ShellPoll {
    pub fn new(command: Template, expect: OutputExpectation) -> Self {
        Self { command, expect }
    }

    fn check(&self, output: &ShellOutput) -> Result<()> {
        let want_success = self.expect.success.unwrap_or(true);
        if output.success != want_success {
            return Err(Error::Assertion(format!(
                "expected success={}, got exit code {:?}",
                want_success, output.code
            )));
        }
        if let Some(needle) = &self.expect.output_contains {
            if !output.stdout.contains(needle.as_str()) {
                return Err(Error::Assertion(format!(
                    "output does not contain '{needle}'"
                )));
            }
        }
        if let Some(expected) = &self.expect.output_equals {
            if output.stdout.trim() != expected.trim() {
                return Err(Error::Assertion(format!(
                    "expected output '{}', got '{}'",
                    expected.trim(),
                    output.stdout.trim()
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Scene for ShellPoll {
    fn label(&self) -> String {
        format!("poll $ {}", self.command.as_str())
    }

    async fn attempt(&mut self, registry: &ResourceRegistry) -> Result<Outcome> {
        let command = match self.command.render(registry) {
            Ok(command) => command,
            Err(e) => return retry_unless_fatal(e),
        };
        let output = match run_shell(&command).await {
            Ok(output) => output,
            Err(e) => return retry_unless_fatal(e),
        };
        match self.check(&output) {
            Ok(()) => Ok(Outcome::Done),
            Err(e) => Ok(Outcome::Retry(e)),
        }
    }
}

/// Assert that a target resolves, printing what it resolved to
pub struct ResolveStep {
    target: Target,
    verbose: bool,
}

impl ResolveStep {
    pub fn new(target: Target, verbose: bool) -> Self {
        Self { target, verbose }
    }
}

#[async_trait]
impl Scene for ResolveStep {
    fn label(&self) -> String {
        format!("resolve {}", self.target)
    }

    async fn attempt(&mut self, registry: &ResourceRegistry) -> Result<Outcome> {
        let name = self.target.name(registry)?;
        let arn = self.target.arn(registry)?;
        if self.verbose {
            println!("    {} {}", name.white(), arn.dimmed());
        }
        Ok(Outcome::Done)
    }
}
