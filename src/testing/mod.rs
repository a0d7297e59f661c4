//! YAML playbook runner
//!
//! Reads a playbook file describing shell commands, polls and pauses to run
//! against a deployed stack, and executes it through the playbook engine.
//! Commands may reference stack resources with `{{arn:ID}}` and
//! `{{name:ID}}` placeholders.

mod config;
mod runner;
mod shell;
mod template;

pub use config::*;
pub use runner::{run_playbook, run_playbook_with_config, TestResult};
pub use shell::{ResolveStep, ShellAction, ShellPoll};
pub use template::Template;
