//! Playbook file configuration types
//!
//! Defines the data structures for deserializing YAML playbooks.

use serde::Deserialize;
use std::path::PathBuf;

/// A complete playbook loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct PlaybookFile {
    /// Name of the test
    pub name: String,
    /// Optional description of what the test verifies
    pub description: Option<String>,
    /// The stack under test
    pub stack: StackConfig,
    /// Pause between steps in milliseconds (default from config.toml)
    pub interval_ms: Option<u64>,
    /// The sequence of steps to execute
    pub steps: Vec<PlaybookStep>,
}

/// The deployed stack a playbook runs against
#[derive(Deserialize, Debug)]
pub struct StackConfig {
    /// Stack name
    pub name: String,
    /// Region (default from config.toml)
    pub region: Option<String>,
    /// Saved describe-stack-resources output, relative to the playbook file
    pub resources_file: Option<PathBuf>,
    /// CDK manifest.json used to translate construct IDs
    pub manifest: Option<PathBuf>,
}

/// A single step in the execution flow
#[derive(Deserialize, Debug)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlaybookStep {
    /// Run a shell command once; it must exit 0
    Shell {
        /// Command passed to `sh -c`, placeholders allowed
        command: String,
    },
    /// Sleep before the next step
    Pause {
        seconds: u64,
    },
    /// Re-run a shell command until its result meets the expectation
    Poll {
        /// Command passed to `sh -c`, placeholders allowed
        command: String,
        /// Defaults to "exits 0"
        expect: Option<OutputExpectation>,
    },
    /// Check that a target resolves to a name and ARN
    Resolve {
        /// Logical ID, CDK construct ID or ARN
        target: String,
    },
}

/// Expectations for a polled command
#[derive(Deserialize, Debug, Default, Clone)]
pub struct OutputExpectation {
    /// Whether the command should exit 0 (default: true)
    pub success: Option<bool>,
    /// Substring that should be in stdout
    pub output_contains: Option<String>,
    /// Expected stdout, compared after trimming whitespace
    pub output_equals: Option<String>,
}
