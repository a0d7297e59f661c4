//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::Result;
use crate::playbook::{ExponentialBackoff, PlaybookConfig};
use crate::stack::{AwsCliDescriber, ResourceFile, StackDescriber};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Playbook pacing
    #[serde(default)]
    pub playbook: PlaybookSettings,

    /// Retry backoff policy for polling scenes
    #[serde(default)]
    pub backoff: BackoffSettings,

    /// Stack discovery defaults
    #[serde(default)]
    pub stack: StackSettings,
}

/// Playbook pacing settings
#[derive(Debug, Deserialize)]
pub struct PlaybookSettings {
    /// Pause between consecutive scenes in milliseconds
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
}

impl Default for PlaybookSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
        }
    }
}

fn default_interval() -> u64 {
    2_000
}

/// Exponential backoff settings
#[derive(Debug, Deserialize)]
pub struct BackoffSettings {
    /// Delay before the first retry in milliseconds
    #[serde(default = "default_base")]
    pub base_ms: u64,

    /// Upper bound on a single wait in milliseconds
    #[serde(default = "default_cap")]
    pub cap_ms: u64,

    /// Number of retries before a scene gives up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            base_ms: default_base(),
            cap_ms: default_cap(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_base() -> u64 {
    100
}
fn default_cap() -> u64 {
    60_000
}
fn default_max_retries() -> u32 {
    10
}

/// How stack resources are discovered
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DescriberKind {
    /// Shell out to `aws cloudformation describe-stack-resources`
    #[default]
    AwsCli,
    /// Read a saved describe-stack-resources JSON document
    File,
}

/// Stack discovery settings
#[derive(Debug, Deserialize)]
pub struct StackSettings {
    /// Region used when a playbook or command does not name one
    #[serde(default = "default_region")]
    pub region: String,

    /// Default describer
    #[serde(default)]
    pub describer: DescriberKind,

    /// Saved describe output read by the `file` describer
    pub resources_file: Option<PathBuf>,

    /// Executable used by the `aws-cli` describer
    #[serde(default = "default_aws_program")]
    pub aws_program: String,
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            region: default_region(),
            describer: DescriberKind::default(),
            resources_file: None,
            aws_program: default_aws_program(),
        }
    }
}

fn default_aws_program() -> String {
    "aws".to_string()
}

fn default_region() -> String {
    std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string())
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    super::Error::FileRead {
                        path: path.display().to_string(),
                        error: e.to_string(),
                    }
                })?;
                return Self::parse(&content);
            }
        }
        Ok(Self::default())
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.backoff.base_ms == 0 {
            return Err(super::Error::Config(
                "backoff.base_ms must be greater than zero".to_string(),
            ));
        }
        if self.backoff.cap_ms < self.backoff.base_ms {
            return Err(super::Error::Config(format!(
                "backoff.cap_ms ({}) must not be smaller than backoff.base_ms ({})",
                self.backoff.cap_ms, self.backoff.base_ms
            )));
        }
        Ok(())
    }

    /// Backoff policy described by this configuration
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(
            Duration::from_millis(self.backoff.base_ms),
            Duration::from_millis(self.backoff.cap_ms),
            self.backoff.max_retries,
        )
    }

    /// Runtime playbook configuration
    pub fn playbook_config(&self) -> PlaybookConfig {
        let backoff = self.backoff();
        PlaybookConfig::default()
            .with_interval(Duration::from_millis(self.playbook.interval_ms))
            .with_timer_factory(move || Box::new(backoff.clone()))
    }

    /// Pick the stack describer. An explicit `resources_file` always wins
    /// over the configured describer.
    pub fn describer(&self, resources_file: Option<&Path>) -> Result<Box<dyn StackDescriber>> {
        if let Some(path) = resources_file {
            return Ok(Box::new(ResourceFile::new(path)));
        }
        match self.stack.describer {
            DescriberKind::AwsCli => Ok(Box::new(AwsCliDescriber::with_program(
                self.stack.aws_program.clone(),
            ))),
            DescriberKind::File => self
                .stack
                .resources_file
                .as_ref()
                .map(|p| Box::new(ResourceFile::new(p)) as Box<dyn StackDescriber>)
                .ok_or_else(|| {
                    super::Error::Config(
                        "stack.describer = \"file\" requires stack.resources_file".to_string(),
                    )
                }),
        }
    }
}
