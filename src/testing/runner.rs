//! Playbook file runner
//!
//! Loads a YAML playbook, resolves its stack once and drives the steps
//! through the playbook engine, reporting progress on stdout.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;

use super::config::{PlaybookFile, PlaybookStep};
use super::shell::{ResolveStep, ShellAction, ShellPoll};
use super::template::Template;
use crate::common::config::Config;
use crate::common::paths::resolve_relative;
use crate::common::{Error, Result};
use crate::playbook::{ConsoleObserver, Playbook, Scene};
use crate::scenes::Pause;
use crate::stack::{CdkManifest, ResourceRegistry, Target};

/// Result of a playbook run
#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub steps_total: usize,
    /// 1-based position of the failing step
    pub failed_step: Option<usize>,
    pub error: Option<String>,
}

impl TestResult {
    fn failed(name: String, steps_total: usize, error: &Error) -> Self {
        Self {
            name,
            passed: false,
            steps_total,
            failed_step: error.step().map(|s| s.position),
            error: Some(error.to_string()),
        }
    }
}

/// Run a playbook file using the user's configuration
pub async fn run_playbook(path: &Path, verbose: bool) -> Result<TestResult> {
    let config = Config::load()?;
    run_playbook_with_config(path, &config, verbose).await
}

/// Run a playbook file with an explicit configuration.
///
/// Malformed files are reported as `Err`; a stack that cannot be loaded or
/// a failing step produce a failed [`TestResult`].
pub async fn run_playbook_with_config(
    path: &Path,
    config: &Config,
    verbose: bool,
) -> Result<TestResult> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;

    let file: PlaybookFile = serde_yaml::from_str(&content).map_err(|e| {
        Error::ConfigParse(format!("Failed to parse playbook '{}': {}", path.display(), e))
    })?;

    let steps_total = file.steps.len();
    let scenes = build_scenes(&file.steps, verbose)?;

    println!(
        "\n{} {}",
        "Running Test:".blue().bold(),
        file.name.white().bold()
    );
    if let Some(desc) = &file.description {
        println!("  {}", desc.dimmed());
    }

    // Relative paths are relative to the playbook file
    let playbook_dir = path.parent().unwrap_or(Path::new("."));
    let region = file
        .stack
        .region
        .clone()
        .unwrap_or_else(|| config.stack.region.clone());

    println!("\n{}", "Loading stack...".cyan());
    let registry = match load_registry(&file, playbook_dir, &region, config).await {
        Ok(registry) => registry,
        Err(e) => {
            println!("  {} {}", "✗".red(), e);
            return Ok(TestResult::failed(file.name, steps_total, &e));
        }
    };
    println!(
        "  {} {} ({}, {} resources)",
        "✓".green(),
        registry.stack_name(),
        registry.region().dimmed(),
        registry.resources().len()
    );

    let mut playbook_config = config
        .playbook_config()
        .with_observer(Arc::new(ConsoleObserver::new(verbose)));
    if let Some(interval_ms) = file.interval_ms {
        playbook_config = playbook_config.with_interval(Duration::from_millis(interval_ms));
    }
    let mut playbook = Playbook::with_config(scenes, playbook_config);

    println!("\n{}", "Steps:".cyan());
    if let Err(e) = playbook.play(&registry).await {
        println!("\n{} {}\n", "✗".red().bold(), "Test Failed".red().bold());
        return Ok(TestResult::failed(file.name, steps_total, &e));
    }

    println!(
        "\n{} {}\n",
        "✓".green().bold(),
        "Test Passed".green().bold()
    );

    Ok(TestResult {
        name: file.name,
        passed: true,
        steps_total,
        failed_step: None,
        error: None,
    })
}

async fn load_registry(
    file: &PlaybookFile,
    playbook_dir: &Path,
    region: &str,
    config: &Config,
) -> Result<ResourceRegistry> {
    let resources_file = file
        .stack
        .resources_file
        .as_deref()
        .map(|p| resolve_relative(playbook_dir, p));
    let describer = config.describer(resources_file.as_deref())?;
    let registry = ResourceRegistry::load(describer.as_ref(), &file.stack.name, region).await?;

    match &file.stack.manifest {
        Some(manifest) => {
            let manifest = CdkManifest::load(&resolve_relative(playbook_dir, manifest))?;
            Ok(registry.with_manifest(manifest))
        }
        None => Ok(registry),
    }
}

/// Turn playbook steps into scenes, validating every template and target
fn build_scenes(steps: &[PlaybookStep], verbose: bool) -> Result<Vec<Box<dyn Scene>>> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            build_scene(step, verbose).map_err(|e| match e {
                Error::Config(msg) => Error::Config(format!("Step {}: {}", i + 1, msg)),
                other => Error::Config(format!("Step {}: {}", i + 1, other)),
            })
        })
        .collect()
}

fn build_scene(step: &PlaybookStep, verbose: bool) -> Result<Box<dyn Scene>> {
    let scene: Box<dyn Scene> = match step {
        PlaybookStep::Shell { command } => {
            Box::new(ShellAction::new(Template::parse(command)?, verbose))
        }
        PlaybookStep::Pause { seconds } => Box::new(Pause::seconds(*seconds)),
        PlaybookStep::Poll { command, expect } => Box::new(ShellPoll::new(
            Template::parse(command)?,
            expect.clone().unwrap_or_default(),
        )),
        PlaybookStep::Resolve { target } => {
            Box::new(ResolveStep::new(Target::parse(target)?, verbose))
        }
    };
    Ok(scene)
}
