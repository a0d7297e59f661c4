//! CLI command handling
//!
//! Dispatches CLI commands and formats output.

use colored::Colorize;
use serde::Serialize;

use crate::commands::{Commands, StackSource};
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::stack::{CdkManifest, ResourceRegistry, Target};
use crate::testing;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    let config = Config::load()?;

    match command {
        Commands::Run { path, verbose } => {
            let result = testing::run_playbook_with_config(&path, &config, verbose).await?;
            if result.passed {
                Ok(())
            } else {
                Err(Error::Assertion(format!(
                    "playbook '{}' failed: {}",
                    result.name,
                    result.error.unwrap_or_default()
                )))
            }
        }

        Commands::Resolve {
            id,
            stack,
            source,
            manifest,
            json,
        } => {
            let target = Target::parse(&id)?;
            let registry = match (&target, stack) {
                (Target::Arn(arn), None) => {
                    ResourceRegistry::empty("", arn.region(), arn.account())
                }
                (_, Some(stack)) => {
                    let registry = load_registry(&config, &stack, &source).await?;
                    match manifest {
                        Some(path) => registry.with_manifest(CdkManifest::load(&path)?),
                        None => registry,
                    }
                }
                (Target::LogicalId(_), None) => {
                    return Err(Error::Config(format!(
                        "--stack is required to resolve logical ID '{id}'"
                    )))
                }
            };

            let resolved = Resolved {
                id: &id,
                name: target.name(&registry)?,
                arn: target.arn(&registry)?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
            } else {
                println!("{} {}", "Name:".bold(), resolved.name);
                println!("{} {}", "ARN: ".bold(), resolved.arn);
            }
            Ok(())
        }

        Commands::Resources {
            stack,
            source,
            json,
        } => {
            let registry = load_registry(&config, &stack, &source).await?;
            let resources = registry.resources();

            if json {
                println!("{}", serde_json::to_string_pretty(&resources)?);
                return Ok(());
            }

            println!(
                "{} {} ({}, account {})",
                "Stack:".bold(),
                registry.stack_name(),
                registry.region(),
                registry.account()
            );
            if resources.is_empty() {
                println!("No resources");
                return Ok(());
            }

            let width = resources
                .iter()
                .map(|r| r.logical_id.len())
                .max()
                .unwrap_or(0);
            for r in resources {
                println!(
                    "  {:<width$}  {}  {}",
                    r.logical_id,
                    r.physical_id,
                    r.resource_type.dimmed(),
                    width = width
                );
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct Resolved<'a> {
    id: &'a str,
    name: String,
    arn: String,
}

async fn load_registry(
    config: &Config,
    stack: &str,
    source: &StackSource,
) -> Result<ResourceRegistry> {
    let region = source
        .region
        .clone()
        .unwrap_or_else(|| config.stack.region.clone());
    let describer = config.describer(source.resources.as_deref())?;
    ResourceRegistry::load(describer.as_ref(), stack, &region).await
}
