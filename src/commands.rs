//! CLI command definitions
//!
//! Defines the clap commands for the stackprobe CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a playbook defined in a YAML file
    Run {
        /// Path to the YAML playbook file
        path: PathBuf,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,
    },

    /// Print the physical name and ARN of a stack resource
    Resolve {
        /// Logical ID, CDK construct ID or ARN
        id: String,

        /// Stack name (required unless ID is an ARN)
        #[arg(long, short)]
        stack: Option<String>,

        #[command(flatten)]
        source: StackSource,

        /// CDK manifest.json used to translate construct IDs
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the resources of a stack
    Resources {
        /// Stack name
        #[arg(long, short)]
        stack: String,

        #[command(flatten)]
        source: StackSource,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where stack resources come from
#[derive(clap::Args, Debug, Clone)]
pub struct StackSource {
    /// Region (default: config file, then AWS_REGION, then us-east-1)
    #[arg(long, short)]
    pub region: Option<String>,

    /// Read a saved describe-stack-resources JSON document instead of
    /// calling the AWS CLI
    #[arg(long)]
    pub resources: Option<PathBuf>,
}
