//! Command definitions.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

pub mod completions;
pub mod dependents;
pub mod reconcile;

/// Commit image updates from image policies back to git.
#[derive(Debug, Parser)]
#[command(name = "imgauto", version, about)]
pub struct Cli {
    /// Only print essential output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write logs to stderr as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one automation: clone, update, commit and push.
    Reconcile {
        /// Automation to run, as <namespace>/<name>.
        automation: String,

        /// JSON file holding automations, repositories, policies and
        /// secrets. Status is written back to it.
        #[arg(long)]
        objects: PathBuf,

        /// Controller configuration (TOML).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Command applying image policies. Receives the manifests
        /// directory as its last argument and the policies as JSON on
        /// stdin; prints the update result as JSON.
        #[arg(long)]
        mutator: Option<String>,

        /// Time the mutator may run before it is killed.
        #[arg(long, default_value = "2m", value_parser = humantime::parse_duration)]
        mutator_timeout: Duration,
    },

    /// List the automations a change to an object would trigger.
    Dependents {
        /// JSON objects file.
        #[arg(long)]
        objects: PathBuf,

        /// Changed git repository, as <namespace>/<name>.
        #[arg(long, required_unless_present = "image_policy", conflicts_with = "image_policy")]
        git_repository: Option<String>,

        /// Changed image policy, as <namespace>/<name>.
        #[arg(long)]
        image_policy: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
