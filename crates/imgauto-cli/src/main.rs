//! imgauto CLI - commit image updates back to git.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod mutator;
mod output;

use commands::{Cli, Commands};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "IMGAUTO_LOG";

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    output::set_quiet(cli.quiet);

    let result = match cli.command {
        Commands::Reconcile {
            automation,
            objects,
            config,
            mutator,
            mutator_timeout,
        } => commands::reconcile::run(
            &automation,
            &objects,
            config.as_deref(),
            mutator.as_deref(),
            mutator_timeout,
        ),
        Commands::Dependents {
            objects,
            git_repository,
            image_policy,
            json,
        } => commands::dependents::run(
            &objects,
            git_repository.as_deref(),
            image_policy.as_deref(),
            json,
        ),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}
