//! Sheetcheck CLI - samplesheet validation tool.

mod cli;
mod commands;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Validate {
            sheet,
            rules,
            lims,
            json,
        } => commands::validate::run(&sheet, &rules, lims, json),

        Commands::Serve {
            rules,
            port,
            upload_dir,
            lims,
        } => commands::serve::run(&rules, port, &upload_dir, lims),
    };

    match result {
        Ok(clean) => {
            if !clean {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
