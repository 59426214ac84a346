//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sheetcheck: samplesheet validation against a configurable rule set
#[derive(Parser)]
#[command(name = "sheetcheck")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a samplesheet and print the grouped issue report
    Validate {
        /// Path to the samplesheet (CSV)
        #[arg(value_name = "SHEET")]
        sheet: PathBuf,

        /// Path to the validation rules document
        #[arg(short, long, default_value = "validation_rules.json")]
        rules: PathBuf,

        /// Cross-check samples against SLIMS (credentials from the environment)
        #[arg(long)]
        lims: bool,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the samplesheet upload endpoint
    Serve {
        /// Path to the validation rules document
        #[arg(short, long, default_value = "validation_rules.json")]
        rules: PathBuf,

        /// Port for the web server
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Directory where uploaded sheets are staged
        #[arg(long, default_value = "uploads")]
        upload_dir: PathBuf,

        /// Cross-check samples against SLIMS (credentials from the environment)
        #[arg(long)]
        lims: bool,
    },
}
