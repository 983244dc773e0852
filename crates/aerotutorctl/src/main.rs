//! Aerotutor Control - CLI front-end for the training-only aircraft
//! systems tutor.
//!
//! Talks only to the tutor orchestrator; retriever output is never
//! accessible directly from here.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aerotutorctl")]
#[command(about = "Training-only aircraft systems tutor", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (default: ./aerotutor.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a conceptual question about an aircraft system
    Ask {
        /// The question, in natural language
        question: Vec<String>,

        /// System focus: electrical or hydraulic
        #[arg(long, default_value = "electrical")]
        system: String,

        /// Print the structured response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Review recent blocked-query audit events
    Audit {
        /// Number of events to show, newest first
        #[arg(long, default_value_t = 20)]
        recent: usize,
    },

    /// Show what the corpus index sees
    Corpus,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            question,
            system,
            json,
        } => commands::ask(cli.config.as_deref(), &question.join(" "), &system, json),
        Commands::Audit { recent } => commands::audit(cli.config.as_deref(), recent),
        Commands::Corpus => commands::corpus(cli.config.as_deref()),
    }
}
