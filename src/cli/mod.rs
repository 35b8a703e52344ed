//! CLI interface for courses-api

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "courses-api")]
#[command(version)]
#[command(about = "REST API for users and the courses they own", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default courses.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides the config file)
        #[arg(long, env = "COURSES_HOST")]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(short, long, env = "COURSES_PORT")]
        port: Option<u16>,

        /// Path to the config file (defaults to searching for courses.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Create the users and courses tables in PostgreSQL
    Migrate {
        /// Path to the config file (defaults to searching for courses.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
