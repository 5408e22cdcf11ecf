//! Command-line interface for Marquee, parsed with clap.

mod commands;

use clap::{Parser, Subcommand};

/// Marquee - theater ticket booking service
#[derive(Parser)]
#[command(name = "marquee")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web API server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create an account
    CreateUser {
        email: String,
        password: String,
        /// Give the account the manager role
        #[arg(long)]
        manager: bool,
    },

    /// Insert demo users, theaters and shows
    Seed,

    /// List theaters
    Theaters,

    /// List shows with their occupancy
    #[command(alias = "ls")]
    Shows {
        /// Only shows of this theater
        #[arg(long)]
        theater: Option<i32>,
    },
}

pub use commands::*;
