//! CLI module for Stillcast
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{AssembleArgs, PlanArgs, ProbeArgs, SettingsArgs};

/// Stillcast
///
/// Turns a still image and an audio track into a video, cleaning up the
/// audio first and splitting long tracks into independently encoded segments.
#[derive(Parser, Debug)]
#[command(name = "stillcast")]
#[command(about = "Stillcast - Still image + audio to video, with fallbacks")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (or a full tracing filter directive)
    #[arg(long, default_value = "info", env = "STILLCAST_LOG", global = true)]
    pub log_level: String,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Settings file (.toml, .yaml or .yml); defaults to ./stillcast.toml when present
    #[arg(long, env = "STILLCAST_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble a video from an image and an audio track
    Assemble(AssembleArgs),
    /// Print the audio duration of a file
    Probe(ProbeArgs),
    /// Show how an audio track would be encoded, without encoding it
    Plan(PlanArgs),
}
