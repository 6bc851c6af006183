//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::TimeSpec;
use crate::output::OverwritePolicy;

/// Arguments for the assemble command
#[derive(Args, Debug)]
pub struct AssembleArgs {
    /// Still image file path
    #[arg(short, long)]
    pub image: PathBuf,

    /// Audio file path
    #[arg(short, long)]
    pub audio: PathBuf,

    /// Output video file path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Overwrite behavior when the output already exists
    #[arg(long, value_enum, default_value_t = OverwritePolicy::Never)]
    pub overwrite: OverwritePolicy,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Audio file path
    #[arg(short, long)]
    pub audio: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

/// Settings overrides shared by every command. Unset values fall through to
/// the settings file and then to the built-in defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// ffmpeg executable
    #[arg(long, env = "STILLCAST_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe executable
    #[arg(long, env = "STILLCAST_FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Parallel segment encoders
    #[arg(long, env = "STILLCAST_WORKERS", value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Segment length for long tracks (seconds, MM:SS or HH:MM:SS)
    #[arg(long, env = "STILLCAST_CHUNK_SIZE", value_parser = parse_time)]
    pub chunk_size: Option<TimeSpec>,

    /// Tracks longer than this are encoded in segments
    #[arg(long, env = "STILLCAST_CHUNK_THRESHOLD", value_parser = parse_time)]
    pub chunk_threshold: Option<TimeSpec>,

    /// Directory run workspaces are created in
    #[arg(long, env = "STILLCAST_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Output frame rate
    #[arg(long)]
    pub fps: Option<u32>,

    /// Skip probing the published output
    #[arg(long)]
    pub no_verify: bool,
}

fn parse_workers(s: &str) -> Result<usize, String> {
    clap_num::number_range(s, 1, 64)
}

fn parse_time(s: &str) -> Result<TimeSpec, String> {
    TimeSpec::parse(s).map_err(|e| e.to_string())
}
