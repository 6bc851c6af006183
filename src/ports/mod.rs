// Ports - Interface definitions (contracts)

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::model::ProbedDuration;

/// External program an invocation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Transcoder (filters, assembly, concatenation)
    Ffmpeg,
    /// Media prober
    Ffprobe,
}

/// One fully-specified external command
#[derive(Debug, Clone)]
pub struct Invocation {
    pub tool: Tool,
    /// Short label for logs, e.g. `enhance-advanced` or `segment-0002`
    pub label: String,
    pub args: Vec<OsString>,
    /// File the command is expected to produce, if any
    pub output: Option<PathBuf>,
}

impl Invocation {
    /// Render the argument list for logging
    pub fn display_args(&self) -> String {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether an argument is present verbatim
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|arg| arg == needle)
    }

    /// Value following a flag, e.g. `value_of("-ss")`
    pub fn value_of(&self, flag: &str) -> Option<String> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|pos| self.args.get(pos + 1))
            .map(|value| value.to_string_lossy().into_owned())
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// Result of running an external command. Every expected failure is a value.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Exit code zero; the produced file still has to be validated by the caller
    Success { stdout: String, stderr: String },
    /// Non-zero exit or killed by a signal
    Failed { code: Option<i32>, stderr: String },
    /// Exceeded its wall-clock budget and was killed
    TimedOut { after: Duration },
    /// The program could not be started at all
    SpawnFailed { message: String },
}

impl ProcessOutcome {
    /// Short diagnostic built from the tail of stderr
    pub fn diagnostic(&self) -> String {
        match self {
            ProcessOutcome::Success { stderr, .. } => {
                format!("exit 0; {}", stderr_tail(stderr))
            }
            ProcessOutcome::Failed { code, stderr } => match code {
                Some(code) => format!("exit {}; {}", code, stderr_tail(stderr)),
                None => format!("terminated by signal; {}", stderr_tail(stderr)),
            },
            ProcessOutcome::TimedOut { after } => {
                format!("killed after {:.1}s timeout", after.as_secs_f64())
            }
            ProcessOutcome::SpawnFailed { message } => format!("could not start: {}", message),
        }
    }
}

/// Last few non-empty lines of stderr
pub fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(3);
    if lines.is_empty() {
        "no stderr output".to_string()
    } else {
        lines[start..].join(" | ")
    }
}

/// Port for running external media tools
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Run one invocation, killing it once `timeout` elapses
    async fn run(&self, invocation: &Invocation, timeout: Duration) -> ProcessOutcome;
}

/// Port for media duration probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Duration of the first audio stream; never fails, reports `Unknown` instead
    async fn probe_duration(&self, path: &Path) -> ProbedDuration;
}
