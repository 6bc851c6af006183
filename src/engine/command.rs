//! ffmpeg argument builder shared by the engine stages

use std::ffi::OsString;
use std::path::Path;

use crate::ports::{Invocation, Tool};

/// Builder for one ffmpeg command line. The output path is always the last argument.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    args: Vec<OsString>,
}

impl FfmpegCommand {
    /// Quiet, non-interactive, overwrite-enabled base command
    pub fn new() -> Self {
        let args = ["-hide_banner", "-nostdin", "-y", "-loglevel", "error"]
            .into_iter()
            .map(OsString::from)
            .collect();
        Self { args }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn flag(self, flag: &str, value: impl Into<OsString>) -> Self {
        self.arg(flag).arg(value)
    }

    pub fn input(self, path: &Path) -> Self {
        self.flag("-i", path.as_os_str())
    }

    pub fn into_invocation(self, label: impl Into<String>, output: &Path) -> Invocation {
        let mut args = self.args;
        args.push(output.as_os_str().to_owned());
        Invocation {
            tool: Tool::Ffmpeg,
            label: label.into(),
            args,
            output: Some(output.to_path_buf()),
        }
    }
}

impl Default for FfmpegCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// Seconds formatted the way ffmpeg time options expect them.
///
/// Microsecond precision, so a sub-millisecond tail segment never reads as zero.
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.6}", seconds.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_last_argument() {
        let invocation = FfmpegCommand::new()
            .input(Path::new("in.wav"))
            .flag("-ar", "44100")
            .into_invocation("test", Path::new("out.wav"));

        assert_eq!(invocation.tool, Tool::Ffmpeg);
        assert_eq!(invocation.args.last().unwrap(), "out.wav");
        assert_eq!(invocation.value_of("-i").as_deref(), Some("in.wav"));
        assert!(invocation.has_arg("-y"));
        assert_eq!(invocation.output_path(), Some(Path::new("out.wav")));
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(600.0), "600.000000");
        assert_eq!(format_seconds(0.1234), "0.123400");
        assert_eq!(format_seconds(-1.0), "0.000000");
        assert_eq!(format_seconds(0.0004), "0.000400");
    }
}
