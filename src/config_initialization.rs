//! Configuration initialization and hierarchy management

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::adapters::FileConfigAdapter;
use crate::cli::SettingsArgs;
use crate::domain::model::PipelineSettings;

/// Build the effective settings following precedence: CLI > Env > File > Defaults.
///
/// Environment variables reach us through clap's `env` attributes, so they
/// already sit in `overrides` alongside the flags.
pub fn resolve_settings(config: Option<&Path>, overrides: &SettingsArgs) -> Result<PipelineSettings> {
    let mut settings = match FileConfigAdapter::discover(config) {
        Some(path) => {
            debug!("Using settings file {}", path.display());
            FileConfigAdapter::load(&path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?
        }
        None => {
            debug!("No settings file, using defaults");
            PipelineSettings::default()
        }
    };

    apply_overrides(&mut settings, overrides);
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

/// Apply command-line and environment overrides on top of `settings`
pub fn apply_overrides(settings: &mut PipelineSettings, overrides: &SettingsArgs) {
    let mut applied = 0;

    if let Some(ffmpeg) = &overrides.ffmpeg {
        settings.ffmpeg_path = ffmpeg.clone();
        applied += 1;
    }
    if let Some(ffprobe) = &overrides.ffprobe {
        settings.ffprobe_path = ffprobe.clone();
        applied += 1;
    }
    if let Some(workers) = overrides.workers {
        settings.workers = workers;
        applied += 1;
    }
    if let Some(chunk_size) = overrides.chunk_size {
        settings.chunk_size_secs = chunk_size.seconds;
        applied += 1;
    }
    if let Some(threshold) = overrides.chunk_threshold {
        settings.chunk_threshold_secs = threshold.seconds;
        applied += 1;
    }
    if let Some(workspace) = &overrides.workspace {
        settings.workspace_root = Some(workspace.clone());
        applied += 1;
    }
    if let Some(fps) = overrides.fps {
        settings.fps = fps;
        applied += 1;
    }
    if overrides.no_verify {
        settings.verify_output = false;
        applied += 1;
    }

    if applied > 0 {
        debug!("Applied {} command-line/environment overrides", applied);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TimeSpec;
    use std::path::PathBuf;

    #[test]
    fn test_overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.toml");
        std::fs::write(&file, "workers = 3\nchunk_size_secs = 120.0\nfps = 30\n").unwrap();

        let overrides = SettingsArgs {
            workers: Some(2),
            chunk_threshold: Some(TimeSpec::from_seconds(300.0)),
            ..SettingsArgs::default()
        };
        let settings = resolve_settings(Some(&file), &overrides).unwrap();

        assert_eq!(settings.workers, 2);
        assert_eq!(settings.chunk_size_secs, 120.0);
        assert_eq!(settings.chunk_threshold_secs, 300.0);
        assert_eq!(settings.fps, 30);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = resolve_settings(
            Some(Path::new("/nonexistent/stillcast.toml")),
            &SettingsArgs::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_result_is_rejected() {
        let overrides = SettingsArgs {
            chunk_size: Some(TimeSpec::from_seconds(0.0)),
            ..SettingsArgs::default()
        };
        let mut settings = PipelineSettings::default();
        apply_overrides(&mut settings, &overrides);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_no_verify_and_paths() {
        let overrides = SettingsArgs {
            ffmpeg: Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")),
            no_verify: true,
            ..SettingsArgs::default()
        };
        let mut settings = PipelineSettings::default();
        apply_overrides(&mut settings, &overrides);
        assert_eq!(settings.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert!(!settings.verify_output);
    }
}
