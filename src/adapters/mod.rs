// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod file_config;
pub mod probe_ffprobe;

// Re-export adapters
pub use exec_ffmpeg::FFmpegAdapter;
pub use file_config::FileConfigAdapter;
pub use probe_ffprobe::FFprobeAdapter;
