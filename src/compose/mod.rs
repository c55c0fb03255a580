//! Sequential compositor: clips + narration into one recorded video.

/// Clip sources and loaders.
pub mod clip;
/// Orchestration of one composition attempt.
pub mod compositor;
/// `ffmpeg`-backed recorder.
pub mod ffmpeg;
/// Output format capability table.
pub mod format;
/// Frame and frame buffer types.
pub mod frame;
/// Recorder trait and in-memory recorder.
pub mod recorder;
/// Compositor state machine and timeline planning.
pub mod state;
