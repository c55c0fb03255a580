use crate::compose::format::OutputFormat;
use crate::compose::frame::FrameRGBA;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{AdreelError, AdreelResult};
use std::path::PathBuf;

/// Configuration handed to a [`Recorder`] when recording starts.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Output canvas.
    pub canvas: Canvas,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Negotiated container/codec pair.
    pub format: OutputFormat,
    /// Narration PCM feeding the audio track.
    pub audio: AudioInputConfig,
    /// Number of frames the render loop will push.
    pub total_frames: u64,
}

/// Raw PCM audio input for the recorder's audio track.
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Captures the combined audio+video stream of one composition attempt.
///
/// Ordering contract: `write_frame` is called in strictly increasing `FrameIndex` order between
/// `start` and `stop`. Exactly one of `stop` or `abort` ends a started recording.
pub trait Recorder: Send {
    /// Called once before any frames are written.
    fn start(&mut self, cfg: RecorderConfig) -> AdreelResult<()>;
    /// Capture one frame from the shared frame buffer.
    fn write_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> AdreelResult<()>;
    /// Finish recording and hand over every captured data chunk, in order.
    fn stop(&mut self) -> AdreelResult<Vec<Vec<u8>>>;
    /// Tear down without producing output. Must be safe to call in any state.
    fn abort(&mut self);
}

/// In-memory recorder for tests and debugging: keeps every frame and emits one chunk per frame.
#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    cfg: Option<RecorderConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    suppress_output: bool,
    aborted: bool,
}

impl InMemoryRecorder {
    /// Create a new in-memory recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that captures frames but hands over no data on stop, the way a broken platform
    /// encoder does.
    pub fn without_output() -> Self {
        Self {
            suppress_output: true,
            ..Self::default()
        }
    }

    /// Configuration captured in `start`, if any.
    pub fn config(&self) -> Option<&RecorderConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in timeline order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// `true` when the last recording was aborted.
    pub fn was_aborted(&self) -> bool {
        self.aborted
    }
}

impl Recorder for InMemoryRecorder {
    fn start(&mut self, cfg: RecorderConfig) -> AdreelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.aborted = false;
        Ok(())
    }

    fn write_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> AdreelResult<()> {
        if self.cfg.is_none() {
            return Err(AdreelError::media("recorder not started"));
        }
        if let Some((last, _)) = self.frames.last()
            && idx.0 <= last.0
        {
            return Err(AdreelError::media("recorder received out-of-order frame index"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn stop(&mut self) -> AdreelResult<Vec<Vec<u8>>> {
        if self.cfg.is_none() {
            return Err(AdreelError::media("recorder not started"));
        }
        if self.suppress_output {
            return Ok(Vec::new());
        }
        Ok(self.frames.iter().map(|(_, f)| f.data.clone()).collect())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}
