//! Audio-clocked sequential compositor.
//!
//! Clips play back-to-back into a fixed-size frame buffer while the narration runs as the master
//! clock. Recording stops only when the narration ends: clips that run out early leave their last
//! frame frozen on screen, clips that run long are cut.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;

use crate::assets::asset::MediaAsset;
use crate::assets::media::{AudioPcm, decode_audio_f32, write_f32le_file};
use crate::compose::clip::{ClipLoader, ClipSource, FfmpegClipLoader};
use crate::compose::ffmpeg::FfmpegRecorder;
use crate::compose::format::{DEFAULT_PREFERENCE, OutputFormat, choose, probe_encoders};
use crate::compose::frame::FrameBuffer;
use crate::compose::recorder::{AudioInputConfig, Recorder, RecorderConfig};
use crate::compose::state::{ComposeEvent, ComposeFailure, ComposeState, CompositorMachine};
use crate::config::AdreelConfig;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{AdreelError, AdreelResult};

/// Options controlling one [`Compositor`].
#[derive(Clone, Debug)]
pub struct CompositorOpts {
    /// Output frame size.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Narration decode sample rate.
    pub sample_rate: u32,
    /// Narration decode channel count.
    pub channels: u16,
    /// Output format preference, most preferred first.
    pub preference: Vec<OutputFormat>,
    /// Scratch directory for materialized inputs and the narration PCM file.
    pub workdir: PathBuf,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            sample_rate: crate::assets::media::NARRATION_SAMPLE_RATE,
            channels: 2,
            preference: DEFAULT_PREFERENCE.to_vec(),
            workdir: std::env::temp_dir().join("adreel"),
        }
    }
}

impl CompositorOpts {
    /// Compositor options derived from the application config.
    pub fn from_config(cfg: &AdreelConfig, workdir: impl Into<PathBuf>) -> Self {
        Self {
            canvas: cfg.canvas,
            fps: cfg.fps,
            sample_rate: cfg.narration_sample_rate,
            channels: cfg.narration_channels,
            preference: cfg.format_preference.clone(),
            workdir: workdir.into(),
        }
    }
}

/// Result of a successful composition.
#[derive(Clone, Debug)]
pub struct ComposedVideo {
    /// Encoded container bytes.
    pub bytes: Vec<u8>,
    /// Negotiated container/codec pair.
    pub format: OutputFormat,
    /// Number of video frames recorded.
    pub frames: u64,
    /// Narration (and therefore output) duration in seconds.
    pub duration_secs: f64,
}

impl ComposedVideo {
    /// File extension matching the negotiated format.
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    /// The output as an inline media asset.
    pub fn to_asset(&self) -> MediaAsset {
        MediaAsset::inline(self.format.content_type(), self.bytes.clone())
    }

    /// Write `<dir>/<stem>.<ext>` and return its path.
    pub fn write_to(&self, dir: &Path, stem: &str) -> AdreelResult<PathBuf> {
        use anyhow::Context as _;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
        let path = dir.join(format!("{stem}.{}", self.extension()));
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        Ok(path)
    }
}

/// Narration master clock: counts output frames until the narration's natural end.
#[derive(Clone, Copy, Debug)]
struct NarrationClock {
    total_frames: u64,
    elapsed: u64,
}

impl NarrationClock {
    fn new(pcm: &AudioPcm, fps: Fps) -> Self {
        Self {
            total_frames: fps.frames_covering_samples(pcm.sample_frames(), pcm.sample_rate),
            elapsed: 0,
        }
    }

    /// Advance by one frame; `true` when playback reached its end.
    fn tick(&mut self) -> bool {
        self.elapsed += 1;
        self.elapsed >= self.total_frames
    }
}

/// Files written for one composition attempt, removed when dropped.
#[derive(Debug, Default)]
struct ScratchFiles {
    paths: Vec<PathBuf>,
}

impl ScratchFiles {
    /// Local path for `asset`; inline bytes are written below `dir` and tracked.
    fn materialize(&mut self, asset: &MediaAsset, dir: &Path, stem: &str) -> AdreelResult<PathBuf> {
        let path = asset.materialize(dir, stem)?;
        if asset.bytes().is_some() {
            self.paths.push(path.clone());
        }
        Ok(path)
    }

    fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove scratch file")
                }
            }
        }
    }
}

/// One composition attempt: a unique file name prefix and the scratch files written under it.
#[derive(Debug)]
struct Attempt {
    tag: String,
    scratch: ScratchFiles,
}

impl Attempt {
    fn new() -> Self {
        static ATTEMPTS: AtomicU64 = AtomicU64::new(0);
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Self {
            tag: format!(
                "{}_{nanos}_{}",
                std::process::id(),
                ATTEMPTS.fetch_add(1, Ordering::Relaxed)
            ),
            scratch: ScratchFiles::default(),
        }
    }
}

/// Resources acquired for one composition attempt.
///
/// Dropping the graph releases everything on every exit path: clip decoders are killed, an
/// unfinished recording is aborted and every scratch file of the attempt is removed.
struct MediaGraph<'r> {
    clips: Vec<Box<dyn ClipSource>>,
    recorder: &'r mut dyn Recorder,
    recording: bool,
    scratch: ScratchFiles,
}

impl<'r> MediaGraph<'r> {
    fn new(recorder: &'r mut dyn Recorder, scratch: ScratchFiles) -> Self {
        Self {
            clips: Vec::new(),
            recorder,
            recording: false,
            scratch,
        }
    }
}

impl Drop for MediaGraph<'_> {
    fn drop(&mut self) {
        if self.recording {
            self.recorder.abort();
        }
        for clip in &mut self.clips {
            clip.release();
        }
        self.clips.clear();
        // Decoders are gone; their inputs can be deleted now.
        drop(std::mem::take(&mut self.scratch));
        tracing::debug!("media graph released");
    }
}

/// Sequential clip compositor with the narration as master clock.
#[derive(Clone, Debug, Default)]
pub struct Compositor {
    opts: CompositorOpts,
}

impl Compositor {
    /// Create a compositor.
    pub fn new(opts: CompositorOpts) -> Self {
        Self { opts }
    }

    /// Options in use.
    pub fn opts(&self) -> &CompositorOpts {
        &self.opts
    }

    /// Pick the output format for a platform supporting `supported` encoders.
    pub fn negotiate(&self, supported: &BTreeSet<String>) -> AdreelResult<OutputFormat> {
        choose(&self.opts.preference, supported).ok_or(ComposeFailure::UnsupportedFormat.into())
    }

    /// Compose using the system ffmpeg toolchain for probing, decoding and recording.
    pub fn compose_with_ffmpeg(
        &self,
        clips: &[MediaAsset],
        narration: &MediaAsset,
    ) -> AdreelResult<ComposedVideo> {
        let supported = probe_encoders();
        let loader = FfmpegClipLoader::new(self.opts.workdir.join("clips"));
        let mut recorder = FfmpegRecorder::new();
        self.compose(clips, narration, &supported, &loader, &mut recorder)
    }

    /// Compose `clips` under `narration`.
    ///
    /// Format negotiation happens first so an unsupported platform fails before any decoding.
    #[tracing::instrument(skip_all, fields(clips = clips.len()))]
    pub fn compose(
        &self,
        clips: &[MediaAsset],
        narration: &MediaAsset,
        supported: &BTreeSet<String>,
        loader: &dyn ClipLoader,
        recorder: &mut dyn Recorder,
    ) -> AdreelResult<ComposedVideo> {
        let format = self.negotiate(supported)?;
        if clips.is_empty() {
            return Err(ComposeFailure::NoClips.into());
        }
        if narration.is_empty() {
            return Err(ComposeFailure::EmptyNarration.into());
        }
        let mut attempt = Attempt::new();
        let stem = format!("narration_src_{}", attempt.tag);
        let path = attempt
            .scratch
            .materialize(narration, &self.opts.workdir, &stem)?;
        let pcm = decode_audio_f32(&path, self.opts.sample_rate, self.opts.channels)?;
        self.run(format, clips, &pcm, loader, recorder, attempt)
    }

    /// Compose `clips` under an already decoded narration buffer.
    pub fn compose_pcm(
        &self,
        clips: &[MediaAsset],
        narration: &AudioPcm,
        supported: &BTreeSet<String>,
        loader: &dyn ClipLoader,
        recorder: &mut dyn Recorder,
    ) -> AdreelResult<ComposedVideo> {
        let format = self.negotiate(supported)?;
        self.run(format, clips, narration, loader, recorder, Attempt::new())
    }

    fn run(
        &self,
        format: OutputFormat,
        clips: &[MediaAsset],
        narration: &AudioPcm,
        loader: &dyn ClipLoader,
        recorder: &mut dyn Recorder,
        attempt: Attempt,
    ) -> AdreelResult<ComposedVideo> {
        let Attempt { tag, scratch } = attempt;
        let mut machine = CompositorMachine::new(clips.len())?;
        if narration.is_empty() {
            return Err(ComposeFailure::EmptyNarration.into());
        }
        let mut clock = NarrationClock::new(narration, self.opts.fps);
        tracing::info!(
            clips = clips.len(),
            narration_secs = narration.duration_secs(),
            frames = clock.total_frames,
            %format,
            "composition started"
        );

        let mut graph = MediaGraph::new(recorder, scratch);
        machine.handle(ComposeEvent::Start)?;

        // Inline clips are written under per-attempt names so the graph owns them.
        let clip_dir = self.opts.workdir.join("clips");
        let mut local = Vec::with_capacity(clips.len());
        for (index, clip) in clips.iter().enumerate() {
            if clip.bytes().is_none() {
                local.push(clip.clone());
                continue;
            }
            match graph
                .scratch
                .materialize(clip, &clip_dir, &format!("clip_{tag}_{index}"))
            {
                Ok(path) => local.push(MediaAsset::file_with_type(clip.content_type(), path)),
                Err(e) => {
                    return Err(fail(
                        &mut machine,
                        ComposeEvent::DecodeFailed {
                            index,
                            message: e.to_string(),
                        },
                    ));
                }
            }
        }

        let loaded: Vec<AdreelResult<Box<dyn ClipSource>>> = local
            .par_iter()
            .enumerate()
            .map(|(i, clip)| loader.load(i, clip, self.opts.canvas, self.opts.fps))
            .collect();
        for (index, clip) in loaded.into_iter().enumerate() {
            match clip {
                Ok(c) => graph.clips.push(c),
                Err(e) => {
                    return Err(fail(
                        &mut machine,
                        ComposeEvent::DecodeFailed {
                            index,
                            message: e.to_string(),
                        },
                    ));
                }
            }
        }

        let pcm_path = self.opts.workdir.join(format!("narration_{tag}.f32le"));
        graph.scratch.track(pcm_path.clone());
        write_f32le_file(&narration.interleaved_f32, &pcm_path)?;

        machine.handle(ComposeEvent::Loaded)?;

        let cfg = RecorderConfig {
            canvas: self.opts.canvas,
            fps: self.opts.fps,
            format,
            audio: AudioInputConfig {
                path: pcm_path,
                sample_rate: narration.sample_rate,
                channels: narration.channels,
            },
            total_frames: clock.total_frames,
        };
        if let Err(e) = graph.recorder.start(cfg) {
            return Err(fail(&mut machine, ComposeEvent::RecorderFault(e.to_string())));
        }
        graph.recording = true;

        if let Err(e) = graph.clips[0].play() {
            return Err(fail(
                &mut machine,
                ComposeEvent::DecodeFailed {
                    index: 0,
                    message: e.to_string(),
                },
            ));
        }

        let mut fb = FrameBuffer::new(self.opts.canvas);
        let mut clip_frames = 0u64;
        let mut frame_idx = 0u64;
        loop {
            // Clip chain: pull the active clip's next frame, handing over to the next clip at
            // each natural end.
            while let ComposeState::Recording { active_clip } = *machine.state() {
                match graph.clips[active_clip].next_frame() {
                    Ok(Some(frame)) => {
                        fb.draw(&frame)?;
                        clip_frames += 1;
                        break;
                    }
                    Ok(None) if clip_frames == 0 => {
                        return Err(fail(
                            &mut machine,
                            ComposeEvent::DecodeFailed {
                                index: active_clip,
                                message: "clip produced no frames".to_string(),
                            },
                        ));
                    }
                    Ok(None) => {
                        graph.clips[active_clip].release();
                        machine.handle(ComposeEvent::ClipEnded)?;
                        clip_frames = 0;
                        match *machine.state() {
                            ComposeState::Recording { active_clip: next } => {
                                tracing::debug!(clip = next, frame = frame_idx, "next clip");
                                if let Err(e) = graph.clips[next].play() {
                                    return Err(fail(
                                        &mut machine,
                                        ComposeEvent::DecodeFailed {
                                            index: next,
                                            message: e.to_string(),
                                        },
                                    ));
                                }
                            }
                            _ => tracing::info!(frame = frame_idx, "clips exhausted; freezing last frame"),
                        }
                    }
                    Err(e) => {
                        return Err(fail(
                            &mut machine,
                            ComposeEvent::DecodeFailed {
                                index: active_clip,
                                message: e.to_string(),
                            },
                        ));
                    }
                }
            }

            // Render/capture loop: the frame buffer is the only visual source.
            if let Err(e) = graph.recorder.write_frame(FrameIndex(frame_idx), fb.current()) {
                return Err(fail(&mut machine, ComposeEvent::RecorderFault(e.to_string())));
            }
            frame_idx += 1;

            if clock.tick() {
                machine.handle(ComposeEvent::AudioEnded)?;
                break;
            }
        }

        let chunks = match graph.recorder.stop() {
            Ok(chunks) => chunks,
            Err(e) => {
                graph.recording = false;
                return Err(fail(&mut machine, ComposeEvent::RecorderFault(e.to_string())));
            }
        };
        graph.recording = false;

        let mut bytes = Vec::new();
        for chunk in chunks {
            machine.handle(ComposeEvent::ChunkReceived(chunk.len()))?;
            bytes.extend_from_slice(&chunk);
        }
        machine.handle(ComposeEvent::RecorderStopped)?;
        if let Some(f) = machine.failure() {
            tracing::warn!(failure = %f, "composition failed");
            return Err(f.clone().into());
        }

        tracing::info!(
            frames = frame_idx,
            bytes = bytes.len(),
            chunks = machine.chunks_received(),
            "composition finished"
        );
        Ok(ComposedVideo {
            bytes,
            format,
            frames: frame_idx,
            duration_secs: narration.duration_secs(),
        })
    }
}

/// Drive the machine into `Failed` with `event` and return the matching error.
fn fail(machine: &mut CompositorMachine, event: ComposeEvent) -> AdreelError {
    if let Err(e) = machine.handle(event) {
        return e;
    }
    match machine.failure() {
        Some(f) => {
            tracing::warn!(failure = %f, "composition failed");
            f.clone().into()
        }
        None => AdreelError::validation("compositor did not reach a failed state"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
