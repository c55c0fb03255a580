//! Clip sources: muted video "decoder elements" feeding the frame buffer.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::assets::asset::MediaAsset;
use crate::assets::media::{VideoSourceInfo, probe_video};
use crate::compose::frame::FrameRGBA;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{AdreelError, AdreelResult};

/// A loaded, silent video clip that plays once from its beginning.
///
/// Playback contract: [`ClipSource::play`] starts at frame 0; [`ClipSource::next_frame`] yields
/// frames at the output frame rate and returns `Ok(None)` exactly when the clip ends naturally.
/// [`ClipSource::release`] (or dropping the source) frees everything it holds.
pub trait ClipSource: Send {
    /// Start playback from the beginning.
    fn play(&mut self) -> AdreelResult<()>;
    /// Next frame at the output frame rate, or `None` at the natural end.
    fn next_frame(&mut self) -> AdreelResult<Option<FrameRGBA>>;
    /// Intrinsic playable duration in seconds.
    fn duration_secs(&self) -> f64;
    /// Release decoder resources. Playback can be restarted with [`ClipSource::play`].
    fn release(&mut self) {}
}

/// Loads clip assets into [`ClipSource`]s without starting playback.
pub trait ClipLoader: Sync {
    /// Load clip `index` of the sequence.
    fn load(
        &self,
        index: usize,
        clip: &MediaAsset,
        canvas: Canvas,
        fps: Fps,
    ) -> AdreelResult<Box<dyn ClipSource>>;
}

/// [`ClipLoader`] backed by `ffprobe` (load) and a streaming `ffmpeg` decoder (play).
#[derive(Clone, Debug)]
pub struct FfmpegClipLoader {
    workdir: PathBuf,
}

impl FfmpegClipLoader {
    /// Inline clip bytes are written below `workdir` before decoding.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

impl ClipLoader for FfmpegClipLoader {
    fn load(
        &self,
        index: usize,
        clip: &MediaAsset,
        canvas: Canvas,
        fps: Fps,
    ) -> AdreelResult<Box<dyn ClipSource>> {
        if clip.is_empty() {
            return Err(AdreelError::media(format!("clip {index} is empty")));
        }
        let path = clip.materialize(&self.workdir, &format!("clip_{index}"))?;
        let info = probe_video(&path)?;
        tracing::debug!(
            index,
            path = %path.display(),
            width = info.width,
            height = info.height,
            duration_secs = info.duration_secs,
            "clip loaded"
        );
        Ok(Box::new(FfmpegClip::new(info, canvas, fps)))
    }
}

/// Streaming `ffmpeg` decoder emitting raw RGBA frames fitted into the output canvas.
pub struct FfmpegClip {
    info: VideoSourceInfo,
    canvas: Canvas,
    fps: Fps,

    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl FfmpegClip {
    fn new(info: VideoSourceInfo, canvas: Canvas, fps: Fps) -> Self {
        Self {
            info,
            canvas,
            fps,
            child: None,
            stdout: None,
            stderr_drain: None,
        }
    }

    fn finish(&mut self) -> AdreelResult<()> {
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| AdreelError::media(format!("failed to wait for ffmpeg decoder: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| AdreelError::media("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| AdreelError::media(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        if !status.success() {
            return Err(AdreelError::media(format!(
                "ffmpeg decode of '{}' exited with status {}: {}",
                self.info.source_path.display(),
                status,
                String::from_utf8_lossy(&stderr_bytes).trim()
            )));
        }
        Ok(())
    }
}

impl ClipSource for FfmpegClip {
    fn play(&mut self) -> AdreelResult<()> {
        kill_child(&mut self.child);
        let mut child = spawn_decoder(&self.info.source_path, self.canvas, self.fps)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AdreelError::media("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| AdreelError::media("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });
        self.child = Some(child);
        self.stdout = Some(stdout);
        self.stderr_drain = Some(stderr_drain);
        Ok(())
    }

    fn next_frame(&mut self) -> AdreelResult<Option<FrameRGBA>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Err(AdreelError::media("clip is not playing"));
        };
        let mut buf = vec![0u8; self.canvas.rgba_len()];
        let filled = read_full(stdout, &mut buf).map_err(|e| {
            AdreelError::media(format!(
                "failed to read frame from '{}': {e}",
                self.info.source_path.display()
            ))
        })?;
        if filled < buf.len() {
            // A trailing partial frame is dropped; the clip has ended.
            self.finish()?;
            return Ok(None);
        }
        Ok(Some(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: buf,
        }))
    }

    fn duration_secs(&self) -> f64 {
        self.info.duration_secs
    }

    fn release(&mut self) {
        drop(self.stdout.take());
        kill_child(&mut self.child);
        drop(self.stderr_drain.take());
    }
}

impl Drop for FfmpegClip {
    fn drop(&mut self) {
        self.release();
    }
}

fn spawn_decoder(path: &Path, canvas: Canvas, fps: Fps) -> AdreelResult<Child> {
    let (w, h) = (canvas.width, canvas.height);
    let filter = format!(
        "fps={}/{},scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black",
        fps.num, fps.den
    );
    Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-an", "-vf", &filter, "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            AdreelError::media(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })
}

pub(crate) fn kill_child(child: &mut Option<Child>) {
    if let Some(mut c) = child.take() {
        let _ = c.kill();
        let _ = c.wait();
    }
}

fn read_full(r: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
