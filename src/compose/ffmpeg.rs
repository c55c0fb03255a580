use crate::compose::clip::kill_child;
use crate::compose::format::OutputFormat;
use crate::compose::frame::FrameRGBA;
use crate::compose::recorder::{Recorder, RecorderConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{AdreelError, AdreelResult};
use std::io::Read;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

const CHUNK_BYTES: usize = 64 * 1024;

/// Recorder that spawns the system `ffmpeg`, streams raw frames to stdin, and collects the encoded
/// container from stdout as data chunks.
///
/// The narration is muxed from the `f32le` file named in [`RecorderConfig::audio`].
#[derive(Default)]
pub struct FfmpegRecorder {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<JoinHandle<std::io::Result<Vec<Vec<u8>>>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<RecorderConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegRecorder {
    /// Create an idle recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Recorder for FfmpegRecorder {
    fn start(&mut self, cfg: RecorderConfig) -> AdreelResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(AdreelError::validation("fps must be non-zero"));
        }
        if cfg.canvas.width == 0 || cfg.canvas.height == 0 {
            return Err(AdreelError::validation(
                "recorder width/height must be non-zero",
            ));
        }
        if !cfg.canvas.width.is_multiple_of(2) || !cfg.canvas.height.is_multiple_of(2) {
            return Err(AdreelError::validation(
                "recorder width/height must be even (required for yuv420p output)",
            ));
        }
        if cfg.audio.sample_rate == 0 || cfg.audio.channels == 0 {
            return Err(AdreelError::validation(
                "audio sample_rate/channels must be non-zero",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.canvas.width, cfg.canvas.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        let (venc, aenc) = cfg.format.encoders();
        cmd.args([
            "-f",
            "f32le",
            "-ar",
            &cfg.audio.sample_rate.to_string(),
            "-ac",
            &cfg.audio.channels.to_string(),
            "-i",
        ])
        .arg(&cfg.audio.path)
        .args(["-map", "0:v:0", "-map", "1:a:0", "-c:v", venc])
        .args(video_quality_args(cfg.format))
        .args(["-pix_fmt", "yuv420p", "-c:a", aenc, "-shortest"])
        .args(cfg.format.muxer_args())
        .arg("pipe:1");

        let mut child = cmd.spawn().map_err(|e| {
            AdreelError::media(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AdreelError::media("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| AdreelError::media("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| AdreelError::media("failed to open ffmpeg stderr (unexpected)"))?;

        let stdout_drain = std::thread::spawn(move || {
            let mut chunks = Vec::new();
            let mut buf = vec![0u8; CHUNK_BYTES];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                chunks.push(buf[..n].to_vec());
            }
            Ok(chunks)
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(format = %cfg.format, total_frames = cfg.total_frames, "ffmpeg recorder started");
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn write_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> AdreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| AdreelError::media("ffmpeg recorder not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(AdreelError::media(
                "ffmpeg recorder received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.canvas.width || frame.height != cfg.canvas.height {
            return Err(AdreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.canvas.width, cfg.canvas.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(AdreelError::media("ffmpeg recorder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&frame.data).map_err(|e| {
            AdreelError::media(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn stop(&mut self) -> AdreelResult<Vec<Vec<u8>>> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| AdreelError::media("ffmpeg recorder not started"))?;

        let status = child
            .wait()
            .map_err(|e| AdreelError::media(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let chunks = match self.stdout_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| AdreelError::media("ffmpeg stdout drain thread panicked"))?
                .map_err(|e| AdreelError::media(format!("ffmpeg stdout read failed: {e}")))?,
            None => Vec::new(),
        };
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| AdreelError::media("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| AdreelError::media(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        self.cfg = None;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(AdreelError::media(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(chunks)
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        kill_child(&mut self.child);
        self.stdout_drain = None;
        self.stderr_drain = None;
        self.cfg = None;
    }
}

impl Drop for FfmpegRecorder {
    fn drop(&mut self) {
        self.abort();
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn video_quality_args(format: OutputFormat) -> &'static [&'static str] {
    match format {
        OutputFormat::Mp4H264Aac => &["-preset", "veryfast", "-crf", "20"],
        OutputFormat::WebmVp9Opus => &["-b:v", "2M", "-deadline", "realtime", "-cpu-used", "8"],
        OutputFormat::WebmVp8Vorbis => &["-b:v", "2M"],
    }
}
