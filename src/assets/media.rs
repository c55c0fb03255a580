use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::error::{AdreelError, AdreelResult};

/// Sample rate used for the narration master clock across decode/effects/encode.
pub const NARRATION_SAMPLE_RATE: u32 = 48_000;

#[derive(Clone, Debug)]
/// Basic metadata about a source video file.
pub struct VideoSourceInfo {
    /// Source path used for probing/decoding.
    pub source_path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Container duration in seconds.
    pub duration_secs: f64,
}

#[derive(Clone, Debug, PartialEq)]
/// Decoded interleaved floating-point PCM.
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (samples per channel).
    pub fn sample_frames(&self) -> u64 {
        if self.channels == 0 {
            return 0;
        }
        (self.interleaved_f32.len() / usize::from(self.channels)) as u64
    }

    /// Playback duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.sample_frames() as f64 / f64::from(self.sample_rate)
    }

    /// `true` when there is nothing to play.
    pub fn is_empty(&self) -> bool {
        self.sample_frames() == 0
    }
}

/// Return `true` when `tool -version` runs successfully.
pub fn tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when both `ffmpeg` and `ffprobe` can be invoked from `PATH`.
pub fn ffmpeg_tools_available() -> bool {
    tool_on_path("ffmpeg") && tool_on_path("ffprobe")
}

/// Probe source video metadata through `ffprobe`.
pub fn probe_video(source_path: &Path) -> AdreelResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| AdreelError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(AdreelError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| AdreelError::media(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| AdreelError::media("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| AdreelError::media("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| AdreelError::media("missing video height from ffprobe"))?;

    // Stream duration is missing for some containers (webm); fall back to the format duration.
    let duration_secs = video_stream
        .duration
        .as_deref()
        .or_else(|| parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            AdreelError::media(format!(
                "video '{}' has no positive duration",
                source_path.display()
            ))
        })?;

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        duration_secs,
    })
}

/// Decode audio from a media source to interleaved `f32` PCM.
pub fn decode_audio_f32(path: &Path, sample_rate: u32, channels: u16) -> AdreelResult<AudioPcm> {
    if sample_rate == 0 || channels == 0 {
        return Err(AdreelError::validation(
            "audio decode sample_rate/channels must be non-zero",
        ));
    }
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &channels.to_string(),
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| AdreelError::media(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(AdreelError::media(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    Ok(AudioPcm {
        sample_rate,
        channels,
        interleaved_f32: f32le_to_samples(&out.stdout)?,
    })
}

/// Convert raw little-endian `f32` bytes to samples.
pub(crate) fn f32le_to_samples(bytes: &[u8]) -> AdreelResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(AdreelError::media(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub(crate) fn write_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> AdreelResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AdreelError::media(format!(
                "failed to create audio output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        AdreelError::media(format!(
            "failed to write audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
