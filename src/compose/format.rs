//! Output container/codec negotiation.
//!
//! The capability table is explicit: an ordered preference list of [`OutputFormat`]s and a pure
//! [`choose`] over the set of encoders the running platform supports.

use std::collections::BTreeSet;
use std::process::Command;

/// Output container plus the video/audio codec pair used to encode it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// MP4 with H.264 video and AAC audio.
    Mp4H264Aac,
    /// WebM with VP9 video and Opus audio.
    WebmVp9Opus,
    /// WebM with VP8 video and Vorbis audio.
    WebmVp8Vorbis,
}

/// Default preference order, most compatible first.
pub const DEFAULT_PREFERENCE: [OutputFormat; 3] = [
    OutputFormat::Mp4H264Aac,
    OutputFormat::WebmVp9Opus,
    OutputFormat::WebmVp8Vorbis,
];

impl OutputFormat {
    /// File extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4H264Aac => "mp4",
            Self::WebmVp9Opus | Self::WebmVp8Vorbis => "webm",
        }
    }

    /// MIME type of the produced file.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Mp4H264Aac => "video/mp4",
            Self::WebmVp9Opus | Self::WebmVp8Vorbis => "video/webm",
        }
    }

    /// ffmpeg encoder names for `(video, audio)`.
    pub fn encoders(self) -> (&'static str, &'static str) {
        match self {
            Self::Mp4H264Aac => ("libx264", "aac"),
            Self::WebmVp9Opus => ("libvpx-vp9", "libopus"),
            Self::WebmVp8Vorbis => ("libvpx", "libvorbis"),
        }
    }

    /// ffmpeg muxer arguments for writing this container to a pipe.
    pub(crate) fn muxer_args(self) -> &'static [&'static str] {
        match self {
            // Plain mp4 needs a seekable output; fragmented mp4 streams.
            Self::Mp4H264Aac => &["-movflags", "frag_keyframe+empty_moov", "-f", "mp4"],
            Self::WebmVp9Opus | Self::WebmVp8Vorbis => &["-f", "webm"],
        }
    }

    /// `true` when every encoder this format needs is in `supported`.
    pub fn is_supported_by(self, supported: &BTreeSet<String>) -> bool {
        let (v, a) = self.encoders();
        supported.contains(v) && supported.contains(a)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (v, a) = self.encoders();
        write!(f, "{} ({v} + {a})", self.extension())
    }
}

/// Pick the first format in `preference` order that `supported` can encode.
pub fn choose(preference: &[OutputFormat], supported: &BTreeSet<String>) -> Option<OutputFormat> {
    preference
        .iter()
        .copied()
        .find(|f| f.is_supported_by(supported))
}

/// Parse the output of `ffmpeg -encoders` into the set of encoder names.
///
/// Encoder lines look like ` V....D libx264   libx264 H.264 ...`: a six-character capability
/// column followed by the encoder name. Header lines are skipped.
pub fn parse_encoder_list(text: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let mut in_table = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("------") {
            in_table = true;
            continue;
        }
        if !in_table {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let (Some(flags), Some(name)) = (parts.next(), parts.next()) else {
            continue;
        };
        if flags.len() == 6 && flags.starts_with(['V', 'A', 'S']) {
            out.insert(name.to_string());
        }
    }
    out
}

/// Query the encoders of the system `ffmpeg`. Missing ffmpeg yields an empty set.
pub fn probe_encoders() -> BTreeSet<String> {
    let out = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output();
    match out {
        Ok(out) if out.status.success() => {
            parse_encoder_list(&String::from_utf8_lossy(&out.stdout))
        }
        Ok(out) => {
            tracing::warn!(status = %out.status, "ffmpeg -encoders failed");
            BTreeSet::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "ffmpeg not runnable; no output formats available");
            BTreeSet::new()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/format.rs"]
mod tests;
