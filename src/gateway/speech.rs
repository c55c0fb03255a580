use std::io::Cursor;

use crate::foundation::error::{AdreelError, AdreelResult};

/// Narrator voice selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceGender {
    /// Female narrator.
    #[default]
    Female,
    /// Male narrator.
    Male,
}

impl VoiceGender {
    /// Prebuilt provider voice used for this selection.
    pub fn voice_name(self) -> &'static str {
        match self {
            Self::Female => "Kore",
            Self::Male => "Charon",
        }
    }

    /// Parse a user selection; anything unrecognized is the default voice.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" | "man" => Self::Male,
            _ => Self::Female,
        }
    }
}

/// Delivery style for the narration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceStyle {
    /// Plain, natural read. Also the fallback for unknown styles.
    #[default]
    Natural,
    /// Upbeat and energetic.
    Cheerful,
    /// Soft and intimate.
    Whisper,
    /// Loud, announcer-like.
    Shout,
    /// Slow and soothing.
    Calm,
}

impl VoiceStyle {
    /// Every style, in display order.
    pub const ALL: [VoiceStyle; 5] = [
        Self::Natural,
        Self::Cheerful,
        Self::Whisper,
        Self::Shout,
        Self::Calm,
    ];

    /// Parse a style name; unknown names map to [`VoiceStyle::Natural`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "cheerful" | "happy" | "excited" => Self::Cheerful,
            "whisper" | "whispering" | "asmr" => Self::Whisper,
            "shout" | "shouting" | "loud" => Self::Shout,
            "calm" | "soothing" => Self::Calm,
            _ => Self::Natural,
        }
    }

    fn template(self) -> &'static str {
        match self {
            Self::Natural => "Read this advertisement in a natural, friendly voice:",
            Self::Cheerful => "Read this advertisement cheerfully, with bright energy:",
            Self::Whisper => "Whisper this advertisement softly and intimately:",
            Self::Shout => "Shout this advertisement with excitement, like a stadium announcer:",
            Self::Calm => "Read this advertisement slowly, in a calm and soothing voice:",
        }
    }
}

/// Build the speech-synthesis prompt for `text` in `style`.
pub fn speech_prompt(text: &str, style: VoiceStyle) -> String {
    format!("{}\n\n{}", style.template(), text.trim())
}

/// Sample rate from an `audio/L16;codec=pcm;rate=24000` style MIME type (24 kHz if absent).
pub fn pcm_rate_from_mime(mime: &str) -> u32 {
    mime.split(';')
        .filter_map(|p| p.trim().strip_prefix("rate="))
        .find_map(|r| r.parse::<u32>().ok())
        .filter(|r| *r > 0)
        .unwrap_or(24_000)
}

/// Wrap raw signed 16-bit little-endian PCM in a WAV container.
pub fn pcm16_to_wav(pcm: &[u8], sample_rate: u32, channels: u16) -> AdreelResult<Vec<u8>> {
    if !pcm.len().is_multiple_of(2) {
        return Err(AdreelError::media("16-bit PCM byte length must be even"));
    }
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut out = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut out, spec)
            .map_err(|e| AdreelError::media(format!("wav header: {e}")))?;
        for s in pcm.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([s[0], s[1]]))
                .map_err(|e| AdreelError::media(format!("wav write: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| AdreelError::media(format!("wav finalize: {e}")))?;
    }
    Ok(out.into_inner())
}

#[cfg(test)]
#[path = "../../tests/unit/gateway/speech.rs"]
mod tests;
