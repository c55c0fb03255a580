//! Narration audio: WAV decode/encode and deterministic voice effects.

/// Playback-rate, compression and gain effects over interleaved PCM.
pub mod effects;

use std::io::Cursor;

use crate::assets::asset::MediaAsset;
use crate::assets::media::AudioPcm;
use crate::foundation::error::{AdreelError, AdreelResult};
use crate::gateway::speech::{VoiceGender, VoiceStyle};

/// Playback rate applied to the male voice.
pub const MALE_PLAYBACK_RATE: f64 = 0.92;

/// Decode a WAV byte buffer (integer or float samples) to `f32` PCM.
pub fn decode_wav(bytes: &[u8]) -> AdreelResult<AudioPcm> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| AdreelError::media(format!("wav decode: {e}")))?;
    let spec = reader.spec();
    let interleaved_f32 = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AdreelError::media(format!("wav samples: {e}")))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| AdreelError::media(format!("wav samples: {e}")))?
        }
    };
    Ok(AudioPcm {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        interleaved_f32,
    })
}

/// Encode PCM as a 16-bit integer WAV, clamping samples to `[-1, 1]`.
pub fn encode_wav16(pcm: &AudioPcm) -> AdreelResult<Vec<u8>> {
    if pcm.channels == 0 || pcm.sample_rate == 0 {
        return Err(AdreelError::media(
            "wav encode requires non-zero channels and sample rate",
        ));
    }
    let spec = hound::WavSpec {
        channels: pcm.channels,
        sample_rate: pcm.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut out = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut out, spec)
            .map_err(|e| AdreelError::media(format!("wav header: {e}")))?;
        for &s in &pcm.interleaved_f32 {
            let v = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
            writer
                .write_sample(v)
                .map_err(|e| AdreelError::media(format!("wav write: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| AdreelError::media(format!("wav finalize: {e}")))?;
    }
    Ok(out.into_inner())
}

/// Apply the fixed voice effects for `style` and `voice`, returning a 16-bit WAV asset.
///
/// The male voice is slowed to [`MALE_PLAYBACK_RATE`]. `Whisper` is compressed and boosted by
/// 9 dB, `Shout` boosted by 4 dB. Other styles pass through unchanged apart from re-encoding.
#[tracing::instrument(skip(raw), fields(content_type = raw.content_type()))]
pub fn post_process_audio(
    raw: &MediaAsset,
    style: VoiceStyle,
    voice: VoiceGender,
) -> AdreelResult<MediaAsset> {
    let bytes = raw.read_bytes()?;
    let mut pcm = decode_wav(&bytes)?;
    if pcm.is_empty() {
        return Err(AdreelError::media("narration audio has no samples"));
    }

    if voice == VoiceGender::Male {
        pcm = effects::change_playback_rate(&pcm, MALE_PLAYBACK_RATE)?;
    }
    match style {
        VoiceStyle::Whisper => {
            effects::compress(&mut pcm, effects::CompressorSettings::WHISPER);
            effects::apply_gain_db(&mut pcm.interleaved_f32, 9.0);
        }
        VoiceStyle::Shout => effects::apply_gain_db(&mut pcm.interleaved_f32, 4.0),
        _ => {}
    }
    effects::clamp(&mut pcm.interleaved_f32);

    tracing::debug!(
        frames = pcm.sample_frames(),
        sample_rate = pcm.sample_rate,
        "narration post-processed"
    );
    Ok(MediaAsset::inline("audio/wav", encode_wav16(&pcm)?))
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mod.rs"]
mod tests;
