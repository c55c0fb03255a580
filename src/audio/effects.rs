use crate::assets::media::AudioPcm;
use crate::foundation::error::{AdreelError, AdreelResult};

/// Resample so the audio plays at `rate` times its original speed (pitch follows).
///
/// A rate below 1.0 lengthens the output by `1 / rate`. Interpolation is linear per channel.
pub fn change_playback_rate(pcm: &AudioPcm, rate: f64) -> AdreelResult<AudioPcm> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(AdreelError::validation(format!(
            "playback rate must be finite and > 0, got {rate}"
        )));
    }
    let channels = usize::from(pcm.channels);
    let src_frames = pcm.sample_frames() as usize;
    if channels == 0 || src_frames == 0 {
        return Ok(pcm.clone());
    }

    let dst_frames = ((src_frames as f64) / rate).ceil() as usize;
    let src = &pcm.interleaved_f32;
    let mut out = Vec::with_capacity(dst_frames * channels);
    for dst in 0..dst_frames {
        let pos = dst as f64 * rate;
        let f0 = (pos.floor() as usize).min(src_frames - 1);
        let f1 = (f0 + 1).min(src_frames - 1);
        let frac = (pos - f0 as f64).clamp(0.0, 1.0) as f32;
        for ch in 0..channels {
            let v0 = src[f0 * channels + ch];
            let v1 = src[f1 * channels + ch];
            out.push(v0 + (v1 - v0) * frac);
        }
    }
    Ok(AudioPcm {
        sample_rate: pcm.sample_rate,
        channels: pcm.channels,
        interleaved_f32: out,
    })
}

/// Feed-forward peak compressor parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompressorSettings {
    /// Level above which gain reduction starts, in dBFS.
    pub threshold_db: f32,
    /// Input/output ratio above the threshold.
    pub ratio: f32,
    /// Envelope attack time in seconds.
    pub attack_secs: f32,
    /// Envelope release time in seconds.
    pub release_secs: f32,
}

impl CompressorSettings {
    /// Settings used for the whisper style.
    pub const WHISPER: Self = Self {
        threshold_db: -24.0,
        ratio: 4.0,
        attack_secs: 0.003,
        release_secs: 0.25,
    };
}

/// Compress `pcm` in place. Channels share one envelope so the stereo image is kept.
pub fn compress(pcm: &mut AudioPcm, settings: CompressorSettings) {
    let channels = usize::from(pcm.channels);
    if channels == 0 || pcm.sample_rate == 0 || settings.ratio <= 1.0 {
        return;
    }
    let sr = pcm.sample_rate as f32;
    let coeff = |secs: f32| {
        if secs <= 0.0 {
            0.0
        } else {
            (-1.0 / (secs * sr)).exp()
        }
    };
    let attack = coeff(settings.attack_secs);
    let release = coeff(settings.release_secs);

    let mut env = 0.0f32;
    for frame in pcm.interleaved_f32.chunks_mut(channels) {
        let peak = frame.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let c = if peak > env { attack } else { release };
        env = c * env + (1.0 - c) * peak;

        let level_db = amplitude_to_db(env);
        let over = level_db - settings.threshold_db;
        if over > 0.0 {
            let reduction_db = over * (1.0 - 1.0 / settings.ratio);
            let g = db_to_gain(-reduction_db);
            for s in frame.iter_mut() {
                *s *= g;
            }
        }
    }
}

/// Multiply every sample by the linear equivalent of `db`.
pub fn apply_gain_db(samples: &mut [f32], db: f32) {
    let g = db_to_gain(db);
    for s in samples {
        *s *= g;
    }
}

/// Clamp samples to `[-1, 1]`.
pub fn clamp(samples: &mut [f32]) {
    for s in samples {
        *s = s.clamp(-1.0, 1.0);
    }
}

/// Decibels to linear gain.
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

fn amplitude_to_db(a: f32) -> f32 {
    if a <= 1e-9 {
        return -180.0;
    }
    20.0 * a.log10()
}

#[cfg(test)]
#[path = "../../tests/unit/audio/effects.rs"]
mod tests;
