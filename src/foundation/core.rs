use crate::foundation::error::{AdreelError, AdreelResult};

/// Absolute 0-based frame index in output timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> AdreelResult<Self> {
        if den == 0 {
            return Err(AdreelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(AdreelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }

    /// Number of frames needed to cover `sample_count` audio samples at `sample_rate`.
    ///
    /// Exact rational ceiling, so a track of `T` seconds maps to a video no shorter than `T` and
    /// at most one frame interval longer.
    pub fn frames_covering_samples(self, sample_count: u64, sample_rate: u32) -> u64 {
        if sample_rate == 0 {
            return 0;
        }
        let num = u128::from(sample_count) * u128::from(self.num);
        let den = u128::from(sample_rate) * u128::from(self.den);
        num.div_ceil(den) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Portrait 9:16 at 720p, the default ad format.
    pub const PORTRAIT_720: Canvas = Canvas {
        width: 720,
        height: 1280,
    };

    /// Create a validated canvas. Both sides must be non-zero and even (yuv420p output).
    pub fn new(width: u32, height: u32) -> AdreelResult<Self> {
        if width == 0 || height == 0 {
            return Err(AdreelError::validation("canvas width/height must be non-zero"));
        }
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(AdreelError::validation(
                "canvas width/height must be even (required for yuv420p output)",
            ));
        }
        Ok(Self { width, height })
    }

    /// Byte length of one tightly packed RGBA8 frame.
    pub fn rgba_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::PORTRAIT_720
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
