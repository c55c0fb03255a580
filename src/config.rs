//! Application configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is a valid config.

use crate::compose::format::{DEFAULT_PREFERENCE, OutputFormat};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{AdreelError, AdreelResult};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the gateway API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdreelConfig {
    /// Output frame size (portrait 9:16 by default).
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Sample rate the narration is decoded at.
    pub narration_sample_rate: u32,
    /// Channel count the narration is decoded at.
    pub narration_channels: u16,
    /// Output format preference, most preferred first.
    pub format_preference: Vec<OutputFormat>,
    /// Generative-media gateway settings.
    pub gateway: GatewayConfig,
}

impl Default for AdreelConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            narration_sample_rate: crate::assets::media::NARRATION_SAMPLE_RATE,
            narration_channels: 2,
            format_preference: DEFAULT_PREFERENCE.to_vec(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Gateway endpoint, model ids and polling policy.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// REST base URL.
    pub base_url: String,
    /// Model used for image generation and editing.
    pub image_model: String,
    /// Model used for text generation and classification.
    pub text_model: String,
    /// Model used for speech synthesis.
    pub speech_model: String,
    /// Model used for image-to-video generation.
    pub video_model: String,
    /// Aspect ratio requested for generated videos.
    pub video_aspect_ratio: String,
    /// Seconds between polls of a long-running video operation.
    pub poll_interval_secs: u64,
    /// Give up on a video operation after this many polls.
    pub max_poll_attempts: u32,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            image_model: "gemini-2.5-flash-image-preview".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            speech_model: "gemini-2.5-flash-preview-tts".to_string(),
            video_model: "veo-2.0-generate-001".to_string(),
            video_aspect_ratio: "9:16".to_string(),
            poll_interval_secs: 10,
            max_poll_attempts: 60,
            request_timeout_secs: 120,
        }
    }
}

impl GatewayConfig {
    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl AdreelConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> AdreelResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| AdreelError::config(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> AdreelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            AdreelError::config(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check value ranges.
    pub fn validate(&self) -> AdreelResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)
            .map_err(|e| AdreelError::config(e.to_string()))?;
        Fps::new(self.fps.num, self.fps.den).map_err(|e| AdreelError::config(e.to_string()))?;
        if self.narration_sample_rate == 0 || self.narration_channels == 0 {
            return Err(AdreelError::config(
                "narration sample rate and channels must be non-zero",
            ));
        }
        if self.format_preference.is_empty() {
            return Err(AdreelError::config("format_preference must not be empty"));
        }
        if self.gateway.poll_interval_secs == 0 {
            return Err(AdreelError::config("gateway.poll_interval_secs must be > 0"));
        }
        if self.gateway.max_poll_attempts == 0 {
            return Err(AdreelError::config("gateway.max_poll_attempts must be > 0"));
        }
        Ok(())
    }
}

/// Read the gateway API key from the environment.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
