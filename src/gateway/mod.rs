//! Generative-media gateway.
//!
//! [`MediaGateway`] is the narrow request/response surface the studio depends on. Each operation
//! is a single request with no client-side retry and either returns a usable result or one
//! classified [`GatewayErrorKind`]. The free functions in this module build the composite
//! operations (lossy classification, all-or-nothing batches, polled video generation) on top of
//! any gateway implementation.

/// Typed error classification at the provider boundary.
pub mod error;
/// Gemini REST implementation.
pub mod gemini;
/// Voice selection, speech prompts and PCM wrapping.
pub mod speech;

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::try_join_all;

use crate::assets::asset::{AssetPayload, MediaAsset};
use crate::config::GatewayConfig;
use crate::foundation::error::AdreelResult;
use crate::gateway::error::GatewayErrorKind;
use crate::gateway::speech::{VoiceGender, VoiceStyle};

/// Handle of a long-running video generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoOperation {
    /// Provider operation name; polling is idempotent per name.
    pub name: String,
}

/// Result of one poll of a [`VideoOperation`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoPoll {
    /// Still running.
    Pending,
    /// Finished; the video may be inline or a URL that still has to be downloaded.
    Done(Option<MediaAsset>),
}

/// Request/response operations over a hosted multimodal generation API.
#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Generate one image guided by `guidance` from one or more reference images.
    async fn image_from_references(
        &self,
        references: &[MediaAsset],
        guidance: &str,
    ) -> AdreelResult<MediaAsset>;

    /// Answer `question` about `image` with exactly one of `labels`.
    async fn classify_attribute(
        &self,
        image: &MediaAsset,
        question: &str,
        labels: &[&str],
    ) -> AdreelResult<String>;

    /// Generate text for `prompt`.
    async fn text_from_prompt(&self, prompt: &str) -> AdreelResult<String>;

    /// Synthesize `text` as speech (WAV).
    async fn speech_from_text(
        &self,
        text: &str,
        voice: VoiceGender,
        style: VoiceStyle,
    ) -> AdreelResult<MediaAsset>;

    /// Start image-to-video generation.
    async fn start_video(&self, prompt: &str, image: &MediaAsset) -> AdreelResult<VideoOperation>;

    /// Poll a video operation once.
    async fn poll_video(&self, op: &VideoOperation) -> AdreelResult<VideoPoll>;

    /// Download a generated asset by URL.
    async fn download(&self, url: &str) -> AdreelResult<MediaAsset>;

    /// Generate one image guided by `guidance` from a single reference image.
    async fn image_from_reference(
        &self,
        reference: &MediaAsset,
        guidance: &str,
    ) -> AdreelResult<MediaAsset> {
        self.image_from_references(std::slice::from_ref(reference), guidance)
            .await
    }
}

/// Classify, falling back to `default` on any failure. Never fails.
pub async fn classify_or_default<G: MediaGateway + ?Sized>(
    gateway: &G,
    image: &MediaAsset,
    question: &str,
    labels: &[&str],
    default: &str,
) -> String {
    match gateway.classify_attribute(image, question, labels).await {
        Ok(label) => label,
        Err(e) => {
            tracing::debug!(error = %e, default, "classification failed; using default label");
            default.to_string()
        }
    }
}

/// Generate one image per guidance string, concurrently. Any failure fails the whole batch.
#[tracing::instrument(skip_all, fields(frames = guidances.len()))]
pub async fn multi_image_from_references<G: MediaGateway + ?Sized>(
    gateway: &G,
    references: &[MediaAsset],
    guidances: &[String],
) -> AdreelResult<Vec<MediaAsset>> {
    try_join_all(
        guidances
            .iter()
            .map(|g| gateway.image_from_references(references, g)),
    )
    .await
}

/// Polling policy for long-running video generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed delay before each poll.
    pub interval: Duration,
    /// Give up after this many polls.
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Policy from the gateway config.
    pub fn from_config(cfg: &GatewayConfig) -> Self {
        Self {
            interval: cfg.poll_interval(),
            max_attempts: cfg.max_poll_attempts,
        }
    }
}

const PROGRESS_MESSAGES: [&str; 5] = [
    "Setting up the scene",
    "Directing the camera",
    "Rendering frames",
    "Polishing lighting and motion",
    "Almost there, finishing the clip",
];

/// Human-readable progress line for the `attempt`-th poll (1-based).
pub fn progress_message(attempt: u32, interval: Duration) -> String {
    let msg = PROGRESS_MESSAGES[(attempt as usize - 1) % PROGRESS_MESSAGES.len()];
    let elapsed = interval.as_secs() * u64::from(attempt);
    format!("{msg}... ({elapsed}s elapsed)")
}

/// Generate a video from `image`, polling at a fixed interval until it completes, then download
/// it. `progress` receives one message per poll.
#[tracing::instrument(skip_all)]
pub async fn video_from_image<G, F>(
    gateway: &G,
    prompt: &str,
    image: &MediaAsset,
    policy: PollPolicy,
    mut progress: F,
) -> AdreelResult<MediaAsset>
where
    G: MediaGateway + ?Sized,
    F: FnMut(&str) + Send,
{
    let op = gateway.start_video(prompt, image).await?;
    tracing::info!(operation = %op.name, "video generation started");
    progress("Video generation started");

    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;
        match gateway.poll_video(&op).await? {
            VideoPoll::Pending => {
                let msg = progress_message(attempt, policy.interval);
                tracing::info!(operation = %op.name, attempt, "{msg}");
                progress(&msg);
            }
            VideoPoll::Done(Some(asset)) => {
                tracing::info!(operation = %op.name, attempt, "video generation finished");
                return match asset.payload() {
                    AssetPayload::Url(url) => gateway.download(url).await,
                    _ if asset.is_empty() => {
                        Err(GatewayErrorKind::EmptyResponse("video".into()).into())
                    }
                    _ => Ok(asset),
                };
            }
            VideoPoll::Done(None) => {
                return Err(GatewayErrorKind::EmptyResponse("video".into()).into());
            }
        }
    }
    Err(GatewayErrorKind::PollTimeout {
        attempts: policy.max_attempts,
    }
    .into())
}

#[cfg(test)]
#[path = "../../tests/unit/gateway/ops.rs"]
mod tests;
