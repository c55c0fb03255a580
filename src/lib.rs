//! adreel builds short vertical product ads.
//!
//! A five-stage studio turns a product photo into a model image, a narrated script, three scene
//! clips and a caption through a generative-media gateway. The compositor then plays the clips
//! back to back under the narration and records one video whose length is set by the narration:
//!
//! - Drive a [`Studio`] session with a [`StudioPipeline`] over any [`MediaGateway`]
//! - Compose clips and narration with a [`Compositor`] into a [`ComposedVideo`]
//! - Swap decoders and recorders through [`ClipLoader`] and [`Recorder`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Media assets and ffmpeg probing/decoding.
pub mod assets;
/// Narration WAV handling and voice effects.
pub mod audio;
/// Audio-clocked sequential clip compositor.
pub mod compose;
/// Application configuration.
pub mod config;
/// Generative-media gateway.
pub mod gateway;
/// Ad studio wizard and generation pipeline.
pub mod studio;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex};
pub use crate::foundation::error::{AdreelError, AdreelResult};

pub use crate::assets::asset::{AssetPayload, MediaAsset, MediaKind};
pub use crate::assets::media::AudioPcm;
pub use crate::audio::post_process_audio;
pub use crate::compose::clip::{ClipLoader, ClipSource, FfmpegClipLoader};
pub use crate::compose::compositor::{ComposedVideo, Compositor, CompositorOpts};
pub use crate::compose::ffmpeg::FfmpegRecorder;
pub use crate::compose::format::OutputFormat;
pub use crate::compose::frame::FrameRGBA;
pub use crate::compose::recorder::{AudioInputConfig, InMemoryRecorder, Recorder, RecorderConfig};
pub use crate::compose::state::{ComposeEvent, ComposeFailure, ComposeState, CompositorMachine};
pub use crate::config::{AdreelConfig, GatewayConfig};
pub use crate::gateway::error::GatewayErrorKind;
pub use crate::gateway::gemini::GeminiGateway;
pub use crate::gateway::speech::{VoiceGender, VoiceStyle};
pub use crate::gateway::{MediaGateway, PollPolicy, VideoOperation, VideoPoll};
pub use crate::studio::caption::Caption;
pub use crate::studio::fallback::VideoFallback;
pub use crate::studio::pipeline::StudioPipeline;
pub use crate::studio::wizard::{ClipSequence, CompositionJob, ProductInfo, Stage, Studio};
