//! Scripted in-process gateway.

use std::sync::Mutex;

use adreel::audio::encode_wav16;
use adreel::{
    AdreelResult, AudioPcm, GatewayErrorKind, MediaAsset, MediaGateway, VideoOperation, VideoPoll,
    VoiceGender, VoiceStyle,
};
use async_trait::async_trait;

/// 24 kHz mono WAV with `frames` samples of a quiet square wave.
pub fn tone_wav(frames: usize) -> MediaAsset {
    let pcm = AudioPcm {
        sample_rate: 24_000,
        channels: 1,
        interleaved_f32: (0..frames)
            .map(|i| if (i / 24) % 2 == 0 { 0.05 } else { -0.05 })
            .collect(),
    };
    MediaAsset::inline("audio/wav", encode_wav16(&pcm).unwrap())
}

/// Gateway whose answers and failures are configured per test.
///
/// Images echo their guidance as bytes, videos finish after `pending_polls` polls and are
/// returned by URL so the download path is exercised.
pub struct MockGateway {
    /// Answer for classification; `Err` makes classification fail.
    pub classification: Result<String, GatewayErrorKind>,
    /// Fail the n-th (0-based) image request.
    pub image_failure: Option<(usize, GatewayErrorKind)>,
    /// Script text returned for non-caption prompts.
    pub script: String,
    /// Text returned for caption prompts.
    pub caption: String,
    /// Sample frames in synthesized speech.
    pub speech_frames: usize,
    /// Fail the n-th (0-based) video start.
    pub video_failure: Option<(usize, GatewayErrorKind)>,
    /// Error reported by every poll instead of progress.
    pub poll_error: Option<GatewayErrorKind>,
    /// Polls reported as pending before an operation completes; `None` never completes.
    pub pending_polls: Option<u32>,
    /// Completed operations carry no video.
    pub empty_video: bool,
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) image_calls: Mutex<usize>,
    pub(crate) video_starts: Mutex<usize>,
    pub(crate) polls: Mutex<Vec<(String, u32)>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            classification: Ok("female".into()),
            image_failure: None,
            script: "Meet the mug that keeps coffee hot all day. Grab yours now.".into(),
            caption: "CAPTION: Hot coffee, all day ☕\nHASHTAGS: #coffee #mug #morning".into(),
            speech_frames: 2_400,
            video_failure: None,
            poll_error: None,
            pending_polls: Some(1),
            empty_video: false,
            calls: Mutex::new(Vec::new()),
            image_calls: Mutex::new(0),
            video_starts: Mutex::new(0),
            polls: Mutex::new(Vec::new()),
        }
    }
}

impl MockGateway {
    /// Names of the trait methods called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls to `name`.
    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| *c == name).count()
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl MediaGateway for MockGateway {
    async fn image_from_references(
        &self,
        references: &[MediaAsset],
        guidance: &str,
    ) -> AdreelResult<MediaAsset> {
        self.record("image");
        assert!(!references.is_empty());
        let n = {
            let mut calls = self.image_calls.lock().unwrap();
            let n = *calls;
            *calls += 1;
            n
        };
        // Let the other requests of a batch start before this one settles.
        tokio::task::yield_now().await;
        if let Some((at, kind)) = &self.image_failure
            && *at == n
        {
            return Err(kind.clone().into());
        }
        Ok(MediaAsset::inline("image/png", guidance.as_bytes().to_vec()))
    }

    async fn classify_attribute(
        &self,
        _image: &MediaAsset,
        _question: &str,
        labels: &[&str],
    ) -> AdreelResult<String> {
        self.record("classify");
        let label = self.classification.clone()?;
        assert!(labels.contains(&label.as_str()));
        Ok(label)
    }

    async fn text_from_prompt(&self, prompt: &str) -> AdreelResult<String> {
        self.record("text");
        if prompt.contains("caption") {
            Ok(self.caption.clone())
        } else {
            Ok(self.script.clone())
        }
    }

    async fn speech_from_text(
        &self,
        text: &str,
        _voice: VoiceGender,
        _style: VoiceStyle,
    ) -> AdreelResult<MediaAsset> {
        self.record("speech");
        assert!(!text.is_empty());
        Ok(tone_wav(self.speech_frames))
    }

    async fn start_video(&self, _prompt: &str, image: &MediaAsset) -> AdreelResult<VideoOperation> {
        self.record("start_video");
        assert!(!image.is_empty());
        let n = {
            let mut starts = self.video_starts.lock().unwrap();
            let n = *starts;
            *starts += 1;
            n
        };
        if let Some((at, kind)) = &self.video_failure
            && *at == n
        {
            return Err(kind.clone().into());
        }
        Ok(VideoOperation {
            name: format!("operations/video-{n}"),
        })
    }

    async fn poll_video(&self, op: &VideoOperation) -> AdreelResult<VideoPoll> {
        self.record("poll");
        if let Some(kind) = &self.poll_error {
            return Err(kind.clone().into());
        }
        let seen = {
            let mut polls = self.polls.lock().unwrap();
            match polls.iter_mut().find(|(name, _)| *name == op.name) {
                Some((_, n)) => {
                    *n += 1;
                    *n
                }
                None => {
                    polls.push((op.name.clone(), 1));
                    1
                }
            }
        };
        match self.pending_polls {
            Some(pending) if seen > pending => {
                if self.empty_video {
                    return Ok(VideoPoll::Done(None));
                }
                Ok(VideoPoll::Done(Some(MediaAsset::url(
                    "video/mp4",
                    format!("https://mock.invalid/{}.mp4", op.name),
                ))))
            }
            _ => Ok(VideoPoll::Pending),
        }
    }

    async fn download(&self, url: &str) -> AdreelResult<MediaAsset> {
        self.record("download");
        Ok(MediaAsset::inline("video/mp4", url.as_bytes().to_vec()))
    }
}
