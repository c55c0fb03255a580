//! Gemini REST implementation of [`MediaGateway`].
//!
//! Image, text, classification and speech go through `models/{model}:generateContent`; video uses
//! `models/{model}:predictLongRunning` plus operation polling. Provider payloads are converted to
//! [`MediaAsset`]s and [`GatewayErrorKind`]s here and nowhere else.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::assets::asset::MediaAsset;
use crate::config::{GatewayConfig, api_key_from_env};
use crate::foundation::error::{AdreelError, AdreelResult};
use crate::gateway::error::{
    GatewayErrorKind, classify_finish_reason, classify_http_failure, classify_operation_error,
};
use crate::gateway::speech::{VoiceGender, VoiceStyle, pcm_rate_from_mime, pcm16_to_wav, speech_prompt};
use crate::gateway::{MediaGateway, VideoOperation, VideoPoll};

const API_KEY_HEADER: &str = "x-goog-api-key";

//
// ─── WIRE TYPES ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<String>,
    #[serde(default)]
    pub(crate) parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub(crate) mime_type: String,
    pub(crate) data: String,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) speech_config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub(crate) contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
    #[serde(default)]
    pub(crate) prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub(crate) content: Option<Content>,
    #[serde(default)]
    pub(crate) finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub(crate) block_reason: Option<String>,
    #[serde(default)]
    pub(crate) block_reason_message: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub(crate) struct Operation {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) done: bool,
    #[serde(default)]
    pub(crate) error: Option<OperationError>,
    #[serde(default)]
    pub(crate) response: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub(crate) struct OperationError {
    #[serde(default)]
    pub(crate) code: Option<i64>,
    #[serde(default)]
    pub(crate) message: String,
}

//
// ─── RESPONSE INTERPRETATION ────────────────────────────────────────────────────
//

fn inline_part(asset: &MediaAsset) -> AdreelResult<Part> {
    Ok(Part {
        text: None,
        inline_data: Some(InlineData {
            mime_type: asset.content_type().to_string(),
            data: STANDARD.encode(asset.read_bytes()?),
        }),
    })
}

fn text_part(text: &str) -> Part {
    Part {
        text: Some(text.to_string()),
        inline_data: None,
    }
}

fn parts(resp: &GenerateContentResponse) -> impl Iterator<Item = &Part> {
    resp.candidates
        .iter()
        .filter_map(|c| c.content.as_ref())
        .flat_map(|c| c.parts.iter())
}

/// Fail with `Blocked` when the prompt or the first candidate was refused.
pub(crate) fn check_blocked(resp: &GenerateContentResponse) -> Result<(), GatewayErrorKind> {
    if let Some(fb) = &resp.prompt_feedback
        && let Some(reason) = &fb.block_reason
    {
        let msg = fb.block_reason_message.clone().unwrap_or_else(|| reason.clone());
        return Err(GatewayErrorKind::Blocked(msg));
    }
    if let Some(reason) = resp
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
        .and_then(classify_finish_reason)
    {
        return Err(reason);
    }
    Ok(())
}

/// First inline payload whose MIME type starts with `prefix`.
pub(crate) fn extract_inline(
    resp: &GenerateContentResponse,
    prefix: &str,
    what: &str,
) -> Result<MediaAsset, GatewayErrorKind> {
    check_blocked(resp)?;
    let data = parts(resp)
        .filter_map(|p| p.inline_data.as_ref())
        .find(|d| d.mime_type.starts_with(prefix))
        .ok_or_else(|| GatewayErrorKind::EmptyResponse(what.to_string()))?;
    let bytes = STANDARD
        .decode(data.data.as_bytes())
        .map_err(|e| GatewayErrorKind::Malformed(format!("base64 {what} payload: {e}")))?;
    if bytes.is_empty() {
        return Err(GatewayErrorKind::EmptyResponse(what.to_string()));
    }
    Ok(MediaAsset::inline(data.mime_type.clone(), bytes))
}

/// Concatenated text parts.
pub(crate) fn extract_text(resp: &GenerateContentResponse) -> Result<String, GatewayErrorKind> {
    check_blocked(resp)?;
    let text: String = parts(resp).filter_map(|p| p.text.as_deref()).collect();
    let text = text.trim();
    if text.is_empty() {
        return Err(GatewayErrorKind::EmptyResponse("text".to_string()));
    }
    Ok(text.to_string())
}

/// Match a model answer against the allowed labels (case-insensitive).
pub(crate) fn extract_label(answer: &str, labels: &[&str]) -> Result<String, GatewayErrorKind> {
    let answer = answer.trim().trim_matches(|c: char| c == '"' || c == '.');
    labels
        .iter()
        .find(|l| l.eq_ignore_ascii_case(answer))
        .map(|l| l.to_string())
        .ok_or_else(|| GatewayErrorKind::Malformed(format!("unexpected label '{answer}'")))
}

/// Interpret one poll of a video operation.
pub(crate) fn interpret_operation(op: &Operation) -> Result<VideoPoll, GatewayErrorKind> {
    if let Some(err) = &op.error {
        return Err(classify_operation_error(err.code, &err.message));
    }
    if !op.done {
        return Ok(VideoPoll::Pending);
    }
    let Some(resp) = &op.response else {
        return Ok(VideoPoll::Done(None));
    };
    if let Some(reasons) = resp
        .pointer("/generateVideoResponse/raiMediaFilteredReasons")
        .and_then(|v| v.as_array())
        .filter(|a| !a.is_empty())
    {
        let joined = reasons
            .iter()
            .filter_map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(GatewayErrorKind::Blocked(joined));
    }
    let sample = resp.pointer("/generateVideoResponse/generatedSamples/0/video");
    if let Some(uri) = sample
        .and_then(|v| v.get("uri"))
        .and_then(|v| v.as_str())
        .filter(|u| !u.is_empty())
    {
        return Ok(VideoPoll::Done(Some(MediaAsset::url("video/mp4", uri))));
    }
    if let Some(b64) = sample
        .and_then(|v| v.get("bytesBase64Encoded"))
        .and_then(|v| v.as_str())
    {
        let bytes = STANDARD
            .decode(b64.as_bytes())
            .map_err(|e| GatewayErrorKind::Malformed(format!("base64 video payload: {e}")))?;
        return Ok(VideoPoll::Done(Some(MediaAsset::inline("video/mp4", bytes))));
    }
    Ok(VideoPoll::Done(None))
}

//
// ─── CLIENT ─────────────────────────────────────────────────────────────────────
//

/// Gemini REST client.
#[derive(Clone)]
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: String,
    cfg: GatewayConfig,
}

impl std::fmt::Debug for GeminiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGateway")
            .field("base_url", &self.cfg.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiGateway {
    /// Create a client with an explicit API key.
    pub fn new(api_key: impl Into<String>, cfg: GatewayConfig) -> AdreelResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GatewayErrorKind::MissingApiKey.into());
        }
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| AdreelError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            cfg,
        })
    }

    /// Create a client with the API key from `GEMINI_API_KEY`.
    pub fn from_env(cfg: GatewayConfig) -> AdreelResult<Self> {
        let key = api_key_from_env().ok_or(GatewayErrorKind::MissingApiKey)?;
        Self::new(key, cfg)
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{model}:{method}",
            self.cfg.base_url.trim_end_matches('/')
        )
    }

    async fn send_json<R: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> AdreelResult<R> {
        let resp = req
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(GatewayErrorKind::from)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_http_failure(status.as_u16(), &body).into());
        }
        Ok(resp.json::<R>().await.map_err(GatewayErrorKind::from)?)
    }

    async fn generate(
        &self,
        model: &str,
        req: &GenerateContentRequest,
    ) -> AdreelResult<GenerateContentResponse> {
        let url = self.model_url(model, "generateContent");
        debug!(url = %url, "sending generateContent request");
        self.send_json(self.client.post(&url).json(req)).await
    }
}

#[async_trait]
impl MediaGateway for GeminiGateway {
    #[instrument(skip_all, fields(references = references.len()))]
    async fn image_from_references(
        &self,
        references: &[MediaAsset],
        guidance: &str,
    ) -> AdreelResult<MediaAsset> {
        let mut parts = references
            .iter()
            .map(inline_part)
            .collect::<AdreelResult<Vec<_>>>()?;
        parts.push(text_part(guidance));
        let req = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
                ..GenerationConfig::default()
            }),
        };
        let resp = self.generate(&self.cfg.image_model, &req).await?;
        Ok(extract_inline(&resp, "image/", "image")?)
    }

    #[instrument(skip_all)]
    async fn classify_attribute(
        &self,
        image: &MediaAsset,
        question: &str,
        labels: &[&str],
    ) -> AdreelResult<String> {
        let req = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![inline_part(image)?, text_part(question)],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("text/x.enum".to_string()),
                response_schema: Some(serde_json::json!({ "type": "STRING", "enum": labels })),
                ..GenerationConfig::default()
            }),
        };
        let resp = self.generate(&self.cfg.text_model, &req).await?;
        let answer = extract_text(&resp)?;
        Ok(extract_label(&answer, labels)?)
    }

    #[instrument(skip_all)]
    async fn text_from_prompt(&self, prompt: &str) -> AdreelResult<String> {
        let req = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![text_part(prompt)],
            }],
            generation_config: None,
        };
        let resp = self.generate(&self.cfg.text_model, &req).await?;
        Ok(extract_text(&resp)?)
    }

    #[instrument(skip(self, text))]
    async fn speech_from_text(
        &self,
        text: &str,
        voice: VoiceGender,
        style: VoiceStyle,
    ) -> AdreelResult<MediaAsset> {
        let req = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![text_part(&speech_prompt(text, style))],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(serde_json::json!({
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": voice.voice_name() }
                    }
                })),
                ..GenerationConfig::default()
            }),
        };
        let resp = self.generate(&self.cfg.speech_model, &req).await?;
        let audio = extract_inline(&resp, "audio/", "audio")?;
        if audio.extension() == "wav" {
            return Ok(audio);
        }
        let bytes = audio.read_bytes()?;
        let wav = pcm16_to_wav(&bytes, pcm_rate_from_mime(audio.content_type()), 1)?;
        Ok(MediaAsset::inline("audio/wav", wav))
    }

    #[instrument(skip_all)]
    async fn start_video(&self, prompt: &str, image: &MediaAsset) -> AdreelResult<VideoOperation> {
        let body = serde_json::json!({
            "instances": [{
                "prompt": prompt,
                "image": {
                    "bytesBase64Encoded": STANDARD.encode(image.read_bytes()?),
                    "mimeType": image.content_type(),
                }
            }],
            "parameters": { "aspectRatio": self.cfg.video_aspect_ratio }
        });
        let url = self.model_url(&self.cfg.video_model, "predictLongRunning");
        let op: Operation = self.send_json(self.client.post(&url).json(&body)).await?;
        if op.name.is_empty() {
            return Err(GatewayErrorKind::EmptyResponse("operation name".into()).into());
        }
        Ok(VideoOperation { name: op.name })
    }

    #[instrument(skip(self))]
    async fn poll_video(&self, op: &VideoOperation) -> AdreelResult<VideoPoll> {
        let url = format!("{}/{}", self.cfg.base_url.trim_end_matches('/'), op.name);
        let op: Operation = self.send_json(self.client.get(&url)).await?;
        Ok(interpret_operation(&op)?)
    }

    #[instrument(skip(self))]
    async fn download(&self, url: &str) -> AdreelResult<MediaAsset> {
        let resp = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(GatewayErrorKind::from)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_http_failure(status.as_u16(), &body).into());
        }
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("video/"))
            .unwrap_or("video/mp4")
            .to_string();
        let bytes = resp.bytes().await.map_err(GatewayErrorKind::from)?;
        if bytes.is_empty() {
            return Err(GatewayErrorKind::EmptyResponse("video download".into()).into());
        }
        Ok(MediaAsset::inline(content_type, bytes.to_vec()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gateway/gemini.rs"]
mod tests;
