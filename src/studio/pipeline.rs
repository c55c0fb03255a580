use tracing::info;

use crate::assets::asset::MediaAsset;
use crate::audio::post_process_audio;
use crate::compose::compositor::ComposedVideo;
use crate::foundation::error::{AdreelError, AdreelResult};
use crate::gateway::speech::{VoiceGender, VoiceStyle};
use crate::gateway::{
    MediaGateway, PollPolicy, classify_or_default, multi_image_from_references, video_from_image,
};
use crate::studio::caption::Caption;
use crate::studio::fallback::fallback_for;
use crate::studio::prompts;
use crate::studio::wizard::{CompositionJob, ProductInfo, Studio};

/// Drives the generation steps of a [`Studio`] session through a [`MediaGateway`].
///
/// Each step reads its inputs from the session and stores its output there, so regenerating a
/// step invalidates later artifacts the same way manual edits do.
pub struct StudioPipeline<'g, G: MediaGateway + ?Sized> {
    gateway: &'g G,
    policy: PollPolicy,
}

fn product(studio: &Studio) -> AdreelResult<ProductInfo> {
    studio
        .product()
        .cloned()
        .ok_or_else(|| AdreelError::validation("no product set"))
}

fn model_image(studio: &Studio) -> AdreelResult<MediaAsset> {
    studio
        .model_image()
        .cloned()
        .ok_or_else(|| AdreelError::validation("no model image set"))
}

fn script(studio: &Studio) -> AdreelResult<String> {
    studio
        .script()
        .map(str::to_string)
        .ok_or_else(|| AdreelError::validation("no script set"))
}

impl<'g, G: MediaGateway + ?Sized> StudioPipeline<'g, G> {
    /// Pipeline over `gateway`, polling video jobs with `policy`.
    pub fn new(gateway: &'g G, policy: PollPolicy) -> Self {
        Self { gateway, policy }
    }

    /// Generate the model image from the product photo.
    pub async fn generate_model(
        &self,
        studio: &mut Studio,
        description: Option<String>,
    ) -> AdreelResult<()> {
        let product = product(studio)?;
        let prompt = prompts::model_image_prompt(&product.name, description.as_deref());
        let image = self
            .gateway
            .image_from_reference(&product.image, &prompt)
            .await?;
        studio.set_model(description, image)?;
        info!("model image generated");
        Ok(())
    }

    /// Generate the narration script.
    pub async fn generate_script(&self, studio: &mut Studio) -> AdreelResult<()> {
        let product = product(studio)?;
        let text = self
            .gateway
            .text_from_prompt(&prompts::script_prompt(&product.name, &product.description))
            .await?;
        studio.set_script(text.trim().to_string())?;
        info!("script generated");
        Ok(())
    }

    /// Narrator voice matching the model image. Never fails; falls back to the default label.
    pub async fn detect_voice(&self, studio: &Studio) -> VoiceGender {
        let Some(image) = studio.model_image() else {
            return VoiceGender::parse(prompts::DEFAULT_AUDIENCE_LABEL);
        };
        let label = classify_or_default(
            self.gateway,
            image,
            prompts::AUDIENCE_QUESTION,
            &prompts::AUDIENCE_LABELS,
            prompts::DEFAULT_AUDIENCE_LABEL,
        )
        .await;
        VoiceGender::parse(&label)
    }

    /// Synthesize and post-process the narration. `voice` defaults to [`Self::detect_voice`].
    pub async fn generate_narration(
        &self,
        studio: &mut Studio,
        voice: Option<VoiceGender>,
        style: VoiceStyle,
    ) -> AdreelResult<()> {
        let text = script(studio)?;
        let voice = match voice {
            Some(v) => v,
            None => self.detect_voice(studio).await,
        };
        let raw = self.gateway.speech_from_text(&text, voice, style).await?;
        let narration = post_process_audio(&raw, style, voice)?;
        studio.set_narration(narration)?;
        info!(?voice, ?style, "narration generated");
        Ok(())
    }

    /// Generate all scene images in one all-or-nothing batch.
    pub async fn generate_scene_images(&self, studio: &mut Studio) -> AdreelResult<()> {
        let product = product(studio)?;
        let references = [product.image.clone(), model_image(studio)?];
        let guidances = prompts::scene_image_prompts(&product.name, &script(studio)?);
        let images = multi_image_from_references(self.gateway, &references, &guidances).await?;
        studio.set_scene_images(images)?;
        info!("scene images generated");
        Ok(())
    }

    /// Regenerate the scene image in `slot`, clearing that slot's clip.
    pub async fn regenerate_scene_image(&self, studio: &mut Studio, slot: usize) -> AdreelResult<()> {
        let product = product(studio)?;
        let references = [product.image.clone(), model_image(studio)?];
        let guidances = prompts::scene_image_prompts(&product.name, &script(studio)?);
        let guidance = guidances
            .get(slot)
            .ok_or_else(|| AdreelError::validation(format!("scene slot {slot} out of range")))?;
        if studio.scene_images().len() != prompts::SCENE_COUNT {
            return Err(AdreelError::validation("scene images are missing"));
        }
        let image = self
            .gateway
            .image_from_references(&references, guidance)
            .await?;
        studio.set_scene_image(slot, image)?;
        info!(slot, "scene image regenerated");
        Ok(())
    }

    /// Generate a clip for every empty slot, one after another.
    ///
    /// On quota exhaustion the session enters the manual fallback with all three video prompts
    /// and the error is returned.
    pub async fn generate_scene_clips<F>(&self, studio: &mut Studio, mut progress: F) -> AdreelResult<()>
    where
        F: FnMut(usize, &str) + Send,
    {
        for slot in 0..prompts::SCENE_COUNT {
            if studio.scene_clips()[slot].is_some() {
                continue;
            }
            self.generate_scene_clip(studio, slot, &mut progress).await?;
        }
        Ok(())
    }

    /// Discard the clip in `slot` and generate a new one from its scene image.
    ///
    /// Quota exhaustion enters the manual fallback like [`Self::generate_scene_clips`].
    pub async fn regenerate_scene_clip<F>(
        &self,
        studio: &mut Studio,
        slot: usize,
        mut progress: F,
    ) -> AdreelResult<()>
    where
        F: FnMut(usize, &str) + Send,
    {
        studio.clear_scene_clip(slot)?;
        self.generate_scene_clip(studio, slot, &mut progress).await
    }

    async fn generate_scene_clip<F>(
        &self,
        studio: &mut Studio,
        slot: usize,
        progress: &mut F,
    ) -> AdreelResult<()>
    where
        F: FnMut(usize, &str) + Send,
    {
        let product = product(studio)?;
        if studio.scene_images().len() != prompts::SCENE_COUNT {
            return Err(AdreelError::validation("scene images are missing"));
        }
        let image = studio.scene_images()[slot].clone();
        let video_prompts = prompts::scene_video_prompts(&product.name);
        let result = video_from_image(
            self.gateway,
            &video_prompts[slot],
            &image,
            self.policy,
            |msg: &str| progress(slot, msg),
        )
        .await;
        match result {
            Ok(clip) => {
                studio.set_scene_clip(slot, clip)?;
                info!(slot, "scene clip generated");
                Ok(())
            }
            Err(e) => {
                if let Some(fallback) = fallback_for(&e, &video_prompts) {
                    tracing::warn!(slot, "video quota exhausted; manual fallback enabled");
                    studio.set_video_fallback(fallback);
                }
                Err(e)
            }
        }
    }

    /// Generate and store the caption.
    pub async fn generate_caption(&self, studio: &mut Studio) -> AdreelResult<Caption> {
        let product = product(studio)?;
        let prompt = prompts::caption_prompt(&product.name, &product.description, &script(studio)?);
        let text = self.gateway.text_from_prompt(&prompt).await?;
        let caption = Caption::parse(&text)?;
        studio.set_caption(caption.clone())?;
        Ok(caption)
    }
}

/// Run the armed composition, if any, and store its output.
///
/// Returns `Ok(None)` when no job is armed, so calling this repeatedly composes at most once per
/// entry into the finishing stage.
pub fn run_composition<C>(studio: &mut Studio, compose: C) -> AdreelResult<Option<ComposedVideo>>
where
    C: FnOnce(&CompositionJob) -> AdreelResult<ComposedVideo>,
{
    let Some(job) = studio.take_composition_job() else {
        return Ok(None);
    };
    let video = compose(&job)?;
    studio.set_composed(video.to_asset())?;
    info!(
        format = %video.format,
        frames = video.frames,
        bytes = video.bytes.len(),
        "ad composed"
    );
    Ok(Some(video))
}

#[cfg(test)]
#[path = "../../tests/unit/studio/pipeline.rs"]
mod tests;
