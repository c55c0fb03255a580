use crate::assets::asset::MediaAsset;
use crate::foundation::error::{AdreelError, AdreelResult};
use crate::studio::caption::Caption;
use crate::studio::fallback::VideoFallback;
use crate::studio::prompts::SCENE_COUNT;

/// Wizard stage, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Product photo, name and description.
    Product,
    /// Model image holding the product.
    Model,
    /// Script and narration audio.
    Script,
    /// Scene images and clips.
    Scenes,
    /// Composition and caption.
    Finishing,
}

impl Stage {
    /// Stages in wizard order.
    pub const ALL: [Stage; 5] = [
        Self::Product,
        Self::Model,
        Self::Script,
        Self::Scenes,
        Self::Finishing,
    ];

    /// Following stage, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Product => Some(Self::Model),
            Self::Model => Some(Self::Script),
            Self::Script => Some(Self::Scenes),
            Self::Scenes => Some(Self::Finishing),
            Self::Finishing => None,
        }
    }

    /// Preceding stage, if any.
    pub fn prev(self) -> Option<Self> {
        match self {
            Self::Product => None,
            Self::Model => Some(Self::Product),
            Self::Script => Some(Self::Model),
            Self::Scenes => Some(Self::Script),
            Self::Finishing => Some(Self::Scenes),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Product => "product",
            Self::Model => "model",
            Self::Script => "script",
            Self::Scenes => "scenes",
            Self::Finishing => "finishing",
        })
    }
}

/// Ordered clips for the studio path: exactly [`SCENE_COUNT`] non-empty clips.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipSequence([MediaAsset; SCENE_COUNT]);

impl ClipSequence {
    /// Validate and wrap `clips`.
    pub fn try_new(clips: Vec<MediaAsset>) -> AdreelResult<Self> {
        if let Some(i) = clips.iter().position(MediaAsset::is_empty) {
            return Err(AdreelError::validation(format!("clip {i} is empty")));
        }
        let clips: [MediaAsset; SCENE_COUNT] = clips.try_into().map_err(|v: Vec<MediaAsset>| {
            AdreelError::validation(format!(
                "expected exactly {SCENE_COUNT} clips, got {}",
                v.len()
            ))
        })?;
        Ok(Self(clips))
    }

    /// Clips in playback order.
    pub fn as_slice(&self) -> &[MediaAsset] {
        &self.0
    }

    /// Unwrap into a vector.
    pub fn into_vec(self) -> Vec<MediaAsset> {
        self.0.into()
    }
}

/// Product input for the first stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductInfo {
    /// Product photo.
    pub image: MediaAsset,
    /// Product name.
    pub name: String,
    /// Free-form product description.
    pub description: String,
}

/// Everything the compositor needs, handed out once per entry into [`Stage::Finishing`].
#[derive(Clone, Debug)]
pub struct CompositionJob {
    /// Clips in playback order.
    pub clips: ClipSequence,
    /// Narration track.
    pub narration: MediaAsset,
}

/// One ad-building session.
///
/// Artifacts belong to the stage that produces them. Replacing an artifact clears every artifact
/// of later stages, plus the narration when the script changes.
#[derive(Clone, Debug)]
pub struct Studio {
    stage: Stage,
    product: Option<ProductInfo>,
    model_description: Option<String>,
    model_image: Option<MediaAsset>,
    script: Option<String>,
    narration: Option<MediaAsset>,
    scene_images: Vec<MediaAsset>,
    scene_clips: [Option<MediaAsset>; SCENE_COUNT],
    video_fallback: Option<VideoFallback>,
    composed: Option<MediaAsset>,
    caption: Option<Caption>,
    composition_armed: bool,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}

impl Studio {
    /// Empty session at [`Stage::Product`].
    pub fn new() -> Self {
        Self {
            stage: Stage::Product,
            product: None,
            model_description: None,
            model_image: None,
            script: None,
            narration: None,
            scene_images: Vec::new(),
            scene_clips: Default::default(),
            video_fallback: None,
            composed: None,
            caption: None,
            composition_armed: false,
        }
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// `true` when the artifacts required to leave the current stage are present.
    pub fn can_advance(&self) -> bool {
        match self.stage {
            Stage::Product => self.product.is_some(),
            Stage::Model => self.model_image.is_some(),
            Stage::Script => self.script.is_some() && self.narration.is_some(),
            Stage::Scenes => self.scene_clips.iter().all(Option::is_some),
            Stage::Finishing => false,
        }
    }

    /// Move to the next stage. Entering [`Stage::Finishing`] arms one composition.
    pub fn advance(&mut self) -> AdreelResult<Stage> {
        let Some(next) = self.stage.next() else {
            return Err(AdreelError::validation("already at the final stage"));
        };
        if !self.can_advance() {
            return Err(AdreelError::validation(format!(
                "stage '{}' is missing required artifacts",
                self.stage
            )));
        }
        self.stage = next;
        if next == Stage::Finishing {
            self.composition_armed = true;
        }
        tracing::debug!(stage = %next, "studio advanced");
        Ok(next)
    }

    /// Move to the previous stage. Artifacts are kept.
    pub fn back(&mut self) -> AdreelResult<Stage> {
        let prev = self
            .stage
            .prev()
            .ok_or_else(|| AdreelError::validation("already at the first stage"))?;
        self.stage = prev;
        self.composition_armed = false;
        tracing::debug!(stage = %prev, "studio moved back");
        Ok(prev)
    }

    fn invalidate_after(&mut self, stage: Stage) {
        if stage < Stage::Model {
            self.model_description = None;
            self.model_image = None;
        }
        if stage < Stage::Script {
            self.script = None;
            self.narration = None;
        }
        if stage < Stage::Scenes {
            self.scene_images.clear();
            self.scene_clips = Default::default();
            self.video_fallback = None;
        }
        if stage < Stage::Finishing {
            self.composed = None;
            self.caption = None;
        }
    }

    fn require_stage(&self, stage: Stage) -> AdreelResult<()> {
        if self.stage != stage {
            return Err(AdreelError::validation(format!(
                "cannot change '{stage}' artifacts while at stage '{}'",
                self.stage
            )));
        }
        Ok(())
    }

    /// Product input.
    pub fn product(&self) -> Option<&ProductInfo> {
        self.product.as_ref()
    }

    /// Set the product, clearing everything downstream.
    pub fn set_product(&mut self, product: ProductInfo) -> AdreelResult<()> {
        self.require_stage(Stage::Product)?;
        if product.image.is_empty() || product.name.trim().is_empty() {
            return Err(AdreelError::validation(
                "product needs an image and a name",
            ));
        }
        self.invalidate_after(Stage::Product);
        self.product = Some(product);
        Ok(())
    }

    /// Optional description used for the model image.
    pub fn model_description(&self) -> Option<&str> {
        self.model_description.as_deref()
    }

    /// Model image.
    pub fn model_image(&self) -> Option<&MediaAsset> {
        self.model_image.as_ref()
    }

    /// Set the model image, clearing script, scenes and finishing artifacts.
    pub fn set_model(
        &mut self,
        description: Option<String>,
        image: MediaAsset,
    ) -> AdreelResult<()> {
        self.require_stage(Stage::Model)?;
        if image.is_empty() {
            return Err(AdreelError::validation("model image is empty"));
        }
        self.invalidate_after(Stage::Model);
        self.model_description = description;
        self.model_image = Some(image);
        Ok(())
    }

    /// Narration script.
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// Set the script. The narration is derived from it and is cleared too.
    pub fn set_script(&mut self, script: String) -> AdreelResult<()> {
        self.require_stage(Stage::Script)?;
        if script.trim().is_empty() {
            return Err(AdreelError::validation("script is empty"));
        }
        self.invalidate_after(Stage::Script);
        self.narration = None;
        self.script = Some(script);
        Ok(())
    }

    /// Narration audio.
    pub fn narration(&self) -> Option<&MediaAsset> {
        self.narration.as_ref()
    }

    /// Set the narration audio.
    pub fn set_narration(&mut self, narration: MediaAsset) -> AdreelResult<()> {
        self.require_stage(Stage::Script)?;
        if self.script.is_none() {
            return Err(AdreelError::validation("narration requires a script"));
        }
        if narration.is_empty() {
            return Err(AdreelError::validation("narration is empty"));
        }
        self.invalidate_after(Stage::Script);
        self.narration = Some(narration);
        Ok(())
    }

    /// Scene images (empty or exactly [`SCENE_COUNT`]).
    pub fn scene_images(&self) -> &[MediaAsset] {
        &self.scene_images
    }

    /// Set all scene images, clearing clips and finishing artifacts.
    pub fn set_scene_images(&mut self, images: Vec<MediaAsset>) -> AdreelResult<()> {
        self.require_stage(Stage::Scenes)?;
        if images.len() != SCENE_COUNT || images.iter().any(MediaAsset::is_empty) {
            return Err(AdreelError::validation(format!(
                "expected {SCENE_COUNT} non-empty scene images, got {}",
                images.len()
            )));
        }
        self.invalidate_after(Stage::Scenes);
        self.scene_clips = Default::default();
        self.video_fallback = None;
        self.scene_images = images;
        Ok(())
    }

    /// Replace the scene image in `slot`. Only that slot's clip and the finishing artifacts are
    /// cleared.
    pub fn set_scene_image(&mut self, slot: usize, image: MediaAsset) -> AdreelResult<()> {
        self.require_stage(Stage::Scenes)?;
        check_slot(slot)?;
        if self.scene_images.len() != SCENE_COUNT {
            return Err(AdreelError::validation(
                "scene images must be generated before replacing one",
            ));
        }
        if image.is_empty() {
            return Err(AdreelError::validation(format!("scene image {slot} is empty")));
        }
        self.invalidate_after(Stage::Scenes);
        self.scene_clips[slot] = None;
        self.scene_images[slot] = image;
        Ok(())
    }

    /// Clip per slot, `None` where not generated yet.
    pub fn scene_clips(&self) -> &[Option<MediaAsset>; SCENE_COUNT] {
        &self.scene_clips
    }

    /// Set the clip in `slot`. A pending fallback is dismissed once every slot is filled.
    pub fn set_scene_clip(&mut self, slot: usize, clip: MediaAsset) -> AdreelResult<()> {
        self.require_stage(Stage::Scenes)?;
        check_slot(slot)?;
        if clip.is_empty() {
            return Err(AdreelError::validation(format!("clip {slot} is empty")));
        }
        self.invalidate_after(Stage::Scenes);
        self.scene_clips[slot] = Some(clip);
        if self.scene_clips.iter().all(Option::is_some) {
            self.video_fallback = None;
        }
        Ok(())
    }

    /// Discard the clip in `slot` together with the finishing artifacts.
    pub fn clear_scene_clip(&mut self, slot: usize) -> AdreelResult<()> {
        self.require_stage(Stage::Scenes)?;
        check_slot(slot)?;
        self.invalidate_after(Stage::Scenes);
        self.scene_clips[slot] = None;
        Ok(())
    }

    /// Pending manual-generation fallback.
    pub fn video_fallback(&self) -> Option<&VideoFallback> {
        self.video_fallback.as_ref()
    }

    /// Enter the manual fallback state.
    pub fn set_video_fallback(&mut self, fallback: VideoFallback) {
        self.video_fallback = Some(fallback);
    }

    /// Take the composition inputs. Returns `Some` once per entry into [`Stage::Finishing`],
    /// and only when all clips and a non-empty narration are present.
    pub fn take_composition_job(&mut self) -> Option<CompositionJob> {
        if self.stage != Stage::Finishing || !self.composition_armed {
            return None;
        }
        let narration = self.narration.clone().filter(|n| !n.is_empty())?;
        let clips = self.scene_clips.iter().cloned().collect::<Option<Vec<_>>>()?;
        let clips = ClipSequence::try_new(clips).ok()?;
        self.composition_armed = false;
        Some(CompositionJob { clips, narration })
    }

    /// Composed ad video.
    pub fn composed(&self) -> Option<&MediaAsset> {
        self.composed.as_ref()
    }

    /// Store the composed video.
    pub fn set_composed(&mut self, video: MediaAsset) -> AdreelResult<()> {
        self.require_stage(Stage::Finishing)?;
        self.composed = Some(video);
        Ok(())
    }

    /// Caption for the post.
    pub fn caption(&self) -> Option<&Caption> {
        self.caption.as_ref()
    }

    /// Store the caption.
    pub fn set_caption(&mut self, caption: Caption) -> AdreelResult<()> {
        self.require_stage(Stage::Finishing)?;
        self.caption = Some(caption);
        Ok(())
    }
}

fn check_slot(slot: usize) -> AdreelResult<()> {
    if slot >= SCENE_COUNT {
        return Err(AdreelError::validation(format!(
            "scene slot {slot} out of range (0..{SCENE_COUNT})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/studio/wizard.rs"]
mod tests;
