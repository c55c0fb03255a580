use crate::foundation::error::{AdreelError, AdreelResult};
use crate::studio::prompts::SCENE_COUNT;

/// Manual fallback shown when video generation runs out of quota.
///
/// Always carries one copyable prompt per clip slot, regardless of how many clips were generated
/// before the quota ran out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFallback {
    prompts: [String; SCENE_COUNT],
    reason: String,
}

impl VideoFallback {
    /// Build from exactly [`SCENE_COUNT`] prompts.
    pub fn new(prompts: Vec<String>, reason: impl Into<String>) -> AdreelResult<Self> {
        let prompts: [String; SCENE_COUNT] = prompts.try_into().map_err(|v: Vec<String>| {
            AdreelError::validation(format!(
                "video fallback needs exactly {SCENE_COUNT} prompts, got {}",
                v.len()
            ))
        })?;
        Ok(Self {
            prompts,
            reason: reason.into(),
        })
    }

    /// Copyable prompts, one per clip slot.
    pub fn prompts(&self) -> &[String; SCENE_COUNT] {
        &self.prompts
    }

    /// Provider message that triggered the fallback.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Plain-text listing of the prompts for manual generation.
    pub fn to_text_file(&self) -> String {
        let mut out = String::from(
            "Video generation quota is exhausted. Generate each clip manually with these prompts,\n\
             using the matching scene image as the first frame.\n",
        );
        for (i, prompt) in self.prompts.iter().enumerate() {
            out.push_str(&format!("\nClip {}:\n{prompt}\n", i + 1));
        }
        out
    }
}

/// Fallback for `err` when it is a quota failure; `None` for every other error.
pub fn fallback_for(err: &AdreelError, prompts: &[String; SCENE_COUNT]) -> Option<VideoFallback> {
    match err {
        AdreelError::Gateway(kind) if kind.is_resource_exhausted() => Some(VideoFallback {
            prompts: prompts.clone(),
            reason: kind.to_string(),
        }),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/studio/fallback.rs"]
mod tests;
