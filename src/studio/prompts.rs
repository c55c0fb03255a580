//! Prompt construction for every generation step of the studio.

/// Question asked about the model image to pick a narrator voice.
pub const AUDIENCE_QUESTION: &str =
    "Is the person in this image presenting as female or male? Answer with one word.";

/// Labels accepted for [`AUDIENCE_QUESTION`].
pub const AUDIENCE_LABELS: [&str; 2] = ["female", "male"];

/// Label used when classification fails.
pub const DEFAULT_AUDIENCE_LABEL: &str = "female";

/// Number of scenes (and clips) in a studio ad.
pub const SCENE_COUNT: usize = 3;

const SCENE_BEATS: [&str; SCENE_COUNT] = [
    "an eye-catching opening shot where the model first reveals the product",
    "a close, natural moment of the model using the product",
    "a confident closing shot with the model presenting the product to the camera",
];

const SCENE_MOTIONS: [&str; SCENE_COUNT] = [
    "slow push-in on the model lifting the product into frame, soft natural light",
    "gentle handheld movement following the model's hands using the product",
    "smooth orbit around the model holding the product toward the camera, subtle smile",
];

/// Prompt for a model image holding the product (product photo passed as reference).
pub fn model_image_prompt(product_name: &str, model_description: Option<&str>) -> String {
    let model = model_description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("a friendly, approachable person in their late twenties");
    format!(
        "Create a photorealistic vertical (9:16) advertising photo of {model} holding the \
         product \"{product_name}\" shown in the reference image. Keep the product's shape, \
         colors and label exactly as in the reference. Clean, bright lifestyle setting."
    )
}

/// Prompt for the narration script.
pub fn script_prompt(product_name: &str, product_description: &str) -> String {
    format!(
        "Write a voice-over script for a 15 second vertical video ad for \"{product_name}\". \
         Product details: {description}\n\
         Use two or three short, punchy sentences ending with a call to action. \
         Return only the words to be spoken, with no stage directions, labels or quotes.",
        description = product_description.trim()
    )
}

/// One image prompt per scene, keeping model and product consistent with the references.
pub fn scene_image_prompts(product_name: &str, script: &str) -> [String; SCENE_COUNT] {
    SCENE_BEATS.map(|beat| {
        format!(
            "Using the same person and the same product \"{product_name}\" from the reference \
             images, create a photorealistic vertical (9:16) frame showing {beat}. \
             The ad narration is: \"{script}\". Keep identity, outfit and product details \
             consistent.",
            script = script.trim()
        )
    })
}

/// One image-to-video prompt per scene.
pub fn scene_video_prompts(product_name: &str) -> [String; SCENE_COUNT] {
    SCENE_MOTIONS.map(|motion| {
        format!(
            "Animate this advertising still for \"{product_name}\": {motion}. \
             Realistic motion, no text overlays, no cuts."
        )
    })
}

/// Prompt for the social caption and hashtags.
pub fn caption_prompt(product_name: &str, product_description: &str, script: &str) -> String {
    format!(
        "Write a short social media caption for a video ad for \"{product_name}\" \
         ({description}). The narration is: \"{script}\".\n\
         Answer in exactly this format:\n\
         CAPTION: <one or two sentences with at most two emoji>\n\
         HASHTAGS: <five to eight hashtags separated by spaces>",
        description = product_description.trim(),
        script = script.trim()
    )
}

#[cfg(test)]
#[path = "../../tests/unit/studio/prompts.rs"]
mod tests;
