use super::*;

#[test]
fn model_prompt_uses_description_or_default() {
    let p = model_image_prompt("Glow Serum", Some("a woman in her forties with curly hair"));
    assert!(p.contains("curly hair"));
    assert!(p.contains("\"Glow Serum\""));
    let p = model_image_prompt("Glow Serum", Some("   "));
    assert!(p.contains("late twenties"));
}

#[test]
fn three_distinct_scene_prompts() {
    let images = scene_image_prompts("Glow Serum", "Shine all day.");
    assert_eq!(images.len(), SCENE_COUNT);
    assert!(images.iter().all(|p| p.contains("Shine all day.")));
    assert_ne!(images[0], images[1]);

    let videos = scene_video_prompts("Glow Serum");
    assert!(videos.iter().all(|p| p.contains("Glow Serum")));
    assert_ne!(videos[1], videos[2]);
}

#[test]
fn default_label_is_allowed() {
    assert!(AUDIENCE_LABELS.contains(&DEFAULT_AUDIENCE_LABEL));
}
