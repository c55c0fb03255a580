use super::*;
use crate::gateway::error::GatewayErrorKind;

fn prompts() -> [String; SCENE_COUNT] {
    ["one".to_string(), "two".to_string(), "three".to_string()]
}

#[test]
fn requires_exactly_three_prompts() {
    assert!(VideoFallback::new(vec!["a".into(), "b".into()], "quota").is_err());
    let fb = VideoFallback::new(prompts().to_vec(), "quota").unwrap();
    assert_eq!(fb.prompts().len(), 3);
    assert_eq!(fb.reason(), "quota");
}

#[test]
fn only_quota_errors_produce_a_fallback() {
    let exhausted = AdreelError::from(GatewayErrorKind::ResourceExhausted("quota".into()));
    let fb = fallback_for(&exhausted, &prompts()).unwrap();
    assert_eq!(fb.prompts(), &prompts());

    let blocked = AdreelError::from(GatewayErrorKind::Blocked("safety".into()));
    assert!(fallback_for(&blocked, &prompts()).is_none());
    assert!(fallback_for(&AdreelError::validation("x"), &prompts()).is_none());
}

#[test]
fn text_file_lists_every_clip() {
    let fb = VideoFallback::new(prompts().to_vec(), "quota").unwrap();
    let text = fb.to_text_file();
    assert!(text.contains("Clip 1:\none"));
    assert!(text.contains("Clip 2:\ntwo"));
    assert!(text.contains("Clip 3:\nthree"));
}
