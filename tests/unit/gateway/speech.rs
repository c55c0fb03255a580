use super::*;

#[test]
fn unknown_style_uses_default_template() {
    assert_eq!(VoiceStyle::parse("operatic"), VoiceStyle::Natural);
    assert_eq!(
        speech_prompt("Buy now", VoiceStyle::parse("operatic")),
        speech_prompt("Buy now", VoiceStyle::Natural)
    );
}

#[test]
fn known_styles_parse_case_insensitively() {
    assert_eq!(VoiceStyle::parse(" WHISPER "), VoiceStyle::Whisper);
    assert_eq!(VoiceStyle::parse("Shout"), VoiceStyle::Shout);
    assert_eq!(VoiceStyle::parse("cheerful"), VoiceStyle::Cheerful);
}

#[test]
fn every_style_has_distinct_phrasing() {
    let prompts: std::collections::HashSet<String> = VoiceStyle::ALL
        .iter()
        .map(|s| speech_prompt("x", *s))
        .collect();
    assert_eq!(prompts.len(), VoiceStyle::ALL.len());
    assert!(speech_prompt("  Glow all day. ", VoiceStyle::Calm).ends_with("Glow all day."));
}

#[test]
fn gender_maps_to_fixed_voices() {
    assert_eq!(VoiceGender::parse("male").voice_name(), "Charon");
    assert_eq!(VoiceGender::parse("anything").voice_name(), "Kore");
}

#[test]
fn pcm_rate_is_read_from_mime_parameters() {
    assert_eq!(pcm_rate_from_mime("audio/L16;codec=pcm;rate=16000"), 16_000);
    assert_eq!(pcm_rate_from_mime("audio/L16"), 24_000);
    assert_eq!(pcm_rate_from_mime("audio/L16; rate=abc"), 24_000);
}

#[test]
fn pcm16_is_wrapped_in_a_readable_wav() {
    let pcm: Vec<u8> = [0i16, 1000, -1000, i16::MAX]
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .collect();
    let wav = pcm16_to_wav(&pcm, 24_000, 1).unwrap();
    let reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
    assert_eq!(reader.spec().sample_rate, 24_000);
    assert_eq!(reader.spec().channels, 1);
    let samples: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
    assert_eq!(samples, vec![0, 1000, -1000, i16::MAX]);

    assert!(pcm16_to_wav(&[1, 2, 3], 24_000, 1).is_err());
}
