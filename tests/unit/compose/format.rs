use super::*;

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn choose_prefers_mp4_when_everything_is_available() {
    let supported = set(&["libx264", "aac", "libvpx-vp9", "libopus"]);
    assert_eq!(
        choose(&DEFAULT_PREFERENCE, &supported),
        Some(OutputFormat::Mp4H264Aac)
    );
}

#[test]
fn choose_falls_back_to_open_container() {
    let supported = set(&["aac", "libvpx-vp9", "libopus"]);
    assert_eq!(
        choose(&DEFAULT_PREFERENCE, &supported),
        Some(OutputFormat::WebmVp9Opus)
    );
    let supported = set(&["libvpx", "libvorbis"]);
    assert_eq!(
        choose(&DEFAULT_PREFERENCE, &supported),
        Some(OutputFormat::WebmVp8Vorbis)
    );
}

#[test]
fn choose_requires_both_codecs() {
    assert_eq!(choose(&DEFAULT_PREFERENCE, &set(&["libx264"])), None);
    assert_eq!(choose(&DEFAULT_PREFERENCE, &BTreeSet::new()), None);
}

#[test]
fn choose_honors_custom_preference_order() {
    let supported = set(&["libx264", "aac", "libvpx", "libvorbis"]);
    let pref = [OutputFormat::WebmVp8Vorbis, OutputFormat::Mp4H264Aac];
    assert_eq!(choose(&pref, &supported), Some(OutputFormat::WebmVp8Vorbis));
}

#[test]
fn parse_encoder_list_skips_header_and_keeps_names() {
    let text = "\
Encoders:
 V..... = Video
 A..... = Audio
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC
 V....D libvpx-vp9           libvpx VP9 (codec vp9)
 A....D aac                  AAC (Advanced Audio Coding)
 A....D libopus              libopus Opus
";
    let parsed = parse_encoder_list(text);
    assert_eq!(parsed, set(&["aac", "libopus", "libvpx-vp9", "libx264"]));
}

#[test]
fn extension_and_content_type_agree() {
    for f in DEFAULT_PREFERENCE {
        assert!(f.content_type().ends_with(f.extension()));
    }
}
