use super::*;
use crate::compose::format::OutputFormat;
use crate::studio::wizard::Stage;

fn finishing_studio() -> Studio {
    let img = |t: &str| MediaAsset::inline("image/png", t.as_bytes().to_vec());
    let mut s = Studio::new();
    s.set_product(ProductInfo {
        image: img("p"),
        name: "Mug".into(),
        description: "Ceramic mug".into(),
    })
    .unwrap();
    s.advance().unwrap();
    s.set_model(None, img("m")).unwrap();
    s.advance().unwrap();
    s.set_script("Sip.".into()).unwrap();
    s.set_narration(MediaAsset::inline("audio/wav", vec![1])).unwrap();
    s.advance().unwrap();
    s.set_scene_images(vec![img("a"), img("b"), img("c")]).unwrap();
    for i in 0..3 {
        s.set_scene_clip(i, MediaAsset::inline("video/mp4", vec![i as u8 + 1]))
            .unwrap();
    }
    s.advance().unwrap();
    assert_eq!(s.stage(), Stage::Finishing);
    s
}

fn fake_video() -> ComposedVideo {
    ComposedVideo {
        bytes: vec![0, 0, 0, 1],
        format: OutputFormat::Mp4H264Aac,
        frames: 3,
        duration_secs: 0.1,
    }
}

#[test]
fn composition_runs_once() {
    let mut s = finishing_studio();
    let mut calls = 0;
    let out = run_composition(&mut s, |job| {
        calls += 1;
        assert_eq!(job.clips.as_slice().len(), 3);
        Ok(fake_video())
    })
    .unwrap();
    assert!(out.is_some());
    assert_eq!(s.composed().unwrap().content_type(), "video/mp4");

    let again = run_composition(&mut s, |_| {
        calls += 1;
        Ok(fake_video())
    })
    .unwrap();
    assert!(again.is_none());
    assert_eq!(calls, 1);
}

#[test]
fn composition_failure_leaves_no_output() {
    let mut s = finishing_studio();
    let err = run_composition(&mut s, |_| {
        Err(crate::compose::state::ComposeFailure::EmptyOutput.into())
    })
    .unwrap_err();
    assert!(matches!(err, AdreelError::Compose(_)));
    assert!(s.composed().is_none());
}
