use super::*;

fn recording(machine: &CompositorMachine) -> Option<usize> {
    match machine.state() {
        ComposeState::Recording { active_clip } => Some(*active_clip),
        _ => None,
    }
}

#[test]
fn empty_sequence_is_rejected() {
    let err = CompositorMachine::new(0).unwrap_err();
    assert_eq!(err.compose_failure(), Some(&ComposeFailure::NoClips));
}

#[test]
fn clips_advance_in_order_then_freeze() {
    let mut m = CompositorMachine::new(3).unwrap();
    m.handle(ComposeEvent::Start).unwrap();
    assert_eq!(m.state(), &ComposeState::Decoding);
    m.handle(ComposeEvent::Loaded).unwrap();
    assert_eq!(recording(&m), Some(0));
    m.handle(ComposeEvent::ClipEnded).unwrap();
    assert_eq!(recording(&m), Some(1));
    m.handle(ComposeEvent::ClipEnded).unwrap();
    assert_eq!(recording(&m), Some(2));
    m.handle(ComposeEvent::ClipEnded).unwrap();
    assert_eq!(m.state(), &ComposeState::Frozen);
    assert_eq!(m.visible_clip(), Some(2));
}

#[test]
fn clip_end_after_freeze_is_illegal() {
    let mut m = CompositorMachine::new(1).unwrap();
    m.handle(ComposeEvent::Start).unwrap();
    m.handle(ComposeEvent::Loaded).unwrap();
    m.handle(ComposeEvent::ClipEnded).unwrap();
    assert!(m.handle(ComposeEvent::ClipEnded).is_err());
    assert_eq!(m.state(), &ComposeState::Frozen);
}

#[test]
fn only_audio_end_finalizes() {
    let mut m = CompositorMachine::new(2).unwrap();
    m.handle(ComposeEvent::Start).unwrap();
    m.handle(ComposeEvent::Loaded).unwrap();
    // Audio shorter than the first clip: recording stops mid-clip.
    m.handle(ComposeEvent::AudioEnded).unwrap();
    assert_eq!(m.state(), &ComposeState::Finalizing);
    // Clip playback events no longer apply.
    assert!(m.handle(ComposeEvent::ClipEnded).is_err());
}

#[test]
fn stop_without_chunks_fails_with_empty_output() {
    let mut m = CompositorMachine::new(1).unwrap();
    m.handle(ComposeEvent::Start).unwrap();
    m.handle(ComposeEvent::Loaded).unwrap();
    m.handle(ComposeEvent::AudioEnded).unwrap();
    m.handle(ComposeEvent::ChunkReceived(0)).unwrap();
    m.handle(ComposeEvent::RecorderStopped).unwrap();
    assert_eq!(m.failure(), Some(&ComposeFailure::EmptyOutput));
    assert!(m.is_terminal());
}

#[test]
fn stop_with_chunks_is_done() {
    let mut m = CompositorMachine::new(1).unwrap();
    m.handle(ComposeEvent::Start).unwrap();
    m.handle(ComposeEvent::Loaded).unwrap();
    m.handle(ComposeEvent::ChunkReceived(10)).unwrap();
    m.handle(ComposeEvent::AudioEnded).unwrap();
    m.handle(ComposeEvent::ChunkReceived(5)).unwrap();
    m.handle(ComposeEvent::RecorderStopped).unwrap();
    assert_eq!(m.state(), &ComposeState::Done);
    assert_eq!(m.chunks_received(), 2);
    assert_eq!(m.bytes_received(), 15);
}

#[test]
fn faults_are_terminal_and_reject_further_events() {
    let mut m = CompositorMachine::new(3).unwrap();
    m.handle(ComposeEvent::Start).unwrap();
    m.handle(ComposeEvent::Loaded).unwrap();
    m.handle(ComposeEvent::RecorderFault("pipe closed".into()))
        .unwrap();
    assert_eq!(
        m.failure(),
        Some(&ComposeFailure::RecorderFault("pipe closed".into()))
    );
    assert!(m.handle(ComposeEvent::AudioEnded).is_err());
}

#[test]
fn decode_failure_during_load_is_terminal() {
    let mut m = CompositorMachine::new(3).unwrap();
    m.handle(ComposeEvent::Start).unwrap();
    m.handle(ComposeEvent::DecodeFailed {
        index: 1,
        message: "bad header".into(),
    })
    .unwrap();
    assert!(matches!(
        m.failure(),
        Some(ComposeFailure::ClipDecode { index: 1, .. })
    ));
}

#[test]
fn plan_matches_two_three_four_seconds_under_six_second_narration() {
    let fps = 30u64;
    let plan = plan_timeline(&[2 * fps, 3 * fps, 4 * fps], 6 * fps).unwrap();
    assert_eq!(plan.len() as u64, 6 * fps);
    // t = 1.5 s
    assert_eq!(plan[45], FrameSource::Clip { clip: 0, frame: 45 });
    // t = 4 s: clip 2 started at 2 s.
    assert_eq!(plan[120], FrameSource::Clip { clip: 1, frame: 60 });
    // t = 5.5 s: clip 3 started at 5 s.
    assert_eq!(plan[165], FrameSource::Clip { clip: 2, frame: 15 });
    assert!(plan.iter().all(|s| matches!(s, FrameSource::Clip { .. })));
}

#[test]
fn plan_freezes_last_clip_when_narration_is_longer() {
    let fps = 30u64;
    let plan = plan_timeline(&[2 * fps, 3 * fps, 4 * fps], 12 * fps).unwrap();
    assert_eq!(plan.len() as u64, 12 * fps);
    assert_eq!(plan[269], FrameSource::Clip { clip: 2, frame: 119 });
    for src in &plan[270..] {
        assert_eq!(*src, FrameSource::Freeze { clip: 2, frame: 119 });
    }

    let segments = summarize_timeline(&plan);
    assert_eq!(segments.len(), 4);
    assert_eq!(
        segments[3],
        TimelineSegment {
            clip: 2,
            frozen: true,
            start_frame: 270,
            end_frame: 360,
        }
    );
}

#[test]
fn plan_truncates_when_narration_is_shorter() {
    let plan = plan_timeline(&[30, 30, 30], 40).unwrap();
    assert_eq!(plan.len(), 40);
    assert_eq!(plan[39], FrameSource::Clip { clip: 1, frame: 9 });
}

#[test]
fn plan_tolerates_more_or_fewer_than_three_clips() {
    let plan = plan_timeline(&[10], 15).unwrap();
    assert_eq!(plan[14], FrameSource::Freeze { clip: 0, frame: 9 });

    let plan = plan_timeline(&[5, 5, 5, 5, 5], 25).unwrap();
    assert_eq!(plan[24], FrameSource::Clip { clip: 4, frame: 4 });
}

#[test]
fn plan_rejects_empty_inputs() {
    assert!(plan_timeline(&[], 10).is_err());
    let err = plan_timeline(&[10], 0).unwrap_err();
    assert_eq!(err.compose_failure(), Some(&ComposeFailure::EmptyNarration));
    let err = plan_timeline(&[10, 0], 10).unwrap_err();
    assert!(matches!(
        err.compose_failure(),
        Some(ComposeFailure::ClipDecode { index: 1, .. })
    ));
}
