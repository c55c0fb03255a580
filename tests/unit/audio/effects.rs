use super::*;

fn mono(samples: Vec<f32>) -> AudioPcm {
    AudioPcm {
        sample_rate: 1000,
        channels: 1,
        interleaved_f32: samples,
    }
}

#[test]
fn slower_rate_lengthens_audio() {
    let pcm = mono(vec![0.5; 920]);
    let out = change_playback_rate(&pcm, 0.92).unwrap();
    assert!((1000..=1001).contains(&out.sample_frames()));
    assert_eq!(out.sample_rate, 1000);
    assert!(out.interleaved_f32.iter().all(|s| (s - 0.5).abs() < 1e-6));
}

#[test]
fn rate_interpolates_linearly_per_channel() {
    let pcm = AudioPcm {
        sample_rate: 10,
        channels: 2,
        interleaved_f32: vec![0.0, 1.0, 1.0, 0.0],
    };
    let out = change_playback_rate(&pcm, 0.5).unwrap();
    assert_eq!(out.sample_frames(), 4);
    assert_eq!(&out.interleaved_f32[..4], &[0.0, 1.0, 0.5, 0.5]);
    assert_eq!(&out.interleaved_f32[4..6], &[1.0, 0.0]);
}

#[test]
fn invalid_rate_is_rejected() {
    let pcm = mono(vec![0.1; 4]);
    assert!(change_playback_rate(&pcm, 0.0).is_err());
    assert!(change_playback_rate(&pcm, f64::NAN).is_err());
}

#[test]
fn gain_in_db_scales_linearly() {
    let mut s = vec![0.1f32, -0.1];
    apply_gain_db(&mut s, 20.0);
    assert!((s[0] - 1.0).abs() < 1e-5);
    assert!((s[1] + 1.0).abs() < 1e-5);
    assert!((db_to_gain(-6.0) - 0.501_187).abs() < 1e-4);
}

#[test]
fn clamp_limits_range() {
    let mut s = vec![1.5f32, -2.0, 0.25];
    clamp(&mut s);
    assert_eq!(s, vec![1.0, -1.0, 0.25]);
}

#[test]
fn compressor_leaves_quiet_signal_alone() {
    // -40 dBFS is below the -24 dBFS threshold.
    let mut pcm = mono(vec![0.01; 2000]);
    compress(&mut pcm, CompressorSettings::WHISPER);
    assert!(pcm.interleaved_f32.iter().all(|s| (s - 0.01).abs() < 1e-7));
}

#[test]
fn compressor_reduces_loud_steady_signal() {
    // 0 dBFS steady state: 24 dB over, 4:1 removes 18 dB.
    let mut pcm = mono(vec![1.0; 2000]);
    compress(&mut pcm, CompressorSettings::WHISPER);
    let last = *pcm.interleaved_f32.last().unwrap();
    assert!((last - db_to_gain(-18.0)).abs() < 1e-3, "got {last}");
}
