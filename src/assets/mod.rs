/// Media asset references produced by the gateway and consumed by the studio and compositor.
pub mod asset;
/// `ffprobe`/`ffmpeg` helpers for probing video and decoding audio.
pub mod media;
