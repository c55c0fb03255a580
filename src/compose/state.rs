//! Compositor state machine.
//!
//! The three activity chains of a composition (narration master clock, clip playback chain,
//! render/capture loop) only talk to each other through [`ComposeEvent`]s. All freeze-frame and
//! termination rules live here so they can be tested without decoding any media.

use crate::foundation::error::{AdreelError, AdreelResult};

/// Why a composition attempt produced no output.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ComposeFailure {
    /// The platform cannot encode any format in the preference list.
    #[error("no supported output container/codec is available")]
    UnsupportedFormat,
    /// The clip sequence was empty.
    #[error("no clips to compose")]
    NoClips,
    /// The narration decoded to zero samples.
    #[error("narration track is empty")]
    EmptyNarration,
    /// A clip could not be loaded or decoded.
    #[error("clip {index} failed to decode: {message}")]
    ClipDecode {
        /// 0-based position in the clip sequence.
        index: usize,
        /// Decoder diagnostics.
        message: String,
    },
    /// The recorder reported an internal fault.
    #[error("recorder fault: {0}")]
    RecorderFault(String),
    /// The recorder stopped cleanly but captured nothing.
    #[error("recorder stopped without capturing any data")]
    EmptyOutput,
}

/// Lifecycle of one composition attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComposeState {
    /// Nothing has happened yet.
    Idle,
    /// Clips are being loaded.
    Decoding,
    /// Recording while `active_clip` plays.
    Recording {
        /// Index of the clip currently feeding the frame buffer.
        active_clip: usize,
    },
    /// Every clip has ended; the last clip's final frame is redrawn until the narration ends.
    Frozen,
    /// Narration ended; waiting for the recorder to hand over its data.
    Finalizing,
    /// Terminal failure.
    Failed(ComposeFailure),
    /// Terminal success.
    Done,
}

/// Discrete events driving [`CompositorMachine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComposeEvent {
    /// Composition requested.
    Start,
    /// Every clip loaded successfully; recording and playback begin.
    Loaded,
    /// The active clip reached its natural end.
    ClipEnded,
    /// The narration (master clock) reached its natural end.
    AudioEnded,
    /// A clip failed to load or decode.
    DecodeFailed {
        /// 0-based clip index.
        index: usize,
        /// Decoder diagnostics.
        message: String,
    },
    /// The recorder reported a fault.
    RecorderFault(String),
    /// The recorder delivered a data chunk of the given byte length.
    ChunkReceived(usize),
    /// The recorder finished delivering data.
    RecorderStopped,
}

/// Explicit compositor state machine over [`ComposeState`].
#[derive(Clone, Debug)]
pub struct CompositorMachine {
    clip_count: usize,
    state: ComposeState,
    chunks: usize,
    bytes: u64,
}

impl CompositorMachine {
    /// Create a machine for a sequence of `clip_count` clips.
    pub fn new(clip_count: usize) -> AdreelResult<Self> {
        if clip_count == 0 {
            return Err(ComposeFailure::NoClips.into());
        }
        Ok(Self {
            clip_count,
            state: ComposeState::Idle,
            chunks: 0,
            bytes: 0,
        })
    }

    /// Current state.
    pub fn state(&self) -> &ComposeState {
        &self.state
    }

    /// Number of clips in the sequence.
    pub fn clip_count(&self) -> usize {
        self.clip_count
    }

    /// Clip whose frame is currently shown: the playing clip, or the last one once frozen.
    pub fn visible_clip(&self) -> Option<usize> {
        match self.state {
            ComposeState::Recording { active_clip } => Some(active_clip),
            ComposeState::Frozen | ComposeState::Finalizing | ComposeState::Done => {
                Some(self.clip_count - 1)
            }
            _ => None,
        }
    }

    /// `true` once in `Done` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ComposeState::Done | ComposeState::Failed(_))
    }

    /// Failure reason, if the machine failed.
    pub fn failure(&self) -> Option<&ComposeFailure> {
        match &self.state {
            ComposeState::Failed(f) => Some(f),
            _ => None,
        }
    }

    /// Non-empty chunks received so far.
    pub fn chunks_received(&self) -> usize {
        self.chunks
    }

    /// Total bytes received so far.
    pub fn bytes_received(&self) -> u64 {
        self.bytes
    }

    /// Apply one event and return the resulting state.
    pub fn handle(&mut self, event: ComposeEvent) -> AdreelResult<&ComposeState> {
        if self.is_terminal() {
            return Err(AdreelError::validation(format!(
                "compositor already finished ({:?}); rejected {event:?}",
                self.state
            )));
        }

        let next = match (&self.state, event) {
            (ComposeState::Idle, ComposeEvent::Start) => ComposeState::Decoding,
            (ComposeState::Decoding, ComposeEvent::Loaded) => {
                ComposeState::Recording { active_clip: 0 }
            }
            (
                ComposeState::Decoding | ComposeState::Recording { .. },
                ComposeEvent::DecodeFailed { index, message },
            ) => ComposeState::Failed(ComposeFailure::ClipDecode { index, message }),
            (ComposeState::Recording { active_clip }, ComposeEvent::ClipEnded) => {
                let next = active_clip + 1;
                if next < self.clip_count {
                    ComposeState::Recording { active_clip: next }
                } else {
                    ComposeState::Frozen
                }
            }
            (ComposeState::Recording { .. } | ComposeState::Frozen, ComposeEvent::AudioEnded) => {
                ComposeState::Finalizing
            }
            (
                ComposeState::Recording { .. } | ComposeState::Frozen | ComposeState::Finalizing,
                ComposeEvent::ChunkReceived(len),
            ) => {
                if len > 0 {
                    self.chunks += 1;
                    self.bytes += len as u64;
                }
                self.state.clone()
            }
            (ComposeState::Finalizing, ComposeEvent::RecorderStopped) => {
                if self.chunks == 0 {
                    ComposeState::Failed(ComposeFailure::EmptyOutput)
                } else {
                    ComposeState::Done
                }
            }
            (_, ComposeEvent::RecorderFault(msg)) => {
                ComposeState::Failed(ComposeFailure::RecorderFault(msg))
            }
            (state, event) => {
                return Err(AdreelError::validation(format!(
                    "illegal compositor transition: {event:?} in {state:?}"
                )));
            }
        };
        self.state = next;
        Ok(&self.state)
    }
}

/// What the frame buffer shows at one output frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameSource {
    /// Frame `frame` of clip `clip`, played normally.
    Clip {
        /// 0-based clip index.
        clip: usize,
        /// 0-based frame within the clip.
        frame: u64,
    },
    /// The last frame of clip `clip` held after every clip has ended.
    Freeze {
        /// 0-based clip index (always the last clip).
        clip: usize,
        /// The held frame within the clip.
        frame: u64,
    },
}

/// A run of consecutive output frames with the same source kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimelineSegment {
    /// Clip index the segment draws from.
    pub clip: usize,
    /// `true` when the segment is a freeze-frame.
    pub frozen: bool,
    /// First output frame (inclusive).
    pub start_frame: u64,
    /// Last output frame (exclusive).
    pub end_frame: u64,
}

/// Plan which source every output frame shows, given per-clip frame counts and the narration
/// length in frames.
///
/// Runs the same [`CompositorMachine`] as the real render loop, with clip-ended and audio-ended
/// events derived from frame counts. Clips with zero frames are rejected the way the render loop
/// rejects a clip that yields nothing.
pub fn plan_timeline(clip_frames: &[u64], total_frames: u64) -> AdreelResult<Vec<FrameSource>> {
    let mut machine = CompositorMachine::new(clip_frames.len())?;
    if total_frames == 0 {
        return Err(ComposeFailure::EmptyNarration.into());
    }
    if let Some(index) = clip_frames.iter().position(|&n| n == 0) {
        return Err(ComposeFailure::ClipDecode {
            index,
            message: "clip has no frames".to_string(),
        }
        .into());
    }

    machine.handle(ComposeEvent::Start)?;
    machine.handle(ComposeEvent::Loaded)?;

    let mut out = Vec::with_capacity(total_frames as usize);
    let mut clip_pos = 0u64;
    for n in 0..total_frames {
        if let ComposeState::Recording { active_clip } = *machine.state()
            && clip_pos == clip_frames[active_clip]
        {
            machine.handle(ComposeEvent::ClipEnded)?;
            clip_pos = 0;
        }

        let src = match *machine.state() {
            ComposeState::Recording { active_clip } => {
                let f = FrameSource::Clip {
                    clip: active_clip,
                    frame: clip_pos,
                };
                clip_pos += 1;
                f
            }
            _ => {
                let last = clip_frames.len() - 1;
                FrameSource::Freeze {
                    clip: last,
                    frame: clip_frames[last] - 1,
                }
            }
        };
        out.push(src);

        if n + 1 == total_frames {
            machine.handle(ComposeEvent::AudioEnded)?;
        }
    }
    Ok(out)
}

/// Collapse a per-frame plan into contiguous segments.
pub fn summarize_timeline(plan: &[FrameSource]) -> Vec<TimelineSegment> {
    let mut out: Vec<TimelineSegment> = Vec::new();
    for (n, src) in plan.iter().enumerate() {
        let (clip, frozen) = match *src {
            FrameSource::Clip { clip, .. } => (clip, false),
            FrameSource::Freeze { clip, .. } => (clip, true),
        };
        let n = n as u64;
        match out.last_mut() {
            Some(seg) if seg.clip == clip && seg.frozen == frozen && seg.end_frame == n => {
                seg.end_frame = n + 1;
            }
            _ => out.push(TimelineSegment {
                clip,
                frozen,
                start_frame: n,
                end_frame: n + 1,
            }),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/compose/state.rs"]
mod tests;
