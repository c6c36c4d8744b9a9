//! Keyframe synthesis: audio events to held visual states, one synthesizer per style.
//!
//! Keyframes are a step function. A state holds until the next keyframe; nothing is
//! interpolated.

pub mod deform;
pub mod jaw;
pub mod sprite;

use crate::assets::sprites::MouthSprite;
use crate::audio::event::Viseme;

/// Offsets of the two head halves in canvas pixels, plus the top half's tilt in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeformState {
    pub top_x: i32,
    pub top_y: i32,
    pub bottom_x: i32,
    pub bottom_y: i32,
    pub tilt_deg: f64,
}

impl DeformState {
    pub const REST: DeformState = DeformState {
        top_x: 0,
        top_y: 0,
        bottom_x: 0,
        bottom_y: 0,
        tilt_deg: 0.0,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpriteState {
    pub viseme: Viseme,
    pub sprite: MouthSprite,
    pub start_frame: u64,
    pub duration_frames: u64,
    pub duration_secs: f64,
}

impl SpriteState {
    pub fn end_frame(&self) -> u64 {
        self.start_frame + self.duration_frames
    }

    pub fn covers(&self, frame: u64) -> bool {
        (self.start_frame..self.end_frame()).contains(&frame)
    }
}

/// Downward jaw displacement in unscaled image pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JawState {
    pub offset_px: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisualState {
    Deform(DeformState),
    Sprite(SpriteState),
    Jaw(JawState),
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Seconds from the start of the audio.
    pub time: f64,
    pub state: VisualState,
}

impl Keyframe {
    pub fn new(time: f64, state: VisualState) -> Self {
        Self { time, state }
    }
}

/// Keyframes ordered by `(time, insertion order)`.
///
/// At equal times the later-inserted keyframe wins when sampling.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct KeyframeTrack {
    keys: Vec<Keyframe>,
}

impl KeyframeTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from keyframes in insertion order.
    pub fn from_keyframes(mut keys: Vec<Keyframe>) -> Self {
        // Stable: equal times keep their insertion order.
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    pub fn push(&mut self, key: Keyframe) {
        let at = self.keys.partition_point(|k| k.time <= key.time);
        self.keys.insert(at, key);
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.keys.last().map(|k| k.time)
    }

    /// The last keyframe with `time <= t`, or `None` before the first one.
    pub fn active_at(&self, t: f64) -> Option<&Keyframe> {
        let n = self.keys.partition_point(|k| k.time <= t);
        n.checked_sub(1).map(|i| &self.keys[i])
    }

    /// The last sprite keyframe whose frame window contains `frame`.
    pub fn sprite_at_frame(&self, frame: u64) -> Option<&SpriteState> {
        self.keys.iter().rev().find_map(|k| match &k.state {
            VisualState::Sprite(s) if s.covers(frame) => Some(s),
            _ => None,
        })
    }

    /// Latest `start + duration` over sprite keyframes.
    pub fn sprite_end_secs(&self) -> Option<f64> {
        self.keys
            .iter()
            .filter_map(|k| match &k.state {
                VisualState::Sprite(s) => Some(k.time + s.duration_secs),
                _ => None,
            })
            .reduce(f64::max)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/keyframes/track.rs"]
mod tests;
