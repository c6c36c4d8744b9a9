//! Two-part head deformation ("cut-out" style): the top half lifts and tilts while the bottom
//! half drops, driven by visemes or by amplitude buckets.

use crate::audio::event::{AudioEvent, EnergyLevel, Viseme};
use crate::foundation::rng::RandomSource;
use crate::keyframes::{DeformState, Keyframe, KeyframeTrack, VisualState};

/// Keyframes land this long after their event starts.
pub const LEAD_SECS: f64 = 0.1;
pub const EXAGGERATION: f64 = 2.5;
pub const TOP_LIFT_PX: i32 = 60;
pub const BOTTOM_LIFT_PX: i32 = 40;
pub const LATERAL_BIAS_PX: i32 = 25;
/// Upper bound on how long a wide shape holds before snapping closed.
pub const MAX_CLOSE_DELAY_SECS: f64 = 0.4;
pub const CLOSE_DELAY_FRACTION: f64 = 0.8;
/// Assumed spacing after the last event when placing its snap-close.
pub const LAST_EVENT_SPAN_SECS: f64 = 0.2;

/// Amplitude variant: emit every Nth non-silent detection.
pub const RATE_LIMIT_EVERY: u32 = 2;
pub const RATE_LIMIT_MIN_INTERVAL_SECS: f64 = 0.1;
/// Amplitude variant: gaps longer than this close an open mouth.
pub const CLOSE_GAP_SECS: f64 = 0.3;

/// Per-shape base offsets before exaggeration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouthOffsets {
    pub top_y: i32,
    pub top_x: i32,
    pub bottom_y: i32,
    pub tilt_deg: f64,
}

pub fn mouth_offsets(v: Viseme) -> MouthOffsets {
    let (top_y, top_x, bottom_y, tilt_deg) = match v {
        Viseme::A | Viseme::X => (0, 0, 0, 0.0),
        Viseme::B => (-15, 5, 5, -3.0),
        Viseme::C => (-35, 10, 10, -5.0),
        Viseme::D => (-60, 15, 15, -8.0),
        Viseme::E => (-30, 8, 8, -4.0),
        Viseme::F => (-20, 6, 6, -3.0),
        Viseme::G => (-25, 7, 7, -4.0),
        Viseme::H => (-40, 12, 12, -6.0),
    };
    MouthOffsets {
        top_y,
        top_x,
        bottom_y,
        tilt_deg,
    }
}

fn exaggerate(px: i32) -> i32 {
    (f64::from(px) * EXAGGERATION) as i32
}

/// Exaggerated, lifted pose for a shape, without lateral bias or jitter.
pub fn open_pose(v: Viseme) -> DeformState {
    let o = mouth_offsets(v);
    DeformState {
        top_x: exaggerate(o.top_x),
        top_y: exaggerate(o.top_y) - TOP_LIFT_PX,
        bottom_x: 0,
        bottom_y: exaggerate(o.bottom_y) - BOTTOM_LIFT_PX,
        tilt_deg: o.tilt_deg,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lateral {
    Left,
    Center,
    Right,
}

impl Lateral {
    fn nth(i: usize) -> Self {
        match i % 3 {
            0 => Self::Left,
            1 => Self::Center,
            _ => Self::Right,
        }
    }

    fn bias(self) -> i32 {
        match self {
            Self::Left => -LATERAL_BIAS_PX,
            Self::Center => 0,
            Self::Right => LATERAL_BIAS_PX,
        }
    }
}

/// Viseme-driven deformation with lateral cycling, jitter and snap-closes after wide shapes.
pub fn synthesize_visemes(events: &[AudioEvent], rng: &mut dyn RandomSource) -> KeyframeTrack {
    let mut track = KeyframeTrack::new();

    for (i, ev) in events.iter().enumerate() {
        let v = ev.value.viseme();
        let t = ev.start + LEAD_SECS;
        let bias = Lateral::nth(i).bias();

        let mut pose = open_pose(v);
        pose.top_x += bias;
        pose.bottom_x += bias;
        pose.tilt_deg += f64::from(rng.range_i32(-5, 5));
        pose.top_y += rng.range_i32(-3, 3);
        pose.top_x += rng.range_i32(-2, 2);
        track.push(Keyframe::new(t, VisualState::Deform(pose)));

        if v.is_wide() {
            let next = events.get(i + 1).map_or(t + LAST_EVENT_SPAN_SECS, |e| e.start);
            let close_at = t + MAX_CLOSE_DELAY_SECS.min(CLOSE_DELAY_FRACTION * (next - t));
            let close = DeformState {
                top_y: rng.range_i32(-5, 5),
                top_x: rng.range_i32(0, 2),
                bottom_x: 0,
                bottom_y: rng.range_i32(0, 2),
                tilt_deg: f64::from(rng.range_i32(-10, 10)),
            };
            track.push(Keyframe::new(close_at, VisualState::Deform(close)));
        }
    }
    track
}

fn bucket_pose(level: EnergyLevel) -> DeformState {
    match level {
        EnergyLevel::Silent => DeformState::REST,
        other => open_pose(other.viseme()),
    }
}

/// Amplitude-driven deformation with rate limiting and forced closes across long gaps.
///
/// Silent events always produce a rest keyframe; they are never rate limited.
pub fn synthesize_amplitude(events: &[AudioEvent]) -> KeyframeTrack {
    let mut track = KeyframeTrack::new();
    let mut detections = 0u32;
    let mut last_open_at: Option<f64> = None;
    let mut mouth_open = false;

    for (i, ev) in events.iter().enumerate() {
        let level = ev.value.level();
        if level == EnergyLevel::Silent {
            track.push(Keyframe::new(ev.start, VisualState::Deform(DeformState::REST)));
            mouth_open = false;
        } else {
            detections += 1;
            let nth_ok = (detections - 1) % RATE_LIMIT_EVERY == 0;
            let spaced_ok = last_open_at
                .is_none_or(|prev| ev.start - prev >= RATE_LIMIT_MIN_INTERVAL_SECS);
            if nth_ok && spaced_ok {
                track.push(Keyframe::new(ev.start, VisualState::Deform(bucket_pose(level))));
                last_open_at = Some(ev.start);
                mouth_open = true;
            }
        }

        if let Some(next) = events.get(i + 1)
            && mouth_open
            && next.start - ev.end() > CLOSE_GAP_SECS
        {
            track.push(Keyframe::new(ev.end(), VisualState::Deform(DeformState::REST)));
            mouth_open = false;
        }
    }
    track
}

#[cfg(test)]
#[path = "../../tests/unit/keyframes/deform.rs"]
mod tests;
