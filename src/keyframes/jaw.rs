use crate::audio::event::{AudioEvent, EnergyLevel};
use crate::keyframes::{JawState, Keyframe, KeyframeTrack, VisualState};

pub const OVERSHOOT_ENERGY: f32 = 0.8;
pub const OVERSHOOT_FACTOR: f64 = 1.25;
/// Time from event start until the jaw reaches its target after an overshoot.
pub const OVERSHOOT_SETTLE_SECS: f64 = 0.06;
/// Fraction of an event after which an open jaw returns to closed.
pub const RETURN_FRACTION: f64 = 0.7;

/// Jaw drop for an energy bucket, as a fraction of the jaw height.
pub fn drop_fraction(level: EnergyLevel) -> f64 {
    match level {
        EnergyLevel::Silent => 0.0,
        EnergyLevel::Small => 0.25,
        EnergyLevel::Medium => 0.5,
        EnergyLevel::Wide => 0.8,
    }
}

/// Gap below which two events count as touching when merging runs.
const RUN_GAP_SECS: f64 = 1e-6;

fn jaw_key(t: f64, offset_px: f64) -> Keyframe {
    Keyframe::new(t, VisualState::Jaw(JawState { offset_px }))
}

/// Consecutive touching events in one energy bucket, merged into a single span.
#[derive(Clone, Copy, Debug, PartialEq)]
struct LevelRun {
    start: f64,
    end: f64,
    level: EnergyLevel,
    peak: f32,
}

/// Collapse the 20 ms amplitude envelope into runs, so a steady level moves the jaw once.
fn level_runs(events: &[AudioEvent]) -> Vec<LevelRun> {
    let mut runs: Vec<LevelRun> = Vec::new();
    for ev in events {
        let level = ev.value.level();
        let energy = ev.value.energy();
        if let Some(run) = runs.last_mut()
            && run.level == level
            && ev.start - run.end <= RUN_GAP_SECS
        {
            run.end = run.end.max(ev.end());
            run.peak = run.peak.max(energy);
            continue;
        }
        runs.push(LevelRun {
            start: ev.start,
            end: ev.end(),
            level,
            peak: energy,
        });
    }
    runs
}

/// Sliding-jaw keyframes for a jaw cutout `jaw_height` pixels tall.
///
/// Touching events in the same bucket are merged first. Loud onsets from a closed mouth
/// overshoot before settling; every open pose is followed by a return to closed at 70% of its
/// run, provided that comes after the pose itself.
pub fn synthesize(events: &[AudioEvent], jaw_height: u32) -> KeyframeTrack {
    let h = f64::from(jaw_height);
    let mut track = KeyframeTrack::new();
    let mut prev = EnergyLevel::Silent;

    for run in level_runs(events) {
        let target = drop_fraction(run.level) * h;

        let settled_at = if run.peak >= OVERSHOOT_ENERGY && prev == EnergyLevel::Silent {
            track.push(jaw_key(
                run.start + 0.5 * OVERSHOOT_SETTLE_SECS,
                target * OVERSHOOT_FACTOR,
            ));
            run.start + OVERSHOOT_SETTLE_SECS
        } else {
            run.start
        };
        track.push(jaw_key(settled_at, target));

        let return_at = run.start + RETURN_FRACTION * (run.end - run.start);
        if target > 0.0 && return_at > settled_at {
            track.push(jaw_key(return_at, 0.0));
        }
        prev = run.level;
    }
    track
}
