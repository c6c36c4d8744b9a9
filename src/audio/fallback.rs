use crate::audio::event::{AudioEvent, Viseme, sort_events};
use crate::audio::pcm::{MonoPcm, dbfs};
use crate::foundation::rng::RandomSource;

pub const WINDOW_SECS: f64 = 0.08;
pub const JITTER_SECS: f64 = 0.02;

/// Loudness category of one analysis window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Loudness {
    Silence,
    Soft,
    Medium,
    Loud,
}

impl Loudness {
    pub fn from_dbfs(db: f64) -> Self {
        if db < -35.0 {
            Self::Silence
        } else if db < -25.0 {
            Self::Soft
        } else if db < -15.0 {
            Self::Medium
        } else {
            Self::Loud
        }
    }

    pub fn candidates(self) -> &'static [Viseme] {
        match self {
            Self::Silence => &[Viseme::X],
            Self::Soft => &[Viseme::A, Viseme::B],
            Self::Medium => &[Viseme::C, Viseme::E, Viseme::G],
            Self::Loud => &[Viseme::D, Viseme::F, Viseme::H],
        }
    }
}

/// Loudness-driven viseme stream used when the recognizer is unavailable.
///
/// Each 80 ms window picks a shape from its loudness category, avoiding the previous shape when
/// the category offers an alternative. Start and duration are jittered by up to 20 ms.
pub fn generate(pcm: &MonoPcm, rng: &mut dyn RandomSource) -> Vec<AudioEvent> {
    let total = pcm.duration_secs();
    let mut events = Vec::new();
    let mut prev = Viseme::X;
    let mut step = 0u64;

    loop {
        let t = step as f64 * WINDOW_SECS;
        if t >= total {
            break;
        }
        step += 1;

        let window = pcm.window(t, WINDOW_SECS);
        if window.is_empty() {
            continue;
        }
        let category = Loudness::from_dbfs(dbfs(window));
        let v = pick(category.candidates(), prev, rng);
        prev = v;

        let start = (t + rng.uniform(-JITTER_SECS, JITTER_SECS)).max(0.0);
        let duration = WINDOW_SECS + rng.uniform(-JITTER_SECS, JITTER_SECS);
        events.push(AudioEvent::viseme(start, duration, v));
    }

    sort_events(&mut events);
    tracing::debug!(count = events.len(), "generated fallback visemes");
    events
}

fn pick(options: &[Viseme], prev: Viseme, rng: &mut dyn RandomSource) -> Viseme {
    if options.len() > 1 && options.contains(&prev) {
        let others: Vec<Viseme> = options.iter().copied().filter(|&v| v != prev).collect();
        return others[rng.pick_index(others.len())];
    }
    options[rng.pick_index(options.len())]
}

#[cfg(test)]
#[path = "../../tests/unit/audio/fallback.rs"]
mod tests;
