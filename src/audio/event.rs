use std::fmt;

/// The 9-symbol mouth-shape alphabet emitted by the recognizer.
///
/// Each shape is documented by the sprite it selects and its articulation class.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Viseme {
    /// Closed lips; closed.
    A,
    /// Small opening; narrow.
    B,
    /// Medium opening; open, snaps closed.
    C,
    /// Wide opening; open, snaps closed.
    D,
    /// Rounded lips; open, snaps closed.
    E,
    /// Teeth showing; narrow.
    F,
    /// The special sprite; narrow.
    G,
    /// Wide opening, same sprite as `D`; open, snaps closed.
    H,
    /// Idle, drawn with the closed sprite.
    X,
}

/// Coarse articulation class used to derive an effort level from a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Articulation {
    Closed,
    Narrow,
    Open,
}

impl Viseme {
    pub const ALL: [Viseme; 9] = [
        Viseme::A,
        Viseme::B,
        Viseme::C,
        Viseme::D,
        Viseme::E,
        Viseme::F,
        Viseme::G,
        Viseme::H,
        Viseme::X,
    ];

    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s.trim() {
            "A" => Self::A,
            "B" => Self::B,
            "C" => Self::C,
            "D" => Self::D,
            "E" => Self::E,
            "F" => Self::F,
            "G" => Self::G,
            "H" => Self::H,
            "X" => Self::X,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
            Self::F => 'F',
            Self::G => 'G',
            Self::H => 'H',
            Self::X => 'X',
        }
    }

    pub fn articulation(self) -> Articulation {
        match self {
            Self::A | Self::X => Articulation::Closed,
            Self::B | Self::F | Self::G => Articulation::Narrow,
            Self::C | Self::D | Self::E | Self::H => Articulation::Open,
        }
    }

    /// Energy scalar by articulation class: closed 0.0, narrow 0.5, open 1.0.
    pub fn energy(self) -> f32 {
        match self.articulation() {
            Articulation::Closed => 0.0,
            Articulation::Narrow => 0.5,
            Articulation::Open => 1.0,
        }
    }

    /// Shapes that get a snap-closed follow-up in the two-part style.
    pub fn is_wide(self) -> bool {
        matches!(self, Self::C | Self::D | Self::E | Self::H)
    }
}

impl fmt::Display for Viseme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Four ordered mouth-opening buckets for continuous energy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnergyLevel {
    Silent,
    Small,
    Medium,
    Wide,
}

impl EnergyLevel {
    pub const SILENCE_THRESHOLD: f32 = 0.1;
    pub const SMALL_THRESHOLD: f32 = 0.35;
    pub const MEDIUM_THRESHOLD: f32 = 0.65;

    pub fn from_energy(e: f32) -> Self {
        if e.is_nan() || e < Self::SILENCE_THRESHOLD {
            Self::Silent
        } else if e < Self::SMALL_THRESHOLD {
            Self::Small
        } else if e < Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Wide
        }
    }

    /// Representative shape for styles that need a viseme.
    pub fn viseme(self) -> Viseme {
        match self {
            Self::Silent => Viseme::X,
            Self::Small => Viseme::B,
            Self::Medium => Viseme::C,
            Self::Wide => Viseme::D,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventValue {
    Viseme(Viseme),
    /// Normalized effort in `[0, 1]`.
    Energy(f32),
}

impl EventValue {
    pub fn energy(self) -> f32 {
        match self {
            Self::Viseme(v) => v.energy(),
            Self::Energy(e) => e.clamp(0.0, 1.0),
        }
    }

    pub fn viseme(self) -> Viseme {
        match self {
            Self::Viseme(v) => v,
            Self::Energy(e) => EnergyLevel::from_energy(e).viseme(),
        }
    }

    pub fn level(self) -> EnergyLevel {
        EnergyLevel::from_energy(self.energy())
    }
}

/// One timed audio-derived event.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioEvent {
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds (strictly positive).
    pub duration: f64,
    pub value: EventValue,
}

impl AudioEvent {
    pub fn viseme(start: f64, duration: f64, v: Viseme) -> Self {
        Self {
            start,
            duration,
            value: EventValue::Viseme(v),
        }
    }

    pub fn energy(start: f64, duration: f64, e: f32) -> Self {
        Self {
            start,
            duration,
            value: EventValue::Energy(e),
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Which event flavour the extractor should produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMode {
    /// Viseme codes from the recognizer (or the loudness fallback).
    Phoneme,
    /// Viseme codes collapsed into three effort levels.
    Energy,
    /// RMS amplitude envelope straight from PCM.
    Amplitude,
}

/// `true` when starts are non-decreasing and every duration is finite and positive.
pub fn is_well_formed(events: &[AudioEvent]) -> bool {
    events
        .iter()
        .all(|e| e.start.is_finite() && e.start >= 0.0 && e.duration.is_finite() && e.duration > 0.0)
        && events.windows(2).all(|w| w[0].start <= w[1].start)
}

/// Sort by start time, keeping the original order for equal starts.
pub(crate) fn sort_events(events: &mut [AudioEvent]) {
    events.sort_by(|a, b| a.start.total_cmp(&b.start));
}

#[cfg(test)]
#[path = "../../tests/unit/audio/event.rs"]
mod tests;
