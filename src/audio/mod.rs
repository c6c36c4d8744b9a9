//! Audio event extraction: recognizer, loudness fallback and amplitude envelope.

pub mod amplitude;
pub mod event;
pub mod extract;
pub mod fallback;
pub mod pcm;
pub mod recognizer;
pub mod transcode;

pub use event::{AudioEvent, EnergyLevel, EventValue, ExtractMode, Viseme};
pub use extract::{ExtractOptions, extract, extract_with};
pub use recognizer::{Recognizer, RhubarbRecognizer};
