use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::event::{AudioEvent, EventValue, ExtractMode, sort_events};
use crate::audio::recognizer::{Recognizer, RhubarbRecognizer};
use crate::audio::transcode::{TranscodeOptions, ensure_wav};
use crate::audio::{amplitude, fallback, pcm};
use crate::foundation::error::LipsyncResult;
use crate::foundation::rng::RandomSource;

/// Tool locations and scratch space for one extraction.
#[derive(Clone, Debug)]
pub struct ExtractOptions {
    pub recognizer: PathBuf,
    pub recognizer_timeout: Duration,
    pub transcode: TranscodeOptions,
    pub work_dir: PathBuf,
}

impl ExtractOptions {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            recognizer: PathBuf::from("rhubarb"),
            recognizer_timeout: Duration::from_secs(300),
            transcode: TranscodeOptions::default(),
            work_dir: work_dir.into(),
        }
    }
}

/// Audio file to ordered events, using Rhubarb as the recognizer.
pub fn extract(
    audio: &Path,
    mode: ExtractMode,
    opts: &ExtractOptions,
    rng: &mut dyn RandomSource,
) -> LipsyncResult<Vec<AudioEvent>> {
    let recognizer = RhubarbRecognizer::new(&opts.recognizer, opts.recognizer_timeout);
    extract_with(audio, mode, opts, &recognizer, rng)
}

/// Like [`extract`] with an explicit recognizer.
#[tracing::instrument(skip_all, fields(audio = %audio.display(), ?mode))]
pub fn extract_with(
    audio: &Path,
    mode: ExtractMode,
    opts: &ExtractOptions,
    recognizer: &dyn Recognizer,
    rng: &mut dyn RandomSource,
) -> LipsyncResult<Vec<AudioEvent>> {
    let wav = ensure_wav(audio, &opts.work_dir, &opts.transcode)?;

    let mut events = match mode {
        ExtractMode::Phoneme => phonemes(&wav, opts, recognizer, rng)?,
        ExtractMode::Energy => to_energy(phonemes(&wav, opts, recognizer, rng)?),
        ExtractMode::Amplitude => match pcm::read_wav(&wav) {
            Ok(samples) => amplitude::envelope(&samples),
            Err(e) => {
                tracing::warn!(error = %e, "audio is not PCM WAV, using energy mode");
                to_energy(phonemes(&wav, opts, recognizer, rng)?)
            }
        },
    };

    sort_events(&mut events);
    events.retain(|e| e.duration > 0.0 && e.start.is_finite());
    tracing::info!(count = events.len(), "extracted audio events");
    Ok(events)
}

fn phonemes(
    wav: &Path,
    opts: &ExtractOptions,
    recognizer: &dyn Recognizer,
    rng: &mut dyn RandomSource,
) -> LipsyncResult<Vec<AudioEvent>> {
    match recognizer.recognize(wav, &opts.work_dir) {
        Ok(events) => {
            tracing::debug!(recognizer = recognizer.name(), count = events.len(), "recognized");
            Ok(events)
        }
        Err(e) => {
            tracing::warn!(
                recognizer = recognizer.name(),
                error = %e,
                "recognizer failed, using loudness fallback"
            );
            let samples = pcm::read_wav(wav)?;
            Ok(fallback::generate(&samples, rng))
        }
    }
}

fn to_energy(events: Vec<AudioEvent>) -> Vec<AudioEvent> {
    events
        .into_iter()
        .map(|e| AudioEvent {
            value: EventValue::Energy(e.value.energy()),
            ..e
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/audio/extract.rs"]
mod tests;
