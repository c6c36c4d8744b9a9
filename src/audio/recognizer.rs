//! External phoneme recognizer boundary.
//!
//! The recognizer is a black-box binary that writes `{"mouthCues": [...]}` JSON. Anything that
//! goes wrong here is reported as [`LipsyncError::RecognizerUnavailable`] so the extractor can
//! fall back to the loudness generator.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::audio::event::{AudioEvent, Viseme, sort_events};
use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::foundation::process::run_with_timeout;

/// Duration given to the last cue, which has no successor to measure against.
pub const LAST_CUE_DURATION_SECS: f64 = 0.2;

/// Turns a WAV file into viseme events.
pub trait Recognizer: Send + Sync {
    fn name(&self) -> &str;

    /// `work_dir` is a scratch directory the recognizer may write into.
    fn recognize(&self, wav: &Path, work_dir: &Path) -> LipsyncResult<Vec<AudioEvent>>;
}

/// Rhubarb Lip Sync invoked as `rhubarb -f json -o <out.json> <wav>`.
#[derive(Clone, Debug)]
pub struct RhubarbRecognizer {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl RhubarbRecognizer {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl Recognizer for RhubarbRecognizer {
    fn name(&self) -> &str {
        "rhubarb"
    }

    fn recognize(&self, wav: &Path, work_dir: &Path) -> LipsyncResult<Vec<AudioEvent>> {
        std::fs::create_dir_all(work_dir).map_err(|e| {
            LipsyncError::recognizer(format!(
                "failed to create '{}': {e}",
                work_dir.display()
            ))
        })?;
        let out = work_dir.join("mouth_cues.json");

        let mut cmd = Command::new(&self.program);
        cmd.args(["-f", "json", "-o"]).arg(&out).arg(wav);
        run_with_timeout(&mut cmd, self.timeout)
            .map_err(|e| LipsyncError::recognizer(e.to_string()))?;

        let json = std::fs::read_to_string(&out).map_err(|e| {
            LipsyncError::recognizer(format!("failed to read '{}': {e}", out.display()))
        })?;
        let _ = std::fs::remove_file(&out);
        parse_mouth_cues(&json)
    }
}

#[derive(serde::Deserialize)]
struct CueDocument {
    #[serde(rename = "mouthCues")]
    mouth_cues: Vec<Cue>,
}

#[derive(serde::Deserialize)]
struct Cue {
    start: f64,
    value: String,
}

/// Parse recognizer JSON into events.
///
/// Durations are the gap to the next cue's start; the final cue lasts
/// [`LAST_CUE_DURATION_SECS`]. Cues that would end up with a zero-length gap are dropped.
pub fn parse_mouth_cues(json: &str) -> LipsyncResult<Vec<AudioEvent>> {
    let doc: CueDocument = serde_json::from_str(json)
        .map_err(|e| LipsyncError::recognizer(format!("malformed recognizer output: {e}")))?;

    let mut cues = Vec::with_capacity(doc.mouth_cues.len());
    for cue in doc.mouth_cues {
        if !cue.start.is_finite() || cue.start < 0.0 {
            return Err(LipsyncError::recognizer(format!(
                "cue has invalid start time {}",
                cue.start
            )));
        }
        let v = Viseme::from_symbol(&cue.value).ok_or_else(|| {
            LipsyncError::recognizer(format!("unknown mouth shape '{}'", cue.value))
        })?;
        cues.push(AudioEvent::viseme(cue.start, LAST_CUE_DURATION_SECS, v));
    }
    sort_events(&mut cues);

    let mut events = Vec::with_capacity(cues.len());
    for i in 0..cues.len() {
        let mut ev = cues[i];
        if let Some(next) = cues.get(i + 1) {
            let gap = next.start - ev.start;
            if gap <= 0.0 {
                continue;
            }
            ev.duration = gap;
        }
        events.push(ev);
    }
    Ok(events)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/recognizer.rs"]
mod tests;
