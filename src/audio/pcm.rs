use std::io::Read;
use std::path::Path;

use crate::foundation::error::{LipsyncError, LipsyncResult};

/// Mono floating-point PCM in `[-1, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct MonoPcm {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl MonoPcm {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Samples covering `[start_sec, start_sec + len_sec)`, clipped to the buffer.
    pub fn window(&self, start_sec: f64, len_sec: f64) -> &[f32] {
        let rate = f64::from(self.sample_rate);
        let start = ((start_sec * rate).floor().max(0.0) as usize).min(self.samples.len());
        let end = (((start_sec + len_sec) * rate).floor().max(0.0) as usize)
            .min(self.samples.len())
            .max(start);
        &self.samples[start..end]
    }
}

/// Decode an uncompressed WAV file into mono PCM (channels are averaged).
pub fn read_wav(path: &Path) -> LipsyncResult<MonoPcm> {
    let f = std::fs::File::open(path).map_err(|e| {
        LipsyncError::input(format!("failed to open audio '{}': {e}", path.display()))
    })?;
    read_wav_from(std::io::BufReader::new(f))
        .map_err(|e| LipsyncError::input(format!("'{}': {e}", path.display())))
}

pub fn read_wav_from<R: Read>(reader: R) -> LipsyncResult<MonoPcm> {
    let mut wav = hound::WavReader::new(reader)
        .map_err(|e| LipsyncError::input(format!("failed to parse WAV: {e}")))?;
    let spec = wav.spec();
    if spec.channels == 0 || spec.sample_rate == 0 {
        return Err(LipsyncError::input("WAV header has zero channels or sample rate"));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            wav.samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
        }
        hound::SampleFormat::Float => wav.samples::<f32>().collect::<Result<_, _>>(),
    }
    .map_err(|e| LipsyncError::input(format!("failed to read WAV samples: {e}")))?;

    let channels = usize::from(spec.channels);
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(MonoPcm {
        sample_rate: spec.sample_rate,
        samples,
    })
}

pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

/// Loudness relative to full scale; silence is `-inf`.
pub fn dbfs(samples: &[f32]) -> f64 {
    let r = f64::from(rms(samples));
    if r <= 0.0 {
        return f64::NEG_INFINITY;
    }
    20.0 * r.log10()
}

#[cfg(test)]
#[path = "../../tests/unit/audio/pcm.rs"]
mod tests;
