use crate::audio::event::AudioEvent;
use crate::audio::pcm::{MonoPcm, rms};

pub const WINDOW_SECS: f64 = 0.05;
pub const HOP_SECS: f64 = 0.02;

/// RMS envelope over 50 ms windows every 20 ms, normalized by the clip's peak window.
///
/// Each event covers one hop. Digitally silent input has no peak and yields no events.
pub fn envelope(pcm: &MonoPcm) -> Vec<AudioEvent> {
    let total = pcm.duration_secs();
    let mut levels = Vec::new();
    let mut step = 0u64;
    loop {
        let t = step as f64 * HOP_SECS;
        if t >= total {
            break;
        }
        step += 1;
        levels.push((t, rms(pcm.window(t, WINDOW_SECS))));
    }

    let peak = levels.iter().map(|&(_, r)| r).fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return Vec::new();
    }

    levels
        .into_iter()
        .map(|(t, r)| AudioEvent::energy(t, HOP_SECS, (r / peak).clamp(0.0, 1.0)))
        .collect()
}
