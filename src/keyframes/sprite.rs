use crate::assets::sprites::MouthSprite;
use crate::audio::event::AudioEvent;
use crate::foundation::core::Fps;
use crate::keyframes::{Keyframe, KeyframeTrack, SpriteState, VisualState};

/// One sprite keyframe per event: `start_frame = round(start * fps)`,
/// `duration_frames = max(1, round(duration * fps))`.
pub fn synthesize(events: &[AudioEvent], fps: Fps) -> KeyframeTrack {
    let keys: Vec<Keyframe> = events
        .iter()
        .map(|ev| {
            let viseme = ev.value.viseme();
            Keyframe::new(
                ev.start,
                VisualState::Sprite(SpriteState {
                    viseme,
                    sprite: MouthSprite::for_viseme(viseme),
                    start_frame: fps.secs_to_frames_round(ev.start),
                    duration_frames: fps.secs_to_frames_round(ev.duration).max(1),
                    duration_secs: ev.duration,
                }),
            )
        })
        .collect();
    // Rounding is monotonic, so time order is also frame order.
    KeyframeTrack::from_keyframes(keys)
}
