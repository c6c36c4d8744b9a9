use image::Rgba;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::PixelSize;
use crate::style::{StyleKind, create_style};

/// Frame `i` is a solid color whose red channel is `i`.
struct Numbered {
    frames: u64,
}

impl FrameSource for Numbered {
    fn frame_size(&self) -> PixelSize {
        PixelSize::new(2, 2)
    }

    fn fps(&self) -> Fps {
        Fps::default()
    }

    fn frame_count(&self) -> u64 {
        self.frames
    }

    fn render_frame(&self, frame: FrameIndex) -> LipsyncResult<RgbaImage> {
        Ok(RgbaImage::from_pixel(2, 2, Rgba([frame.0 as u8, 0, 0, 255])))
    }
}

fn reds(sink: &InMemorySink) -> Vec<u8> {
    sink.frames().iter().map(|f| f.get_pixel(0, 0).0[0]).collect()
}

#[test]
fn parallel_chunks_arrive_in_index_order() {
    let source = Numbered { frames: 50 };
    let mut sink = InMemorySink::new(source.frame_size());
    let threading = RenderThreading {
        parallel: true,
        chunk_size: 7,
        threads: Some(3),
    };
    let stats = render_to_sink(&source, &mut sink, &threading, &CancelToken::new()).unwrap();
    assert_eq!(stats.frames_total, 50);
    assert_eq!(stats.chunks, 8);
    assert_eq!(reds(&sink), (0..50).collect::<Vec<u8>>());
    assert!(sink.is_finished());
}

#[test]
fn sequential_and_parallel_agree() {
    let source = Numbered { frames: 20 };
    let mut a = InMemorySink::new(source.frame_size());
    let mut b = InMemorySink::new(source.frame_size());
    let sequential = RenderThreading {
        parallel: false,
        chunk_size: 0,
        threads: None,
    };
    render_to_sink(&source, &mut a, &sequential, &CancelToken::new()).unwrap();
    render_to_sink(&source, &mut b, &RenderThreading::default(), &CancelToken::new()).unwrap();
    assert_eq!(a.frames(), b.frames());
}

#[test]
fn cancelled_render_stops_before_the_first_chunk() {
    let source = Numbered { frames: 10 };
    let mut sink = InMemorySink::new(source.frame_size());
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = render_to_sink(&source, &mut sink, &RenderThreading::default(), &cancel).unwrap_err();
    assert!(matches!(err, LipsyncError::Cancelled));
    assert!(sink.frames().is_empty());
}

#[test]
fn zero_threads_is_rejected() {
    let source = Numbered { frames: 1 };
    let mut sink = InMemorySink::new(source.frame_size());
    let threading = RenderThreading {
        threads: Some(0),
        ..RenderThreading::default()
    };
    let err = render_to_sink(&source, &mut sink, &threading, &CancelToken::new()).unwrap_err();
    assert!(matches!(err, LipsyncError::Validation(_)));
}

#[test]
fn frame_count_floors_and_keeps_one_frame() {
    let fps = Fps::default();
    assert_eq!(frame_count(1.0, fps), 24);
    assert_eq!(frame_count(2.04, fps), 48);
    assert_eq!(frame_count(0.0, fps), 1);
}

#[test]
fn clips_last_at_least_one_second() {
    let style = create_style(StyleKind::Sprite);
    let track = crate::keyframes::sprite::synthesize(
        &[crate::audio::event::AudioEvent::energy(0.0, 0.2, 0.5)],
        Fps::default(),
    );
    assert_eq!(clip_duration(style.as_ref(), &track), MIN_DURATION_SECS);
    assert_eq!(clip_duration(style.as_ref(), &KeyframeTrack::new()), 1.0);
}
