use std::io::Cursor;

use super::*;

fn wav_bytes(channels: u16, rate: u32, samples: &[i16]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut w = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            w.write_sample(s).unwrap();
        }
        w.finalize().unwrap();
    }
    cursor.into_inner()
}

#[test]
fn stereo_is_mixed_down_to_mono() {
    let bytes = wav_bytes(2, 8000, &[16384, 0, -16384, -16384]);
    let pcm = read_wav_from(Cursor::new(bytes)).unwrap();
    assert_eq!(pcm.sample_rate, 8000);
    assert_eq!(pcm.samples.len(), 2);
    assert!((pcm.samples[0] - 0.25).abs() < 1e-4);
    assert!((pcm.samples[1] + 0.5).abs() < 1e-4);
}

#[test]
fn garbage_is_input_error() {
    let err = read_wav_from(Cursor::new(b"not a wav".to_vec())).unwrap_err();
    assert!(matches!(err, LipsyncError::Input(_)));
}

#[test]
fn window_clips_to_buffer() {
    let pcm = MonoPcm {
        sample_rate: 10,
        samples: vec![0.0; 25],
    };
    assert_eq!(pcm.window(0.0, 1.0).len(), 10);
    assert_eq!(pcm.window(2.0, 1.0).len(), 5);
    assert!(pcm.window(3.0, 1.0).is_empty());
    assert!((pcm.duration_secs() - 2.5).abs() < 1e-9);
}

#[test]
fn dbfs_of_full_scale_square_is_zero() {
    let square = [1.0f32, -1.0, 1.0, -1.0];
    assert!(dbfs(&square).abs() < 1e-6);
    assert_eq!(dbfs(&[0.0, 0.0]), f64::NEG_INFINITY);
    assert_eq!(dbfs(&[]), f64::NEG_INFINITY);
    assert!((rms(&[0.5, -0.5]) - 0.5).abs() < 1e-6);
}
