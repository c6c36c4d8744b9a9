use super::*;

#[test]
fn mux_command_keeps_the_shortest_stream() {
    let cmd = mux_command(
        Path::new("v.mp4"),
        Path::new("a.wav"),
        Path::new("out.mp4"),
        Path::new("ffmpeg"),
    );
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    assert_eq!(args[3..6], ["v.mp4", "-i", "a.wav"]);
    for flag in ["-shortest", "aac", "128k", "libx264", "+faststart"] {
        assert!(args.iter().any(|a| a == flag), "missing {flag} in {args:?}");
    }
    assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
}

#[test]
fn failed_mux_copies_the_silent_video() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("video_only.mp4");
    std::fs::write(&video, b"not really a video").unwrap();
    let out = dir.path().join("nested").join("out.mp4");

    let opts = MuxOptions {
        ffmpeg: dir.path().join("no-such-ffmpeg"),
        timeout: Duration::from_secs(5),
    };
    let outcome = mux_or_copy(&video, Path::new("missing.wav"), &out, &opts).unwrap();
    assert!(matches!(outcome, MuxOutcome::VideoOnly { .. }));
    assert_eq!(std::fs::read(&out).unwrap(), b"not really a video");
}

#[test]
fn missing_intermediate_cannot_be_copied() {
    let dir = tempfile::tempdir().unwrap();
    let opts = MuxOptions {
        ffmpeg: dir.path().join("no-such-ffmpeg"),
        timeout: Duration::from_secs(5),
    };
    let err = mux_or_copy(
        &dir.path().join("absent.mp4"),
        Path::new("missing.wav"),
        &dir.path().join("out.mp4"),
        &opts,
    )
    .unwrap_err();
    assert!(matches!(err, LipsyncError::Render(_)));
}
