use super::*;

#[test]
fn supported_extensions_are_case_insensitive() {
    assert!(is_supported_audio(Path::new("a.WAV")));
    assert!(is_supported_audio(Path::new("dir/b.mp3")));
    assert!(is_supported_audio(Path::new("c.M4a")));
    assert!(!is_supported_audio(Path::new("d.flac")));
    assert!(!is_supported_audio(Path::new("noext")));
}

#[test]
fn wav_input_is_passed_through() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("voice.wav");
    std::fs::write(&wav, b"RIFF").unwrap();
    let out = ensure_wav(&wav, dir.path(), &TranscodeOptions::default()).unwrap();
    assert_eq!(out, wav);
}

#[test]
fn missing_and_unsupported_inputs_are_input_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.mp3");
    let err = ensure_wav(&missing, dir.path(), &TranscodeOptions::default()).unwrap_err();
    assert!(matches!(err, LipsyncError::Input(_)));

    let flac = dir.path().join("voice.flac");
    std::fs::write(&flac, b"fLaC").unwrap();
    let err = ensure_wav(&flac, dir.path(), &TranscodeOptions::default()).unwrap_err();
    assert!(matches!(err, LipsyncError::Input(_)));
}

#[test]
fn missing_codec_tool_is_transcode_error() {
    let dir = tempfile::tempdir().unwrap();
    let mp3 = dir.path().join("voice.mp3");
    std::fs::write(&mp3, b"ID3").unwrap();
    let opts = TranscodeOptions {
        ffmpeg: PathBuf::from("lipsynth-no-such-ffmpeg"),
        timeout: Duration::from_secs(5),
    };
    let err = ensure_wav(&mp3, &dir.path().join("work"), &opts).unwrap_err();
    assert!(matches!(err, LipsyncError::Transcode(_)));
}
