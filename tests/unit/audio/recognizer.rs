use super::*;
use crate::audio::event::is_well_formed;

#[test]
fn durations_are_gaps_and_last_cue_gets_default() {
    let json = r#"{
        "metadata": {"soundFile": "x.wav", "duration": 1.0},
        "mouthCues": [
            {"start": 0.00, "end": 0.10, "value": "X"},
            {"start": 0.10, "end": 0.35, "value": "D"},
            {"start": 0.35, "end": 0.50, "value": "A"}
        ]
    }"#;
    let events = parse_mouth_cues(json).unwrap();
    assert_eq!(events.len(), 3);
    assert!((events[0].duration - 0.10).abs() < 1e-9);
    assert!((events[1].duration - 0.25).abs() < 1e-9);
    assert_eq!(events[2].duration, LAST_CUE_DURATION_SECS);
    assert_eq!(events[1].value.viseme(), Viseme::D);
    assert!(is_well_formed(&events));
}

#[test]
fn unsorted_and_duplicate_starts_are_normalized() {
    let json = r#"{"mouthCues": [
        {"start": 0.5, "value": "B"},
        {"start": 0.0, "value": "X"},
        {"start": 0.0, "value": "C"}
    ]}"#;
    let events = parse_mouth_cues(json).unwrap();
    assert!(is_well_formed(&events));
    let shapes: Vec<_> = events.iter().map(|e| e.value.viseme()).collect();
    assert_eq!(shapes, vec![Viseme::C, Viseme::B]);
}

#[test]
fn malformed_output_is_recognizer_unavailable() {
    for bad in [
        "not json",
        r#"{"cues": []}"#,
        r#"{"mouthCues": [{"start": 0.0, "value": "Q"}]}"#,
        r#"{"mouthCues": [{"start": -1.0, "value": "A"}]}"#,
    ] {
        let err = parse_mouth_cues(bad).unwrap_err();
        assert!(err.is_recoverable(), "{bad}: {err}");
        assert!(matches!(err, LipsyncError::RecognizerUnavailable(_)));
    }
}

#[test]
fn empty_cue_list_is_empty() {
    assert!(parse_mouth_cues(r#"{"mouthCues": []}"#).unwrap().is_empty());
}

#[test]
fn missing_binary_is_recognizer_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let r = RhubarbRecognizer::new("lipsynth-no-such-rhubarb", Duration::from_secs(5));
    let err = r
        .recognize(&dir.path().join("in.wav"), dir.path())
        .unwrap_err();
    assert!(matches!(err, LipsyncError::RecognizerUnavailable(_)));
}
