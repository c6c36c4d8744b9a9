use super::*;

#[test]
fn missing_binary_is_spawn_error() {
    let mut cmd = Command::new("lipsynth-definitely-not-a-real-binary");
    let err = run_with_timeout(&mut cmd, Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, ProcessError::Spawn { .. }));
}

#[cfg(unix)]
#[test]
fn captures_stdout_of_successful_child() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "printf hello"]);
    let out = run_with_timeout(&mut cmd, Duration::from_secs(5)).unwrap();
    assert_eq!(out.stdout, b"hello");
}

#[cfg(unix)]
#[test]
fn non_zero_exit_reports_stderr() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "echo nope 1>&2; exit 3"]);
    match run_with_timeout(&mut cmd, Duration::from_secs(5)) {
        Err(ProcessError::Failed { stderr, .. }) => assert_eq!(stderr, "nope"),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn slow_child_times_out() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "exec sleep 5"]);
    let started = Instant::now();
    let err = run_with_timeout(&mut cmd, Duration::from_millis(100)).unwrap_err();
    assert!(matches!(err, ProcessError::TimedOut { .. }));
    assert!(started.elapsed() < Duration::from_secs(4));
}
