//! Integration tests for `--timestamps` activation.

use std::time::Duration;

use timestamp::{ACTIVATION_FLAG, ManualClock, Recorder, RecorderConfig};

fn run(args: &[&str]) -> String {
    let clock = ManualClock::new();
    let recorder = Recorder::with_parts(
        RecorderConfig::from_args(args).with_syscall_marker(false),
        &clock,
        Vec::new(),
    );
    recorder.emit(">open");
    clock.advance(Duration::from_millis(1));
    recorder.emit("<open");
    String::from_utf8(recorder.into_writer()).expect("utf-8")
}

#[test]
fn activation_flag_is_the_documented_token() {
    assert_eq!(ACTIVATION_FLAG, "--timestamps");
}

#[test]
fn without_flag_nothing_is_written() {
    assert_eq!(run(&["prog"]), "");
    assert_eq!(run(&["prog", "--timestamps=yes", "timestamps"]), "");
}

#[test]
fn flag_enables_output() {
    assert_eq!(
        run(&["prog", "--timestamps"]),
        "##   0.0  0.00: >open\n##   1.0  1.00: <open\n"
    );
}

#[test]
fn repeated_flag_is_idempotent() {
    assert_eq!(
        run(&["prog", "--timestamps"]),
        run(&["--timestamps", "prog", "--timestamps", "--timestamps"])
    );
}

#[test]
fn flag_position_does_not_matter() {
    assert_eq!(
        run(&["--timestamps", "prog", "input.json"]),
        run(&["prog", "input.json", "--timestamps"])
    );
}
