//! Tests that run the built binary with argument sets that are rejected
//! before any camera is opened

use std::process::{Command, Output};

fn run_binary(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_camera-recorder"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run camera-recorder")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_out_of_range_width_exits_non_zero() {
    let output = run_binary(&["99999999999999", "720", "60", "1"]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("Width, Height, Framerate, or camera ID out of range"),
        "{}",
        stderr(&output)
    );
}

#[test]
fn test_non_numeric_exits_non_zero() {
    let output = run_binary(&["wide", "720", "60", "1"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid width, height, framerate, or camera ID"));
}

#[test]
fn test_hyphen_value_reaches_numeric_check() {
    let output = run_binary(&["-abc", "720", "60", "1"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(
        err.contains("Invalid width, height, framerate, or camera ID"),
        "{}",
        err
    );
    assert!(!err.contains("unexpected argument"), "{}", err);
}

#[test]
fn test_negative_camera_id_is_out_of_range() {
    let output = run_binary(&["1280", "720", "60", "-1"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Width, Height, Framerate, or camera ID out of range"));
}

#[test]
fn test_warning_survives_a_later_rejection() {
    let output = run_binary(&["12px", "abc", "30", "0"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    let warning = err.find("Trailing characters after width: 12px");
    let diagnostic = err.find("Invalid width, height, framerate, or camera ID");
    assert!(warning.is_some() && diagnostic.is_some(), "{}", err);
    assert!(warning < diagnostic);
}
