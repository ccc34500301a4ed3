//! Integration tests for pipeline descriptions

use camera_recorder::params::SessionParams;
use camera_recorder::pipeline::{capture_description, output_description, output_file_name};

fn params() -> SessionParams {
    SessionParams {
        width: 1280,
        height: 720,
        framerate: 60,
        camera_id: 2,
    }
}

#[test]
fn test_capture_embeds_parameters() {
    let desc = capture_description(&params());
    assert!(desc.starts_with("nvarguscamerasrc sensor-id=2 !"));
    assert!(desc.contains("width=(int)1280"));
    assert!(desc.contains("height=(int)720"));
    assert!(desc.contains("framerate=(fraction)60/1"));
    assert!(desc.contains("format=(string)NV12"));
}

#[test]
fn test_capture_embeds_defaults() {
    let desc = capture_description(&SessionParams::default());
    assert!(desc.contains("sensor-id=0"));
    assert!(desc.contains("width=(int)1920"));
    assert!(desc.contains("height=(int)1080"));
    assert!(desc.contains("framerate=(fraction)30/1"));
}

#[test]
fn test_output_file_keyed_by_camera() {
    let desc = output_description(&params());
    assert!(desc.ends_with("filesink location=output_2.mkv"));
    assert_eq!(output_file_name(params().camera_id), "output_2.mkv");
}

#[test]
fn test_output_converts_bgr_to_i420() {
    let desc = output_description(&params());
    let bgr = desc.find("format=(string)BGR").unwrap();
    let bgrx = desc.find("format=BGRx").unwrap();
    let i420 = desc.find("format=(string)I420").unwrap();
    assert!(bgr < bgrx && bgrx < i420);
    assert!(desc.contains("nvvidconv ! video/x-raw(memory:NVMM)"));
}

#[test]
fn test_descriptions_differ_per_camera() {
    let mut other = params();
    other.camera_id = 3;
    assert_ne!(capture_description(&params()), capture_description(&other));
    assert_ne!(output_description(&params()), output_description(&other));
}
