//! Fixed values shared by the capture and recording sides.

use std::time::Duration;

/// Width used when no complete argument set is given
pub const DEFAULT_WIDTH: u32 = 1920;
/// Height used when no complete argument set is given
pub const DEFAULT_HEIGHT: u32 = 1080;
/// Frame rate used when no complete argument set is given
pub const DEFAULT_FRAMERATE: u32 = 30;
/// Camera (sensor) index used when no complete argument set is given
pub const DEFAULT_CAMERA_ID: u32 = 0;

/// How long the recording loop sleeps between slot polls
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Length of the frame rate reporting window
pub const RATE_WINDOW: Duration = Duration::from_secs(1);

/// Time allowed for the camera pipeline to deliver its first frame
pub const OPEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest a single camera pull waits before the interrupt flag is checked again
pub const GRAB_TIMEOUT: Duration = Duration::from_millis(100);

/// Time allowed for the muxer to finish the file after end-of-stream
pub const EOS_TIMEOUT: Duration = Duration::from_secs(5);

/// Key name reported by video sinks for the Esc key
pub const EXIT_KEY: &str = "Escape";

pub mod elements {
    //! GStreamer element names used in the pipeline descriptions

    /// Jetson CSI camera source
    pub const CAMERA_SOURCE: &str = "nvarguscamerasrc";
    /// Hardware color converter (NVMM <-> system memory)
    pub const HW_CONVERT: &str = "nvvidconv";
    /// Hardware H.264 encoder
    pub const ENCODER: &str = "omxh264enc";
    /// Container muxer for the output file
    pub const MUXER: &str = "matroskamux";
    /// Name given to the appsink of the capture pipeline
    pub const CAPTURE_SINK_NAME: &str = "sink";
    /// Name given to the appsrc of the output and preview pipelines
    pub const APP_SOURCE_NAME: &str = "src";
}

/// Fourcc of the codec the output pipeline encodes to
pub const CODEC_FOURCC: [u8; 4] = *b"X264";

/// Extension of the recorded container
pub const OUTPUT_EXTENSION: &str = "mkv";
