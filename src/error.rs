//! Error types for argument parsing, pipeline setup and the two loops.

use gstreamer as gst;

/// Failure to turn the command line into session parameters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgsError {
    #[error("Invalid width, height, framerate, or camera ID")]
    Invalid,

    #[error("Width, Height, Framerate, or camera ID out of range")]
    OutOfRange,
}

/// Failure to bring up one of the pipelines
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("GStreamer init failed: {0}")]
    GStreamerInit(#[from] glib::Error),

    #[error("Failed to open camera: {id}")]
    Camera { id: u32, reason: String },

    #[error("Failed to open file for camera: {id}")]
    Writer { id: u32, reason: String },

    #[error("Failed to open preview: {0}")]
    Preview(String),
}

impl OpenError {
    /// Underlying cause, for logging next to the user-facing message
    pub fn reason(&self) -> Option<&str> {
        match self {
            OpenError::Camera { reason, .. } | OpenError::Writer { reason, .. } => Some(reason),
            OpenError::Preview(reason) => Some(reason),
            OpenError::GStreamerInit(_) => None,
        }
    }
}

/// Fault raised by the capture loop
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("Empty frame received from camera!")]
    EmptyFrame,
}

/// Failure to append a frame to the output file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    #[error("Frame size {got_width}x{got_height} doesn't match writer {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },

    #[error("Writer refused frame: {0:?}")]
    Push(gst::FlowError),

    #[error("Writer error: {0}")]
    Other(String),
}

/// Anything that ends a recording run with a failure status
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Open(#[from] OpenError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Recording failed: {0}")]
    Recorder(#[from] WriteError),

    #[error("Recording thread panicked")]
    ThreadPanicked,
}

pub type SessionResult<T> = Result<T, SessionError>;
