//! Camera recorder
//!
//! Captures frames from a CSI camera through a GStreamer pipeline and records
//! them to `output_<id>.mkv` through a second, independent encoding pipeline.
//!
//! The capture loop runs on the calling thread and publishes every frame to a
//! single-slot [`slot::FrameSlot`]. A background [`recorder::RecordingTask`]
//! polls the slot and appends the newest frame to the file. When the recorder
//! falls behind, intermediate frames are dropped rather than queued.
//!
//! ```no_run
//! use camera_recorder::prelude::*;
//! use std::sync::Arc;
//!
//! let params = SessionParams::default();
//! let ctx = Arc::new(SessionContext::new());
//! let report = record(&params, ctx).unwrap();
//! println!("{} frames recorded", report.recorded);
//! ```

pub mod capture;
pub mod cli;
pub mod constants;
pub mod error;
pub mod frame;
pub mod params;
pub mod pipeline;
pub mod preview;
pub mod rate;
pub mod recorder;
pub mod session;
pub mod slot;

pub mod prelude {
    pub use crate::capture::{CameraSource, CaptureExit, FrameSource, LoopAction};
    pub use crate::error::{ArgsError, CaptureError, OpenError, SessionError, WriteError};
    pub use crate::frame::{Frame, PixelFormat};
    pub use crate::params::{parse_args, SessionParams};
    pub use crate::preview::PreviewSurface;
    pub use crate::recorder::{FileWriter, FrameSink, RecordingTask};
    pub use crate::session::{record, run_session, SessionContext, SessionReport};
}
