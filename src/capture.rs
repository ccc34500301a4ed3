//! Capture side: the camera pipeline and the loop that feeds the shared slot.

use gstreamer as gst;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;

use gst::prelude::*;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::constants::{elements, GRAB_TIMEOUT, OPEN_TIMEOUT};
use crate::error::{CaptureError, OpenError};
use crate::frame::Frame;
use crate::params::SessionParams;
use crate::pipeline::{self, capture_description};
use crate::preview::PreviewSurface;
use crate::rate::RateCounter;
use crate::session::SessionContext;

/// Returned by a loop step to say whether to keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    Continue,
    Stop,
}

/// Anything that hands out captured frames one at a time
pub trait FrameSource {
    /// Block until the next frame arrives.
    ///
    /// `None` means the source produced an empty or invalid frame, or gave up
    /// waiting because `ctx` was interrupted. Sources that can stall must keep
    /// checking [`SessionContext::is_interrupted`] while they wait.
    fn grab(&mut self, ctx: &SessionContext) -> Option<Frame>;
}

/// Why the capture loop returned without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureExit {
    /// The user pressed the exit key or closed the preview
    ExitKey,
    /// The interrupt flag was raised (Ctrl-C or a recorder fault)
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureStats {
    pub frames: u64,
    pub exit: CaptureExit,
}

/// Pull frames until interrupted, publishing each one to the shared slot.
///
/// An empty frame aborts the loop at once; the source is not called again.
pub fn run_capture_loop<S>(
    source: &mut S,
    ctx: &SessionContext,
    mut preview: Option<&mut dyn PreviewSurface>,
) -> Result<CaptureStats, CaptureError>
where
    S: FrameSource + ?Sized,
{
    let mut rate = RateCounter::new();
    let mut frames = 0u64;

    loop {
        if ctx.is_interrupted() {
            debug!(frames, "Capture loop interrupted");
            return Ok(CaptureStats {
                frames,
                exit: CaptureExit::Interrupted,
            });
        }

        let Some(frame) = source.grab(ctx) else {
            if ctx.is_interrupted() {
                debug!(frames, "Capture interrupted while waiting for a frame");
                return Ok(CaptureStats {
                    frames,
                    exit: CaptureExit::Interrupted,
                });
            }
            error!(frames, "Empty frame received from camera");
            return Err(CaptureError::EmptyFrame);
        };

        ctx.slot().publish(&frame);
        frames += 1;

        if let Some(preview) = preview.as_deref_mut() {
            if preview.show(&frame) == LoopAction::Stop {
                info!(frames, "Exit requested from preview");
                return Ok(CaptureStats {
                    frames,
                    exit: CaptureExit::ExitKey,
                });
            }
        }

        rate.record();
        if let Some(fps) = rate.poll(Instant::now()) {
            println!("capture fps = {}", fps);
        }
    }
}

/// Format reported by the camera once it is streaming
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// Camera pipeline ending in an appsink
pub struct CameraSource {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    info: SourceInfo,
    /// First frame, pulled while opening to learn the negotiated format
    pending: Option<Frame>,
}

impl CameraSource {
    /// Start the capture pipeline and wait for its first frame.
    pub fn open(params: &SessionParams) -> Result<Self, OpenError> {
        let id = params.camera_id;
        let fail = |reason: String| OpenError::Camera { id, reason };

        gst::init()?;

        let description = capture_description(params);
        debug!(%description, "Launching capture pipeline");

        let pipeline = pipeline::launch(&description).map_err(fail)?;
        let appsink: gst_app::AppSink =
            pipeline::element_by_name(&pipeline, elements::CAPTURE_SINK_NAME).map_err(fail)?;

        // One buffer in flight; the camera waits for us rather than piling up
        appsink.set_max_buffers(1);
        appsink.set_drop(false);

        pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| fail(format!("Failed to start pipeline: {}", e)))?;

        let timeout = gst::ClockTime::from_mseconds(OPEN_TIMEOUT.as_millis() as u64);
        let Some(sample) = appsink.try_pull_sample(timeout) else {
            let reason = pipeline::bus_error(&pipeline)
                .unwrap_or_else(|| "No frame before timeout".to_string());
            let _ = pipeline.set_state(gst::State::Null);
            return Err(fail(reason));
        };

        let info = sample
            .caps()
            .and_then(|caps| gst_video::VideoInfo::from_caps(caps).ok())
            .map(|info| SourceInfo {
                width: info.width(),
                height: info.height(),
                fps: fraction_to_f64(info.fps()),
            })
            .ok_or_else(|| fail("First sample has no video caps".to_string()))?;

        info!(
            camera = id,
            width = info.width,
            height = info.height,
            fps = info.fps,
            "Camera pipeline streaming"
        );

        Ok(Self {
            pipeline,
            appsink,
            info,
            pending: Frame::from_sample(&sample),
        })
    }

    pub fn info(&self) -> SourceInfo {
        self.info
    }
}

impl FrameSource for CameraSource {
    fn grab(&mut self, ctx: &SessionContext) -> Option<Frame> {
        if let Some(frame) = self.pending.take() {
            return Some(frame);
        }

        let timeout = gst::ClockTime::from_mseconds(GRAB_TIMEOUT.as_millis() as u64);
        loop {
            if let Some(sample) = self.appsink.try_pull_sample(timeout) {
                return Frame::from_sample(&sample);
            }
            // try_pull_sample gives None both on timeout and at end of stream
            if self.appsink.is_eos() {
                error!("Capture pipeline reached end of stream");
                return None;
            }
            if let Some(reason) = pipeline::bus_error(&self.pipeline) {
                error!(%reason, "Capture pipeline error");
                return None;
            }
            if ctx.is_interrupted() {
                return None;
            }
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        debug!("Dropping capture pipeline");
        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            error!(?e, "Failed to set capture pipeline to Null on drop");
        }
    }
}

fn fraction_to_f64(fraction: gst::Fraction) -> f64 {
    if fraction.denom() == 0 {
        0.0
    } else {
        f64::from(fraction.numer()) / f64::from(fraction.denom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_conversion() {
        assert_eq!(fraction_to_f64(gst::Fraction::new(30, 1)), 30.0);
        assert_eq!(fraction_to_f64(gst::Fraction::new(30000, 1001)), 30000.0 / 1001.0);
        assert_eq!(fraction_to_f64(gst::Fraction::new(0, 1)), 0.0);
    }

    #[test]
    #[ignore]
    fn open_default_camera() {
        let source = CameraSource::open(&SessionParams::default()).expect("open camera");
        assert_eq!(source.info().width, 1920);
    }
}
