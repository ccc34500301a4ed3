//! Recording side: the background task that drains the shared slot into the
//! output file, and the GStreamer writer it drains into.

use gstreamer as gst;
use gstreamer_app as gst_app;

use gst::prelude::*;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::capture::SourceInfo;
use crate::constants::{elements, CODEC_FOURCC, EOS_TIMEOUT, POLL_INTERVAL};
use crate::error::{OpenError, SessionError, WriteError};
use crate::frame::{Frame, PixelFormat};
use crate::params::SessionParams;
use crate::pipeline::{self, output_description, output_file_name};
use crate::rate::RateCounter;
use crate::session::SessionContext;

/// Destination for recorded frames
pub trait FrameSink: Send + 'static {
    /// Append one frame to the recording
    fn write(&mut self, frame: Frame) -> Result<(), WriteError>;

    /// Close the recording once no more frames will be written
    fn finish(self)
    where
        Self: Sized,
    {
    }
}

/// Poll the slot and write every fresh frame until the stop flag is set.
///
/// Returns the number of frames written. A write failure raises the
/// interrupt flag so the capture side stops as well.
pub fn run_recording_loop<W>(sink: &mut W, ctx: &SessionContext) -> Result<u64, WriteError>
where
    W: FrameSink + ?Sized,
{
    let mut rate = RateCounter::new();
    let mut written = 0u64;

    while !ctx.stop_requested() {
        if let Some(frame) = ctx.slot().take_if_fresh() {
            if let Err(e) = sink.write(frame) {
                error!(error = %e, written, "Failed to write frame");
                ctx.interrupt();
                return Err(e);
            }
            written += 1;
            rate.record();
        }

        if let Some(fps) = rate.poll(Instant::now()) {
            println!("record fps = {}", fps);
        }
        thread::sleep(POLL_INTERVAL);
    }

    debug!(written, "Recording loop stopped");
    Ok(written)
}

/// What the recording thread hands back when joined
pub struct RecordingOutcome<W> {
    pub sink: W,
    pub result: Result<u64, WriteError>,
}

/// Recording loop running on its own thread.
///
/// The sink is moved into the thread and returned by [`RecordingTask::join`],
/// so it can only be closed after the thread is gone.
pub struct RecordingTask<W> {
    handle: Option<JoinHandle<RecordingOutcome<W>>>,
    ctx: Arc<SessionContext>,
}

impl<W: FrameSink> RecordingTask<W> {
    pub fn start(mut sink: W, ctx: Arc<SessionContext>) -> Self {
        info!("Starting recording thread");
        let thread_ctx = Arc::clone(&ctx);
        let handle = thread::spawn(move || {
            let result = run_recording_loop(&mut sink, &thread_ctx);
            RecordingOutcome { sink, result }
        });

        Self {
            handle: Some(handle),
            ctx,
        }
    }

    /// Ask the loop to exit after its current iteration
    pub fn stop(&self) {
        debug!("Requesting recording stop");
        self.ctx.request_stop();
    }

    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| h.is_finished())
            .unwrap_or(true)
    }

    /// Stop the loop and wait for the thread to end
    pub fn join(mut self) -> Result<RecordingOutcome<W>, SessionError> {
        self.stop();
        let handle = self.handle.take().ok_or(SessionError::ThreadPanicked)?;
        let outcome = handle.join().map_err(|_| SessionError::ThreadPanicked)?;
        info!("Recording thread joined");
        Ok(outcome)
    }
}

impl<W> Drop for RecordingTask<W> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            warn!("Recording task dropped without join; stopping it");
            self.ctx.request_stop();
            let _ = handle.join();
        }
    }
}

/// H.264/Matroska writer fed through an appsrc
pub struct FileWriter {
    pipeline: gst::Pipeline,
    appsrc: gst_app::AppSrc,
    width: u32,
    height: u32,
    location: String,
}

impl FileWriter {
    /// Open `output_<id>.mkv` for frames of the size the camera delivers.
    pub fn open(params: &SessionParams, source: SourceInfo) -> Result<Self, OpenError> {
        let id = params.camera_id;
        let fail = |reason: String| OpenError::Writer { id, reason };

        gst::init()?;

        let description = output_description(params);
        debug!(
            %description,
            codec = %String::from_utf8_lossy(&CODEC_FOURCC),
            "Launching output pipeline"
        );

        let pipeline = pipeline::launch(&description).map_err(fail)?;
        let appsrc: gst_app::AppSrc =
            pipeline::element_by_name(&pipeline, elements::APP_SOURCE_NAME).map_err(fail)?;

        let caps = gst::Caps::builder("video/x-raw")
            .field("format", PixelFormat::Bgr.to_gst_format_string())
            .field("width", source.width as i32)
            .field("height", source.height as i32)
            .field("framerate", gst::Fraction::new(params.framerate as i32, 1))
            .build();
        appsrc.set_caps(Some(&caps));
        appsrc.set_format(gst::Format::Time);
        appsrc.set_is_live(true);
        appsrc.set_do_timestamp(true);
        configure_queue(&appsrc, PixelFormat::Bgr, source.width, source.height);

        pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| fail(format!("Failed to start pipeline: {}", e)))?;
        if let Some(reason) = pipeline::bus_error(&pipeline) {
            let _ = pipeline.set_state(gst::State::Null);
            return Err(fail(reason));
        }

        let location = output_file_name(id);
        info!(
            %location,
            width = source.width,
            height = source.height,
            framerate = params.framerate,
            "Output pipeline started"
        );

        Ok(Self {
            pipeline,
            appsrc,
            width: source.width,
            height: source.height,
            location,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl FrameSink for FileWriter {
    fn write(&mut self, frame: Frame) -> Result<(), WriteError> {
        if frame.width != self.width || frame.height != self.height {
            return Err(WriteError::SizeMismatch {
                width: self.width,
                height: self.height,
                got_width: frame.width,
                got_height: frame.height,
            });
        }

        let buffer = gst::Buffer::from_mut_slice(frame.data);
        self.appsrc
            .push_buffer(buffer)
            .map(|_| ())
            .map_err(WriteError::Push)
    }

    /// Send end-of-stream and wait for the muxer to close the file
    fn finish(self) {
        debug!(location = %self.location, "Finishing output file");
        if let Err(e) = self.appsrc.end_of_stream() {
            warn!(?e, "Failed to send EOS to output pipeline");
            return;
        }

        let Some(bus) = self.pipeline.bus() else {
            return;
        };
        let timeout = gst::ClockTime::from_mseconds(EOS_TIMEOUT.as_millis() as u64);
        match bus.timed_pop_filtered(timeout, &[gst::MessageType::Eos, gst::MessageType::Error]) {
            Some(message) => match message.view() {
                gst::MessageView::Eos(..) => info!(location = %self.location, "Output file closed"),
                gst::MessageView::Error(err) => {
                    error!(error = %err.error(), debug = ?err.debug(), "Output pipeline error on close")
                }
                _ => {}
            },
            None => warn!(location = %self.location, "Timed out waiting for output EOS"),
        }
    }
}

/// Hold at most one frame inside `appsrc` and make `push_buffer` wait for
/// room, so a slow encoder stalls the recording loop instead of growing an
/// unbounded queue. Frames the loop cannot take in time are overwritten in
/// the slot.
pub(crate) fn configure_queue(
    appsrc: &gst_app::AppSrc,
    format: PixelFormat,
    width: u32,
    height: u32,
) {
    let limit = queue_limit(format, width, height);
    appsrc.set_max_bytes(limit);
    appsrc.set_block(true);
    debug!(limit, "appsrc queue bounded to one frame");
}

/// Byte limit of an appsrc queue holding one frame
pub(crate) fn queue_limit(format: PixelFormat, width: u32, height: u32) -> u64 {
    // a single byte still lets exactly one buffer in before push blocks
    format.image_size(width, height).unwrap_or(1).max(1)
}

impl Drop for FileWriter {
    fn drop(&mut self) {
        debug!("Dropping output pipeline");
        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            error!(?e, "Failed to set output pipeline to Null on drop");
        }
    }
}
