//! One recording run: shared state, lifecycle and the orchestration of the
//! capture and recording loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::capture::{run_capture_loop, CameraSource, CaptureExit, FrameSource};
use crate::error::SessionResult;
use crate::params::SessionParams;
use crate::preview::PreviewSurface;
use crate::recorder::{FileWriter, FrameSink, RecordingOutcome, RecordingTask};
use crate::slot::FrameSlot;

/// State shared by the capture loop, the recording thread and signal handlers
#[derive(Default)]
pub struct SessionContext {
    slot: FrameSlot,
    /// Tells the recording loop to exit
    stop: AtomicBool,
    /// Tells the capture loop to exit
    interrupted: AtomicBool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self) -> &FrameSlot {
        &self.slot
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// End the capture loop at its next iteration
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Stopping,
    Stopped,
}

/// Counters of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub captured: u64,
    pub recorded: u64,
    /// Frames overwritten in the slot before the recorder took them
    pub dropped: u64,
    pub exit: CaptureExit,
}

fn transition(state: &mut SessionState, next: SessionState) {
    debug!(from = ?*state, to = ?next, "Session state change");
    *state = next;
}

/// Run the capture loop on this thread and the recording loop on another
/// until capture ends, then stop, join and close the sink.
///
/// A capture fault takes precedence over a recorder fault when both occur.
pub fn run_session<S, W>(
    source: &mut S,
    sink: W,
    ctx: Arc<SessionContext>,
    preview: Option<&mut dyn PreviewSurface>,
) -> SessionResult<SessionReport>
where
    S: FrameSource + ?Sized,
    W: FrameSink,
{
    let mut state = SessionState::Running;
    debug!(?state, "Session starting");

    let task = RecordingTask::start(sink, Arc::clone(&ctx));
    let capture = run_capture_loop(source, &ctx, preview);

    transition(&mut state, SessionState::Stopping);
    let RecordingOutcome { sink, result } = task.join()?;
    sink.finish();
    transition(&mut state, SessionState::Stopped);

    let dropped = ctx.slot().dropped();
    let capture = capture?;
    let recorded = result?;

    info!(
        captured = capture.frames,
        recorded,
        dropped,
        exit = ?capture.exit,
        "Session finished"
    );

    Ok(SessionReport {
        captured: capture.frames,
        recorded,
        dropped,
        exit: capture.exit,
    })
}

/// Open the camera, the output file and (with `display`) the preview, then
/// run the session.
pub fn record(params: &SessionParams, ctx: Arc<SessionContext>) -> SessionResult<SessionReport> {
    let mut source = CameraSource::open(params)?;
    let info = source.info();
    println!(
        "Camera: {} Width: {} Height: {}",
        params.camera_id, info.width, info.height
    );
    println!("FPS: {}", info.fps);

    let writer = FileWriter::open(params, info)?;
    info!(location = writer.location(), "Recording");

    #[cfg(feature = "display")]
    let mut window =
        crate::preview::PreviewWindow::open(crate::pipeline::PreviewMode::from_features())?;
    #[cfg(feature = "display")]
    let preview: Option<&mut dyn PreviewSurface> = {
        println!("Note: Click 'Esc' key to exit the window.");
        Some(&mut window)
    };
    #[cfg(not(feature = "display"))]
    let preview: Option<&mut dyn PreviewSurface> = None;

    run_session(&mut source, writer, ctx, preview)
}
