//! Optional preview window.
//!
//! The window itself only exists with the `display` feature; the capture loop
//! talks to it through [`PreviewSurface`].

use crate::capture::LoopAction;
use crate::frame::Frame;

/// Something that can show frames and report a request to quit
pub trait PreviewSurface {
    /// Render `frame`; [`LoopAction::Stop`] means the user asked to exit.
    fn show(&mut self, frame: &Frame) -> LoopAction;
}

#[cfg(feature = "display")]
pub use window::PreviewWindow;

#[cfg(feature = "display")]
mod window {
    use gstreamer as gst;
    use gstreamer_app as gst_app;

    use gst::prelude::*;
    use tracing::{debug, error, info, warn};

    use super::PreviewSurface;
    use crate::capture::LoopAction;
    use crate::constants::{elements, EXIT_KEY};
    use crate::error::OpenError;
    use crate::frame::{Frame, PixelFormat};
    use crate::pipeline::{self, preview_description, PreviewMode};
    use crate::recorder::configure_queue;

    /// appsrc pipeline rendering into a video sink window
    pub struct PreviewWindow {
        pipeline: gst::Pipeline,
        appsrc: gst_app::AppSrc,
        /// Layout the appsrc caps currently describe
        negotiated: Option<(u32, u32, PixelFormat)>,
    }

    impl PreviewWindow {
        pub fn open(mode: PreviewMode) -> Result<Self, OpenError> {
            gst::init()?;

            let description = preview_description(mode);
            debug!(%description, ?mode, "Launching preview pipeline");

            let pipeline = pipeline::launch(&description).map_err(OpenError::Preview)?;
            let appsrc: gst_app::AppSrc =
                pipeline::element_by_name(&pipeline, elements::APP_SOURCE_NAME)
                    .map_err(OpenError::Preview)?;

            appsrc.set_format(gst::Format::Time);
            appsrc.set_is_live(true);
            appsrc.set_do_timestamp(true);

            pipeline
                .set_state(gst::State::Playing)
                .map_err(|e| OpenError::Preview(format!("Failed to start pipeline: {}", e)))?;

            info!(?mode, "Preview window opened");
            Ok(Self {
                pipeline,
                appsrc,
                negotiated: None,
            })
        }

        fn ensure_caps(&mut self, frame: &Frame) {
            let layout = (frame.width, frame.height, frame.format);
            if self.negotiated == Some(layout) {
                return;
            }
            let caps = gst::Caps::builder("video/x-raw")
                .field("format", frame.format.to_gst_format_string())
                .field("width", frame.width as i32)
                .field("height", frame.height as i32)
                .field("framerate", gst::Fraction::new(0, 1))
                .build();
            self.appsrc.set_caps(Some(&caps));
            configure_queue(&self.appsrc, frame.format, frame.width, frame.height);
            self.negotiated = Some(layout);
        }

        /// Drain the bus looking for the exit key or a closed window
        fn poll_bus(&self) -> LoopAction {
            let Some(bus) = self.pipeline.bus() else {
                return LoopAction::Continue;
            };
            while let Some(message) = bus.pop() {
                match message.view() {
                    gst::MessageView::Element(_) => {
                        if message.structure().is_some_and(is_exit_key_message) {
                            return LoopAction::Stop;
                        }
                    }
                    gst::MessageView::Error(err) => {
                        // video sinks report a closed window as an error
                        warn!(error = %err.error(), "Preview pipeline error");
                        return LoopAction::Stop;
                    }
                    _ => {}
                }
            }
            LoopAction::Continue
        }
    }

    impl PreviewSurface for PreviewWindow {
        fn show(&mut self, frame: &Frame) -> LoopAction {
            self.ensure_caps(frame);
            let buffer = gst::Buffer::from_mut_slice(frame.data.clone());
            if let Err(e) = self.appsrc.push_buffer(buffer) {
                warn!(?e, "Failed to push frame to preview");
            }
            self.poll_bus()
        }
    }

    impl Drop for PreviewWindow {
        fn drop(&mut self) {
            debug!("Dropping preview pipeline");
            if let Err(e) = self.pipeline.set_state(gst::State::Null) {
                error!(?e, "Failed to set preview pipeline to Null on drop");
            }
        }
    }

    /// Whether a navigation message carries a press of the exit key
    pub(crate) fn is_exit_key_message(structure: &gst::StructureRef) -> bool {
        if !structure.has_name("GstNavigationMessage") {
            return false;
        }
        if structure.get::<&str>("type").ok() != Some("event") {
            return false;
        }
        let Ok(event) = structure.get::<gst::Event>("event") else {
            return false;
        };
        event.structure().is_some_and(is_exit_key_event)
    }

    pub(crate) fn is_exit_key_event(structure: &gst::StructureRef) -> bool {
        structure.has_name("application/x-gst-navigation")
            && structure.get::<&str>("event").ok() == Some("key-press")
            && structure.get::<&str>("key").ok() == Some(EXIT_KEY)
    }

}
