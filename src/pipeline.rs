//! GStreamer launch descriptions for the capture, output and preview pipelines.
//!
//! Capture: sensor NV12 in NVMM memory is converted by `nvvidconv` to BGRx,
//! then by `videoconvert` to interleaved BGR for the application.
//! Output: BGR goes back through `videoconvert` to BGRx, then `nvvidconv`
//! produces NVMM I420 for the hardware H.264 encoder.

use gstreamer as gst;

use gst::prelude::*;

use crate::constants::{elements, OUTPUT_EXTENSION};
use crate::params::SessionParams;

/// File the run records into, keyed by camera index
pub fn output_file_name(camera_id: u32) -> String {
    format!("output_{}.{}", camera_id, OUTPUT_EXTENSION)
}

/// Camera → hardware convert → BGR → appsink
pub fn capture_description(params: &SessionParams) -> String {
    format!(
        "{src} sensor-id={id} ! \
         video/x-raw(memory:NVMM), width=(int){w}, height=(int){h}, \
         format=(string)NV12, framerate=(fraction){f}/1 ! \
         {conv} flip-method=0 ! video/x-raw, format=(string)BGRx ! \
         videoconvert ! video/x-raw, format=(string)BGR ! \
         appsink name={sink}",
        src = elements::CAMERA_SOURCE,
        id = params.camera_id,
        w = params.width,
        h = params.height,
        f = params.framerate,
        conv = elements::HW_CONVERT,
        sink = elements::CAPTURE_SINK_NAME,
    )
}

/// appsrc → BGRx → hardware convert to I420 → H.264 → Matroska file
pub fn output_description(params: &SessionParams) -> String {
    format!(
        "appsrc name={src} ! video/x-raw, format=(string)BGR ! \
         videoconvert ! video/x-raw, format=BGRx ! \
         {conv} ! video/x-raw(memory:NVMM), format=(string)I420 ! \
         {enc} ! {mux} ! queue ! \
         filesink location={file}",
        src = elements::APP_SOURCE_NAME,
        conv = elements::HW_CONVERT,
        enc = elements::ENCODER,
        mux = elements::MUXER,
        file = output_file_name(params.camera_id),
    )
}

/// How the preview window renders frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    /// Whatever `autovideosink` picks
    Plain,
    /// OpenGL window
    Gl,
    /// OpenGL window with frames uploaded to GL memory up front
    GlUpload,
}

impl PreviewMode {
    /// Mode selected by the crate's build features
    pub fn from_features() -> Self {
        if cfg!(feature = "gpu-upload") {
            PreviewMode::GlUpload
        } else if cfg!(feature = "gl-display") {
            PreviewMode::Gl
        } else {
            PreviewMode::Plain
        }
    }
}

/// appsrc → (GL) video sink
pub fn preview_description(mode: PreviewMode) -> String {
    let sink = match mode {
        PreviewMode::Plain => "videoconvert ! autovideosink sync=false",
        PreviewMode::Gl => "videoconvert ! glimagesink sync=false",
        PreviewMode::GlUpload => "glupload ! glcolorconvert ! glimagesink sync=false",
    };
    format!("appsrc name={} ! {}", elements::APP_SOURCE_NAME, sink)
}

/// Parse `description` into a pipeline
pub(crate) fn launch(description: &str) -> Result<gst::Pipeline, String> {
    gst::parse::launch(description)
        .map_err(|e| format!("Failed to create pipeline: {}", e))?
        .downcast::<gst::Pipeline>()
        .map_err(|_| "Failed to downcast to Pipeline".to_string())
}

/// Look up a named element and cast it to its concrete type
pub(crate) fn element_by_name<T>(pipeline: &gst::Pipeline, name: &str) -> Result<T, String>
where
    T: IsA<gst::Element>,
{
    pipeline
        .by_name(name)
        .ok_or_else(|| format!("Failed to find element {}", name))?
        .downcast::<T>()
        .map_err(|_| format!("Element {} has an unexpected type", name))
}

/// Pop the first error waiting on the pipeline bus, if any
pub(crate) fn bus_error(pipeline: &gst::Pipeline) -> Option<String> {
    let message = pipeline.bus()?.pop_filtered(&[gst::MessageType::Error])?;
    match message.view() {
        gst::MessageView::Error(err) => Some(format!(
            "Error from {:?}: {} ({:?})",
            err.src().map(|s| s.path_string()),
            err.error(),
            err.debug()
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_uses_camera_index() {
        assert_eq!(output_file_name(0), "output_0.mkv");
        assert_eq!(output_file_name(3), "output_3.mkv");
    }

    #[test]
    fn capture_converts_through_bgrx_to_bgr() {
        let desc = capture_description(&SessionParams::default());
        let bgrx = desc.find("format=(string)BGRx").unwrap();
        let bgr = desc.find("format=(string)BGR !").unwrap();
        assert!(desc.find("NV12").unwrap() < bgrx);
        assert!(bgrx < bgr);
        assert!(desc.ends_with("appsink name=sink"));
    }

    #[test]
    fn output_encodes_i420_into_matroska() {
        let desc = output_description(&SessionParams::default());
        assert!(desc.starts_with("appsrc name=src"));
        assert!(desc.contains("format=(string)I420 ! omxh264enc ! matroskamux"));
    }

    #[test]
    fn preview_modes_pick_sinks() {
        assert!(preview_description(PreviewMode::Plain).contains("autovideosink"));
        assert!(preview_description(PreviewMode::Gl).contains("glimagesink"));
        assert!(preview_description(PreviewMode::GlUpload).contains("glupload"));
    }
}
