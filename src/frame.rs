//! Captured frame type

use gstreamer as gst;
use gstreamer_video as gst_video;

/// Pixel layout of a [`Frame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 24-bit interleaved B G R, what the capture pipeline delivers
    #[default]
    Bgr,
    /// 32-bit B G R x
    Bgrx,
    /// Semi-planar 4:2:0
    Nv12,
    /// Planar 4:2:0
    I420,
    /// Anything else GStreamer negotiated
    Other,
}

impl PixelFormat {
    /// Caps format string for this layout
    pub fn to_gst_format_string(self) -> &'static str {
        match self {
            PixelFormat::Bgr => "BGR",
            PixelFormat::Bgrx => "BGRx",
            PixelFormat::Nv12 => "NV12",
            PixelFormat::I420 => "I420",
            PixelFormat::Other => "ANY",
        }
    }

    /// Bytes in one tightly packed image of this layout, if it is known
    pub fn image_size(self, width: u32, height: u32) -> Option<u64> {
        let pixels = u64::from(width) * u64::from(height);
        match self {
            PixelFormat::Bgr => Some(pixels * 3),
            PixelFormat::Bgrx => Some(pixels * 4),
            PixelFormat::Nv12 | PixelFormat::I420 => Some(pixels * 3 / 2),
            PixelFormat::Other => None,
        }
    }
}

impl From<gst_video::VideoFormat> for PixelFormat {
    fn from(format: gst_video::VideoFormat) -> Self {
        match format {
            gst_video::VideoFormat::Bgr => PixelFormat::Bgr,
            gst_video::VideoFormat::Bgrx => PixelFormat::Bgrx,
            gst_video::VideoFormat::Nv12 => PixelFormat::Nv12,
            gst_video::VideoFormat::I420 => PixelFormat::I420,
            _ => PixelFormat::Other,
        }
    }
}

/// One captured image, owned independently of the capture pipeline's buffers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Bytes per row of the first plane
    pub stride: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        let stride = if height == 0 {
            0
        } else {
            (data.len() / height as usize) as u32
        };
        Self {
            width,
            height,
            stride,
            format,
            data,
        }
    }

    /// A frame with no pixels, what a failed retrieval looks like
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    /// Copy the pixels of a pulled sample.
    ///
    /// Returns `None` for samples without caps, buffer or pixels.
    pub fn from_sample(sample: &gst::Sample) -> Option<Self> {
        let caps = sample.caps()?;
        let info = gst_video::VideoInfo::from_caps(caps).ok()?;
        let buffer = sample.buffer()?;
        let map = buffer.map_readable().ok()?;

        let frame = Self {
            width: info.width(),
            height: info.height(),
            stride: info.stride()[0] as u32,
            format: info.format().into(),
            data: map.as_slice().to_vec(),
        };
        (!frame.is_empty()).then_some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_is_derived_from_rows() {
        let frame = Frame::new(4, 2, PixelFormat::Bgr, vec![0; 4 * 3 * 2]);
        assert_eq!(frame.stride, 12);
        assert!(!frame.is_empty());
    }

    #[test]
    fn default_frame_is_empty() {
        assert!(Frame::default().is_empty());
        assert!(Frame::new(4, 2, PixelFormat::Bgr, Vec::new()).is_empty());
    }

    #[test]
    fn image_size_per_layout() {
        assert_eq!(PixelFormat::Bgr.image_size(1920, 1080), Some(6_220_800));
        assert_eq!(PixelFormat::Bgrx.image_size(4, 2), Some(32));
        assert_eq!(PixelFormat::I420.image_size(4, 2), Some(12));
        assert_eq!(PixelFormat::Other.image_size(4, 2), None);
    }

    #[test]
    fn gst_formats_map_to_pixel_formats() {
        assert_eq!(PixelFormat::from(gst_video::VideoFormat::Bgr), PixelFormat::Bgr);
        assert_eq!(PixelFormat::from(gst_video::VideoFormat::I420), PixelFormat::I420);
        assert_eq!(PixelFormat::from(gst_video::VideoFormat::Rgba), PixelFormat::Other);
    }
}
