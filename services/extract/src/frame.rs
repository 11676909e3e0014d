//! Frame messages of the Waymo Open Dataset (`waymo.open_dataset.Frame`).
//!
//! Only the fields the extractor reads are declared. The schema is proto2;
//! every other field of the on-disk message is skipped while decoding.

use crate::views::CameraView;

/// One synchronized capture of all sensors.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Frame {
    #[prost(message, optional, tag = "1")]
    pub context: Option<Context>,
    /// Capture time in microseconds.
    #[prost(int64, optional, tag = "2")]
    pub timestamp_micros: Option<i64>,
    #[prost(message, repeated, tag = "4")]
    pub images: Vec<CameraImage>,
}

/// Segment-level context shared by every frame of a shard.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Context {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
}

/// Compressed image from a single camera.
#[derive(Clone, PartialEq, prost::Message)]
pub struct CameraImage {
    /// Camera code (`CameraName.Name`).
    #[prost(int32, optional, tag = "1")]
    pub name: Option<i32>,
    /// JPEG payload.
    #[prost(bytes = "vec", optional, tag = "2")]
    pub image: Option<Vec<u8>>,
}

impl Frame {
    /// Capture timestamp, `0` when absent.
    pub fn timestamp(&self) -> i64 {
        self.timestamp_micros.unwrap_or_default()
    }

    /// Segment name from the frame context, if any.
    pub fn segment_name(&self) -> Option<&str> {
        self.context.as_ref()?.name.as_deref()
    }
}

impl CameraImage {
    pub fn new(view: CameraView, payload: Vec<u8>) -> Self {
        Self {
            name: Some(view.code()),
            image: Some(payload),
        }
    }

    /// Raw camera code, `0` (UNKNOWN) when absent.
    pub fn code(&self) -> i32 {
        self.name.unwrap_or_default()
    }

    pub fn view(&self) -> Option<CameraView> {
        CameraView::from_code(self.code())
    }

    pub fn payload(&self) -> &[u8] {
        self.image.as_deref().unwrap_or_default()
    }
}
