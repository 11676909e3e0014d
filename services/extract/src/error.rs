use crate::record::RecordError;
use crate::views::CameraView;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors while extracting a shard.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read record stream: {0}")]
    Record(#[from] RecordError),

    #[error("Malformed frame at record {position}: {source}")]
    FrameDecode {
        position: u64,
        #[source]
        source: prost::DecodeError,
    },

    #[error("Failed to decode {view} image of frame {timestamp}: {source}")]
    ImageDecode {
        view: CameraView,
        timestamp: i64,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode image {}: {source}", path.display())]
    ImageEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
