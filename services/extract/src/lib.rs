//! Waymo Open Dataset image extractor
//!
//! Pulls camera images out of the Waymo Open Dataset. The dataset is stored
//! in Google Cloud Storage as TFRecord shards, one per driving segment; each
//! record is a `Frame` protobuf carrying a JPEG per camera.
//!
//! ## Architecture
//!
//! ```text
//! GCS bucket                 Local disk                      Output dir
//! ┌──────────────┐  gsutil  ┌──────────────┐                ┌──────────────────────┐
//! │ {split}/     │─────────▶│ temp shard   │                │ {ts}_{view}.jpeg     │
//! │   *.tfrecord │    cp    └──────────────┘                └──────────────────────┘
//! └──────────────┘                 │                                   ▲
//!                                  ▼                                   │
//!                          ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//!                          │ Record       │─▶│ Frame        │─▶│ View         │
//!                          │ Reader       │  │ Sampler      │  │ Extractor    │
//!                          └──────────────┘  └──────────────┘  └──────────────┘
//! ```
//!
//! Everything runs sequentially: one shard at a time, one frame at a time.

pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod frame;
pub mod pipeline;
pub mod record;
pub mod sampler;
pub mod storage;
pub mod views;
pub mod writer;

pub use config::ExtractConfig;
pub use error::ExtractError;
pub use extractor::{extract_views, Extracted, ViewImage};
pub use frame::{CameraImage, Frame};
pub use pipeline::{extract_shard, ExtractRequest, Extractor, RunStats, ShardStats};
pub use record::{RecordError, RecordReader};
pub use sampler::FrameSampler;
pub use storage::{fetch_shard, list_shards, GsutilStore, LocalShard, ObjectStore, Split, StorageError};
pub use views::{CameraView, ViewSet};
pub use writer::ImageWriter;
