//! Extraction pipeline.
//!
//! ```text
//! list_shards -> for each shard: fetch_shard -> RecordReader -> FrameSampler
//!             -> Frame::decode -> extract_views -> ImageWriter -> cleanup
//! ```
//!
//! Shards are processed strictly one after another. The first fatal error
//! (bad record, bad frame, bad image, output I/O) stops the run; images
//! already written stay on disk.

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::extractor::extract_views;
use crate::frame::Frame;
use crate::record::RecordReader;
use crate::sampler::FrameSampler;
use crate::storage::{fetch_shard, list_shards, shard_name, ObjectStore, Split};
use crate::views::ViewSet;
use crate::writer::ImageWriter;
use indicatif::ProgressBar;
use prost::Message;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// What to extract, as selected on the command line.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub output_dir: PathBuf,
    pub views: ViewSet,
    pub split: Split,
    pub sampler: FrameSampler,
}

/// Statistics for one shard.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShardStats {
    pub records_read: u64,
    pub frames_kept: u64,
    pub images_written: u64,
    pub unknown_views: u64,
}

/// Statistics for a whole run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub shards_listed: u64,
    pub shards_processed: u64,
    pub records_read: u64,
    pub frames_kept: u64,
    pub images_written: u64,
    pub unknown_views: u64,
}

impl RunStats {
    fn add_shard(&mut self, shard: &ShardStats) {
        self.shards_processed += 1;
        self.records_read += shard.records_read;
        self.frames_kept += shard.frames_kept;
        self.images_written += shard.images_written;
        self.unknown_views += shard.unknown_views;
    }
}

/// Extract the requested views from one local shard file.
///
/// Every record is read and its framing checked; records dropped by the
/// sampler are never parsed.
pub fn extract_shard(
    path: &Path,
    sampler: FrameSampler,
    views: &ViewSet,
    writer: &ImageWriter,
    verify_checksums: bool,
) -> Result<ShardStats, ExtractError> {
    let mut reader = RecordReader::open(path, verify_checksums)?;
    let mut stats = ShardStats::default();
    let mut segment_logged = false;

    for (record, position) in reader.by_ref().zip(0u64..) {
        let record = record?;
        if !sampler.should_keep(position) {
            continue;
        }

        let frame = Frame::decode(record.as_slice())
            .map_err(|source| ExtractError::FrameDecode { position, source })?;
        stats.frames_kept += 1;

        if !segment_logged {
            if let Some(segment) = frame.segment_name() {
                debug!(segment = %segment, "Decoding segment");
            }
            segment_logged = true;
        }

        let extracted = extract_views(&frame, views);
        stats.unknown_views += extracted.unknown_codes;

        for image in extracted.images {
            writer.write(image.payload, image.view, frame.timestamp())?;
            stats.images_written += 1;
        }
    }

    stats.records_read = reader.records_read();
    Ok(stats)
}

/// Runs the extraction over every shard of a split.
pub struct Extractor<S> {
    store: S,
    config: ExtractConfig,
    request: ExtractRequest,
}

impl<S: ObjectStore> Extractor<S> {
    pub fn new(store: S, config: ExtractConfig, request: ExtractRequest) -> Self {
        Self {
            store,
            config,
            request,
        }
    }

    /// Run the pipeline to completion or to the first fatal error.
    #[instrument(skip(self), fields(split = %self.request.split, stride = self.request.sampler.stride()))]
    pub async fn run(&self) -> Result<RunStats, ExtractError> {
        let writer = ImageWriter::create(&self.request.output_dir, self.config.output.jpeg_quality)?;
        let temp_dir = self.config.storage.temp_dir();

        let shards = list_shards(
            &self.store,
            self.config.storage.bucket_root(),
            self.request.split,
        )
        .await;

        let mut stats = RunStats {
            shards_listed: shards.len() as u64,
            ..RunStats::default()
        };

        info!(
            shards = shards.len(),
            output_dir = %writer.output_dir().display(),
            "Starting extraction"
        );

        let bar = ProgressBar::new(shards.len() as u64);
        for url in &shards {
            bar.set_message(shard_name(url).to_string());
            info!(shard = %shard_name(url), "Processing shard");

            let local = fetch_shard(&self.store, url, &temp_dir).await;
            let shard_stats = extract_shard(
                local.path(),
                self.request.sampler,
                &self.request.views,
                &writer,
                self.config.decoding.verify_checksums,
            )?;
            drop(local);

            debug!(
                shard = %shard_name(url),
                records_read = shard_stats.records_read,
                frames_kept = shard_stats.frames_kept,
                images_written = shard_stats.images_written,
                "Shard complete"
            );
            stats.add_shard(&shard_stats);
            bar.inc(1);
        }
        bar.finish();

        Ok(stats)
    }
}
