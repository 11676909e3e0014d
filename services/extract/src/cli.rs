use crate::pipeline::ExtractRequest;
use crate::sampler::FrameSampler;
use crate::storage::Split;
use crate::views::{CameraView, ViewSet};
use clap::Parser;
use std::path::PathBuf;

/// Extract camera images from the Waymo Open Dataset.
///
/// The video is shot at 10 fps, so `--sample 10` keeps one frame per second.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory in which to write the images (created if absent)
    pub output_path: PathBuf,

    /// Camera views to extract [default: all views]
    #[arg(long, value_enum, num_args = 1..)]
    pub views: Vec<CameraView>,

    /// Dataset split to extract from
    #[arg(long, value_enum, default_value_t = Split::Training)]
    pub split: Split,

    /// Keep one frame every N frames
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub sample: u32,
}

impl Args {
    /// Requested views, or a fresh list of every view when none were given.
    pub fn views(&self) -> Vec<CameraView> {
        if self.views.is_empty() {
            CameraView::all()
        } else {
            self.views.clone()
        }
    }

    pub fn into_request(self) -> ExtractRequest {
        let views: ViewSet = self.views().into_iter().collect();
        // The parser only accepts strides >= 1.
        let sampler = FrameSampler::new(self.sample).unwrap_or_default();

        ExtractRequest {
            output_dir: self.output_path,
            views,
            split: self.split,
            sampler,
        }
    }
}
