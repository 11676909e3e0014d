use std::num::NonZeroU32;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SamplerError {
    #[error("Sample stride must be at least 1")]
    ZeroStride,
}

/// Positional frame sampler.
///
/// Keeps the frames at ordinal positions 0, stride, 2*stride, ... of a
/// record stream. Frame content and timestamps are never inspected, so
/// uneven spacing in the source data is not compensated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSampler {
    stride: NonZeroU32,
}

impl FrameSampler {
    /// Create a sampler keeping one frame every `stride` frames
    pub fn new(stride: u32) -> Result<Self, SamplerError> {
        NonZeroU32::new(stride)
            .map(|stride| Self { stride })
            .ok_or(SamplerError::ZeroStride)
    }

    pub fn stride(&self) -> u32 {
        self.stride.get()
    }

    /// Whether the item at zero-based `position` is retained
    pub fn should_keep(&self, position: u64) -> bool {
        position % u64::from(self.stride.get()) == 0
    }

    /// Lazily filter `items` by position.
    ///
    /// Yields `(position, item)` pairs so callers can report where a kept
    /// item sat in the source stream. Items at skipped positions are
    /// discarded unexamined; fallible streams should be checked item by item
    /// with [`FrameSampler::should_keep`] instead.
    pub fn sample<I>(self, items: I) -> impl Iterator<Item = (u64, I::Item)>
    where
        I: IntoIterator,
    {
        items
            .into_iter()
            .zip(0u64..)
            .filter_map(move |(item, position)| {
                if self.should_keep(position) {
                    Some((position, item))
                } else {
                    trace!(position, stride = self.stride.get(), "Frame skipped by sampler");
                    None
                }
            })
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self {
            stride: NonZeroU32::MIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kept_positions(stride: u32, count: u64) -> Vec<u64> {
        let sampler = FrameSampler::new(stride).unwrap();
        sampler.sample(0..count).map(|(position, _)| position).collect()
    }

    #[test]
    fn test_zero_stride_rejected() {
        assert_eq!(FrameSampler::new(0), Err(SamplerError::ZeroStride));
    }

    #[test]
    fn test_stride_one_keeps_everything() {
        assert_eq!(kept_positions(1, 7), (0..7).collect::<Vec<_>>());
        assert_eq!(FrameSampler::default().stride(), 1);
    }

    #[test]
    fn test_stride_ten_over_twenty_five() {
        assert_eq!(kept_positions(10, 25), vec![0, 10, 20]);
    }

    #[test]
    fn test_keeps_ceil_n_over_s() {
        for stride in 1..=12u32 {
            for count in 0..=40u64 {
                let kept = kept_positions(stride, count);
                let expected = count.div_ceil(u64::from(stride));
                assert_eq!(kept.len() as u64, expected, "stride={stride} count={count}");
                assert!(kept.iter().all(|p| p % u64::from(stride) == 0));
            }
        }
    }

    #[test]
    fn test_sample_yields_original_items() {
        let sampler = FrameSampler::new(2).unwrap();
        let items: Vec<_> = sampler.sample(["a", "b", "c", "d", "e"]).collect();
        assert_eq!(items, vec![(0, "a"), (2, "c"), (4, "e")]);
    }

    #[test]
    fn test_stride_larger_than_stream() {
        assert_eq!(kept_positions(100, 5), vec![0]);
        assert!(kept_positions(100, 0).is_empty());
    }
}
