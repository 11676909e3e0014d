use crate::frame::Frame;
use crate::views::{CameraView, ViewSet};
use tracing::trace;

/// A camera image selected from a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewImage<'a> {
    pub view: CameraView,
    pub payload: &'a [u8],
}

/// Result of extracting views from one frame.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Extracted<'a> {
    /// Selected images, in the frame's entry order
    pub images: Vec<ViewImage<'a>>,
    /// Entries dropped because their camera code is not recognized
    pub unknown_codes: u64,
}

/// Select the images of `frame` whose camera is recognized and requested.
pub fn extract_views<'a>(frame: &'a Frame, requested: &ViewSet) -> Extracted<'a> {
    let mut extracted = Extracted::default();

    for image in &frame.images {
        let Some(view) = image.view() else {
            trace!(
                code = image.code(),
                timestamp = frame.timestamp(),
                "Dropping image with unrecognized camera code"
            );
            extracted.unknown_codes += 1;
            continue;
        };

        if requested.contains(view) {
            extracted.images.push(ViewImage {
                view,
                payload: image.payload(),
            });
        }
    }

    extracted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::CameraImage;

    fn image_with_code(code: i32) -> CameraImage {
        CameraImage {
            name: Some(code),
            image: Some(vec![code as u8]),
        }
    }

    fn frame_with(images: Vec<CameraImage>) -> Frame {
        Frame {
            context: None,
            timestamp_micros: Some(100),
            images,
        }
    }

    fn views_of(extracted: &Extracted<'_>) -> Vec<CameraView> {
        extracted.images.iter().map(|image| image.view).collect()
    }

    #[test]
    fn test_keeps_frame_order() {
        let frame = frame_with(vec![
            image_with_code(5),
            image_with_code(1),
            image_with_code(3),
        ]);

        let extracted = extract_views(&frame, &ViewSet::all());
        assert_eq!(
            views_of(&extracted),
            vec![CameraView::SideRight, CameraView::Front, CameraView::FrontRight]
        );
        assert_eq!(extracted.images[0].payload, &[5]);
        assert_eq!(extracted.unknown_codes, 0);
    }

    #[test]
    fn test_filters_to_requested_views() {
        let frame = frame_with((1..=5).map(image_with_code).collect());
        let requested = ViewSet::new([CameraView::SideLeft, CameraView::Front]);

        let extracted = extract_views(&frame, &requested);
        assert_eq!(
            views_of(&extracted),
            vec![CameraView::Front, CameraView::SideLeft]
        );
    }

    #[test]
    fn test_unknown_codes_dropped_for_any_request() {
        let frame = frame_with(vec![
            image_with_code(0),
            image_with_code(6),
            image_with_code(-3),
            image_with_code(2),
            CameraImage::default(),
        ]);

        for requested in [ViewSet::all(), ViewSet::default(), ViewSet::new([CameraView::FrontLeft])] {
            let extracted = extract_views(&frame, &requested);
            assert!(extracted.images.iter().all(|image| image.view == CameraView::FrontLeft));
            assert_eq!(extracted.unknown_codes, 4);
        }
    }

    #[test]
    fn test_no_matching_views() {
        let frame = frame_with(vec![image_with_code(1)]);
        let requested = ViewSet::new([CameraView::SideLeft, CameraView::SideRight]);

        let extracted = extract_views(&frame, &requested);
        assert!(extracted.images.is_empty());
    }

    #[test]
    fn test_empty_frame() {
        let frame = frame_with(vec![]);
        let extracted = extract_views(&frame, &ViewSet::all());
        assert_eq!(extracted, Extracted::default());
    }
}
