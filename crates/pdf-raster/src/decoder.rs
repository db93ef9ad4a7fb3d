use crate::types::{Result, TargetSize};
use image::RgbaImage;
use std::ops::Range;
use std::path::Path;

/// Renders document pages to pixels.
///
/// Called from the worker thread with batches of consecutive page indices.
/// Implementations return one image per requested page, in order.
pub trait PageDecoder: Send + 'static {
    fn decode_pages(
        &mut self,
        path: &Path,
        pages: Range<usize>,
        target: TargetSize,
    ) -> Result<Vec<RgbaImage>>;
}

impl<F> PageDecoder for F
where
    F: FnMut(&Path, Range<usize>, TargetSize) -> Result<Vec<RgbaImage>> + Send + 'static,
{
    fn decode_pages(
        &mut self,
        path: &Path,
        pages: Range<usize>,
        target: TargetSize,
    ) -> Result<Vec<RgbaImage>> {
        self(path, pages, target)
    }
}
