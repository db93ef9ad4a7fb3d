use crate::types::TargetSize;
use image::{Rgba, RgbaImage};
use std::sync::Arc;

const BLANK_PIXEL: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Every page of a document rendered at one target size.
///
/// An image set is immutable once built. Pages are reference counted so the
/// rendering thread can hold on to one without copying pixels.
#[derive(Debug, Clone)]
pub struct ImageSet {
    target: TargetSize,
    pages: Vec<Arc<RgbaImage>>,
    blank: Arc<RgbaImage>,
}

impl ImageSet {
    /// Build a set from rendered pages. Returns `None` if `pages` is empty.
    pub fn new(target: TargetSize, pages: Vec<RgbaImage>) -> Option<Self> {
        let first = pages.first()?;
        let blank = RgbaImage::from_pixel(first.width(), first.height(), BLANK_PIXEL);
        Some(Self {
            target,
            pages: pages.into_iter().map(Arc::new).collect(),
            blank: Arc::new(blank),
        })
    }

    pub fn target(&self) -> TargetSize {
        self.target
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Size of the first page
    pub fn dimensions(&self) -> (u32, u32) {
        self.blank.dimensions()
    }

    pub fn page(&self, index: usize) -> Option<&Arc<RgbaImage>> {
        self.pages.get(index)
    }

    /// Page at `index`, or the blank image when `index` is out of range
    pub fn page_or_blank(&self, index: isize) -> Arc<RgbaImage> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.pages.get(index))
            .unwrap_or(&self.blank)
            .clone()
    }

    pub fn blank(&self) -> &Arc<RgbaImage> {
        &self.blank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(value: u8) -> RgbaImage {
        RgbaImage::from_pixel(4, 3, Rgba([value, value, value, 255]))
    }

    #[test]
    fn test_empty_pages_rejected() {
        assert!(ImageSet::new(TargetSize::Width(4), Vec::new()).is_none());
    }

    #[test]
    fn test_blank_matches_first_page() {
        let set = ImageSet::new(TargetSize::Height(3), vec![page(10), page(20)]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.dimensions(), (4, 3));
        assert!(set.blank().pixels().all(|p| *p == BLANK_PIXEL));
    }

    #[test]
    fn test_page_or_blank() {
        let set = ImageSet::new(TargetSize::Height(3), vec![page(10), page(20)]).unwrap();
        assert_eq!(set.page_or_blank(1).get_pixel(0, 0)[0], 20);
        assert!(Arc::ptr_eq(&set.page_or_blank(-1), set.blank()));
        assert!(Arc::ptr_eq(&set.page_or_blank(2), set.blank()));
        assert!(Arc::ptr_eq(&set.page_or_blank(isize::MIN), set.blank()));
    }
}
