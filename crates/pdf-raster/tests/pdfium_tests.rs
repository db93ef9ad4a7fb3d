#![cfg(feature = "pdfium")]

mod common;

use common::{create_test_pdf, save};
use pdf_raster::*;

/// Decoder bound to the pdfium found on this machine, if any
fn decoder() -> Option<PdfiumDecoder> {
    let decoder = PdfiumDecoder::default();
    match decoder.check() {
        Ok(()) => Some(decoder),
        Err(e) => {
            eprintln!("skipping: {e}");
            None
        }
    }
}

#[test]
fn test_pdfium_renders_requested_pages_at_target_height() {
    let Some(mut decoder) = decoder() else {
        return;
    };
    let temp = save(create_test_pdf(3, (800, 600), false));

    let images = decoder
        .decode_pages(temp.path(), 1..3, TargetSize::Height(300))
        .unwrap();

    assert_eq!(images.len(), 2);
    for image in &images {
        assert_eq!(image.height(), 300);
        assert!(image.width().abs_diff(400) <= 1, "width {}", image.width());
    }
}

#[test]
fn test_pdfium_reports_missing_page() {
    let Some(mut decoder) = decoder() else {
        return;
    };
    let temp = save(create_test_pdf(2, (800, 600), false));

    let result = decoder.decode_pages(temp.path(), 1..3, TargetSize::Width(100));
    assert!(matches!(result, Err(RasterError::Decode { page: 2, .. })));
}

#[test]
fn test_rasterizer_publishes_pdfium_pages() {
    let Some(decoder) = decoder() else {
        return;
    };
    let temp = save(create_test_pdf(5, (960, 540), false));
    let config = RasterConfig {
        batch_size: 2,
        ..Default::default()
    };

    let (mut rasterizer, mut updates) = Rasterizer::open(temp.path(), None, config, decoder).unwrap();
    rasterizer.push_resize(640, 480);

    let ready = loop {
        match updates.blocking_recv() {
            Some(update @ RasterUpdate::Ready { .. }) => break update,
            Some(RasterUpdate::Failed { message, .. }) => panic!("render failed: {message}"),
            Some(_) => {}
            None => panic!("worker stopped"),
        }
    };
    assert!(matches!(ready, RasterUpdate::Ready { pages: 5, .. }));

    let images = rasterizer.snapshot().unwrap();
    assert_eq!(images.len(), 5);
    assert_eq!(images.target(), TargetSize::Width(640));
    assert_eq!(images.dimensions().0, 640);
    rasterizer.shutdown();
}
