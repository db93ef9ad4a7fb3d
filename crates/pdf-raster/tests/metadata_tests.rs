mod common;

use common::{create_test_pdf, save};
use lopdf::Object;
use pdf_raster::*;

#[test]
fn test_probe_page_count_and_size() {
    let temp = save(create_test_pdf(7, (960, 540), false));
    let metadata = LopdfProbe.probe(temp.path()).unwrap();
    assert_eq!(metadata.page_count, 7);
    assert_eq!(metadata.page_width_pt, 960.0);
    assert_eq!(metadata.page_height_pt, 540.0);
    assert!((metadata.aspect() - 16.0 / 9.0).abs() < 1e-6);
}

#[test]
fn test_probe_inherited_media_box() {
    let temp = save(create_test_pdf(3, (800, 600), true));
    let metadata = LopdfProbe.probe(temp.path()).unwrap();
    assert_eq!(metadata.page_count, 3);
    assert_eq!(
        (metadata.page_width_pt, metadata.page_height_pt),
        (800.0, 600.0)
    );
}

#[test]
fn test_probe_rotated_page_swaps_dimensions() {
    let mut doc = create_test_pdf(1, (800, 600), false);
    let first_page = *doc.get_pages().values().next().unwrap();
    doc.get_dictionary_mut(first_page)
        .unwrap()
        .set("Rotate", Object::Integer(90));
    let temp = save(doc);

    let metadata = LopdfProbe.probe(temp.path()).unwrap();
    assert_eq!(
        (metadata.page_width_pt, metadata.page_height_pt),
        (600.0, 800.0)
    );
}

#[test]
fn test_document_info_applies_page_limit() {
    let temp = save(create_test_pdf(10, (800, 600), false));

    let full = DocumentInfo::open(temp.path(), None).unwrap();
    assert_eq!(full.page_count(), 10);
    assert!((full.aspect() - 4.0 / 3.0).abs() < 1e-6);

    let limited = DocumentInfo::open(temp.path(), Some(4)).unwrap();
    assert_eq!(limited.page_count(), 4);
    assert_eq!(limited.path(), temp.path());

    let generous = DocumentInfo::open(temp.path(), Some(50)).unwrap();
    assert_eq!(generous.page_count(), 10);
}

#[test]
fn test_document_without_pages_is_rejected() {
    let temp = save(create_test_pdf(0, (800, 600), false));
    assert!(matches!(
        DocumentInfo::open(temp.path(), None),
        Err(RasterError::NoPages)
    ));

    let temp = save(create_test_pdf(3, (800, 600), false));
    assert!(matches!(
        DocumentInfo::open(temp.path(), Some(0)),
        Err(RasterError::NoPages)
    ));
}

#[test]
fn test_missing_file_fails_rasterizer_construction() {
    let result = Rasterizer::open(
        "/nonexistent/deck.pdf",
        None,
        RasterConfig::default(),
        |_: &std::path::Path, _: std::ops::Range<usize>, _: TargetSize| -> Result<Vec<RgbaImage>> {
            Ok(Vec::new())
        },
    );
    assert!(result.is_err());
}

#[test]
fn test_degenerate_page_size_is_rejected() {
    let metadata = DocumentMetadata {
        page_count: 2,
        page_width_pt: 0.0,
        page_height_pt: 600.0,
    };
    assert!(matches!(
        DocumentInfo::from_metadata("deck.pdf", metadata, None),
        Err(RasterError::Config(_))
    ));
}
