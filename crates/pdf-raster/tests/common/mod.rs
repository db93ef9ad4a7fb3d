use lopdf::{Dictionary, Document, Object, Stream};
use tempfile::NamedTempFile;

fn media_box(width: i64, height: i64) -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(width),
        Object::Integer(height),
    ])
}

/// Build a deck of `num_pages` blank slides. The MediaBox goes on the page
/// tree root when `inherit` is set, otherwise on every page.
pub fn create_test_pdf(num_pages: usize, size: (i64, i64), inherit: bool) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let mut page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]);
        if !inherit {
            page.set("MediaBox", media_box(size.0, size.1));
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    if inherit {
        pages.set("MediaBox", media_box(size.0, size.1));
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

pub fn save(mut doc: Document) -> NamedTempFile {
    let temp = NamedTempFile::new().unwrap();
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    std::fs::write(temp.path(), writer).unwrap();
    temp
}
