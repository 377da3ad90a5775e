#![cfg(feature = "pdf")]

use std::path::Path;
use std::sync::Arc;

use folio::pdf::{HighlightStyle, MupdfLoader};
use folio::test_utils::RecordingSurface;
use folio::viewer::{PageViewController, ViewerConfig};
use lopdf::{Document, Object, Stream, dictionary};

const SAMPLE_TEXT: &str = "this test is a test";

/// Three US Letter pages, only the last one has text
fn write_sample_pdf(path: &Path) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::new();
    for index in 0..3 {
        let text = if index == 2 { SAMPLE_TEXT } else { "" };
        let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(3),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// One Letter page with a word at `x y` in user space plus extra page entries
fn write_single_page_pdf(path: &Path, word: &str, x: i64, y: i64, extra: lopdf::Dictionary) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content = format!("BT /F1 12 Tf {x} {y} Td ({word}) Tj ET");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let mut page = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
        "MediaBox" => ints(&[0, 0, 612, 792]),
    };
    for (key, value) in extra.iter() {
        page.set(key.clone(), value.clone());
    }
    let page_id = doc.add_object(page);

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn ints(values: &[i64]) -> Object {
    Object::Array(values.iter().copied().map(Object::Integer).collect())
}

/// `Rect` of every highlight annotation in the file
fn highlight_rects(path: &Path) -> Vec<[f32; 4]> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .filter_map(|&page_id| {
            let page = doc.get_dictionary(page_id).ok()?;
            match page.get(b"Annots").ok()? {
                Object::Array(items) => Some(items.clone()),
                Object::Reference(id) => Some(doc.get_object(*id).ok()?.as_array().ok()?.clone()),
                _ => None,
            }
        })
        .flatten()
        .filter_map(|annot| {
            let dict = doc.get_dictionary(annot.as_reference().ok()?).ok()?;
            if dict.get(b"Subtype").and_then(|s| s.as_name()).ok() != Some(&b"Highlight"[..]) {
                return None;
            }
            let rect = dict.get(b"Rect").ok()?.as_array().ok()?;
            let values: Vec<f32> = rect.iter().filter_map(|v| v.as_float().ok()).collect();
            values.try_into().ok()
        })
        .collect()
}

fn highlight_count(path: &Path) -> usize {
    highlight_rects(path).len()
}

/// Search `word` on the only page, save, and return the stored rects
fn highlight_and_save(source: &Path, word: &str) -> Vec<[f32; 4]> {
    let saved = source.with_file_name("saved.pdf");
    let mut viewer = viewer();
    viewer.open(source).unwrap();
    assert_eq!(viewer.search(word).count(), 1);
    viewer.save(&saved).unwrap();
    highlight_rects(&saved)
}

fn viewer() -> PageViewController<RecordingSurface> {
    PageViewController::new(
        Arc::new(MupdfLoader::new(HighlightStyle::default())),
        RecordingSurface::new(),
        ViewerConfig::default(),
    )
}

#[test]
fn search_highlight_save_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("sample.pdf");
    let saved = dir.path().join("sample-highlighted.pdf");
    write_sample_pdf(&source);

    let mut viewer = viewer();
    let meta = viewer.open(&source).unwrap();
    assert_eq!(meta.page_count, 3);

    viewer.next_page();
    viewer.next_page();
    assert!(!viewer.next_page());
    assert_eq!(viewer.state().page_index, 2);

    let result = viewer.search("test");
    assert_eq!(result.count(), 2);
    for rect in &result.rects {
        // Text sits on the 720pt baseline, 72pt from the top in y-down space
        assert!(rect.y0 < 72.0 && rect.y1 > 60.0, "{rect:?}");
        assert!(rect.x0 >= 72.0, "{rect:?}");
    }

    viewer.save(&saved).unwrap();
    assert_eq!(highlight_count(&saved), 2);
    assert_eq!(highlight_count(&source), 0);

    viewer.open(&saved).unwrap();
    viewer.go_to_page(2);
    assert_eq!(viewer.search("test").count(), 2);
}

#[test]
fn rendered_frame_follows_zoom() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("sample.pdf");
    write_sample_pdf(&source);

    let mut viewer = viewer();
    viewer.open(&source).unwrap();
    viewer.fit_to_height(396).unwrap();

    let frame = viewer.surface().last_frame().unwrap();
    assert!(frame.height.abs_diff(396) <= 1, "{frame:?}");
    assert!(frame.width.abs_diff(306) <= 1, "{frame:?}");
    assert_eq!(frame.pixels.len(), (frame.width * frame.height * 3) as usize);
}

#[test]
fn missing_file_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let mut viewer = viewer();

    assert!(viewer.open(dir.path().join("nope.pdf")).is_err());
    assert!(!viewer.is_loaded());
}

#[test]
fn cropped_page_highlight_lands_on_the_text() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("cropped.pdf");
    write_single_page_pdf(
        &source,
        "cropped",
        172,
        600,
        dictionary! { "CropBox" => ints(&[100, 100, 512, 692]) },
    );

    let rects = highlight_and_save(&source, "cropped");
    assert_eq!(rects.len(), 1);
    let [llx, lly, urx, ury] = rects[0];
    assert!((llx - 172.0).abs() < 1.0, "{rects:?}");
    assert!(urx > llx + 20.0, "{rects:?}");
    assert!(lly < 600.0 && ury > 600.0, "{rects:?}");
}

#[test]
fn rotated_page_highlight_lands_on_the_text() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("rotated.pdf");
    write_single_page_pdf(
        &source,
        "rotated",
        172,
        600,
        dictionary! { "Rotate" => Object::Integer(90) },
    );

    let rects = highlight_and_save(&source, "rotated");
    assert_eq!(rects.len(), 1);
    let [llx, lly, urx, ury] = rects[0];
    assert!((llx - 172.0).abs() < 1.0, "{rects:?}");
    assert!(urx > llx + 20.0, "{rects:?}");
    assert!(lly < 600.0 && ury > 600.0, "{rects:?}");
}
