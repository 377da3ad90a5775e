//! Writing highlight annotations into a PDF file

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;
use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};

use super::document::DocumentFault;
use super::highlight::HighlightStyle;
use super::types::{Highlight, PageRect};

/// US Letter, used when a page carries no MediaBox anywhere up its tree
const FALLBACK_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];
const MAX_PARENT_DEPTH: usize = 32;
/// Annotation flag: print
const FLAG_PRINT: i64 = 4;

/// Copy `source` to `dest`, adding one `/Highlight` annotation per entry.
///
/// Returns the number of annotations written. Highlights that point at a
/// page the file does not have are skipped.
pub fn write_highlights(
    source: &Path,
    dest: &Path,
    highlights: &[Highlight],
    style: &HighlightStyle,
) -> Result<usize, DocumentFault> {
    let mut doc = Document::load(source)?;
    let pages: BTreeMap<u32, ObjectId> = doc.get_pages();
    let mut written = 0;

    for highlight in highlights {
        let page_number = highlight.page as u32 + 1;
        let Some(&page_id) = pages.get(&page_number) else {
            warn!(
                "Skipping highlight on page {} of {source:?}: page not found",
                highlight.page
            );
            continue;
        };

        let transform = page_transform(&doc, page_id);
        let annot = highlight_annotation(&highlight.rect, &transform, style);
        let annot_id = doc.add_object(Object::Dictionary(annot));
        add_annotation_to_page(&mut doc, page_id, annot_id)?;
        written += 1;
    }

    doc.save(dest)?;
    Ok(written)
}

/// Maps the rendered, top-left y-down page space back to PDF user space.
///
/// Rendered space starts at the top-left corner of the visible box (the
/// CropBox clipped to the MediaBox) after `/Rotate` has been applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageTransform {
    /// Visible box in user space, `[x0, y0, x1, y1]`
    pub visible: [f32; 4],
    /// Clockwise page rotation, one of 0, 90, 180 or 270
    pub rotate: u16,
}

impl PageTransform {
    #[must_use]
    pub fn new(visible: [f32; 4], rotate: i64) -> Self {
        Self {
            visible,
            rotate: snap_rotation(rotate),
        }
    }

    /// Convert a page rect to user space `[llx, lly, urx, ury]`
    #[must_use]
    pub fn to_user_space(&self, rect: &PageRect) -> [f32; 4] {
        let rect = rect.normalized();
        let (ax, ay) = self.to_user(rect.x0, rect.y0);
        let (bx, by) = self.to_user(rect.x1, rect.y1);
        [ax.min(bx), ay.min(by), ax.max(bx), ay.max(by)]
    }

    /// Inverse of: rotate by `-rotate`, flip y, move the box corner to 0,0
    fn to_user(&self, x: f32, y: f32) -> (f32, f32) {
        let (ox, oy) = self.origin();
        rotate_point(x + ox, -(y + oy), self.rotate)
    }

    /// Top-left corner of the visible box in flipped, rotated space
    fn origin(&self) -> (f32, f32) {
        let [x0, y0, x1, y1] = self.visible;
        let back = (360 - self.rotate) % 360;
        [(x0, y0), (x0, y1), (x1, y0), (x1, y1)]
            .into_iter()
            .map(|(x, y)| {
                let (rx, ry) = rotate_point(x, y, back);
                (rx, -ry)
            })
            .fold((f32::INFINITY, f32::INFINITY), |(mx, my), (x, y)| {
                (mx.min(x), my.min(y))
            })
    }
}

fn snap_rotation(degrees: i64) -> u16 {
    let normalized = degrees.rem_euclid(360);
    // Odd angles round to the nearest quarter turn
    (((normalized + 45) / 90 % 4) * 90) as u16
}

fn rotate_point(x: f32, y: f32, degrees: u16) -> (f32, f32) {
    match degrees {
        90 => (-y, x),
        180 => (-x, -y),
        270 => (y, -x),
        _ => (x, y),
    }
}

fn highlight_annotation(
    rect: &PageRect,
    transform: &PageTransform,
    style: &HighlightStyle,
) -> Dictionary {
    let [llx, lly, urx, ury] = transform.to_user_space(rect);
    let [r, g, b] = style.color.map(|c| f32::from(c) / 255.0);

    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Highlight",
        "Rect" => reals(&[llx, lly, urx, ury]),
        "QuadPoints" => reals(&[llx, ury, urx, ury, llx, lly, urx, lly]),
        "C" => reals(&[r, g, b]),
        "CA" => Object::Real(style.opacity.clamp(0.0, 1.0)),
        "F" => Object::Integer(FLAG_PRINT),
    }
}

fn reals(values: &[f32]) -> Object {
    Object::Array(values.iter().copied().map(Object::Real).collect())
}

fn add_annotation_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    annot_id: ObjectId,
) -> Result<(), DocumentFault> {
    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;

    let shared_array = match page.get_mut(b"Annots") {
        Ok(Object::Array(arr)) => {
            arr.push(Object::Reference(annot_id));
            None
        }
        Ok(Object::Reference(id)) => Some(*id),
        _ => {
            page.set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
            None
        }
    };

    if let Some(array_id) = shared_array {
        doc.get_object_mut(array_id)?
            .as_array_mut()?
            .push(Object::Reference(annot_id));
    }

    Ok(())
}

/// Page geometry as the renderer sees it, with inherited attributes resolved
fn page_transform(doc: &Document, page_id: ObjectId) -> PageTransform {
    let media_box = inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| obj.as_array().ok())
        .and_then(|values| parse_box(values))
        .unwrap_or_else(|| {
            warn!("MediaBox not found on page {page_id:?}, falling back to US Letter (612x792)");
            FALLBACK_MEDIA_BOX
        });

    let visible = inherited(doc, page_id, b"CropBox")
        .and_then(|obj| obj.as_array().ok())
        .and_then(|values| parse_box(values))
        .and_then(|crop| intersect(crop, media_box))
        .unwrap_or(media_box);

    let rotate = inherited(doc, page_id, b"Rotate")
        .and_then(|obj| obj.as_i64().ok().or_else(|| obj.as_float().ok().map(|f| f as i64)))
        .unwrap_or(0);

    PageTransform::new(visible, rotate)
}

/// Look up an inheritable page attribute, following `/Parent`
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = Some(page_id);

    for _ in 0..MAX_PARENT_DEPTH {
        let dict = doc.get_dictionary(current?).ok()?;

        if let Ok(obj) = dict.get(key) {
            return match obj {
                Object::Reference(r) => doc.get_object(*r).ok(),
                other => Some(other),
            };
        }

        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}

fn intersect(a: [f32; 4], b: [f32; 4]) -> Option<[f32; 4]> {
    let x0 = a[0].max(b[0]);
    let y0 = a[1].max(b[1]);
    let x1 = a[2].min(b[2]);
    let y1 = a[3].min(b[3]);
    (x0 < x1 && y0 < y1).then_some([x0, y0, x1, y1])
}

fn parse_box(values: &[Object]) -> Option<[f32; 4]> {
    if values.len() < 4 {
        return None;
    }
    let x0 = values[0].as_float().ok()?;
    let y0 = values[1].as_float().ok()?;
    let x1 = values[2].as_float().ok()?;
    let y1 = values[3].as_float().ok()?;
    Some([x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)])
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

    /// One-page file with extra entries on the page and on its parent node
    fn create_test_pdf(path: &Path, page_entries: &Dictionary, pages_entries: &Dictionary) {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        };
        for (key, value) in page_entries.iter() {
            page.set(key.clone(), value.clone());
        }
        let page_id = doc.add_object(page);

        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        };
        for (key, value) in pages_entries.iter() {
            pages.set(key.clone(), value.clone());
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    fn highlight_rects(path: &Path) -> Vec<Vec<f32>> {
        let doc = Document::load(path).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let Ok(Object::Array(annots)) = page.get(b"Annots") else {
            return Vec::new();
        };

        annots
            .iter()
            .filter_map(|annot| {
                let dict = doc.get_dictionary(annot.as_reference().ok()?).ok()?;
                let subtype = dict.get(b"Subtype").ok()?.as_name().ok()?;
                if subtype != b"Highlight" {
                    return None;
                }
                let rect = dict.get(b"Rect").ok()?.as_array().ok()?;
                Some(rect.iter().filter_map(|v| v.as_float().ok()).collect())
            })
            .collect()
    }

    fn highlight_one(
        page_entries: &Dictionary,
        pages_entries: &Dictionary,
        rect: PageRect,
    ) -> Vec<Vec<f32>> {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.pdf");
        let dest = dir.path().join("dest.pdf");
        create_test_pdf(&source, page_entries, pages_entries);

        let highlights = [Highlight { page: 0, rect }];
        write_highlights(&source, &dest, &highlights, &HighlightStyle::default()).unwrap();
        highlight_rects(&dest)
    }

    #[test]
    fn user_space_flips_y_axis() {
        let rect = PageRect::new(10.0, 20.0, 110.0, 40.0);
        assert_eq!(
            PageTransform::new(LETTER, 0).to_user_space(&rect),
            [10.0, 752.0, 110.0, 772.0]
        );
    }

    #[test]
    fn crop_box_moves_the_origin() {
        let transform = PageTransform::new([100.0, 100.0, 512.0, 692.0], 0);
        let rect = PageRect::new(72.0, 80.0, 100.0, 96.0);
        assert_eq!(transform.to_user_space(&rect), [172.0, 596.0, 200.0, 612.0]);
    }

    #[test]
    fn rotated_pages_map_back_to_unrotated_space() {
        let rect = PageRect::new(10.0, 20.0, 110.0, 40.0);

        // Quarter turn: the rendered top-left is the user-space origin
        assert_eq!(
            PageTransform::new(LETTER, 90).to_user_space(&rect),
            [20.0, 10.0, 40.0, 110.0]
        );
        // Half turn: the rendered top-left is the bottom-right corner
        assert_eq!(
            PageTransform::new(LETTER, 180).to_user_space(&rect),
            [502.0, 20.0, 602.0, 40.0]
        );
        assert_eq!(
            PageTransform::new(LETTER, 270).to_user_space(&rect),
            [572.0, 682.0, 592.0, 782.0]
        );
    }

    #[test]
    fn rotation_snaps_to_quarter_turns() {
        assert_eq!(PageTransform::new(LETTER, -90).rotate, 270);
        assert_eq!(PageTransform::new(LETTER, 450).rotate, 90);
        assert_eq!(PageTransform::new(LETTER, 100).rotate, 90);
        assert_eq!(PageTransform::new(LETTER, 359).rotate, 0);
    }

    #[test]
    fn writes_one_annotation_per_highlight() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.pdf");
        let dest = dir.path().join("dest.pdf");
        create_test_pdf(
            &source,
            &dictionary! { "MediaBox" => reals(&LETTER) },
            &Dictionary::new(),
        );

        let highlights = [
            Highlight {
                page: 0,
                rect: PageRect::new(10.0, 20.0, 110.0, 40.0),
            },
            Highlight {
                page: 0,
                rect: PageRect::new(10.0, 60.0, 50.0, 80.0),
            },
            Highlight {
                page: 7,
                rect: PageRect::new(0.0, 0.0, 1.0, 1.0),
            },
        ];

        let written =
            write_highlights(&source, &dest, &highlights, &HighlightStyle::default()).unwrap();
        assert_eq!(written, 2);

        let rects = highlight_rects(&dest);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0], vec![10.0, 752.0, 110.0, 772.0]);
        // Source is left untouched
        assert!(highlight_rects(&source).is_empty());
    }

    #[test]
    fn inherited_media_box_is_used() {
        let rects = highlight_one(
            &Dictionary::new(),
            &dictionary! { "MediaBox" => reals(&[0.0, 0.0, 300.0, 400.0]) },
            PageRect::new(0.0, 0.0, 100.0, 50.0),
        );
        assert_eq!(rects, vec![vec![0.0, 350.0, 100.0, 400.0]]);
    }

    #[test]
    fn crop_box_is_clipped_to_media_box() {
        let rects = highlight_one(
            &dictionary! {
                "MediaBox" => reals(&LETTER),
                "CropBox" => reals(&[100.0, 100.0, 700.0, 692.0]),
            },
            &Dictionary::new(),
            PageRect::new(72.0, 80.0, 100.0, 96.0),
        );
        assert_eq!(rects, vec![vec![172.0, 596.0, 200.0, 612.0]]);
    }

    #[test]
    fn inherited_rotation_is_applied() {
        let rects = highlight_one(
            &dictionary! { "MediaBox" => reals(&LETTER) },
            &dictionary! { "Rotate" => Object::Integer(90) },
            PageRect::new(10.0, 20.0, 110.0, 40.0),
        );
        assert_eq!(rects, vec![vec![20.0, 10.0, 40.0, 110.0]]);
    }
}
