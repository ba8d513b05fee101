use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};

use crate::config::Align;
use crate::error::{InvoiceError, Result};
use crate::pdf::{FontWeight, TemplateDoc, TemplateStore, TEXT_SIZE};

const FONT_REGULAR: &str = "InvHelv";
const FONT_BOLD: &str = "InvHelvB";

/// Average glyph advance as a fraction of the point size, close enough to
/// Helvetica for centring short currency strings.
const GLYPH_ADVANCE: f32 = 0.5;

/// Opens `<dir>/<stylist>.pdf` and stamps text over its existing content
/// using the standard Helvetica fonts.
pub struct PdfTemplates {
    dir: PathBuf,
}

impl PdfTemplates {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl TemplateStore for PdfTemplates {
    fn open(&self, stylist: &str) -> Result<Box<dyn TemplateDoc>> {
        let path = self.dir.join(format!("{stylist}.pdf"));
        if !path.exists() {
            return Err(InvoiceError::TemplateNotFound {
                stylist: stylist.to_string(),
                path,
            });
        }
        let doc = StampedPdf::open(&path)?;
        Ok(Box::new(doc))
    }
}

#[derive(Debug)]
struct StampedPdf {
    doc: Document,
    path: PathBuf,
    pages: BTreeMap<u32, ObjectId>,
    heights: HashMap<u32, f32>,
    /// Pending text operations per page, flushed on finish.
    ops: BTreeMap<u32, Vec<Operation>>,
    font: &'static str,
    size: f32,
}

impl StampedPdf {
    fn open(path: &Path) -> Result<Self> {
        let doc = Document::load(path).map_err(|e| pdf_err(path, e))?;
        let pages = doc.get_pages();
        let heights = pages
            .iter()
            .map(|(&num, &id)| (num, page_height(&doc, id)))
            .collect();
        Ok(Self {
            doc,
            path: path.to_path_buf(),
            pages,
            heights,
            ops: BTreeMap::new(),
            font: FONT_REGULAR,
            size: TEXT_SIZE,
        })
    }

    /// Materialize a direct Resources dict on the page, preserving anything
    /// inherited from the page tree, and add our font entries to it.
    fn register_fonts(&mut self, page_id: ObjectId, regular: ObjectId, bold: ObjectId) -> Result<()> {
        let mut resources = match resolve_inherited(&self.doc, page_id, b"Resources") {
            Some(Object::Dictionary(d)) => d,
            Some(Object::Reference(id)) => self
                .doc
                .get_object(id)
                .ok()
                .and_then(|o| o.as_dict().ok().cloned())
                .unwrap_or_else(Dictionary::new),
            _ => Dictionary::new(),
        };

        let mut fonts = match resources.get(b"Font") {
            Ok(Object::Dictionary(d)) => d.clone(),
            Ok(Object::Reference(id)) => self
                .doc
                .get_object(*id)
                .ok()
                .and_then(|o| o.as_dict().ok().cloned())
                .unwrap_or_else(Dictionary::new),
            _ => Dictionary::new(),
        };
        fonts.set(FONT_REGULAR, Object::Reference(regular));
        fonts.set(FONT_BOLD, Object::Reference(bold));
        resources.set("Font", Object::Dictionary(fonts));

        let page = self
            .doc
            .get_object_mut(page_id)
            .and_then(|o| o.as_dict_mut())
            .map_err(|e| pdf_err(&self.path, e))?;
        page.set("Resources", Object::Dictionary(resources));
        Ok(())
    }
}

impl TemplateDoc for StampedPdf {
    fn set_font(&mut self, weight: FontWeight, size: f32) -> Result<()> {
        self.font = match weight {
            FontWeight::Regular => FONT_REGULAR,
            FontWeight::Bold => FONT_BOLD,
        };
        self.size = size;
        Ok(())
    }

    fn insert_text(
        &mut self,
        text: &str,
        page: u32,
        x: f32,
        y: f32,
        width: f32,
        _height: f32,
        align: Align,
    ) -> Result<()> {
        if !self.pages.contains_key(&page) {
            return Err(pdf_err(&self.path, format!("template has no page {page}")));
        }
        let page_height = *self.heights.get(&page).unwrap_or(&842.0);

        let tx = match align {
            Align::Left => x,
            Align::Center => x + (width - text_width(text, self.size)) / 2.0,
            Align::Right => x + width - text_width(text, self.size),
        };
        // Layout coordinates are top-down; PDF text is positioned from the
        // bottom-left baseline.
        let ty = page_height - y - self.size;

        let ops = self.ops.entry(page).or_default();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![self.font.into(), Object::Real(self.size)],
        ));
        ops.push(Operation::new(
            "Td",
            vec![Object::Real(tx), Object::Real(ty)],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<Vec<u8>> {
        let regular = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });

        let stamped: Vec<(u32, Vec<Operation>)> = std::mem::take(&mut self.ops).into_iter().collect();
        for (page, page_ops) in stamped {
            let page_id = *self
                .pages
                .get(&page)
                .ok_or_else(|| pdf_err(&self.path, format!("template has no page {page}")))?;
            self.register_fonts(page_id, regular, bold)?;

            let mut operations = vec![
                Operation::new("q", vec![]),
                Operation::new("rg", vec![0.into(), 0.into(), 0.into()]),
            ];
            operations.extend(page_ops);
            operations.push(Operation::new("Q", vec![]));

            let overlay = Content { operations }
                .encode()
                .map_err(|e| pdf_err(&self.path, e))?;
            let mut content = self
                .doc
                .get_page_content(page_id)
                .map_err(|e| pdf_err(&self.path, e))?;
            content.push(b'\n');
            content.extend(overlay);
            self.doc
                .change_page_content(page_id, content)
                .map_err(|e| pdf_err(&self.path, e))?;
        }

        let mut out = Vec::new();
        self.doc
            .save_to(&mut out)
            .map_err(|e| pdf_err(&self.path, e))?;
        Ok(out)
    }
}

fn pdf_err(path: &Path, err: impl std::fmt::Display) -> InvoiceError {
    InvoiceError::Pdf {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Walk the Parent chain for attributes that may be inherited from the
/// page tree (Resources, MediaBox).
fn resolve_inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let dict = doc.get_dictionary(id).ok()?;
        if let Ok(obj) = dict.get(key) {
            return Some(obj.clone());
        }
        current = dict.get(b"Parent").ok().and_then(|o| o.as_reference().ok());
    }
    None
}

fn page_height(doc: &Document, page_id: ObjectId) -> f32 {
    if let Some(obj) = resolve_inherited(doc, page_id, b"MediaBox") {
        let arr = match obj {
            Object::Array(a) => Some(a),
            Object::Reference(id) => doc
                .get_object(id)
                .ok()
                .and_then(|o| o.as_array().ok().cloned()),
            _ => None,
        };
        if let Some(arr) = arr {
            if arr.len() == 4 {
                if let (Some(y0), Some(y1)) = (number(&arr[1]), number(&arr[3])) {
                    return y1 - y0;
                }
            }
        }
    }
    // A4 fallback for templates missing a MediaBox
    842.0
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_ADVANCE
}

/// Stamped strings carry currency symbols outside ASCII; the fonts are
/// registered with WinAnsiEncoding, so map to Latin-1 bytes.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code < 256 {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}
