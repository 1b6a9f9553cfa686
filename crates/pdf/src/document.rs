use crate::canvas::{Canvas, Color, Rect, TextStyle, TOTAL_PAGES};
use crate::error::{PdfError, Result};
use crate::layout::Alignment;
use crate::metrics::{FontWeight, Helvetica, TextMetrics};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

#[derive(Debug, Clone)]
enum DrawOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        style: TextStyle,
    },
    Rect {
        rect: Rect,
        color: Color,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: Color,
        width: f32,
    },
}

/// [`Canvas`] backed by lopdf, using the standard Helvetica fonts.
///
/// Draw calls are recorded per page and turned into content streams by
/// [`Canvas::finish`], which is also where [`TOTAL_PAGES`] is resolved.
#[derive(Debug, Clone)]
pub struct PdfCanvas {
    width: f32,
    height: f32,
    title: Option<String>,
    pages: Vec<Vec<DrawOp>>,
}

impl PdfCanvas {
    /// Create a canvas whose pages are `width` × `height` points
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            title: None,
            pages: vec![Vec::new()],
        }
    }

    /// Set the document title stored in the PDF info dictionary
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }

    /// Flip a top-left based y coordinate into PDF user space
    fn flip(&self, y: f32) -> f32 {
        self.height - y
    }

    fn page_operations(&self, ops: &[DrawOp], total_pages: usize) -> Vec<Operation> {
        let total = total_pages.to_string();
        let mut operations = Vec::new();

        for op in ops {
            match op {
                DrawOp::Text { text, x, y, style } => {
                    let text = text.replace(TOTAL_PAGES, &total);
                    let width = self.text_width(&text, style.weight, style.size);
                    let left = match style.align {
                        Alignment::Left => *x,
                        Alignment::Center => x - width / 2.0,
                        Alignment::Right => x - width,
                    };
                    let font = match style.weight {
                        FontWeight::Regular => REGULAR_FONT,
                        FontWeight::Bold => BOLD_FONT,
                    };
                    let [r, g, b] = style.color.components();

                    operations.push(Operation::new("BT", vec![]));
                    operations.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
                    operations.push(Operation::new("Tf", vec![font.into(), style.size.into()]));
                    operations.push(Operation::new("Td", vec![left.into(), self.flip(*y).into()]));
                    operations.push(Operation::new(
                        "Tj",
                        vec![Object::String(encode_win_ansi(&text), StringFormat::Literal)],
                    ));
                    operations.push(Operation::new("ET", vec![]));
                }
                DrawOp::Rect { rect, color } => {
                    let [r, g, b] = color.components();
                    operations.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
                    operations.push(Operation::new(
                        "re",
                        vec![
                            rect.x.into(),
                            self.flip(rect.y + rect.height).into(),
                            rect.width.into(),
                            rect.height.into(),
                        ],
                    ));
                    operations.push(Operation::new("f", vec![]));
                }
                DrawOp::Line {
                    from,
                    to,
                    color,
                    width,
                } => {
                    let [r, g, b] = color.components();
                    operations.push(Operation::new("RG", vec![r.into(), g.into(), b.into()]));
                    operations.push(Operation::new("w", vec![(*width).into()]));
                    operations.push(Operation::new("m", vec![from.0.into(), self.flip(from.1).into()]));
                    operations.push(Operation::new("l", vec![to.0.into(), self.flip(to.1).into()]));
                    operations.push(Operation::new("S", vec![]));
                }
            }
        }

        operations
    }
}

impl TextMetrics for PdfCanvas {
    fn text_width(&self, text: &str, weight: FontWeight, font_size: f32) -> f32 {
        Helvetica.text_width(text, weight, font_size)
    }
}

impl Canvas for PdfCanvas {
    fn page_width(&self) -> f32 {
        self.width
    }

    fn page_height(&self) -> f32 {
        self.height
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.pages.len()
    }

    fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(DrawOp::Rect { rect, color });
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
        self.push(DrawOp::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn finish(self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(PdfError::EmptyDocument);
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => regular_id,
                BOLD_FONT => bold_id,
            },
        });

        let total_pages = self.pages.len();
        let mut kids: Vec<Object> = Vec::with_capacity(total_pages);
        for ops in &self.pages {
            let content = Content {
                operations: self.page_operations(ops, total_pages),
            };
            let encoded = content
                .encode()
                .map_err(|e| PdfError::EncodeError(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total_pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), self.width.into(), self.height.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Producer" => Object::string_literal("finreport"),
        };
        if let Some(title) = &self.title {
            info.set("Title", Object::String(encode_win_ansi(title), StringFormat::Literal));
        }
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);

        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| PdfError::WriteError(e.to_string()))?;

        tracing::debug!(pages = total_pages, bytes = bytes.len(), "Finalized PDF document");
        Ok(bytes)
    }
}

/// Encode text for the WinAnsi-encoded base fonts.
///
/// Latin-1 maps directly; common typographic punctuation uses its WinAnsi
/// slot; anything else becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_strings(doc: &Document, page: u32) -> Vec<String> {
        let pages = doc.get_pages();
        let content = doc.get_page_content(pages[&page]).unwrap();
        Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Abc 1"), b"Abc 1".to_vec());
        assert_eq!(encode_win_ansi("\u{20AC}5"), vec![0x80, b'5']);
        assert_eq!(encode_win_ansi("\u{e9}"), vec![0xE9]);
        assert_eq!(encode_win_ansi("\u{4e2d}"), vec![b'?']);
    }

    #[test]
    fn test_finish_produces_loadable_pdf() {
        let mut canvas = PdfCanvas::new(595.28, 841.89).with_title("Report");
        canvas.draw_text("Hello", 20.0, 40.0, TextStyle::new(12.0));
        canvas.add_page();
        canvas.draw_text(
            &format!("Page 2 of {TOTAL_PAGES}"),
            300.0,
            830.0,
            TextStyle::new(8.0).align(Alignment::Center),
        );
        canvas.fill_rect(
            Rect {
                x: 10.0,
                y: 10.0,
                width: 50.0,
                height: 12.0,
            },
            Color::HEADER,
        );

        let bytes = canvas.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();

        assert_eq!(doc.get_pages().len(), 2);
        assert_eq!(page_strings(&doc, 1), vec!["Hello"]);
        assert_eq!(page_strings(&doc, 2), vec!["Page 2 of 2"]);
    }
}
