//! Minimal A4 text layout on top of `printpdf`.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::errors::{BusyBeeError, Result};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const BOTTOM: f32 = 22.0;

/// Points to millimetres, for line spacing.
fn pt_to_mm(pt: f32) -> f32 {
    pt * 0.3528
}

/// Writes lines top to bottom, starting new pages as needed.
pub struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PdfWriter {
    pub fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| BusyBeeError::render(format!("Failed to load font: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| BusyBeeError::render(format!("Failed to load font: {e}")))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    pub fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure_room(&mut self, size: f32) {
        if self.y - pt_to_mm(size) < BOTTOM {
            self.new_page();
        }
    }

    fn write(&mut self, text: &str, size: f32, bold: bool) {
        self.ensure_room(size);
        self.y -= pt_to_mm(size);
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= pt_to_mm(size * 0.45);
    }

    pub fn title(&mut self, text: &str) {
        self.write(text, 16.0, true);
        self.gap(2.0);
    }

    pub fn heading(&mut self, text: &str) {
        self.gap(3.0);
        self.write(text, 12.0, true);
    }

    pub fn line(&mut self, text: &str) {
        self.write(text, 10.0, false);
    }

    /// Wraps long text on word boundaries.
    pub fn paragraph(&mut self, text: &str) {
        for line in wrap_text(text, 95) {
            self.line(&line);
        }
    }

    pub fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| BusyBeeError::render(format!("Failed to write PDF: {e}")))
    }
}

/// Greedy word wrap at `width` characters; over-long words are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            lines.push(head);
        }
        if current.is_empty() {
            current = word;
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        assert_eq!(
            wrap_text("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
        assert_eq!(wrap_text("abcdefghijkl", 5), vec!["abcde", "fghij", "kl"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn test_writer_produces_pdf_bytes() {
        let mut pdf = PdfWriter::new("Test").unwrap();
        pdf.title("Student Report");
        for i in 0..120 {
            pdf.line(&format!("Line {i}"));
        }
        pdf.paragraph(&"word ".repeat(60));
        let bytes = pdf.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
