//! Document writer seam — turns the plain-text CV into a binary document.
//!
//! Assembly is CPU-bound, so callers run `render` on the blocking pool.
//! The trait mirrors the pluggable-scorer seam: `AppState` carries an
//! `Arc<dyn DocumentWriter>` swapped at startup.

use anyhow::Result;
use docx_rs::{Docx, Paragraph, Run};

/// Section-heading color (dark blue).
const HEADING_COLOR: &str = "00008B";
/// Heading font size in half-points (14pt).
const HEADING_SIZE: usize = 28;

pub trait DocumentWriter: Send + Sync {
    /// Renders plain CV text into a binary document stream.
    fn render(&self, text: &str) -> Result<Vec<u8>>;
}

/// Default writer producing a DOCX document.
pub struct DocxWriter;

impl DocumentWriter for DocxWriter {
    fn render(&self, text: &str) -> Result<Vec<u8>> {
        let mut docx = Docx::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let paragraph = if is_heading(line) {
                Paragraph::new().add_run(
                    Run::new()
                        .add_text(line.trim_end_matches(':'))
                        .bold()
                        .size(HEADING_SIZE)
                        .color(HEADING_COLOR),
                )
            } else {
                Paragraph::new().add_run(Run::new().add_text(line))
            };
            docx = docx.add_paragraph(paragraph);
        }

        let mut cursor = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

/// A line is a section heading when it ends with a colon or is written in
/// ALL CAPS (at least one letter, none lowercase).
fn is_heading(line: &str) -> bool {
    if line.ends_with(':') {
        return true;
    }
    let mut has_alpha = false;
    for c in line.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if c.is_lowercase() {
                return false;
            }
        }
    }
    has_alpha
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_caps_line_is_heading() {
        assert!(is_heading("WORK EXPERIENCE"));
        assert!(is_heading("SKILLS"));
    }

    #[test]
    fn test_colon_line_is_heading() {
        assert!(is_heading("Education:"));
    }

    #[test]
    fn test_body_line_is_not_heading() {
        assert!(!is_heading("Led a team of five engineers."));
    }

    #[test]
    fn test_digits_only_line_is_not_heading() {
        assert!(!is_heading("2019 - 2023"));
    }

    #[test]
    fn test_render_produces_nonempty_docx() {
        let writer = DocxWriter;
        let bytes = writer
            .render("JOHN DOE\nProfessional Summary:\nBuilt backend services.\n\nSKILLS\nRust, SQL")
            .unwrap();
        // DOCX files are zip archives: PK magic.
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }
}
