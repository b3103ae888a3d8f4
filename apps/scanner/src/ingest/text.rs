use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use crate::errors::DocumentError;
use crate::models::document::{DocumentFormat, NormalizedText, RawDocument};

/// Converts a loaded document into clean plain text.
pub fn normalize_document(doc: &RawDocument) -> Result<NormalizedText, DocumentError> {
    let raw = match doc.format() {
        DocumentFormat::PlainText => String::from_utf8_lossy(doc.content()).into_owned(),
        DocumentFormat::Pdf => extract_pdf_text(doc)?,
        DocumentFormat::Unsupported => {
            return Err(DocumentError::UnsupportedFormat(doc.display_name()));
        }
    };

    let text = clean_text(&raw);
    if text.is_empty() {
        return Err(DocumentError::EmptyDocument);
    }
    Ok(NormalizedText::new(text))
}

/// pdf-extract panics on some malformed fonts and resource dictionaries; those
/// documents fail like any other unreadable file.
fn extract_pdf_text(doc: &RawDocument) -> Result<String, DocumentError> {
    let content = doc.content();
    match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(content))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(DocumentError::Unreadable(format!("PDF text extraction failed: {e}"))),
        Err(panic_payload) => {
            let panic_msg = if let Some(s) = panic_payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            warn!("PDF extractor panicked on {}: {}", doc.display_name(), panic_msg);
            Err(DocumentError::Unreadable(format!(
                "PDF text extraction panicked: {panic_msg}"
            )))
        }
    }
}

/// Folds typographic characters, strips control characters, collapses whitespace
/// within lines and squeezes runs of blank lines down to one.
pub fn clean_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let mut folded = String::with_capacity(unified.len());
    for c in unified.chars() {
        match c {
            '\u{FB01}' => folded.push_str("fi"),
            '\u{FB02}' => folded.push_str("fl"),
            '\u{2018}' | '\u{2019}' => folded.push('\''),
            '\u{201C}' | '\u{201D}' => folded.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => folded.push('-'),
            '\u{00A0}' | '\t' => folded.push(' '),
            '\n' => folded.push('\n'),
            c if c.is_control() => {}
            c => folded.push(c),
        }
    }

    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0;
    for line in folded.split('\n') {
        let squeezed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if squeezed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(squeezed);
    }

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_clean_text_folds_typography() {
        let cleaned = clean_text("Jan 2020 \u{2013} Present\r\n\u{201C}Of\u{FB01}ce\u{201D}");
        assert_eq!(cleaned, "Jan 2020 - Present\n\"Office\"");
    }

    #[test]
    fn test_clean_text_collapses_whitespace_and_blank_lines() {
        let cleaned = clean_text("  Jane\t  Doe  \n\n\n\nSkills:   Rust\n");
        assert_eq!(cleaned, "Jane Doe\n\nSkills: Rust");
    }

    #[test]
    fn test_clean_text_strips_control_chars() {
        assert_eq!(clean_text("Rust\u{0007}acean\u{0000}"), "Rustacean");
    }

    #[test]
    fn test_normalize_plain_text() {
        let doc = RawDocument::new(PathBuf::from("jane.txt"), b"Jane Doe\r\nPython".to_vec());
        let text = normalize_document(&doc).unwrap();
        assert_eq!(text.as_str(), "Jane Doe\nPython");
    }

    #[test]
    fn test_whitespace_only_document_is_empty() {
        let doc = RawDocument::new(PathBuf::from("blank.txt"), b" \n\t\n ".to_vec());
        assert_eq!(normalize_document(&doc).unwrap_err(), DocumentError::EmptyDocument);
    }

    #[test]
    fn test_pdf_with_undefined_font_is_unreadable() {
        let doc = RawDocument::new(PathBuf::from("broken.pdf"), pdf_with_undefined_font());
        assert!(matches!(
            normalize_document(&doc),
            Err(DocumentError::Unreadable(_))
        ));
    }

    #[test]
    fn test_truncated_pdf_is_unreadable() {
        let doc = RawDocument::new(PathBuf::from("cut.pdf"), b"%PDF-1.4\n1 0 obj".to_vec());
        assert!(matches!(
            normalize_document(&doc),
            Err(DocumentError::Unreadable(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let doc = RawDocument::new(PathBuf::from("odd.txt"), vec![b'R', b'u', 0xFF, b's', b't']);
        let text = normalize_document(&doc).unwrap();
        assert!(text.as_str().starts_with("Ru"));
    }
}

/// A single-page PDF whose content stream selects font `/F9` while the page's
/// `/Resources` dictionary is empty.
#[cfg(test)]
pub(crate) fn pdf_with_undefined_font() -> Vec<u8> {
    let content = "BT /F9 12 Tf 72 720 Td (Jane Doe) Tj ET";
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << >> /Contents 4 0 R >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }
    let xref_at = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        pdf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    pdf.into_bytes()
}
