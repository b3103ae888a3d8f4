use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Detected on-disk format of a resume file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Unsupported,
}

impl DocumentFormat {
    /// Detects the format from the file extension, falling back to the PDF magic bytes.
    pub fn detect(path: &Path, content: &[u8]) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("txt" | "text" | "md") => DocumentFormat::PlainText,
            Some("pdf") => DocumentFormat::Pdf,
            _ if content.starts_with(b"%PDF-") => DocumentFormat::Pdf,
            _ => DocumentFormat::Unsupported,
        }
    }
}

/// A resume file as read from disk. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct RawDocument {
    path: PathBuf,
    content: Vec<u8>,
    format: DocumentFormat,
}

impl RawDocument {
    pub fn new(path: PathBuf, content: Vec<u8>) -> Self {
        let format = DocumentFormat::detect(&path, &content);
        Self {
            path,
            content,
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// File name used in logs and reports.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Plain text derived from a `RawDocument`, ready for entity extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
