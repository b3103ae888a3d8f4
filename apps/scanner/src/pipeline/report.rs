use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::matching::MatchResult;
use crate::models::applicant::ApplicantRecord;

/// A per-document failure or warning, keyed by the file it concerns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentIssue {
    pub source: PathBuf,
    pub message: String,
}

impl DocumentIssue {
    pub fn new(source: &Path, message: impl Into<String>) -> Self {
        Self {
            source: source.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Everything one run produced. Serialized as JSON to stdout, or to a file when one
/// is configured.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub model: String,
    pub job_title: Option<String>,
    pub processed: Vec<ApplicantRecord>,
    pub failures: Vec<DocumentIssue>,
    pub warnings: Vec<DocumentIssue>,
    pub ranking: Vec<MatchResult>,
    pub persisted: usize,
}

impl BatchReport {
    pub fn empty(model: String) -> Self {
        Self {
            model,
            job_title: None,
            processed: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
            ranking: Vec::new(),
            persisted: 0,
        }
    }

    /// Writes the report as pretty JSON to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}
