//! Language model: the versioned lexicon and gazetteers the extraction engine runs on.
//!
//! Loaded exactly once at startup and shared as `Arc<LanguageModel>`. Each worker builds
//! its own `Extractor` (compiled matchers) from the shared handle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model file {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("failed to compile matcher '{name}': {reason}")]
    Matcher { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillTerm {
    pub name: String,
    /// Short or ambiguous terms ("Go", "AWS") only match with exact casing.
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageModel {
    pub name: String,
    pub version: String,
    pub skills: Vec<SkillTerm>,
    pub title_keywords: Vec<String>,
    pub organization_suffixes: Vec<String>,
    #[serde(default)]
    pub organization_prefixes: Vec<String>,
    pub section_headings: Vec<String>,
    pub experience_headings: Vec<String>,
    #[serde(default)]
    pub name_stopwords: Vec<String>,
    #[serde(default)]
    pub cities: Vec<String>,
}

impl LanguageModel {
    /// Loads and validates the model file. Any failure here is fatal for the run.
    pub fn load(path: &Path) -> Result<Arc<LanguageModel>, ModelError> {
        if !path.is_file() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json(&raw).map_err(|reason| ModelError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;

        info!(
            "Loaded language model {} ({} skills, {} title keywords)",
            model.tag(),
            model.skills.len(),
            model.title_keywords.len()
        );
        Ok(Arc::new(model))
    }

    pub fn from_json(raw: &str) -> Result<LanguageModel, String> {
        let model: LanguageModel = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.version.trim().is_empty() {
            return Err("model name and version must be set".to_string());
        }
        if self.skills.is_empty() {
            return Err("skill lexicon is empty".to_string());
        }
        if self.skills.iter().any(|s| s.name.trim().is_empty()) {
            return Err("skill lexicon contains a blank term".to_string());
        }
        if self.title_keywords.is_empty() {
            return Err("title keyword list is empty".to_string());
        }
        if self.experience_headings.is_empty() {
            return Err("experience heading list is empty".to_string());
        }
        Ok(())
    }

    /// `name@version`, recorded in reports so outputs can be tied to a model build.
    pub fn tag(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// True if `line` is a section heading ("Skills", "EDUCATION:", "Work Experience").
    pub fn is_section_heading(&self, line: &str) -> bool {
        let key = heading_key(line);
        !key.is_empty() && self.section_headings.iter().any(|h| h.eq_ignore_ascii_case(&key))
    }

    pub fn is_experience_heading(&self, line: &str) -> bool {
        let key = heading_key(line);
        !key.is_empty()
            && self
                .experience_headings
                .iter()
                .any(|h| h.eq_ignore_ascii_case(&key))
    }
}

fn heading_key(line: &str) -> String {
    line.trim()
        .trim_end_matches(':')
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub(crate) fn test_model() -> Arc<LanguageModel> {
    let raw = include_str!("../../../../models/en_resume_sm.json");
    Arc::new(LanguageModel::from_json(raw).expect("bundled model must be valid"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_model_is_valid() {
        let model = test_model();
        assert_eq!(model.tag(), "en_resume_sm@1.0.0");
        assert!(model.skills.iter().any(|s| s.name == "Python"));
    }

    #[test]
    fn test_missing_model_is_not_found() {
        let err = LanguageModel::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
    }

    #[test]
    fn test_invalid_model_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"name": "x", "version": "1"}"#).unwrap();
        let err = LanguageModel::load(&path).unwrap_err();
        assert!(matches!(err, ModelError::Invalid { .. }));
    }

    #[test]
    fn test_empty_skill_lexicon_is_rejected() {
        let raw = r#"{
            "name": "x", "version": "1", "skills": [],
            "title_keywords": ["Engineer"], "organization_suffixes": [],
            "section_headings": [], "experience_headings": ["experience"]
        }"#;
        assert!(LanguageModel::from_json(raw).unwrap_err().contains("skill lexicon"));
    }

    #[test]
    fn test_section_heading_detection() {
        let model = test_model();
        assert!(model.is_section_heading("EDUCATION"));
        assert!(model.is_section_heading("  Technical Skills:"));
        assert!(model.is_experience_heading("Work   Experience"));
        assert!(!model.is_section_heading("Built 3 services in Rust"));
        assert!(!model.is_section_heading(""));
    }
}
