//! Enrichment Adapter: asks a generative model for a second opinion on a record
//! and merges the answer additively.
//!
//! The merge never removes or overwrites an extracted value. Scalar fields are only
//! filled when empty, and suggested skills are only accepted when the source text
//! actually mentions them.

pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::enrichment::prompts::{RESUME_ENRICH_PROMPT, RESUME_ENRICH_SYSTEM};
use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{LlmClient, LlmError, MODEL};
use crate::models::applicant::{ApplicantRecord, EnrichmentNotes};
use crate::normalizer::contains_term;

/// Resume text beyond this many characters is not sent to the service.
const MAX_PROMPT_TEXT_CHARS: usize = 12_000;
/// A suggested experience section shorter than this is treated as noise.
const MIN_EXPERIENCE_WORDS: usize = 10;

/// What the service proposes for one resume. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentSuggestion {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub summary: String,
}

#[async_trait]
pub trait Enricher: Send + Sync {
    /// Identifier recorded in `EnrichmentNotes::model`.
    fn backend(&self) -> &str;

    async fn suggest(
        &self,
        record: &ApplicantRecord,
        text: &str,
    ) -> Result<EnrichmentSuggestion, LlmError>;
}

/// Enricher backed by the generative-language `LlmClient`.
pub struct LlmEnricher {
    llm: LlmClient,
}

impl LlmEnricher {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Enricher for LlmEnricher {
    fn backend(&self) -> &str {
        MODEL
    }

    async fn suggest(
        &self,
        record: &ApplicantRecord,
        text: &str,
    ) -> Result<EnrichmentSuggestion, LlmError> {
        let known_skills = if record.skills.is_empty() {
            "none".to_string()
        } else {
            record.skills.iter().cloned().collect::<Vec<_>>().join(", ")
        };
        let resume_text: String = text.chars().take(MAX_PROMPT_TEXT_CHARS).collect();
        let prompt = RESUME_ENRICH_PROMPT
            .replace("{known_skills}", &known_skills)
            .replace("{resume_text}", &resume_text);

        self.llm
            .call_json::<EnrichmentSuggestion>(&prompt, &system_prompt())
            .await
    }
}

fn system_prompt() -> String {
    format!("{RESUME_ENRICH_SYSTEM} {JSON_ONLY_SYSTEM} {GROUNDING_INSTRUCTION}")
}

/// Applies a suggestion to `record` without losing anything already extracted.
pub fn merge(
    record: &mut ApplicantRecord,
    suggestion: EnrichmentSuggestion,
    text: &str,
    backend: &str,
) {
    let mut notes = EnrichmentNotes {
        model: backend.to_string(),
        ..EnrichmentNotes::default()
    };

    let name = suggestion.name.trim();
    if record.name.is_none() && is_plausible_name(name) {
        record.name = Some(name.to_string());
        notes.filled_fields.push("name".to_string());
    }

    let email = suggestion.email.trim().to_lowercase();
    if record.contact.email.is_none() && is_plausible_email(&email) {
        record.contact.email = Some(email);
        notes.filled_fields.push("email".to_string());
    }

    let phone = suggestion.phone.split_whitespace().collect::<Vec<_>>().join(" ");
    if record.contact.phone.is_none() && digit_count(&phone) >= 9 {
        record.contact.phone = Some(phone);
        notes.filled_fields.push("phone".to_string());
    }

    for skill in suggestion.skills {
        let skill = skill.trim();
        if skill.is_empty() || !contains_term(text, skill) {
            continue;
        }
        let known = record.skills.iter().any(|s| s.eq_ignore_ascii_case(skill));
        if !known {
            record.skills.insert(skill.to_string());
            notes.added_skills.push(skill.to_string());
        }
    }

    let experience = suggestion.experience.trim();
    if record.experience_summary.is_none()
        && experience.split_whitespace().count() > MIN_EXPERIENCE_WORDS
    {
        record.experience_summary = Some(experience.to_string());
        notes.filled_fields.push("experience_summary".to_string());
    }

    let summary = suggestion.summary.trim();
    if !summary.is_empty() {
        notes.summary = Some(summary.to_string());
    }

    record.enrichment = Some(notes);
}

/// 2–4 words, each purely alphabetic.
fn is_plausible_name(name: &str) -> bool {
    let words: Vec<&str> = name.split_whitespace().collect();
    (2..=4).contains(&words.len())
        && words.iter().all(|w| w.chars().all(char::is_alphabetic))
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(char::is_ascii_digit).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::applicant::ApplicantId;
    use std::path::PathBuf;

    const TEXT: &str = "Jane Doe\njane@example.com\nSkills: Python, Go, Terraform and Kubernetes\n";

    fn record() -> ApplicantRecord {
        let mut record = ApplicantRecord::new(ApplicantId::from_content(TEXT.as_bytes()), PathBuf::from("jane.txt"));
        record.skills.insert("Go".to_string());
        record.skills.insert("Python".to_string());
        record.contact.email = Some("jane@example.com".to_string());
        record
    }

    #[test]
    fn test_merge_is_superset_of_original() {
        let original = record();
        let mut merged = original.clone();
        merge(
            &mut merged,
            EnrichmentSuggestion {
                name: "Jane Doe".to_string(),
                email: "other@example.com".to_string(),
                skills: vec!["terraform".to_string(), "python".to_string()],
                ..Default::default()
            },
            TEXT,
            MODEL,
        );

        assert!(original.skills.is_subset(&merged.skills));
        assert_eq!(merged.contact.email, original.contact.email);
        assert_eq!(merged.name.as_deref(), Some("Jane Doe"));
        assert!(merged.skills.contains("terraform"));
        // "python" is already known under another spelling.
        assert_eq!(merged.skills.len(), 3);

        let notes = merged.enrichment.unwrap();
        assert_eq!(notes.model, "gemini-2.0-flash");
        assert_eq!(notes.added_skills, vec!["terraform".to_string()]);
        assert_eq!(notes.filled_fields, vec!["name".to_string()]);
    }

    #[test]
    fn test_merge_rejects_skills_absent_from_text() {
        let mut merged = record();
        merge(
            &mut merged,
            EnrichmentSuggestion {
                skills: vec!["Leadership".to_string(), "Kubernetes".to_string()],
                ..Default::default()
            },
            TEXT,
            MODEL,
        );
        assert!(!merged.skills.contains("Leadership"));
        assert!(merged.skills.contains("Kubernetes"));
    }

    #[test]
    fn test_merge_never_overwrites_name() {
        let mut merged = record();
        merged.name = Some("Jane Doe".to_string());
        merge(
            &mut merged,
            EnrichmentSuggestion {
                name: "Janet Dough".to_string(),
                ..Default::default()
            },
            TEXT,
            MODEL,
        );
        assert_eq!(merged.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_merge_rejects_implausible_scalars() {
        let mut merged = record();
        merged.contact.email = None;
        merge(
            &mut merged,
            EnrichmentSuggestion {
                name: "Candidate #42".to_string(),
                email: "not an email".to_string(),
                phone: "12345".to_string(),
                experience: "Too short".to_string(),
                ..Default::default()
            },
            TEXT,
            MODEL,
        );
        assert!(merged.name.is_none());
        assert!(merged.contact.email.is_none());
        assert!(merged.contact.phone.is_none());
        assert!(merged.experience_summary.is_none());
        assert!(merged.enrichment.unwrap().filled_fields.is_empty());
    }

    #[test]
    fn test_merge_fills_empty_experience_and_keeps_summary() {
        let mut merged = record();
        merge(
            &mut merged,
            EnrichmentSuggestion {
                phone: "+1 (555) 123-4567".to_string(),
                experience: "Senior engineer at Acme building payment services in Go and Python since 2019"
                    .to_string(),
                summary: "Backend engineer focused on payments.".to_string(),
                ..Default::default()
            },
            TEXT,
            MODEL,
        );
        assert_eq!(merged.contact.phone.as_deref(), Some("+1 (555) 123-4567"));
        assert!(merged.experience_summary.unwrap().starts_with("Senior engineer"));
        let notes = merged.enrichment.unwrap();
        assert_eq!(notes.summary.as_deref(), Some("Backend engineer focused on payments."));
        assert_eq!(
            notes.filled_fields,
            vec!["phone".to_string(), "experience_summary".to_string()]
        );
    }

    #[test]
    fn test_system_prompt_demands_grounded_json() {
        let system = system_prompt();
        assert!(system.starts_with(RESUME_ENRICH_SYSTEM));
        assert!(system.contains("valid JSON only"));
        assert!(system.contains("appear verbatim"));
    }

    #[test]
    fn test_suggestion_tolerates_missing_fields() {
        let suggestion: EnrichmentSuggestion =
            serde_json::from_str(r#"{"skills": ["Rust"]}"#).unwrap();
        assert_eq!(suggestion.skills, vec!["Rust".to_string()]);
        assert!(suggestion.name.is_empty());
    }
}
