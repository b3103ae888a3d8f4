//! Field Normalizer: maps extracted entity spans onto an `ApplicantRecord`.
//!
//! Scalar fields (name, email, phone) take the first span nearest the document start.
//! Experience entries are assembled from title/organization/date spans inside the
//! experience section. Spans whose label maps to `RecordField::Unmapped` are dropped.

pub mod contact;
pub mod dates;
pub mod sections;

use std::sync::Arc;

use tracing::trace;

use crate::extraction::engine::is_word_bounded;
use crate::extraction::labels::{EntitySpan, RecordField};
use crate::extraction::model::{LanguageModel, ModelError};
use crate::models::applicant::{ApplicantId, ApplicantRecord, ExperienceEntry};
use crate::models::document::{NormalizedText, RawDocument};
use crate::normalizer::contact::ContactCleaner;
use crate::normalizer::dates::parse_date_range;
use crate::normalizer::sections::find_experience_section;

/// Upper bound on the stored experience section text.
const EXPERIENCE_SUMMARY_MAX_CHARS: usize = 2000;

pub struct FieldNormalizer {
    model: Arc<LanguageModel>,
    contact: ContactCleaner,
}

impl FieldNormalizer {
    pub fn new(model: Arc<LanguageModel>) -> Result<Self, ModelError> {
        Ok(Self {
            model,
            contact: ContactCleaner::new()?,
        })
    }

    pub fn normalize(
        &self,
        doc: &RawDocument,
        text: &NormalizedText,
        spans: &[EntitySpan],
    ) -> ApplicantRecord {
        let text = text.as_str();
        let mut record = ApplicantRecord::new(
            ApplicantId::from_content(doc.content()),
            doc.path().to_path_buf(),
        );

        for span in spans {
            match span.label.record_field() {
                RecordField::Name => {
                    if record.name.is_none() {
                        record.name = Some(span.text.trim().to_string());
                    }
                }
                RecordField::Email => {
                    if record.contact.email.is_none() {
                        record.contact.email = Some(self.contact.clean_email(&span.text));
                    }
                }
                RecordField::Phone => {
                    if record.contact.phone.is_none() {
                        record.contact.phone = Some(self.contact.clean_phone(&span.text));
                    }
                }
                RecordField::Link => {
                    if !record.contact.links.contains(&span.text) {
                        record.contact.links.push(span.text.clone());
                    }
                }
                RecordField::Skill => {
                    record.skills.insert(span.canonical().to_string());
                }
                RecordField::StatedYears => {
                    if let Some(years) = span.value.as_deref().and_then(|v| v.parse::<u32>().ok()) {
                        record.stated_years = Some(record.stated_years.map_or(years, |y| y.max(years)));
                    }
                }
                // Experience fields are grouped in a second pass below.
                RecordField::ExperienceTitle
                | RecordField::ExperienceOrganization
                | RecordField::ExperienceDates => {}
                RecordField::Unmapped => {
                    trace!("Dropping unmapped {:?} span '{}'", span.label, span.text);
                }
            }
        }

        let section = find_experience_section(text, &self.model);
        let in_scope: Vec<&EntitySpan> = spans
            .iter()
            .filter(|s| section.map_or(true, |sec| sec.contains(s.start, s.end)))
            .collect();
        record.experience = group_experience(&in_scope);

        record.experience_summary = section
            .map(|sec| text[sec.start..sec.end].trim())
            .filter(|body| !body.is_empty())
            .map(|body| body.chars().take(EXPERIENCE_SUMMARY_MAX_CHARS).collect());

        record
    }
}

/// Walks spans in document order. A second title, organization or date range on the
/// current entry closes it and opens the next one.
fn group_experience(spans: &[&EntitySpan]) -> Vec<ExperienceEntry> {
    let mut entries = Vec::new();
    let mut current = ExperienceEntry::default();

    for span in spans {
        match span.label.record_field() {
            RecordField::ExperienceTitle => {
                if current.title.is_some() {
                    flush(&mut entries, &mut current);
                }
                current.title = Some(span.text.clone());
            }
            RecordField::ExperienceOrganization => {
                if current.organization.is_some() {
                    flush(&mut entries, &mut current);
                }
                current.organization = Some(span.text.clone());
            }
            RecordField::ExperienceDates => {
                let Some(range) = parse_date_range(&span.text) else {
                    continue;
                };
                if current.dates.is_some() {
                    flush(&mut entries, &mut current);
                }
                current.dates = Some(range);
            }
            _ => {}
        }
    }
    flush(&mut entries, &mut current);
    entries
}

fn flush(entries: &mut Vec<ExperienceEntry>, current: &mut ExperienceEntry) {
    let entry = std::mem::take(current);
    if entry.title.is_some() || entry.organization.is_some() {
        entries.push(entry);
    }
}

/// Case-insensitive, whole-word containment check used to ground skills in the source text.
pub fn contains_term(text: &str, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return false;
    }
    let haystack = text.to_ascii_lowercase();
    let needle = term.to_ascii_lowercase();
    haystack
        .match_indices(&needle)
        .any(|(start, m)| is_word_bounded(&haystack, start, start + m.len()))
}
