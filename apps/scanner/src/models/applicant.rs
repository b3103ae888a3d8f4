use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for content-derived applicant ids (UUID v5), so identical files map to identical ids.
const APPLICANT_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a7e_94b3_4d0a_8e55_1b2c_3d4e_5f60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(Uuid);

impl ApplicantId {
    pub fn from_content(content: &[u8]) -> Self {
        Self(Uuid::new_v5(&APPLICANT_NAMESPACE, content))
    }
}

impl std::fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub links: Vec<String>,
}

/// Inclusive month-granular date range. `end == None` means the position is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    let total = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    total.max(0) as u32
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: Option<String>,
    pub organization: Option<String>,
    pub dates: Option<DateRange>,
}

/// What the enrichment service contributed on top of extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentNotes {
    pub model: String,
    pub summary: Option<String>,
    pub added_skills: Vec<String>,
    pub filled_fields: Vec<String>,
}

/// Structured applicant data produced by the normalizer and optionally enriched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub applicant_id: ApplicantId,
    pub source: PathBuf,
    pub name: Option<String>,
    pub contact: ContactInfo,
    pub experience: Vec<ExperienceEntry>,
    pub skills: BTreeSet<String>,
    pub stated_years: Option<u32>,
    pub experience_summary: Option<String>,
    pub enrichment: Option<EnrichmentNotes>,
}

impl ApplicantRecord {
    pub fn new(applicant_id: ApplicantId, source: PathBuf) -> Self {
        Self {
            applicant_id,
            source,
            name: None,
            contact: ContactInfo::default(),
            experience: Vec::new(),
            skills: BTreeSet::new(),
            stated_years: None,
            experience_summary: None,
            enrichment: None,
        }
    }

    /// Years of experience: the larger of the stated figure and the dated experience entries.
    ///
    /// Overlapping date ranges are merged so concurrent roles are not double counted.
    pub fn experience_years(&self, as_of: NaiveDate) -> f64 {
        let mut ranges: Vec<(NaiveDate, NaiveDate)> = self
            .experience
            .iter()
            .filter_map(|e| e.dates)
            .map(|d| (d.start, d.end.unwrap_or(as_of)))
            .filter(|(start, end)| start <= end)
            .collect();
        ranges.sort();

        let mut merged: Vec<(NaiveDate, NaiveDate)> = Vec::new();
        for (start, end) in ranges {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }

        let months: u32 = merged
            .iter()
            .map(|(start, end)| months_between(*start, *end))
            .sum();
        let dated = months as f64 / 12.0;
        let stated = self.stated_years.map(f64::from).unwrap_or(0.0);
        dated.max(stated)
    }

    /// Skills joined the way the store persists them.
    pub fn skills_csv(&self) -> Option<String> {
        if self.skills.is_empty() {
            None
        } else {
            Some(self.skills.iter().cloned().collect::<Vec<_>>().join(", "))
        }
    }
}
