use serde::{Deserialize, Serialize};

/// Every label the extraction engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLabel {
    Person,
    Organization,
    Date,
    Skill,
    Email,
    Phone,
    JobTitle,
    Url,
    Duration,
    Location,
}

/// Where a span lands in an `ApplicantRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Name,
    Email,
    Phone,
    Link,
    Skill,
    StatedYears,
    ExperienceTitle,
    ExperienceOrganization,
    ExperienceDates,
    Unmapped,
}

impl EntityLabel {
    /// Total mapping from label to record field. Labels with no home are `Unmapped`.
    pub fn record_field(self) -> RecordField {
        match self {
            EntityLabel::Person => RecordField::Name,
            EntityLabel::Email => RecordField::Email,
            EntityLabel::Phone => RecordField::Phone,
            EntityLabel::Url => RecordField::Link,
            EntityLabel::Skill => RecordField::Skill,
            EntityLabel::Duration => RecordField::StatedYears,
            EntityLabel::JobTitle => RecordField::ExperienceTitle,
            EntityLabel::Organization => RecordField::ExperienceOrganization,
            EntityLabel::Date => RecordField::ExperienceDates,
            EntityLabel::Location => RecordField::Unmapped,
        }
    }
}

/// A labelled byte range of the normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
    /// Canonical form where one exists (lexicon spelling for skills, year count for durations).
    pub value: Option<String>,
}

impl EntitySpan {
    pub fn new(text: &str, label: EntityLabel, start: usize, end: usize) -> Self {
        Self {
            text: text[start..end].to_string(),
            label,
            start,
            end,
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn overlaps(&self, other: &EntitySpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `other` lies entirely within this span.
    pub fn contains(&self, other: &EntitySpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Canonical value if present, otherwise the surface text.
    pub fn canonical(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.text)
    }
}
