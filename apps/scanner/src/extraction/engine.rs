//! Extraction engine: turns normalized resume text into typed entity spans.
//!
//! Pattern recognizers (email, phone, url, dates, durations) are fixed; lexicon
//! recognizers (skills, titles, organizations, cities) are compiled from the loaded
//! `LanguageModel`. Output is sorted and deduplicated, so identical text and model
//! always produce identical spans.

use std::sync::Arc;

use aho_corasick::{AhoCorasick, MatchKind};
use regex::Regex;

use crate::extraction::labels::{EntityLabel, EntitySpan};
use crate::extraction::model::{LanguageModel, ModelError};
use crate::models::document::NormalizedText;

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

/// Tried in order; later forms only when no earlier form matched anywhere.
const EMAIL_PATTERNS: &[&str] = &[
    r"[\w.-]+@[\w.-]+\.\w+",
    r"(?i)[\w.-]+\s*\[\s*at\s*\]\s*[\w.-]+\s*\[\s*dot\s*\]\s*\w+",
    r"(?i)[\w.-]+[ \t]+at[ \t]+[\w.-]+[ \t]+dot[ \t]+\w+",
    r"[\w.-]+[ \t]*@[ \t]*[\w.-]+[ \t]*\.[ \t]*\w+",
];
const PHONE_PATTERN: &str = r"(?:\+|\()?\d[\d \t().-]{8,20}\d";
const URL_PATTERN: &str = r"(?i)\b(?:https?://[^\s<>()]+|(?:www\.)?(?:linkedin\.com|github\.com|gitlab\.com)/[^\s<>()]+)";
const DURATION_PATTERN: &str = r"(?i)\b(\d{1,2})[ \t]*\+?[ \t]*(?:years?|yrs?)\b(?:[ \t]+of)?(?:[ \t]+(?:professional|industry|work|relevant))?[ \t]+(?:experience|exp)\b";
const LOCATION_PATTERN: &str = r"\b[A-Z][a-z]+(?:[ \t][A-Z][a-z]+)?,[ \t]?[A-Z]{2}\b";
const ORG_AFTER_AT_PATTERN: &str = r"(?:\bat|@)[ \t]+([A-Z][\w&'.-]*(?:[ \t]+[A-Z][\w&'.-]*){0,3})";

const PHONE_MIN_DIGITS: usize = 9;
const PHONE_MAX_DIGITS: usize = 15;
/// The top of the document is searched for the applicant's name before the rest.
const NAME_SEARCH_LINES: usize = 5;

/// A per-worker inference handle: the shared model plus this worker's compiled matchers.
pub struct Extractor {
    model: Arc<LanguageModel>,
    skills_folded: Option<(AhoCorasick, Vec<String>)>,
    skills_exact: Option<(AhoCorasick, Vec<String>)>,
    cities: Option<AhoCorasick>,
    emails: Vec<Regex>,
    phone: Regex,
    url: Regex,
    date_range: Regex,
    date_single: Regex,
    duration: Regex,
    title: Regex,
    org_suffix: Regex,
    org_prefix: Option<Regex>,
    org_after_at: Regex,
    location: Regex,
}

impl Extractor {
    pub fn new(model: Arc<LanguageModel>) -> Result<Self, ModelError> {
        let date_atom = format!(
            r"(?:{MONTH}\.?[ \t]+(?:19|20)\d{{2}}|(?:0?[1-9]|1[0-2])/(?:19|20)\d{{2}}|(?:19|20)\d{{2}})"
        );
        let date_range = format!(
            r"(?i)\b{date_atom}[ \t]*(?:-|\bto\b|\buntil\b)[ \t]*(?:{date_atom}|present|current|now|today)\b"
        );
        let date_single = format!(r"(?i)\b{date_atom}\b");

        let title = format!(
            r"\b(?:[A-Z][A-Za-z+#/&.-]*[ \t]+){{0,3}}(?:{})\b",
            alternation(&model.title_keywords)
        );
        let org_suffix = format!(
            r"\b(?:[A-Z][\w&'.-]*[ \t]+){{1,4}}(?:{})\b\.?",
            alternation(&model.organization_suffixes)
        );
        let org_prefix = if model.organization_prefixes.is_empty() {
            None
        } else {
            Some(compile(
                "organization prefix",
                &format!(
                    r"\b(?:{})(?:[ \t]+[A-Z][\w&'.-]*){{1,3}}",
                    alternation(&model.organization_prefixes)
                ),
            )?)
        };

        let (folded, exact): (Vec<_>, Vec<_>) =
            model.skills.iter().partition(|s| !s.case_sensitive);
        let skills_folded = build_lexicon(
            "skill lexicon",
            folded.iter().map(|s| s.name.clone()).collect(),
            true,
        )?;
        let skills_exact = build_lexicon(
            "case-sensitive skill lexicon",
            exact.iter().map(|s| s.name.clone()).collect(),
            false,
        )?;
        let cities = build_lexicon("city gazetteer", model.cities.clone(), false)?.map(|(ac, _)| ac);

        Ok(Self {
            emails: EMAIL_PATTERNS
                .iter()
                .map(|p| compile("email", p))
                .collect::<Result<_, _>>()?,
            phone: compile("phone", PHONE_PATTERN)?,
            url: compile("url", URL_PATTERN)?,
            date_range: compile("date range", &date_range)?,
            date_single: compile("date", &date_single)?,
            duration: compile("duration", DURATION_PATTERN)?,
            title: compile("job title", &title)?,
            org_suffix: compile("organization suffix", &org_suffix)?,
            org_prefix,
            org_after_at: compile("organization after 'at'", ORG_AFTER_AT_PATTERN)?,
            location: compile("location", LOCATION_PATTERN)?,
            skills_folded,
            skills_exact,
            cities,
            model,
        })
    }

    /// Runs every recognizer and returns spans sorted by (start, end, label).
    pub fn extract(&self, text: &NormalizedText) -> Vec<EntitySpan> {
        let text = text.as_str();
        let mut spans = Vec::new();

        self.find_emails(text, &mut spans);
        self.find_urls(text, &mut spans);
        self.find_phones(text, &mut spans);
        self.find_dates(text, &mut spans);
        self.find_durations(text, &mut spans);
        self.find_skills(text, &mut spans);
        self.find_titles(text, &mut spans);
        self.find_organizations(text, &mut spans);
        self.find_locations(text, &mut spans);
        self.find_person(text, &mut spans);

        resolve(spans)
    }

    fn find_emails(&self, text: &str, spans: &mut Vec<EntitySpan>) {
        for pattern in &self.emails {
            let before = spans.len();
            for m in pattern.find_iter(text) {
                spans.push(EntitySpan::new(text, EntityLabel::Email, m.start(), m.end()));
            }
            if spans.len() > before {
                return;
            }
        }
    }

    fn find_urls(&self, text: &str, spans: &mut Vec<EntitySpan>) {
        for m in self.url.find_iter(text) {
            let end = trim_end(text, m.start(), m.end(), &['.', ',', ';', ':']);
            spans.push(EntitySpan::new(text, EntityLabel::Url, m.start(), end));
        }
    }

    fn find_phones(&self, text: &str, spans: &mut Vec<EntitySpan>) {
        for m in self.phone.find_iter(text) {
            let digits = m.as_str().chars().filter(|c| c.is_ascii_digit()).count();
            if (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
                spans.push(EntitySpan::new(text, EntityLabel::Phone, m.start(), m.end()));
            }
        }
    }

    fn find_dates(&self, text: &str, spans: &mut Vec<EntitySpan>) {
        let ranges: Vec<EntitySpan> = self
            .date_range
            .find_iter(text)
            .map(|m| EntitySpan::new(text, EntityLabel::Date, m.start(), m.end()).with_value("range"))
            .collect();
        for m in self.date_single.find_iter(text) {
            let inside_range = ranges.iter().any(|r| r.start <= m.start() && m.end() <= r.end);
            if !inside_range {
                spans.push(EntitySpan::new(text, EntityLabel::Date, m.start(), m.end()));
            }
        }
        spans.extend(ranges);
    }

    fn find_durations(&self, text: &str, spans: &mut Vec<EntitySpan>) {
        for caps in self.duration.captures_iter(text) {
            let (Some(whole), Some(years)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            spans.push(
                EntitySpan::new(text, EntityLabel::Duration, whole.start(), whole.end())
                    .with_value(years.as_str()),
            );
        }
    }

    fn find_skills(&self, text: &str, spans: &mut Vec<EntitySpan>) {
        for (matcher, names) in [&self.skills_folded, &self.skills_exact].into_iter().flatten() {
            for m in matcher.find_iter(text) {
                if is_word_bounded(text, m.start(), m.end()) {
                    spans.push(
                        EntitySpan::new(text, EntityLabel::Skill, m.start(), m.end())
                            .with_value(names[m.pattern().as_usize()].clone()),
                    );
                }
            }
        }
    }

    fn find_titles(&self, text: &str, spans: &mut Vec<EntitySpan>) {
        for m in self.title.find_iter(text) {
            spans.push(EntitySpan::new(text, EntityLabel::JobTitle, m.start(), m.end()));
        }
    }

    fn find_organizations(&self, text: &str, spans: &mut Vec<EntitySpan>) {
        let punct = ['.', ',', ';', ':'];
        for m in self.org_suffix.find_iter(text) {
            let end = trim_end(text, m.start(), m.end(), &punct);
            spans.push(EntitySpan::new(text, EntityLabel::Organization, m.start(), end));
        }
        if let Some(prefix) = &self.org_prefix {
            for m in prefix.find_iter(text) {
                let end = trim_end(text, m.start(), m.end(), &punct);
                spans.push(EntitySpan::new(text, EntityLabel::Organization, m.start(), end));
            }
        }

        // "Engineer at Acme" only counts when the same line carries a job title.
        for caps in self.org_after_at.captures_iter(text) {
            let Some(name) = caps.get(1) else { continue };
            let (line_start, line_end) = line_bounds(text, name.start());
            let line = &text[line_start..line_end];
            if !self.title.is_match(line) {
                continue;
            }
            let end = trim_end(text, name.start(), name.end(), &punct);
            if end > name.start() {
                spans.push(EntitySpan::new(text, EntityLabel::Organization, name.start(), end));
            }
        }
    }

    fn find_locations(&self, text: &str, spans: &mut Vec<EntitySpan>) {
        for m in self.location.find_iter(text) {
            spans.push(EntitySpan::new(text, EntityLabel::Location, m.start(), m.end()));
        }
        if let Some(cities) = &self.cities {
            for m in cities.find_iter(text) {
                if is_word_bounded(text, m.start(), m.end()) {
                    spans.push(EntitySpan::new(text, EntityLabel::Location, m.start(), m.end()));
                }
            }
        }
    }

    /// Heading-style name: 2–4 capitalized alphabetic words that are not a section
    /// heading, stop-word, title or skill. The first few lines are tried first; past
    /// them, lines naming an organization or a city are skipped as well.
    fn find_person(&self, text: &str, spans: &mut Vec<EntitySpan>) {
        let mut lines = Vec::new();
        let mut offset = 0;
        for raw_line in text.split('\n') {
            let line_start = offset;
            offset += raw_line.len() + 1;
            let line = raw_line.trim();
            if !line.is_empty() {
                let start = line_start + (raw_line.len() - raw_line.trim_start().len());
                lines.push((start, line));
            }
        }

        let header = lines
            .iter()
            .take(NAME_SEARCH_LINES)
            .find(|(_, line)| self.looks_like_name(line));
        let found = header.or_else(|| {
            lines.iter().skip(NAME_SEARCH_LINES).find(|(_, line)| {
                self.looks_like_name(line) && !self.names_place_or_organization(line)
            })
        });

        if let Some(&(start, line)) = found {
            spans.push(EntitySpan::new(text, EntityLabel::Person, start, start + line.len()));
        }
    }

    fn names_place_or_organization(&self, line: &str) -> bool {
        let model = &self.model;
        model.cities.iter().any(|c| c.eq_ignore_ascii_case(line))
            || line.split_whitespace().any(|w| {
                model
                    .organization_suffixes
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(w))
            })
    }

    fn looks_like_name(&self, line: &str) -> bool {
        let words: Vec<&str> = line.split_whitespace().collect();
        if !(2..=4).contains(&words.len()) {
            return false;
        }
        let shaped = words.iter().all(|w| {
            w.chars().next().is_some_and(char::is_uppercase)
                && w.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'')
        });
        if !shaped || self.model.is_section_heading(line) {
            return false;
        }

        let model = &self.model;
        let blocked = words.iter().any(|w| {
            model.name_stopwords.iter().any(|s| s.eq_ignore_ascii_case(w))
                || model.title_keywords.iter().any(|t| t.eq_ignore_ascii_case(w))
                || model.skills.iter().any(|s| s.name.eq_ignore_ascii_case(w))
        });
        !blocked && !model.skills.iter().any(|s| s.name.eq_ignore_ascii_case(line))
    }
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex, ModelError> {
    Regex::new(pattern).map_err(|e| ModelError::Matcher {
        name,
        reason: e.to_string(),
    })
}

/// Longest terms first so alternations prefer "VP of Engineering" over "Engineer".
fn alternation(terms: &[String]) -> String {
    let mut sorted: Vec<&String> = terms.iter().filter(|t| !t.trim().is_empty()).collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    sorted
        .into_iter()
        .map(|t| regex::escape(t.trim()))
        .collect::<Vec<_>>()
        .join("|")
}

fn build_lexicon(
    name: &'static str,
    terms: Vec<String>,
    case_insensitive: bool,
) -> Result<Option<(AhoCorasick, Vec<String>)>, ModelError> {
    if terms.is_empty() {
        return Ok(None);
    }
    let matcher = AhoCorasick::builder()
        .ascii_case_insensitive(case_insensitive)
        .match_kind(MatchKind::LeftmostLongest)
        .build(&terms)
        .map_err(|e| ModelError::Matcher {
            name,
            reason: e.to_string(),
        })?;
    Ok(Some((matcher, terms)))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when `text[start..end]` is not glued to neighbouring word characters.
pub(crate) fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    let first = text[start..end].chars().next();
    let last = text[start..end].chars().next_back();

    // Only enforce a boundary on sides where the term itself ends in a word character.
    let left_ok = !first.is_some_and(is_word_char) || !before.is_some_and(is_word_char);
    let right_ok = !last.is_some_and(is_word_char) || !after.is_some_and(is_word_char);
    left_ok && right_ok
}

fn trim_end(text: &str, start: usize, mut end: usize, chars: &[char]) -> usize {
    while end > start {
        match text[..end].chars().next_back() {
            Some(c) if chars.contains(&c) => end -= c.len_utf8(),
            _ => break,
        }
    }
    end
}

fn line_bounds(text: &str, at: usize) -> (usize, usize) {
    let start = text[..at].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = text[at..].find('\n').map(|i| at + i).unwrap_or(text.len());
    (start, end)
}

/// Drops spans lying inside an email/url, keeps the longest of overlapping same-label
/// spans, then orders the result deterministically.
fn resolve(spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
    let containers: Vec<EntitySpan> = spans
        .iter()
        .filter(|s| matches!(s.label, EntityLabel::Email | EntityLabel::Url))
        .cloned()
        .collect();

    let mut candidates: Vec<EntitySpan> = spans
        .into_iter()
        .filter(|s| {
            matches!(s.label, EntityLabel::Email | EntityLabel::Url)
                || !containers.iter().any(|c| c.contains(s))
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.label
            .cmp(&b.label)
            .then(a.start.cmp(&b.start))
            .then((b.end - b.start).cmp(&(a.end - a.start)))
    });

    let mut kept: Vec<EntitySpan> = Vec::with_capacity(candidates.len());
    for span in candidates {
        let clash = kept
            .iter()
            .rev()
            .take_while(|k| k.label == span.label)
            .any(|k| k.overlaps(&span));
        if !clash {
            kept.push(span);
        }
    }

    kept.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(a.end.cmp(&b.end))
            .then(a.label.cmp(&b.label))
    });
    kept
}
