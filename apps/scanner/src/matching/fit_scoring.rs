//! Fit Scoring: pluggable, trait-based scorer that measures an applicant against a job.
//!
//! Default: `CoverageScorer` (skill coverage plus an experience threshold; pure and deterministic).
//!
//! The pipeline holds an `Arc<dyn FitScorer>` so the scoring backend can be swapped at startup.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::matching::job::JobRequirement;
use crate::models::applicant::{ApplicantId, ApplicantRecord};

/// Weight of desired-skill coverage on top of required coverage.
pub const DESIRED_BONUS_WEIGHT: f64 = 0.2;

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub applicant_id: ApplicantId,
    pub score: f64,              // 0.0 – 1.0
    pub required_coverage: f64,  // 0.0 – 1.0
    pub desired_coverage: f64,   // 0.0 – 1.0
    pub experience_years: f64,
    pub meets_experience: bool,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub scorer_backend: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap scoring backends without touching the pipeline.
pub trait FitScorer: Send + Sync {
    fn score(&self, record: &ApplicantRecord, job: &JobRequirement, as_of: NaiveDate) -> MatchResult;
}

/// Skill-coverage scorer. Stateless.
pub struct CoverageScorer;

impl FitScorer for CoverageScorer {
    fn score(&self, record: &ApplicantRecord, job: &JobRequirement, as_of: NaiveDate) -> MatchResult {
        score_match(record, job, as_of)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core coverage algorithm
// ────────────────────────────────────────────────────────────────────────────

pub fn score_match(record: &ApplicantRecord, job: &JobRequirement, as_of: NaiveDate) -> MatchResult {
    let have: Vec<String> = record.skills.iter().map(|s| skill_key(s)).collect();
    let required = dedup_skills(&job.required_skills);
    let desired = dedup_skills(&job.desired_skills);

    let mut matched = Vec::new();
    let mut missing = Vec::new();

    let mut required_hits = 0usize;
    for (key, spelling) in &required {
        if have.contains(key) {
            required_hits += 1;
            matched.push(spelling.clone());
        } else {
            missing.push(spelling.clone());
        }
    }

    let mut desired_hits = 0usize;
    for (key, spelling) in &desired {
        // A skill listed as both required and desired only counts once in `matched`.
        if have.contains(key) {
            desired_hits += 1;
            if !required.contains_key(key) {
                matched.push(spelling.clone());
            }
        }
    }

    let required_coverage = if required.is_empty() {
        1.0
    } else {
        required_hits as f64 / required.len() as f64
    };
    let desired_coverage = if desired.is_empty() {
        0.0
    } else {
        desired_hits as f64 / desired.len() as f64
    };
    let score = (required_coverage + DESIRED_BONUS_WEIGHT * desired_coverage).min(1.0);

    let experience_years = record.experience_years(as_of);
    let meets_experience = experience_years >= f64::from(job.min_years);
    if !meets_experience {
        missing.push(format!("min {} years experience", job.min_years));
    }

    matched.sort();
    missing.sort();

    MatchResult {
        applicant_id: record.applicant_id,
        score,
        required_coverage,
        desired_coverage,
        experience_years,
        meets_experience,
        matched,
        missing,
        scorer_backend: "coverage".to_string(),
    }
}

/// Orders results best first; equal scores fall back to applicant id.
pub fn rank(results: &mut [MatchResult]) {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.applicant_id.cmp(&b.applicant_id))
    });
}

fn skill_key(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Case-insensitive de-duplication. The smallest spelling wins so input order never matters.
fn dedup_skills(skills: &[String]) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for skill in skills {
        let spelling = skill.trim();
        if spelling.is_empty() {
            continue;
        }
        out.entry(skill_key(spelling))
            .and_modify(|kept| {
                if spelling < kept.as_str() {
                    *kept = spelling.to_string();
                }
            })
            .or_insert_with(|| spelling.to_string());
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
