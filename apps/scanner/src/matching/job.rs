use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;

/// What a role asks for. Supplied as a JSON file and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRequirement {
    pub title: Option<String>,
    pub required_skills: Vec<String>,
    pub desired_skills: Vec<String>,
    pub min_years: u32,
}

impl JobRequirement {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| AppError::JobRequirement {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let job: JobRequirement =
            serde_json::from_str(&raw).map_err(|e| AppError::JobRequirement {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        info!(
            "Loaded job requirement '{}': {} required, {} desired skills, min {} years",
            job.title.as_deref().unwrap_or("untitled"),
            job.required_skills.len(),
            job.desired_skills.len(),
            job.min_years
        );
        Ok(job)
    }
}
