pub mod fit_scoring;
pub mod job;

pub use fit_scoring::{rank, CoverageScorer, FitScorer, MatchResult};
pub use job::JobRequirement;
