// NLP extraction: the process-scoped language model and the per-worker extractor built on it.
// The model is loaded once in main and passed explicitly; nothing here reads globals.

pub mod engine;
pub mod labels;
pub mod model;

pub use engine::Extractor;
pub use model::{LanguageModel, ModelError};
