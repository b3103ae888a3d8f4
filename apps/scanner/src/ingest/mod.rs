// Document loading: directory listing, file reads and plain-text normalization.
// Per-file failures are DocumentErrors; only an unreadable input directory is fatal.

pub mod loader;
pub mod text;

pub use loader::{list_resumes, load_document};
pub use text::normalize_document;
