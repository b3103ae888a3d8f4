use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_INPUT_DIR;

#[derive(Parser, Debug)]
#[command(
    name = "ats-scanner",
    about = "Parse a directory of resumes into structured applicant records and rank them against a job",
    version
)]
pub struct Cli {
    /// Directory containing resume files (.txt, .md, .pdf). Created if missing.
    #[arg(value_name = "INPUT_DIR", default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_dir_defaults_to_cvs() {
        let cli = Cli::try_parse_from(["ats-scanner"]).unwrap();
        assert_eq!(cli.input_dir, PathBuf::from("cvs"));
    }

    #[test]
    fn test_input_dir_positional() {
        let cli = Cli::try_parse_from(["ats-scanner", "/tmp/resumes"]).unwrap();
        assert_eq!(cli.input_dir, PathBuf::from("/tmp/resumes"));
    }

    #[test]
    fn test_rejects_extra_arguments() {
        assert!(Cli::try_parse_from(["ats-scanner", "a", "b"]).is_err());
    }
}
