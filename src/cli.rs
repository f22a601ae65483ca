//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::{Path, PathBuf};

/// ChatStats - statistics reports for exported chat conversation archives
///
/// Ingest an exported conversation-history archive (JSON) and generate a
/// year-in-review statistics report: KPIs with year-over-year comparison,
/// monthly and daily activity, model usage, and title word frequencies.
///
/// Examples:
///   chatstats --input conversations.json
///   chatstats --input conversations.json --year 2024 --format json
///   chatstats --input conversations.json --by-model --top-words 50
///   chatstats --input conversations.json --dry-run
///   chatstats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the exported conversation archive (JSON)
    ///
    /// The top level must be a sequence of conversation records.
    /// Not required when using --init-config.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "CHATSTATS_ARCHIVE",
        required_unless_present = "init_config"
    )]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Defaults to chatstats_report.md, or the value in .chatstats.toml.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Calendar year to report on
    ///
    /// The previous year is used as the comparison baseline.
    /// Defaults to the current UTC year.
    #[arg(short, long, value_name = "YEAR")]
    pub year: Option<i32>,

    /// Minimum length of a title word, in characters
    ///
    /// Shorter tokens are dropped from the word-frequency table.
    #[arg(long, value_name = "CHARS")]
    pub min_word_length: Option<usize>,

    /// Number of title words to include in the report
    #[arg(long, value_name = "COUNT")]
    pub top_words: Option<usize>,

    /// Split monthly counts by model
    #[arg(long)]
    pub by_model: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .chatstats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: ingest and print a normalization summary, no report
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .chatstats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the archive path, empty if not set (should be validated first).
    pub fn input_path(&self) -> &Path {
        self.input.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate the archive path
        match self.input {
            Some(ref input) => {
                if !input.exists() {
                    return Err(format!("Archive file does not exist: {}", input.display()));
                }
                if !input.is_file() {
                    return Err(format!("Archive path is not a file: {}", input.display()));
                }
            }
            None => return Err("An archive file is required (--input)".to_string()),
        }

        // Validate the scope year
        if let Some(year) = self.year {
            if !(1970..=9999).contains(&year) {
                return Err("Year must be between 1970 and 9999".to_string());
            }
        }

        // Validate word settings
        if self.min_word_length == Some(0) {
            return Err("Minimum word length must be at least 1".to_string());
        }
        if self.top_words == Some(0) {
            return Err("Top words must be at least 1".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_args(input: Option<PathBuf>) -> Args {
        Args {
            input,
            output: None,
            format: OutputFormat::Markdown,
            year: None,
            min_word_length: None,
            top_words: None,
            by_model: false,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    fn archive_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        file
    }

    #[test]
    fn test_validation_accepts_existing_archive() {
        let file = archive_file();
        let args = make_args(Some(file.path().to_path_buf()));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_archive() {
        let args = make_args(Some(PathBuf::from("/nonexistent/conversations.json")));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_year_out_of_range() {
        let file = archive_file();
        let mut args = make_args(Some(file.path().to_path_buf()));
        args.year = Some(1200);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_word_length() {
        let file = archive_file();
        let mut args = make_args(Some(file.path().to_path_buf()));
        args.min_word_length = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let file = archive_file();
        let mut args = make_args(Some(file.path().to_path_buf()));
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args(None);
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(None);
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
