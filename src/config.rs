//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.chatstats.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Title word-frequency settings.
    #[serde(default)]
    pub words: WordsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "chatstats_report.md".to_string()
}

/// Title word-frequency settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordsConfig {
    /// Minimum word length in characters.
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Number of words to include in the report.
    #[serde(default = "default_top")]
    pub top: usize,
}

impl Default for WordsConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            top: default_top(),
        }
    }
}

fn default_min_length() -> usize {
    3
}

fn default_top() -> usize {
    25
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the daily-activity section.
    #[serde(default = "default_true")]
    pub include_daily_activity: bool,

    /// Include the model-usage section.
    #[serde(default = "default_true")]
    pub include_model_breakdown: bool,

    /// Include the title word-frequency section.
    #[serde(default = "default_true")]
    pub include_word_frequencies: bool,

    /// Split monthly counts by model.
    #[serde(default)]
    pub group_monthly_by_model: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_daily_activity: true,
            include_model_breakdown: true,
            include_word_frequencies: true,
            group_monthly_by_model: false,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".chatstats.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Optional settings - only override if provided
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(min_length) = args.min_word_length {
            self.words.min_length = min_length;
        }
        if let Some(top) = args.top_words {
            self.words.top = top;
        }

        // Flags always override
        if args.by_model {
            self.report.group_monthly_by_model = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "chatstats_report.md");
        assert_eq!(config.words.min_length, 3);
        assert_eq!(config.words.top, 25);
        assert!(config.report.include_daily_activity);
        assert!(!config.report.group_monthly_by_model);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "review.md"
verbose = true

[words]
min_length = 4
top = 50

[report]
include_word_frequencies = false
group_monthly_by_model = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "review.md");
        assert!(config.general.verbose);
        assert_eq!(config.words.min_length, 4);
        assert_eq!(config.words.top, 50);
        assert!(!config.report.include_word_frequencies);
        assert!(config.report.group_monthly_by_model);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[words]\nmin_length = 2\n").unwrap();
        assert_eq!(config.words.min_length, 2);
        assert_eq!(config.words.top, 25);
        assert_eq!(config.general.output, "chatstats_report.md");
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let mut args = crate::cli::Args {
            input: None,
            output: Some(PathBuf::from("custom.md")),
            format: crate::cli::OutputFormat::Markdown,
            year: None,
            min_word_length: Some(5),
            top_words: None,
            by_model: true,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        };

        config.merge_with_args(&args);
        assert_eq!(config.general.output, "custom.md");
        assert_eq!(config.words.min_length, 5);
        assert_eq!(config.words.top, 25);
        assert!(config.report.group_monthly_by_model);

        // absent CLI values leave config untouched
        args.output = None;
        config.general.output = "from_file.md".to_string();
        config.merge_with_args(&args);
        assert_eq!(config.general.output, "from_file.md");
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[general]\noutput = \"out.md\"\n").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.general.output, "out.md");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[words]"));
        assert!(toml_str.contains("[report]"));
    }
}
