pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::ChannelAllowList;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::Serialize;
use std::path::Path;
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_FOLDER: &str = ".";
pub const DEFAULT_PATTERN: &str = "*.xml";
pub const DEFAULT_OUTPUT_FILE: &str = "Sheet3_Builder_XML_Output.xlsx";
pub const DEFAULT_TESTS: [&str; 2] = ["Max Power (dBm)", "Throughput (%)"];

/// Fully resolved options for one run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSettings {
    pub folder: String,
    pub pattern: String,
    pub output_path: String,
    pub tests: Vec<String>,
    pub channels_keep: Option<ChannelAllowList>,
}

impl ReportSettings {
    /// Defaults for `folder`; the report is written next to the inputs.
    pub fn for_folder(folder: impl Into<String>) -> Self {
        let folder = folder.into();
        Self {
            output_path: default_output_path(&folder),
            folder,
            pattern: DEFAULT_PATTERN.to_string(),
            tests: DEFAULT_TESTS.iter().map(|t| t.to_string()).collect(),
            channels_keep: None,
        }
    }

    pub fn with_tests<I, S>(mut self, tests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tests = tests.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_channels_keep(mut self, channels: ChannelAllowList) -> Self {
        self.channels_keep = Some(channels);
        self
    }

    pub fn with_output_path(mut self, output_path: impl Into<String>) -> Self {
        self.output_path = output_path.into();
        self
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self::for_folder(DEFAULT_FOLDER)
    }
}

impl From<TomlConfig> for ReportSettings {
    fn from(config: TomlConfig) -> Self {
        let folder = config
            .source
            .folder
            .unwrap_or_else(|| DEFAULT_FOLDER.to_string());
        let mut settings = Self::for_folder(folder);
        if let Some(pattern) = config.source.pattern {
            settings.pattern = pattern;
        }
        if let Some(output_path) = config.report.output_path {
            settings.output_path = output_path;
        }
        if let Some(tests) = config.filter.tests {
            settings.tests = tests;
        }
        settings.channels_keep = config.filter.channels_keep;
        settings
    }
}

fn default_output_path(folder: &str) -> String {
    Path::new(folder)
        .join(DEFAULT_OUTPUT_FILE)
        .to_string_lossy()
        .into_owned()
}

impl ConfigProvider for ReportSettings {
    fn input_folder(&self) -> &str {
        &self.folder
    }

    fn file_pattern(&self) -> &str {
        &self.pattern
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn tests_to_include(&self) -> &[String] {
        &self.tests
    }

    fn channels_keep(&self) -> Option<&ChannelAllowList> {
        self.channels_keep.as_ref()
    }
}

impl Validate for ReportSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("source.folder", &self.folder)?;
        validation::validate_non_empty_string("source.pattern", &self.pattern)?;
        glob::Pattern::new(&self.pattern)?;

        validation::validate_path("report.output_path", &self.output_path)?;
        validation::validate_file_extensions(
            "report.output_path",
            std::slice::from_ref(&self.output_path),
            &["xlsx"],
        )?;

        validation::validate_non_empty_list("filter.tests", &self.tests)?;

        if let Some(channels) = &self.channels_keep {
            for (band, _) in channels.bands() {
                validation::validate_non_empty_string("filter.channels_keep", band)?;
            }
        }

        Ok(())
    }
}

/// One `--keep-channels` value: `BAND=CH1,CH2` or a bare `BAND` for every channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRule {
    pub band: String,
    pub channels: Vec<String>,
}

pub fn parse_channel_rule(value: &str) -> std::result::Result<ChannelRule, String> {
    let (band, channels) = match value.split_once('=') {
        Some((band, channels)) => (band, channels),
        None => (value, ""),
    };
    let band = band.trim();
    if band.is_empty() {
        return Err(format!("missing band in '{}'", value));
    }
    Ok(ChannelRule {
        band: band.to_string(),
        channels: channels
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "rf-sheet-builder")]
#[command(about = "Builds the Sheet3 report workbook from a folder of RF test XML files")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Folder scanned for input files
    #[arg(long)]
    pub folder: Option<String>,

    /// Output workbook path (defaults to <folder>/Sheet3_Builder_XML_Output.xlsx)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Input file glob, relative to the folder
    #[arg(long)]
    pub pattern: Option<String>,

    /// Test names to keep
    #[arg(long, value_delimiter = ',')]
    pub tests: Vec<String>,

    /// Channels to keep for a band, e.g. n77=650000/650000 (repeatable)
    #[arg(long = "keep-channels", value_parser = parse_channel_rule)]
    pub keep_channels: Vec<ChannelRule>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,

    #[arg(long, help = "Show the resolved configuration and input files, then exit")]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Merges the configuration file (if any) with the command line, which wins.
    pub fn resolve(&self) -> Result<ReportSettings> {
        let mut file_config = match &self.config {
            Some(path) => TomlConfig::from_file(path).map_err(|e| match e {
                EtlError::IoError(io) => EtlError::ConfigError {
                    message: format!("cannot read {}: {}", path, io),
                },
                other => other,
            })?,
            None => TomlConfig::default(),
        };

        if let Some(folder) = &self.folder {
            file_config.source.folder = Some(folder.clone());
        }
        if let Some(pattern) = &self.pattern {
            file_config.source.pattern = Some(pattern.clone());
        }
        if let Some(output) = &self.output {
            file_config.report.output_path = Some(output.clone());
        }
        if !self.tests.is_empty() {
            file_config.filter.tests = Some(self.tests.clone());
        }
        if !self.keep_channels.is_empty() {
            let mut channels = ChannelAllowList::new();
            for rule in &self.keep_channels {
                channels.insert(&rule.band, rule.channels.iter().cloned());
            }
            file_config.filter.channels_keep = Some(channels);
        }

        Ok(ReportSettings::from(file_config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_folder() {
        let settings = ReportSettings::for_folder("/data/xml");
        assert_eq!(settings.pattern, "*.xml");
        assert_eq!(
            settings.output_path,
            Path::new("/data/xml")
                .join("Sheet3_Builder_XML_Output.xlsx")
                .to_string_lossy()
        );
        assert_eq!(settings.tests, vec!["Max Power (dBm)", "Throughput (%)"]);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_settings() {
        let csv_output = ReportSettings::default().with_output_path("report.csv");
        assert!(csv_output.validate().is_err());

        let no_tests = ReportSettings::default().with_tests(Vec::<String>::new());
        assert!(matches!(
            no_tests.validate(),
            Err(EtlError::MissingConfigError { .. })
        ));

        let mut bad_pattern = ReportSettings::default();
        bad_pattern.pattern = "[*.xml".to_string();
        assert!(matches!(
            bad_pattern.validate(),
            Err(EtlError::PatternError(_))
        ));
    }

    #[test]
    fn test_parse_channel_rule() {
        assert_eq!(
            parse_channel_rule("n77=650000/650000, 640000/640000").unwrap(),
            ChannelRule {
                band: "n77".to_string(),
                channels: vec!["650000/650000".to_string(), "640000/640000".to_string()],
            }
        );
        assert!(parse_channel_rule("B12").unwrap().channels.is_empty());
        assert!(parse_channel_rule("=1/1").is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_overrides_file_values() {
        let cli = CliConfig::parse_from([
            "rf-sheet-builder",
            "--folder",
            "/data/xml",
            "--tests",
            "Throughput (%)",
            "--keep-channels",
            "n77=650000/650000",
            "--keep-channels",
            "B12",
        ]);

        let settings = cli.resolve().unwrap();
        assert_eq!(settings.folder, "/data/xml");
        assert_eq!(settings.tests, vec!["Throughput (%)"]);
        let channels = settings.channels_keep.unwrap();
        assert!(!channels.allows("n77", "651000/651000"));
        assert!(channels.allows("B12", "23095/5095"));
    }
}
