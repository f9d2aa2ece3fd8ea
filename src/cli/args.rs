//! Command-line argument definitions for the worksheet downloader
//!
//! The complete CLI interface using the clap derive API.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::app::services::column_spec::ColumnSpecList;
use crate::{Error, Result};

/// CLI arguments for the worksheet downloader
///
/// Downloads a single Google Sheets worksheet, validates every cell against
/// a compact per-column type definition, and emits the rows as delimited
/// text for bulk-loading into a relational table.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sheetload",
    version,
    about = "Download and validate a Google Sheets worksheet as typed, delimited rows",
    long_about = "Downloads a single Google Sheets worksheet, validates and coerces every cell \
                  against a compact per-column type definition (for example \
                  'csd(in_fmt=%d.%m.%Y)ib(true=ja,false=nein)fs'), and writes the validated rows \
                  as delimited text suitable for COPY-style bulk loads. A single bad cell fails \
                  the whole download, so a half-validated worksheet never reaches the table."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Download, validate and emit one worksheet (default command)
    Download(DownloadArgs),
    /// Parse a column definition and show the resulting column layout
    Inspect(InspectArgs),
}

/// Arguments for the download command
#[derive(Debug, Clone, Parser)]
pub struct DownloadArgs {
    /// Spreadsheet key
    ///
    /// The long identifier from the spreadsheet URL, between /d/ and /edit.
    #[arg(
        short = 'k',
        long = "spreadsheet-key",
        value_name = "KEY",
        help = "Spreadsheet key from the document URL"
    )]
    pub spreadsheet_key: String,

    /// Worksheet name
    ///
    /// The tab name within the spreadsheet, exactly as displayed.
    #[arg(
        short = 'w',
        long = "worksheet-name",
        value_name = "NAME",
        help = "Name of the worksheet tab to download"
    )]
    pub worksheet_name: String,

    /// Column definition
    ///
    /// One letter per worksheet column: c (counter), s (string), i (integer),
    /// f (float), d (date), b (boolean), x (drop), & (add-on constant).
    /// Parameters go in parentheses, a '!' suffix marks the column required.
    #[arg(
        short = 'c',
        long = "columns-definition",
        value_name = "DEFINITION",
        help = "Per-column type definition, e.g. 'csd(in_fmt=%d.%m.%Y)ib(true=ja,false=nein)fs'"
    )]
    pub columns_definition: ColumnSpecList,

    /// Number of leading rows to skip
    ///
    /// Header rows are dropped before validation. If not specified, one
    /// header row is skipped (or the value from the config file).
    #[arg(
        long = "skip-rows",
        value_name = "COUNT",
        help = "Number of leading header rows to skip (default: 1)"
    )]
    pub skip_rows: Option<usize>,

    /// Output field delimiter
    ///
    /// A single character; the literal two-character sequence `\t` is
    /// accepted for tab, which is also the default.
    #[arg(
        long = "delimiter",
        value_name = "CHAR",
        help = "Field delimiter for the emitted rows (default: tab)"
    )]
    pub delimiter: Option<String>,

    /// Output file for the validated rows
    ///
    /// If not specified, rows are written to stdout.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Output file for validated rows (default: stdout)"
    )]
    pub output: Option<PathBuf>,

    /// API key for sheets shared with "anyone with the link"
    #[arg(
        long = "api-key",
        value_name = "KEY",
        help = "Google API key",
        conflicts_with = "access_token"
    )]
    pub api_key: Option<String>,

    /// OAuth access token for sheets requiring user-level access
    #[arg(
        long = "access-token",
        value_name = "TOKEN",
        help = "OAuth access token"
    )]
    pub access_token: Option<String>,

    /// Path to configuration file
    ///
    /// TOML configuration file for credentials and retry settings. If not
    /// specified, looks for ~/.config/sheetload/config.toml
    #[arg(
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the inspect command
#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Column definition to parse and display
    #[arg(
        short = 'c',
        long = "columns-definition",
        value_name = "DEFINITION",
        help = "Per-column type definition to inspect"
    )]
    pub columns_definition: ColumnSpecList,

    /// Output format for the column layout
    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        help = "Output format for the column layout"
    )]
    pub output_format: OutputFormat,
}

/// Output format options for machine-readable results
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .expect("Command should be present when get_command() is called")
    }
}

impl DownloadArgs {
    /// Validate the download command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.spreadsheet_key.trim().is_empty() {
            return Err(Error::configuration("Spreadsheet key must not be empty"));
        }

        if self.worksheet_name.trim().is_empty() {
            return Err(Error::configuration("Worksheet name must not be empty"));
        }

        // Validate the delimiter early, so a typo fails before the fetch
        self.get_delimiter()?;

        // Validate config file exists if specified
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        // Validate output file directory exists if specified
        if let Some(output) = &self.output {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(Error::configuration(format!(
                        "Output file directory does not exist: {}",
                        parent.display()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Resolve the delimiter flag into a single output character, if given
    pub fn get_delimiter(&self) -> Result<Option<char>> {
        let Some(raw) = &self.delimiter else {
            return Ok(None);
        };
        match raw.as_str() {
            "\\t" => Ok(Some('\t')),
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Some(c)),
                    _ => Err(Error::configuration(format!(
                        "Delimiter must be a single character or '\\t', got '{s}'"
                    ))),
                }
            }
        }
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

impl InspectArgs {
    /// Determine the appropriate log level; inspect is always quiet
    pub fn get_log_level(&self) -> &'static str {
        "error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn download_args() -> DownloadArgs {
        DownloadArgs {
            spreadsheet_key: "1aBcD".to_string(),
            worksheet_name: "Sheet1".to_string(),
            columns_definition: "cs".parse().unwrap(),
            skip_rows: None,
            delimiter: None,
            output: None,
            api_key: None,
            access_token: None,
            config_file: None,
            verbose: 0,
            quiet: false,
        }
    }

    #[test]
    fn test_download_args_validation() {
        let args = download_args();
        assert!(args.validate().is_ok());

        let mut invalid = args.clone();
        invalid.spreadsheet_key = "  ".to_string();
        assert!(invalid.validate().is_err());

        let mut invalid = args.clone();
        invalid.worksheet_name = String::new();
        assert!(invalid.validate().is_err());

        let mut invalid = args.clone();
        invalid.config_file = Some(PathBuf::from("/nonexistent/config.toml"));
        assert!(invalid.validate().is_err());

        let mut invalid = args.clone();
        invalid.output = Some(PathBuf::from("/nonexistent/dir/rows.tsv"));
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_delimiter_parsing() {
        let mut args = download_args();
        assert_eq!(args.get_delimiter().unwrap(), None);

        args.delimiter = Some("\\t".to_string());
        assert_eq!(args.get_delimiter().unwrap(), Some('\t'));

        args.delimiter = Some(";".to_string());
        assert_eq!(args.get_delimiter().unwrap(), Some(';'));

        args.delimiter = Some("abc".to_string());
        assert!(args.get_delimiter().is_err());

        args.delimiter = Some(String::new());
        assert!(args.get_delimiter().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = download_args();

        // Default level
        assert_eq!(args.get_log_level(), "warn");

        // Verbose levels
        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");

        args.verbose = 2;
        assert_eq!(args.get_log_level(), "debug");

        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");

        // Quiet mode
        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_columns_definition_parses_via_clap() {
        let args = Args::try_parse_from([
            "sheetload",
            "download",
            "--spreadsheet-key",
            "1aBcD",
            "--worksheet-name",
            "Sheet1",
            "--columns-definition",
            "csd(in_fmt=%d.%m.%Y)ib(true=ja,false=nein)fs",
        ])
        .unwrap();

        match args.get_command() {
            Commands::Download(download) => {
                assert_eq!(download.columns_definition.len(), 7);
                assert_eq!(download.skip_rows, None);
            }
            other => panic!("expected download command, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_columns_definition_is_rejected_by_clap() {
        let result = Args::try_parse_from([
            "sheetload",
            "download",
            "--spreadsheet-key",
            "1aBcD",
            "--worksheet-name",
            "Sheet1",
            "--columns-definition",
            "sq",
        ]);
        assert!(result.is_err());
    }
}
