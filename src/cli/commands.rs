//! Command implementations for the worksheet downloader CLI
//!
//! Dispatches the parsed arguments to the download and inspect commands,
//! sets up structured logging, and writes the validated rows as delimited
//! text.

use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::app::services::downloader::SheetDownloader;
use crate::app::services::row_engine::RowStream;
use crate::app::services::sheet_fetcher::GoogleSheetsFetcher;
use crate::cli::args::{Args, Commands, DownloadArgs, InspectArgs, OutputFormat};
use crate::config::Config;
use crate::{ColumnKind, ColumnSpecList, Error, Result};

/// Download statistics for reporting
#[derive(Debug, Clone, Default)]
pub struct DownloadStats {
    /// Number of validated rows written
    pub rows_written: usize,
    /// Total download and validation time
    pub elapsed: std::time::Duration,
}

/// Main command runner
///
/// Dispatches to the appropriate subcommand handler based on CLI args:
/// - `download`: fetch, validate and emit one worksheet
/// - `inspect`: parse a column definition and show the column layout
pub async fn run(args: Args) -> Result<DownloadStats> {
    match args.get_command() {
        Commands::Download(download_args) => run_download(download_args).await,
        Commands::Inspect(inspect_args) => run_inspect(inspect_args),
    }
}

/// Set up structured logging to stderr
///
/// Stdout is reserved for the emitted rows, so all diagnostics go to
/// stderr.
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sheetload={}", log_level)));

    if quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        // Standard logging with timestamps
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Execute the download command
async fn run_download(args: DownloadArgs) -> Result<DownloadStats> {
    let start = std::time::Instant::now();

    args.validate()?;
    setup_logging(args.get_log_level(), args.quiet)?;

    let config = load_configuration(&args)?;
    let credentials = config.resolve_credentials()?;
    let delimiter = args.get_delimiter()?.unwrap_or(config.output.delimiter);
    let skip_rows = args.skip_rows.unwrap_or(config.output.skip_rows);

    let fetcher = GoogleSheetsFetcher::new(credentials)?;
    let downloader = SheetDownloader::new(
        fetcher,
        config.retry.to_policy(),
        args.columns_definition.clone(),
        skip_rows,
    );

    let stream = downloader
        .download(&args.spreadsheet_key, &args.worksheet_name)
        .await?;

    let rows_written = match &args.output {
        Some(path) => write_rows_to_file(stream, delimiter, path)?,
        None => write_rows(stream, delimiter, std::io::stdout().lock())?,
    };

    let stats = DownloadStats {
        rows_written,
        elapsed: start.elapsed(),
    };
    info!(
        rows = stats.rows_written,
        elapsed_secs = stats.elapsed.as_secs_f64(),
        "download complete"
    );
    Ok(stats)
}

/// Load configuration using the layered approach (defaults -> file -> env
/// -> flags)
fn load_configuration(args: &DownloadArgs) -> Result<Config> {
    let mut config = Config::load(args.config_file.as_deref())?;

    // Credential flags beat both the environment and the config file
    if let Some(api_key) = &args.api_key {
        config.credentials.api_key = Some(api_key.clone());
        config.credentials.access_token = None;
    }
    if let Some(access_token) = &args.access_token {
        config.credentials.access_token = Some(access_token.clone());
    }

    Ok(config)
}

/// Drain the validated row stream into a delimited writer
///
/// Rows are written without a header line so the output can feed a
/// COPY-style bulk load directly. The writer sees only complete rows; the
/// first validation failure aborts before anything further is flushed.
fn write_rows<W: Write>(stream: RowStream, delimiter: char, writer: W) -> Result<usize> {
    if !delimiter.is_ascii() {
        return Err(Error::configuration(format!(
            "Delimiter must be an ASCII character, got '{delimiter}'"
        )));
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .from_writer(writer);

    let mut rows_written = 0;
    for row in stream {
        let row = row?;
        writer.write_record(row.to_fields())?;
        rows_written += 1;
    }
    writer.flush()?;
    Ok(rows_written)
}

fn write_rows_to_file(stream: RowStream, delimiter: char, path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path)
        .map_err(|e| Error::io(format!("failed to create {}", path.display()), e))?;
    write_rows(stream, delimiter, file)
}

/// Execute the inspect command
fn run_inspect(args: InspectArgs) -> Result<DownloadStats> {
    setup_logging(args.get_log_level(), true)?;

    match args.output_format {
        OutputFormat::Human => print!("{}", render_layout_human(&args.columns_definition)),
        OutputFormat::Json => {
            println!("{}", render_layout_json(&args.columns_definition)?);
        }
    }
    Ok(DownloadStats::default())
}

/// Render the parsed column layout as a human-readable table
fn render_layout_human(specs: &ColumnSpecList) -> String {
    let mut out = String::new();
    out.push_str("input  output  code  required  type\n");
    for spec in specs {
        let input = spec
            .input_index
            .map(|i| i.to_string())
            .unwrap_or_else(|| "-".to_string());
        let output = spec
            .output_position
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let required = if spec.required { "yes" } else { "no" };
        out.push_str(&format!(
            "{:<6} {:<7} {:<5} {:<9} {}\n",
            input,
            output,
            spec.kind.code(),
            required,
            kind_label(&spec.kind)
        ));
    }
    out.push_str(&format!(
        "\n{} worksheet columns in, {} output columns\n",
        specs.input_width(),
        specs.output_width()
    ));
    out
}

/// Render the parsed column layout as JSON for scripting
fn render_layout_json(specs: &ColumnSpecList) -> Result<String> {
    let columns: Vec<serde_json::Value> = specs
        .iter()
        .map(|spec| {
            serde_json::json!({
                "code": spec.kind.code().to_string(),
                "type": kind_label(&spec.kind),
                "required": spec.required,
                "input_index": spec.input_index,
                "output_position": spec.output_position,
            })
        })
        .collect();
    let layout = serde_json::json!({
        "columns": columns,
        "input_width": specs.input_width(),
        "output_width": specs.output_width(),
    });
    serde_json::to_string_pretty(&layout)
        .map_err(|e| Error::configuration(format!("failed to render layout as JSON: {e}")))
}

/// Human-readable description of one column kind
fn kind_label(kind: &ColumnKind) -> String {
    match kind {
        ColumnKind::Counter => "counter (starts at 1)".to_string(),
        ColumnKind::Text => "string".to_string(),
        ColumnKind::Integer => "integer".to_string(),
        ColumnKind::Float {
            thousands_separator: Some(sep),
        } => format!("float (thousands separator '{sep}')"),
        ColumnKind::Float {
            thousands_separator: None,
        } => "float".to_string(),
        ColumnKind::Date { in_fmt } => format!("date (format '{in_fmt}')"),
        ColumnKind::Boolean {
            true_tokens,
            false_tokens,
        } => format!(
            "boolean (true: {}; false: {})",
            true_tokens.join(", "),
            false_tokens.join(", ")
        ),
        ColumnKind::AddOn { value } => format!("constant '{value}'"),
        ColumnKind::Drop => "dropped".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::row_engine::RowValidationEngine;

    fn specs(definition: &str) -> ColumnSpecList {
        definition.parse().unwrap()
    }

    fn stream(definition: &str, rows: &[&[&str]]) -> RowStream {
        let grid = rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        RowValidationEngine::new(specs(definition)).validate_rows(grid, 0)
    }

    #[test]
    fn test_write_rows_tab_delimited_without_header() {
        let stream = stream("cs", &[&["Berlin"], &["Hamburg"]]);
        let mut buffer = Vec::new();

        let count = write_rows(stream, '\t', &mut buffer).unwrap();

        assert_eq!(count, 2);
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "1\tBerlin\n2\tHamburg\n");
    }

    #[test]
    fn test_write_rows_renders_typed_values() {
        let stream = stream(
            "d(in_fmt=%d.%m.%Y)b(true=ja,false=nein)fi",
            &[&["01.01.2020", "ja", "2.3", "7"]],
        );
        let mut buffer = Vec::new();

        write_rows(stream, ';', &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "2020-01-01;true;2.3;7\n");
    }

    #[test]
    fn test_write_rows_fails_on_bad_cell() {
        let stream = stream("i", &[&["1"], &["bad"]]);
        let mut buffer = Vec::new();

        let result = write_rows(stream, '\t', &mut buffer);
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_write_rows_rejects_non_ascii_delimiter() {
        let stream = stream("s", &[&["x"]]);
        let result = write_rows(stream, '→', &mut Vec::new());
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_render_layout_human_marks_synthetic_columns() {
        let rendered = render_layout_human(&specs("cs!x&(value=web)"));

        // counter consumes no input, drop produces no output
        assert!(rendered.contains("counter"));
        assert!(rendered.contains("dropped"));
        assert!(rendered.contains("constant 'web'"));
        assert!(rendered.contains("3 worksheet columns in, 3 output columns"));
    }

    #[test]
    fn test_render_layout_json_round_trips() {
        let rendered = render_layout_json(&specs("cib(true=ja,false=nein)")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(parsed["input_width"], 2);
        assert_eq!(parsed["output_width"], 3);
        assert_eq!(parsed["columns"][0]["code"], "c");
        assert_eq!(parsed["columns"][0]["input_index"], serde_json::Value::Null);
        assert_eq!(parsed["columns"][2]["required"], false);
    }
}
