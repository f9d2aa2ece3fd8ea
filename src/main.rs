use clap::Parser;
use sheetload::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Create async runtime and run the main command logic
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(commands::run(args)) {
        Ok(_stats) => {
            // Success - stats have already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Sheetload - Google Sheets Worksheet Downloader");
    println!("==============================================");
    println!();
    println!("Download a single Google Sheets worksheet, validate every cell against");
    println!("a compact per-column type definition, and emit the rows as delimited");
    println!("text suitable for COPY-style bulk loads.");
    println!();
    println!("USAGE:");
    println!("    sheetload <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    download    Download, validate and emit one worksheet (main command)");
    println!("    inspect     Parse a column definition and show the column layout");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Download a worksheet with a counter, strings, a German date,");
    println!("    # an integer, a ja/nein boolean and a float:");
    println!("    sheetload download --spreadsheet-key 1aBcD... --worksheet-name Sheet1 \\");
    println!("              --columns-definition 'csd(in_fmt=%d.%m.%Y)ib(true=ja,false=nein)fs'");
    println!();
    println!("    # Show how a column definition maps worksheet columns to output columns:");
    println!("    sheetload inspect --columns-definition 'csx&(value=web)' --format json");
    println!();
    println!("    # Get help for specific commands:");
    println!("    sheetload download --help");
    println!("    sheetload inspect --help");
    println!();
    println!("For detailed help on any command, use:");
    println!("    sheetload <COMMAND> --help");
}
