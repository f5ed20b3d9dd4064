//! xlsx-ingest CLI - workbook import tool
//!
//! A command-line tool for converting .xlsx workbooks into the canonical
//! workbook JSON document.

mod logger;

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use xlsx_ingest::render::JsonFormat;
use xlsx_ingest::{ImportOptions, Locale, Workbook};

/// Import .xlsx workbooks into canonical workbook JSON
#[derive(Parser)]
#[command(
    name = "xlsx-ingest",
    author = "iyulab",
    version,
    about = "Import .xlsx workbooks into canonical workbook JSON",
    long_about = "xlsx-ingest - OOXML spreadsheet importer.\n\n\
                  Reads sheets, cells, styles, rich text, hyperlinks, merges and\n\
                  freeze panes from an .xlsx package."
)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a workbook to JSON
    Json {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        /// Workbook name (default: input file stem)
        #[arg(long)]
        name: Option<String>,

        /// Workbook locale, e.g. enUS or fr-FR
        #[arg(long)]
        locale: Option<Locale>,

        /// Leave hidden sheets out of the output
        #[arg(long)]
        skip_hidden: bool,
    },

    /// Show workbook information
    Info {
        /// Input file path
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    logger::init(logger::level_for(cli.verbose, cli.quiet));

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Json {
            input,
            output,
            compact,
            name,
            locale,
            skip_hidden,
        } => {
            let pb = create_spinner("Importing workbook...");

            let options = ImportOptions::new()
                .with_name(name.unwrap_or_else(|| file_stem(&input)))
                .with_locale(locale.unwrap_or_default())
                .with_hidden_sheets(!skip_hidden);
            let workbook = xlsx_ingest::import_file_with_options(&input, &options)?;
            pb.set_message("Rendering to JSON...");

            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let json = xlsx_ingest::render::to_json(&workbook, format)?;

            pb.finish_and_clear();
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!(
                    "{} Converted to JSON: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Info { input, json } => {
            let pb = create_spinner("Analyzing workbook...");
            let workbook = xlsx_ingest::import_file(&input)?;
            pb.finish_and_clear();

            if json {
                let summary = summary_json(&workbook);
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_info(&input, &workbook);
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_info(input: &Path, workbook: &Workbook) {
    println!("{}", "Workbook Information".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "File".bold(),
        input.file_name().unwrap_or_default().to_string_lossy()
    );
    println!("{}: {}", "Name".bold(), workbook.name);
    println!("{}: {}", "Sheets".bold(), workbook.sheet_order.len());
    println!("{}: {}", "Styles".bold(), workbook.styles.len());

    for sheet in workbook.ordered_sheets() {
        println!("\n{} {}", "Sheet".cyan().bold(), sheet.name.bold());
        println!("{}", "─".repeat(40));
        println!("{}: {}", "Id".bold(), sheet.id);
        if sheet.hidden {
            println!("{}: {}", "Hidden".bold(), "yes".yellow());
        }
        match sheet.dimension() {
            Some(range) => println!(
                "{}: {}:{}",
                "Dimension".bold(),
                xlsx_ingest::xlsx::reference::format_cell(range.start_row, range.start_column),
                xlsx_ingest::xlsx::reference::format_cell(range.end_row, range.end_column)
            ),
            None => println!("{}: {}", "Dimension".bold(), "empty".dimmed()),
        }
        println!("{}: {}", "Cells".bold(), sheet.cell_count());
        println!("{}: {}", "Merges".bold(), sheet.merge_data.len());
        println!("{}: {}", "Hyperlinks".bold(), sheet.hyperlink_count());
        if sheet.freeze.is_frozen() {
            println!(
                "{}: {} rows, {} columns",
                "Frozen".bold(),
                sheet.freeze.start_row.max(0),
                sheet.freeze.start_column.max(0)
            );
        }
    }
}

fn summary_json(workbook: &Workbook) -> serde_json::Value {
    let sheets: Vec<serde_json::Value> = workbook
        .ordered_sheets()
        .map(|sheet| {
            serde_json::json!({
                "id": sheet.id,
                "name": sheet.name,
                "hidden": sheet.hidden,
                "dimension": sheet.dimension(),
                "cells": sheet.cell_count(),
                "merges": sheet.merge_data.len(),
                "hyperlinks": sheet.hyperlink_count(),
            })
        })
        .collect();

    serde_json::json!({
        "name": workbook.name,
        "locale": workbook.locale,
        "styles": workbook.styles.len(),
        "sheets": sheets,
    })
}

fn print_version() {
    println!("{} {}", "xlsx-ingest".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("OOXML spreadsheet importer");
    println!();
    println!("Supported formats: XLSX, XLSM");
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| xlsx_ingest::xlsx::DEFAULT_WORKBOOK_NAME.to_string())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
