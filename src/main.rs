//! # forme-invoice CLI
//!
//! Usage:
//!   forme-invoice render invoice.json -o invoice.pdf
//!   cat invoice.json | forme-invoice render - --config template.json
//!   forme-invoice validate invoice.json
//!   forme-invoice example > invoice.json

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use forme_invoice::{parse_invoice, render, validate, InvoiceError, RenderOptions, TemplateConfig};

#[derive(Parser)]
#[command(name = "forme-invoice", version, about = "Render invoice records to PDF")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and render an invoice record to PDF
    Render {
        /// Invoice JSON file, or `-` for stdin
        input: PathBuf,
        /// Output path (defaults to invoice-<number>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Template configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
        /// Year for the copyright footer (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Check an invoice record and list every field error
    Validate {
        /// Invoice JSON file, or `-` for stdin
        input: PathBuf,
    },
    /// Print an example invoice record
    Example,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Render {
            input,
            output,
            config,
            year,
        } => run_render(&input, output, config.as_deref(), year),
        Commands::Validate { input } => run_validate(&input),
        Commands::Example => {
            print!("{}", example_invoice_json());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_input(path: &Path) -> Result<String, InvoiceError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn run_render(
    input: &Path,
    output: Option<PathBuf>,
    config: Option<&Path>,
    year: Option<i32>,
) -> Result<(), InvoiceError> {
    let config = match config {
        Some(path) => TemplateConfig::from_json(&fs::read_to_string(path)?)?,
        None => TemplateConfig::default(),
    };
    let options = match year {
        Some(year) => RenderOptions { year },
        None => RenderOptions::default(),
    };

    let data = parse_invoice(&read_input(input)?)?;
    validate(&data)?;
    let bytes = render(&data, &config, &options)?;

    let output = output.unwrap_or_else(|| PathBuf::from(data.file_name()));
    fs::write(&output, &bytes)?;
    info!(path = %output.display(), bytes = bytes.len(), "wrote invoice");
    Ok(())
}

fn run_validate(input: &Path) -> Result<(), InvoiceError> {
    let data = parse_invoice(&read_input(input)?)?;
    validate(&data)?;
    info!(
        invoice_number = %data.invoice_number,
        items = data.items.len(),
        total = %data.total(),
        "invoice is valid"
    );
    Ok(())
}

fn example_invoice_json() -> &'static str {
    r##"{
  "invoiceNumber": "NNB-INV-250101-1200",
  "date": "2025-01-01",
  "companyName": "Na Na Beauty",
  "companyAddress": "Shop S129, 2/F, Capital Plaza, 61-65 Chatham Road South, Tsim Sha Tsui, Kowloon",
  "companyEmail": "info@nanabeauty.com",
  "companyPhone": "98375219",
  "clientName": "Chan Tai Man",
  "clientEmail": "chan@example.com",
  "clientPhone": "9123 4567",
  "items": [
    { "description": "Gel Manicure", "quantity": 1, "price": 480 },
    { "description": "Hand Care Package", "quantity": 1, "price": 480 },
    { "description": "OPI Nail Polish", "quantity": 2, "price": 150 }
  ],
  "notes": "Thank you for visiting. Please keep this invoice for your records."
}
"##
}
