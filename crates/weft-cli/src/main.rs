mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "weft",
    version,
    about = "Carbon footprint estimates and bulk-import validation for garment products"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a bulk-import sheet (XLSX, CSV, TSV or JSON rows) without calculating
    Validate {
        /// Path to the import file
        input_file: PathBuf,

        /// Sheet name for XLSX files (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Validate, calculate and aggregate a bulk-import sheet
    Import {
        /// Path to the import file
        input_file: PathBuf,

        /// Sheet name for XLSX files (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Custom emission factor table (JSON)
        #[arg(short, long = "factors", value_name = "FILE")]
        factors: Option<PathBuf>,

        /// File listing SKUs that already exist, one per line
        #[arg(long = "existing-skus", value_name = "FILE")]
        existing_skus: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Exit with an error when any row is invalid
        #[arg(long)]
        strict: bool,
    },
    /// Assess a single product from a JSON description
    Assess {
        /// Path to the assessment JSON file
        input_file: PathBuf,

        /// Custom emission factor table (JSON)
        #[arg(short, long = "factors", value_name = "FILE")]
        factors: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Write the bulk-import template as CSV
    Template {
        /// Header language: en (default) or vi
        #[arg(short, long, default_value = "en", value_parser = ["en", "vi"])]
        locale: String,

        /// Write the enumerated-values reference instead of the import sheet
        #[arg(long)]
        reference: bool,

        /// Output file (default: stdout)
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Inspect and check emission factor tables
    Factors {
        #[command(subcommand)]
        action: FactorsAction,
    },
}

#[derive(Subcommand)]
enum FactorsAction {
    /// Summarise the shipped factor table
    List,
    /// Explain how a footprint is calculated, with the shipped factors
    Explain,
    /// Print the factor table format with an example
    Schema,
    /// Validate a custom factor table
    Validate {
        /// Path to JSON factor table
        file: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            input_file,
            sheet,
            output,
        } => commands::validate::run(&input_file, sheet, &output),
        Commands::Import {
            input_file,
            sheet,
            factors,
            existing_skus,
            output,
            strict,
        } => commands::import::run(
            &input_file,
            sheet,
            factors.as_deref(),
            existing_skus.as_deref(),
            &output,
            strict,
        ),
        Commands::Assess {
            input_file,
            factors,
            output,
        } => commands::assess::run(&input_file, factors.as_deref(), &output),
        Commands::Template {
            locale,
            reference,
            out,
        } => commands::template::run(&locale, reference, out.as_deref()),
        Commands::Factors { action } => match action {
            FactorsAction::List => commands::factors::list(),
            FactorsAction::Explain => commands::factors::explain(),
            FactorsAction::Schema => commands::factors::schema(),
            FactorsAction::Validate { file } => commands::factors::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
