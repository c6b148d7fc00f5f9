//! PDF Manager CLI tool
//!
//! Runs the interactive menu when started without a subcommand.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_manager::config::{Settings, DEFAULT_IMAGES_DIR, DEFAULT_SPLIT_DIR};
use pdf_manager::date::{format_pdf_date, parse_pdf_date};
use pdf_manager::menu::{Args, Dispatcher, Operation};
use pdf_manager::pdf::extract_info;
use pdf_manager::DocumentService;

/// PDF Manager - Read, split, merge, protect and watermark PDFs
#[derive(Parser)]
#[command(name = "pdf-manager")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Interactive menu
    pdf-manager

    # Merge PDFs in order
    pdf-manager merge -o combined.pdf intro.pdf \"chapter-*.pdf\"

    # Rotate every page a quarter turn counter-clockwise
    pdf-manager rotate scan.pdf -o upright.pdf --angle -90

    # Protect a document with a password
    pdf-manager encrypt report.pdf -o locked.pdf --password secret")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory for split pages and the cropped sample
    #[arg(long, global = true, env = "PDF_MANAGER_SPLIT_DIR", default_value = DEFAULT_SPLIT_DIR)]
    split_dir: PathBuf,

    /// Default directory for extracted images
    #[arg(long, global = true, env = "PDF_MANAGER_IMAGES_DIR", default_value = DEFAULT_IMAGES_DIR)]
    images_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the page count and the text of every page
    Read {
        /// Input PDF file
        input: PathBuf,
    },

    /// Print the document information entries
    Metadata {
        /// Input PDF file
        input: PathBuf,
    },

    /// Split a PDF into one file per page
    Split {
        /// Input PDF file
        input: PathBuf,
    },

    /// Merge multiple PDF files into one
    Merge {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Rotate every page clockwise
    Rotate {
        /// Input PDF file
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Angle in degrees, a multiple of 90 (negative turns counter-clockwise)
        #[arg(short, long, default_value_t = 90, allow_negative_numbers = true)]
        angle: i64,
    },

    /// Protect a PDF with AES-256 encryption
    Encrypt {
        /// Input PDF file
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Password required to open the output
        #[arg(short, long, env = "PDF_MANAGER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Remove password protection from a PDF
    Decrypt {
        /// Encrypted PDF file
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Password that opens the input
        #[arg(short, long, env = "PDF_MANAGER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Save the images embedded in a PDF
    Images {
        /// Input PDF file
        input: PathBuf,

        /// Output directory (defaults to --images-dir)
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,
    },

    /// Write the rotated and cropped three-page sample to the split directory
    Crop {
        /// Input PDF file with at least three pages
        input: PathBuf,
    },

    /// Stamp diagonal text on every page
    Watermark {
        /// Input PDF file
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Watermark text
        #[arg(short, long)]
        text: String,
    },

    /// Show page count and document information
    Info {
        /// Input PDF file
        input: PathBuf,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_manager=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let service = DocumentService::new(Settings {
        split_dir: cli.split_dir,
        images_dir: cli.images_dir,
    });

    let result = match cli.command {
        None => cmd_interactive(&service),
        Some(command) => run_command(&service, command),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Run one subcommand through the handler of its menu operation
fn run_command(service: &DocumentService, command: Commands) -> anyhow::Result<()> {
    let path = |p: PathBuf| p.to_string_lossy().into_owned();

    match command {
        Commands::Read { input } => cmd_operation(
            service,
            Operation::ReadText,
            &Args::new().with("input", path(input)),
        ),
        Commands::Metadata { input } => cmd_operation(
            service,
            Operation::Metadata,
            &Args::new().with("input", path(input)),
        ),
        Commands::Split { input } => cmd_operation(
            service,
            Operation::Split,
            &Args::new().with("input", path(input)),
        ),
        Commands::Merge { inputs, output } => cmd_operation(
            service,
            Operation::Merge,
            &Args::new()
                .with("inputs", inputs.join(" "))
                .with("output", path(output)),
        ),
        Commands::Rotate {
            input,
            output,
            angle,
        } => cmd_operation(
            service,
            Operation::Rotate,
            &Args::new()
                .with("input", path(input))
                .with("output", path(output))
                .with("angle", angle.to_string()),
        ),
        Commands::Encrypt {
            input,
            output,
            password,
        } => cmd_operation(
            service,
            Operation::Encrypt,
            &Args::new()
                .with("input", path(input))
                .with("output", path(output))
                .with("password", password),
        ),
        Commands::Decrypt {
            input,
            output,
            password,
        } => cmd_operation(
            service,
            Operation::Decrypt,
            &Args::new()
                .with("input", path(input))
                .with("output", path(output))
                .with("password", password),
        ),
        Commands::Images { input, output_dir } => {
            let mut args = Args::new().with("input", path(input));
            if let Some(dir) = output_dir {
                args.insert("output_dir", path(dir));
            }
            cmd_operation(service, Operation::ExtractImages, &args)
        }
        Commands::Crop { input } => cmd_operation(
            service,
            Operation::Crop,
            &Args::new().with("input", path(input)),
        ),
        Commands::Watermark {
            input,
            output,
            text,
        } => cmd_operation(
            service,
            Operation::Watermark,
            &Args::new()
                .with("input", path(input))
                .with("output", path(output))
                .with("text", text),
        ),
        Commands::Info { input } => cmd_info(input),
    }
}

fn cmd_interactive(service: &DocumentService) -> anyhow::Result<()> {
    let stdin = io::stdin();
    Dispatcher::new(service, stdin.lock(), io::stdout()).run()?;
    Ok(())
}

fn cmd_operation(service: &DocumentService, operation: Operation, args: &Args) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    operation
        .handler()
        .run(service, args, &mut stdout)
        .with_context(|| operation.label().to_string())?;
    stdout.flush()?;
    Ok(())
}

fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    let info = extract_info(&input)?;
    let metadata = info.metadata;

    println!("File: {}", input.display());
    println!("Pages: {}", info.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }
    if let Some(raw) = metadata.creation_date {
        match parse_pdf_date(&raw) {
            Some(date) => println!("Created: {}", format_pdf_date(&date)),
            None => println!("Created: {}", raw),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_info_subcommand() {
        let cli = Cli::try_parse_from(["pdf-manager", "info", "report.pdf"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Info { input }) if input == PathBuf::from("report.pdf")
        ));
    }

    #[test]
    fn test_rotate_accepts_negative_angle() {
        let cli =
            Cli::try_parse_from(["pdf-manager", "rotate", "in.pdf", "-o", "out.pdf", "-a", "-90"])
                .unwrap();
        assert!(matches!(cli.command, Some(Commands::Rotate { angle: -90, .. })));
    }

    #[test]
    fn test_no_subcommand_runs_menu() {
        let cli = Cli::try_parse_from(["pdf-manager"]).unwrap();
        assert!(cli.command.is_none());
    }
}
