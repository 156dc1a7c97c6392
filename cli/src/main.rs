//! slidecraft CLI - PowerPoint template analysis and deck generation
//!
//! Inspects templates and generates template-styled decks from a JSON list
//! of slide records.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use slidecraft::generator::{assemble, output_path_for, preview, GenerationOptions};
use slidecraft::render::{to_json, JsonFormat};
use slidecraft::{
    analyze_bytes, parse_slide_records, SlideContent, TemplateAnalyzer, TemplateProfile,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// PowerPoint template analysis and template-styled deck generation
#[derive(Parser)]
#[command(
    name = "slidecraft",
    version,
    about = "Analyze PowerPoint templates and generate decks in their style",
    long_about = "slidecraft - PowerPoint template analysis and deck generation.\n\n\
                  Reads .pptx/.potx templates and builds new decks from JSON slide records."
)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a template's profile as JSON
    Analyze {
        /// Template file (.pptx or .potx)
        template: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Check whether a template is suitable for generation
    Validate {
        /// Template file (.pptx or .potx)
        template: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize a template's own slides
    Structure {
        /// Template file (.pptx or .potx)
        template: PathBuf,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Preview the slides a records file would produce
    Preview {
        /// JSON array of slide records
        slides: PathBuf,

        /// Template whose layouts are used for suggestions
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Generate a deck from a records file
    Generate {
        /// JSON array of slide records
        slides: PathBuf,

        /// Template to style the deck with (default: built-in blank deck)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output file path (default: <template>_generated.pptx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not reuse template images
        #[arg(long)]
        no_images: bool,

        /// Do not write speaker notes
        #[arg(long)]
        no_notes: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Analyze {
            template,
            output,
            compact,
        } => {
            let pb = create_spinner("Analyzing template...");
            let profile = TemplateAnalyzer::open(&template)?.analyze()?;
            let json = to_json(&profile, json_format(compact))?;
            pb.finish_and_clear();

            write_output(output.as_ref(), &json)?;
            if let Some(output) = output {
                println!(
                    "{} Profile written: {} ({} layouts, {} colors, {} images)",
                    "✓".green().bold(),
                    output.display(),
                    profile.layouts.len(),
                    profile.colors.len(),
                    profile.images.len()
                );
            }
        }

        Commands::Validate { template, json } => {
            let report = slidecraft::validate_file(&template);
            if json {
                write_output(None, &to_json(&report, JsonFormat::Pretty)?)?;
            } else {
                print_report(&template, &report);
            }
            if !report.valid {
                std::process::exit(2);
            }
        }

        Commands::Structure { template, compact } => {
            let pb = create_spinner("Reading template slides...");
            let structure = TemplateAnalyzer::open(&template)?.slide_structure()?;
            pb.finish_and_clear();
            write_output(None, &to_json(&structure, json_format(compact))?)?;
        }

        Commands::Preview {
            slides,
            template,
            compact,
        } => {
            let records = read_records(&slides)?;
            let profile = load_profile(template.as_deref())?.1;
            let previews = preview(&records, &profile);
            write_output(None, &to_json(&previews, json_format(compact))?)?;
        }

        Commands::Generate {
            slides,
            template,
            output,
            no_images,
            no_notes,
        } => {
            let records = read_records(&slides)?;
            let options = GenerationOptions::new()
                .with_images(!no_images)
                .with_notes(!no_notes);

            let pb = create_spinner("Analyzing template...");
            let (data, profile) = load_profile(template.as_deref())?;
            pb.set_message(format!("Generating {} slides...", records.len()));
            let generated = assemble(data.as_deref(), &records, &profile, &options)?;

            let output = output.unwrap_or_else(|| output_path_for(template.as_deref()));
            generated.save(&output)?;
            pb.finish_and_clear();

            println!(
                "{} Generated {} slides: {}",
                "✓".green().bold(),
                generated.slide_count,
                output.display()
            );
            for skipped in generated.diagnostics.entries() {
                println!("  {} {}", "!".yellow().bold(), skipped);
            }
        }
    }

    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<SlideContent>, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)?;
    Ok(parse_slide_records(&json)?)
}

/// Template bytes and profile; the built-in blank deck without a template.
fn load_profile(
    template: Option<&Path>,
) -> Result<(Option<Vec<u8>>, TemplateProfile), Box<dyn std::error::Error>> {
    match template {
        Some(path) => {
            let data = fs::read(path)?;
            let profile = analyze_bytes(&data)?;
            Ok((Some(data), profile))
        }
        None => {
            let blank = slidecraft::pptx::defaults::blank_package().to_bytes()?;
            Ok((None, analyze_bytes(&blank)?))
        }
    }
}

fn print_report(template: &Path, report: &slidecraft::ValidationReport) {
    println!("{}", "Template Validation".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "File".bold(),
        template.file_name().unwrap_or_default().to_string_lossy()
    );
    let verdict = if report.valid {
        "valid".green().bold()
    } else {
        "invalid".red().bold()
    };
    println!("{}: {}", "Status".bold(), verdict);
    println!("{}: {}/100", "Score".bold(), report.compatibility_score);

    if let Some(summary) = &report.summary {
        println!("{}: {}", "Layouts".bold(), summary.layouts);
        println!("{}: {}", "Example slides".bold(), summary.slides);
        println!("{}: {}", "Images".bold(), summary.images);
        println!("{}: {}", "Master".bold(), if summary.has_master { "yes" } else { "no" });
    }

    for error in &report.errors {
        println!("{} {}", "✗".red().bold(), error);
    }
    for warning in &report.warnings {
        println!("{} {}", "!".yellow().bold(), warning);
    }
    for recommendation in &report.recommendations {
        println!("{} {}", "→".blue().bold(), recommendation);
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
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
