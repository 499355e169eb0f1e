//! `deckir`: extract presentations to IR JSON and write IR edits back.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use deckir_core::{
    derive_diff, Diff, Document, ExtractionSettings, Extractor, RegenerationOutcome,
    RegenerationSettings, Regenerator,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "deckir")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("DECKIR_BUILD"), ")"))]
#[command(about = "Presentation to IR round-trip tool", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one or more .pptx files to IR JSON
    Extract {
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output file for a single input, output directory for several (default: stdout / next to input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Extraction settings JSON
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
    /// Apply IR edits to the original .pptx
    Regenerate {
        /// The .pptx the IR was extracted from
        #[arg(long)]
        original: PathBuf,

        /// IR JSON produced by `extract`
        #[arg(long)]
        ir: PathBuf,

        /// Diff JSON to apply
        #[arg(long, conflicts_with = "modified", required_unless_present = "modified")]
        diff: Option<PathBuf>,

        /// Modified IR JSON; the diff is derived against `--ir`
        #[arg(long)]
        modified: Option<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,

        /// Write the regeneration report as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        /// Fail when a slide or shape cannot be found
        #[arg(long)]
        strict: bool,
    },
    /// Print a short summary of a .pptx
    Info {
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            settings,
        } => extract(&input, output.as_deref(), settings.as_deref()).map(|_| ExitCode::SUCCESS),
        Commands::Regenerate {
            original,
            ir,
            diff,
            modified,
            output,
            report,
            strict,
        } => regenerate(
            &original,
            &ir,
            diff.as_deref(),
            modified.as_deref(),
            &output,
            report.as_deref(),
            strict,
        ),
        Commands::Info { file } => info(&file).map(|_| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn extract(inputs: &[PathBuf], output: Option<&Path>, settings: Option<&Path>) -> Result<()> {
    let settings = match settings {
        Some(path) => ExtractionSettings::from_json_file(path)
            .with_context(|| format!("reading settings {}", path.display()))?,
        None => ExtractionSettings::default(),
    };
    let extractor = Extractor::new(settings)?;

    if let [input] = inputs {
        let document = extractor
            .extract_path(input)
            .with_context(|| format!("extracting {}", input.display()))?;
        let json = document.to_json()?;
        match output {
            Some(path) => std::fs::write(path, json)
                .with_context(|| format!("writing {}", path.display()))?,
            None => println!("{}", json),
        }
        return Ok(());
    }

    if let Some(dir) = output {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut failed = 0;
    for (input, result) in inputs.iter().zip(extractor.extract_many(inputs)) {
        match result {
            Ok(document) => {
                let path = ir_path(input, output);
                std::fs::write(&path, document.to_json()?)
                    .with_context(|| format!("writing {}", path.display()))?;
                log::info!("{} -> {}", input.display(), path.display());
            }
            Err(e) => {
                eprintln!("error processing {}: {}", input.display(), e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} files failed", failed, inputs.len());
    }
    Ok(())
}

/// `<stem>.ir.json` in `dir`, or next to the input.
fn ir_path(input: &Path, dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "presentation".to_string());
    let name = format!("{}.ir.json", stem);
    match dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn regenerate(
    original: &Path,
    ir: &Path,
    diff: Option<&Path>,
    modified: Option<&Path>,
    output: &Path,
    report_path: Option<&Path>,
    strict: bool,
) -> Result<ExitCode> {
    let document = Document::from_json_file(ir).with_context(|| format!("reading IR {}", ir.display()))?;
    let diff = match (diff, modified) {
        (Some(path), _) => {
            Diff::from_json_file(path).with_context(|| format!("reading diff {}", path.display()))?
        }
        (None, Some(path)) => {
            let modified = Document::from_json_file(path)
                .with_context(|| format!("reading modified IR {}", path.display()))?;
            derive_diff(&document, &modified)?
        }
        (None, None) => bail!("either --diff or --modified is required"),
    };

    let settings = RegenerationSettings {
        strict,
        ..RegenerationSettings::default()
    };
    let report = Regenerator::new(settings)
        .regenerate(original, &document, &diff, output)
        .with_context(|| format!("regenerating {}", original.display()))?;

    if let Some(path) = report_path {
        std::fs::write(path, report.to_json()).with_context(|| format!("writing {}", path.display()))?;
    }
    eprintln!(
        "{} edits applied, {} skipped, {} parts rewritten",
        report.applied.len(),
        report.skipped.len(),
        report.rewritten_parts.len()
    );
    for skip in &report.skipped {
        eprintln!("  skipped {}: {}", skip.key, skip.reason);
    }

    Ok(match report.outcome() {
        RegenerationOutcome::Success => ExitCode::SUCCESS,
        RegenerationOutcome::PartialSuccess => ExitCode::from(2),
    })
}

fn info(file: &Path) -> Result<()> {
    let settings = ExtractionSettings {
        include_table_cells: false,
        ..ExtractionSettings::default()
    };
    let document = Extractor::new(settings)?
        .extract_path(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let meta = &document.metadata;

    println!("File:        {}", file.display());
    println!("Id:          {}", meta.presentation_id);
    if let Some(title) = &meta.title {
        println!("Title:       {}", title);
    }
    if let Some(author) = &meta.author {
        println!("Author:      {}", author);
    }
    println!(
        "Slide size:  {} x {} EMU ({})",
        meta.slide_size.width, meta.slide_size.height, meta.aspect_ratio
    );
    println!(
        "Slides:      {} ({} masters, {} layouts)",
        document.slides.len(),
        document.masters.len(),
        document.layouts.len()
    );
    for slide in document.slides() {
        println!(
            "  #{:<3} id={:<6} {:?}, {} shapes{}",
            slide.index,
            slide.id,
            slide.role,
            slide.shapes_preorder().count(),
            if slide.hidden { ", hidden" } else { "" }
        );
    }
    if !document.warnings.is_empty() {
        println!("Warnings:    {}", document.warnings.len());
    }
    Ok(())
}
