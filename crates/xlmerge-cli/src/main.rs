//! xlmerge CLI - merge spreadsheets into one timestamped .xlsx

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use xlmerge::{merge_files, MergeConfig, MergeError, SourceDescriptor};

#[derive(Parser)]
#[command(name = "xlmerge")]
#[command(author, version, about = "Merge .xls/.xlsx files into one .xlsx")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Resize output columns to fit their content
    #[arg(long, global = true)]
    auto_size: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the given files in order; with no files, read config.yaml
    Merge {
        /// Input spreadsheet files (.xls or .xlsx)
        files: Vec<PathBuf>,
    },

    /// Scan a directory for spreadsheets and merge them in name order
    Scan {
        /// Directory to scan (default: current directory)
        dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(1);
        }
    };

    match run(cli) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn run(cli: Cli) -> Result<PathBuf> {
    let mut auto_size = cli.auto_size;

    let candidates = match cli.command {
        Commands::Merge { files } if !files.is_empty() => files,
        Commands::Merge { .. } => {
            let config = load_config(Path::new("config.yaml"))?;
            // The flag forces auto-sizing on; otherwise the config decides
            auto_size = auto_size || config.auto_size_columns;
            config.sources.into_iter().map(PathBuf::from).collect()
        }
        Commands::Scan { dir } => scan_directory(dir.as_deref().unwrap_or(Path::new(".")))?,
    };

    let sources = filter_candidates(&candidates);
    for source in &sources {
        eprintln!("merging {}", source.path().display());
    }

    let output = merge_files(&sources, auto_size, Path::new("."))?;
    Ok(output)
}

fn load_config(path: &Path) -> Result<MergeConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("no input files given and '{}' not readable", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("invalid config '{}'", path.display()))
}

/// All .xls/.xlsx files directly in `dir`, in name order
fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("cannot scan directory '{}'", dir.display()))?;

    let mut found: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && SourceDescriptor::from_path(path.as_path()).is_some())
        .collect();
    found.sort();
    Ok(found)
}

/// Drop candidates that do not exist or have an unsupported extension,
/// warning for each
fn filter_candidates(candidates: &[PathBuf]) -> Vec<SourceDescriptor> {
    let mut sources = Vec::with_capacity(candidates.len());
    for path in candidates {
        if !path.exists() {
            eprintln!("skipping '{}': file not found", path.display());
            continue;
        }
        match SourceDescriptor::from_path(path.clone()) {
            Some(descriptor) => sources.push(descriptor),
            None => eprintln!("skipping '{}': not a .xls or .xlsx file", path.display()),
        }
    }
    sources
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<MergeError>() {
        Some(MergeError::InsufficientInputs(_)) => 2,
        Some(MergeError::UnreadableSource { .. }) => 3,
        Some(MergeError::MissingHeader { .. }) => 4,
        Some(MergeError::Serialization { .. }) => 5,
        Some(MergeError::Core(_)) | None => 1,
    }
}
