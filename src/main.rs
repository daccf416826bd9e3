//! Main entry point for the bigx CLI application.
//!
//! Opens one BIG archive and lists, extracts or pipes its entries.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

use bigx::big::Outcome;
use bigx::{BigArchive, BigEntry, BigExtractor, Cli, LocalFileReader, ReadAt};

/// Application entry point.
///
/// Argument errors exit with status 1 (help and version exit 0). Every
/// other failure is returned as an error, which also exits with status 1.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    init_tracing(&cli);

    let reader = LocalFileReader::new(&cli.file)
        .with_context(|| format!("cannot open {}", cli.file.display()))?;
    process_archive(Arc::new(reader), &cli).await
}

/// Log to stderr, filtered by `RUST_LOG` when set.
fn init_tracing(cli: &Cli) {
    let default = if cli.is_very_quiet() { "error" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Process a BIG archive based on CLI options.
///
/// - List mode (`-l` or `-v`): display archive contents
/// - Pipe mode (`-p`): write payloads to stdout
/// - Extract mode: write payloads under the output root
async fn process_archive<R: ReadAt + 'static>(reader: Arc<R>, cli: &Cli) -> Result<()> {
    let extractor = BigExtractor::new(reader);
    let archive = extractor
        .read_archive()
        .await
        .with_context(|| format!("cannot read {}", cli.file.display()))?;

    let filter = cli.filter();
    let selected: Vec<BigEntry> = archive
        .entries
        .iter()
        .filter(|e| filter.matches(&e.path))
        .cloned()
        .collect();

    if cli.list || cli.verbose {
        list_entries(cli, &archive, &selected, extractor.archive_len());
        return Ok(());
    }

    if cli.pipe {
        let show_names = selected.len() > 1;
        let mut stdout = tokio::io::stdout();
        for entry in &selected {
            if show_names {
                stdout
                    .write_all(format!("--- {} ---\n", entry.path).as_bytes())
                    .await?;
                stdout.flush().await?;
            }
            extractor.extract_to_stdout(entry).await?;
        }
        return Ok(());
    }

    let options = cli.extract_options();
    let root = cli.output_root();
    let quiet = cli.is_quiet();

    let summary = extractor
        .extract_all(&selected, &root, &options, |done| {
            if quiet {
                return;
            }
            match done.outcome {
                Outcome::Written => println!("  extracting: {}", done.entry.path),
                Outcome::Skipped => eprintln!("Skipping: {} (file exists)", done.entry.path),
            }
        })
        .await
        .with_context(|| format!("extraction from {} failed", cli.file.display()))?;

    if !quiet {
        println!(
            "{} files extracted to {} ({}), {} skipped",
            summary.written,
            root.display(),
            format_size(summary.bytes_written),
            summary.skipped
        );
    }

    Ok(())
}

/// List entries of the archive.
///
/// - Simple format (`-l`): just paths, one per line
/// - Verbose format (`-v`): header summary, then offset, size and path
fn list_entries(cli: &Cli, archive: &BigArchive, entries: &[BigEntry], archive_len: u64) {
    if !cli.verbose {
        for entry in entries {
            println!("{}", entry.path);
        }
        return;
    }

    println!(
        "Archive: {}  ({}, {} entries, declared size {}, actual size {})",
        cli.file.display(),
        archive.variant,
        archive.header.entry_count,
        archive.header.declared_size,
        archive_len
    );
    println!("{:>10}  {:>10}  Name", "Offset", "Size");
    println!("{}", "-".repeat(70));

    let mut total = 0u64;
    for entry in entries {
        println!("{:>#10x}  {:>10}  {}", entry.offset, entry.size, entry.path);
        total += u64::from(entry.size);
    }

    println!("{}", "-".repeat(70));
    println!(
        "{:>10}  {:>10}  {} files ({})",
        "",
        total,
        entries.len(),
        format_size(total)
    );
}

/// Format a byte size into a human-readable string.
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
