use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::task::{JoinError, JoinSet};
use tracing::debug;

use crate::io::ReadAt;

use super::error::{BigError, Result};
use super::options::{ExtractOptions, Overwrite, resolve_output_path};
use super::parser::BigParser;
use super::structures::{BigArchive, BigEntry};

/// Result of extracting one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Written,
    /// Output existed and [`Overwrite::Never`] was set
    Skipped,
}

/// A finished entry, as reported to the progress callback
#[derive(Debug, Clone)]
pub struct ExtractedEntry {
    pub entry: BigEntry,
    pub output_path: PathBuf,
    pub outcome: Outcome,
}

/// Totals for one extraction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub written: usize,
    pub skipped: usize,
    pub bytes_written: u64,
}

impl ExtractSummary {
    fn record(&mut self, done: &ExtractedEntry) {
        match done.outcome {
            Outcome::Written => {
                self.written += 1;
                self.bytes_written += u64::from(done.entry.size);
            }
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

/// BIG archive extractor
pub struct BigExtractor<R: ReadAt> {
    parser: BigParser<R>,
}

impl<R: ReadAt> Clone for BigExtractor<R> {
    fn clone(&self) -> Self {
        Self {
            parser: BigParser::new(self.parser.reader().clone()),
        }
    }
}

impl<R: ReadAt> BigExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: BigParser::new(reader),
        }
    }

    /// Decode header and table of contents
    pub async fn read_archive(&self) -> Result<BigArchive> {
        self.parser.read_archive().await
    }

    /// List all files in the archive, in table order
    pub async fn list_files(&self) -> Result<Vec<BigEntry>> {
        Ok(self.parser.read_archive().await?.entries)
    }

    /// Actual archive length in bytes
    pub fn archive_len(&self) -> u64 {
        self.parser.size()
    }

    /// Read an entry's payload into memory.
    ///
    /// The payload range is checked against the real archive length first;
    /// the declared size in the header plays no part.
    pub async fn extract_to_memory(&self, entry: &BigEntry) -> Result<Vec<u8>> {
        let archive_len = self.parser.size();
        let payload_error = || BigError::PayloadReadError {
            path: entry.path.clone(),
            offset: entry.offset,
            size: entry.size,
            archive_len,
        };

        if entry.end() > archive_len {
            return Err(payload_error());
        }

        let mut buf = vec![0u8; entry.size as usize];
        self.parser
            .reader()
            .read_exact_at(u64::from(entry.offset), &mut buf)
            .await
            .map_err(|e| {
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    payload_error()
                } else {
                    BigError::Io(e)
                }
            })?;

        Ok(buf)
    }

    /// Extract file to disk
    pub async fn extract_to_file(&self, entry: &BigEntry, output_path: &Path) -> Result<()> {
        // Read first so a bad entry leaves nothing behind
        let data = self.extract_to_memory(entry).await?;

        // create_dir_all succeeds if another task created the directory first
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = fs::File::create(output_path).await?;
        file.write_all(&data).await?;
        file.flush().await?;

        Ok(())
    }

    /// Extract file to stdout
    pub async fn extract_to_stdout(&self, entry: &BigEntry) -> Result<()> {
        let data = self.extract_to_memory(entry).await?;

        let mut stdout = tokio::io::stdout();
        stdout.write_all(&data).await?;
        stdout.flush().await?;

        Ok(())
    }

    async fn extract_entry(
        &self,
        entry: BigEntry,
        output_path: PathBuf,
        overwrite: Overwrite,
    ) -> Result<ExtractedEntry> {
        let outcome = if overwrite == Overwrite::Never && fs::try_exists(&output_path).await? {
            debug!(path = %output_path.display(), "output exists, skipping");
            Outcome::Skipped
        } else {
            self.extract_to_file(&entry, &output_path).await?;
            Outcome::Written
        };

        Ok(ExtractedEntry {
            entry,
            output_path,
            outcome,
        })
    }
}

impl<R: ReadAt + 'static> BigExtractor<R> {
    /// Extract `entries` under `root`.
    ///
    /// Up to `options.jobs` entries are in flight at once, each reading its
    /// payload with positioned reads. `on_done` sees every finished entry in
    /// completion order. The first error aborts the pass and cancels the
    /// entries still running; files already written stay on disk.
    pub async fn extract_all<F>(
        &self,
        entries: &[BigEntry],
        root: &Path,
        options: &ExtractOptions,
        mut on_done: F,
    ) -> Result<ExtractSummary>
    where
        F: FnMut(&ExtractedEntry),
    {
        let plan = plan_outputs(entries, root)?;
        let jobs = options.jobs.max(1);
        debug!(entries = plan.len(), jobs, root = %root.display(), "extracting");

        let mut summary = ExtractSummary::default();
        let mut tasks = JoinSet::new();

        for (entry, output_path) in plan {
            if tasks.len() >= jobs {
                if let Some(joined) = tasks.join_next().await {
                    let done = finished(joined)?;
                    summary.record(&done);
                    on_done(&done);
                }
            }

            let extractor = self.clone();
            let overwrite = options.overwrite;
            tasks.spawn(async move {
                extractor
                    .extract_entry(entry, output_path, overwrite)
                    .await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let done = finished(joined)?;
            summary.record(&done);
            on_done(&done);
        }

        Ok(summary)
    }
}

fn finished(
    joined: std::result::Result<Result<ExtractedEntry>, JoinError>,
) -> Result<ExtractedEntry> {
    joined.map_err(|e| BigError::Io(io::Error::other(e)))?
}

/// Resolve output paths in table order, dropping every entry that a later
/// entry with the same output path would overwrite.
fn plan_outputs(entries: &[BigEntry], root: &Path) -> Result<Vec<(BigEntry, PathBuf)>> {
    let mut plan: Vec<Option<(BigEntry, PathBuf)>> = Vec::with_capacity(entries.len());
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();

    for entry in entries {
        let output_path = resolve_output_path(root, &entry.path)?;
        if let Some(earlier) = seen.insert(output_path.clone(), plan.len()) {
            debug!(path = %entry.path, "duplicate path, later entry wins");
            plan[earlier] = None;
        }
        plan.push(Some((entry.clone(), output_path)));
    }

    Ok(plan.into_iter().flatten().collect())
}
