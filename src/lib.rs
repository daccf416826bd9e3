//! # bigx
//!
//! Extractor for BIG game archives.
//!
//! A BIG archive is a 12-byte header, a table of contents listing offset,
//! size and relative path for every file, and the raw file payloads. Three
//! variants are known, tagged `BIG5`, `BIG4` and `BIGF`; they differ only in
//! the padding around the table entries.
//!
//! ## Features
//!
//! - Decode the header and table of contents of all three variants
//! - Extract payloads to disk, to memory or to stdout
//! - Bounded concurrent extraction using positioned reads
//! - Selective extraction with name and glob filters
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use bigx::{BigExtractor, ExtractOptions, LocalFileReader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let path = Path::new("CLASH.big");
//!     let extractor = BigExtractor::new(Arc::new(LocalFileReader::new(path)?));
//!
//!     let entries = extractor.list_files().await?;
//!     for entry in &entries {
//!         println!("{} ({} bytes)", entry.path, entry.size);
//!     }
//!
//!     let options = ExtractOptions::default();
//!     let root = options.output_root(path);
//!     extractor.extract_all(&entries, &root, &options, |_| {}).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod big;
pub mod cli;
pub mod filter;
pub mod io;

pub use big::{
    ArchiveHeader, BigArchive, BigEntry, BigError, BigExtractor, ExtractOptions, Overwrite,
    Variant,
};
pub use cli::Cli;
pub use filter::EntryFilter;
pub use io::{LocalFileReader, MemoryReader, ReadAt};
