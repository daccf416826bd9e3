//! BIG archive parsing and extraction.
//!
//! ## Architecture
//!
//! - [`structures`]: header, variant and entry types
//! - [`parser`]: decoding the header and table of contents
//! - [`extractor`]: reading payloads and writing them out
//! - [`options`]: extraction settings and output path resolution
//!
//! ## Format Overview
//!
//! ```text
//! [0x00] "BIG"                          (3 bytes)
//! [0x03] Variant tag '5' | '4' | 'F'    (1 byte)
//! [0x04] Declared archive size          (u32 LE, informational)
//! [0x08] Entry count                    (u32 BE)
//! [0x0C] Reserved                       (3 bytes BIG5, 4 bytes BIG4/BIGF)
//!        Entries, in table order:
//!          [BIG5 only: 1 unknown byte]
//!          Payload offset               (u32 BE, absolute)
//!          Payload size                 (u32 BE)
//!          Relative path                (ASCII, NUL-terminated)
//! ```
//!
//! The declared size is the only little-endian field. BIG4 and BIGF share a
//! layout. Payloads are raw bytes at their absolute offsets.
//!
//! ## Limitations
//!
//! - No checksums or integrity checks
//! - Read only; archives cannot be written or repacked

mod error;
mod extractor;
mod options;
mod parser;
mod structures;

pub use error::{BigError, Result};
pub use extractor::{BigExtractor, ExtractSummary, ExtractedEntry, Outcome};
pub use options::{ExtractOptions, Overwrite, resolve_output_path};
pub use parser::{BigParser, decode_entries, parse_archive, read_entry};
pub use structures::*;
