//! Low-level BIG archive parser.
//!
//! The table of contents directly follows the 12-byte header. Its entries
//! carry variable-length, NUL-terminated paths, so the table can only be
//! walked front to back; an entry's position is known only once every entry
//! before it has been decoded.
//!
//! ## Parsing Strategy
//!
//! 1. Fetch a window from the start of the source
//! 2. Decode the header and the whole table from that window
//! 3. If the table runs past the window, grow it and decode again
//!
//! Payloads are never touched here; see [`BigExtractor`](super::BigExtractor).

use byteorder::{BigEndian, ReadBytesExt};
use std::io::{self, Cursor, Read};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::io::ReadAt;

use super::error::{BigError, Result};
use super::structures::*;

/// First read covers the table of every archive seen so far.
const INITIAL_TOC_WINDOW: u64 = 64 * 1024;

/// Cap on up-front allocation, so a corrupt entry count cannot reserve
/// gigabytes before the first entry fails to decode.
const MAX_PREALLOCATED_ENTRIES: u32 = 4096;

/// Decode a full archive (header and table) from a sequential stream.
///
/// The stream must be positioned at the start of the archive. On success it
/// is left at the first byte after the table.
pub fn parse_archive<R: Read>(r: &mut R) -> Result<BigArchive> {
    let header = ArchiveHeader::read(r)?;
    let variant = header.variant()?;
    let entries = decode_entries(r, variant, header.entry_count)?;

    Ok(BigArchive {
        header,
        variant,
        entries,
    })
}

/// Decode `entry_count` entries following the header.
///
/// Expects the stream right after the header, at the variant's reserved
/// region. Any failure aborts the whole table: a misread entry shifts every
/// entry after it.
pub fn decode_entries<R: Read>(
    r: &mut R,
    variant: Variant,
    entry_count: u32,
) -> Result<Vec<BigEntry>> {
    let layout = variant.layout();
    skip(r, layout.reserved_len, 0)?;

    let mut entries = Vec::with_capacity(entry_count.min(MAX_PREALLOCATED_ENTRIES) as usize);
    for index in 0..entry_count {
        skip(r, layout.entry_prefix_len, index)?;
        let entry = read_entry(r, index)?;
        trace!(
            index,
            offset = entry.offset,
            size = entry.size,
            path = %entry.path,
            "decoded entry"
        );
        entries.push(entry);
    }

    Ok(entries)
}

/// Read one entry: big-endian offset, big-endian size, NUL-terminated path.
///
/// `index` is only used to label errors.
pub fn read_entry<R: Read>(r: &mut R, index: u32) -> Result<BigEntry> {
    let truncated = |e: io::Error| truncated_entry(e, index);

    let offset = r.read_u32::<BigEndian>().map_err(truncated)?;
    let size = r.read_u32::<BigEndian>().map_err(truncated)?;
    let path = read_path(r, index)?;

    Ok(BigEntry { offset, size, path })
}

/// Read a NUL-terminated ASCII path, discarding the terminator.
fn read_path<R: Read>(r: &mut R, index: u32) -> Result<String> {
    let mut bytes = Vec::new();
    loop {
        let byte = r.read_u8().map_err(|e| truncated_entry(e, index))?;
        if byte == 0 {
            break;
        }
        if bytes.len() == MAX_PATH_LEN {
            return Err(BigError::PathTooLong {
                index,
                limit: MAX_PATH_LEN,
            });
        }
        bytes.push(byte);
    }

    if !bytes.is_ascii() {
        return Err(BigError::InvalidPath { index });
    }
    String::from_utf8(bytes).map_err(|_| BigError::InvalidPath { index })
}

/// Skip `len` bytes of unknown content.
fn skip<R: Read>(r: &mut R, len: usize, index: u32) -> Result<()> {
    let skipped = io::copy(&mut r.by_ref().take(len as u64), &mut io::sink())?;
    if skipped < len as u64 {
        return Err(BigError::TruncatedEntry { index });
    }
    Ok(())
}

fn truncated_entry(e: io::Error, index: u32) -> BigError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        BigError::TruncatedEntry { index }
    } else {
        BigError::Io(e)
    }
}

/// BIG archive parser over a random-access source.
///
/// Typically used through [`BigExtractor`](super::BigExtractor).
pub struct BigParser<R: ReadAt> {
    /// The underlying data source
    reader: Arc<R>,
    /// Actual size of the archive in bytes
    size: u64,
}

impl<R: ReadAt> BigParser<R> {
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Read and decode the header and table of contents.
    ///
    /// Reads never go past the real end of the source. A table that is
    /// still incomplete once the window covers the whole source is reported
    /// as truncated.
    pub async fn read_archive(&self) -> Result<BigArchive> {
        let mut window = INITIAL_TOC_WINDOW.min(self.size);
        let mut buf = vec![0u8; window as usize];
        self.reader.read_exact_at(0, &mut buf).await?;

        loop {
            match parse_archive(&mut Cursor::new(&buf)) {
                Ok(archive) => {
                    self.log_archive(&archive);
                    return Ok(archive);
                }
                Err(e) if e.is_truncation() && window < self.size => {
                    let filled = buf.len();
                    window = window.saturating_mul(2).min(self.size);
                    debug!(window, "table of contents extends past read window");
                    buf.resize(window as usize, 0);
                    self.reader
                        .read_exact_at(filled as u64, &mut buf[filled..])
                        .await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn log_archive(&self, archive: &BigArchive) {
        debug!(
            variant = %archive.variant,
            entries = archive.entries.len(),
            declared_size = archive.header.declared_size,
            "read table of contents"
        );
        if u64::from(archive.header.declared_size) != self.size {
            warn!(
                declared = archive.header.declared_size,
                actual = self.size,
                "declared archive size does not match file size"
            );
        }
    }

    /// Actual size of the source in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get a reference to the underlying reader.
    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }
}
