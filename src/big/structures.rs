use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::fmt;
use std::io::{self, Read};

use super::error::{BigError, Result};

/// Archive signature, the first three bytes of every BIG file
pub const SIGNATURE: &[u8; 3] = b"BIG";

/// Fixed header: signature, variant tag, declared size, entry count
pub const HEADER_SIZE: usize = 12;

/// Longest path accepted before a terminator must appear
pub const MAX_PATH_LEN: usize = 4096;

/// Container variant, selected by the fourth header byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Big5,
    Big4,
    BigF,
}

impl Variant {
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            b'5' => Ok(Variant::Big5),
            b'4' => Ok(Variant::Big4),
            b'F' => Ok(Variant::BigF),
            other => Err(BigError::UnsupportedVariant(other)),
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            Variant::Big5 => b'5',
            Variant::Big4 => b'4',
            Variant::BigF => b'F',
        }
    }

    /// Table layout for this variant. BIG4 and BIGF share one layout.
    pub fn layout(&self) -> TocLayout {
        match self {
            Variant::Big5 => TocLayout::BIG5,
            Variant::Big4 | Variant::BigF => TocLayout::BIGF,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BIG{}", char::from(self.tag()))
    }
}

/// Widths of the unknown regions that differ between variants.
///
/// Their contents have never been observed to matter and are skipped
/// unread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TocLayout {
    /// Bytes between the header and the first entry
    pub reserved_len: usize,
    /// Bytes in front of each entry's offset field
    pub entry_prefix_len: usize,
}

impl TocLayout {
    pub const BIG5: TocLayout = TocLayout {
        reserved_len: 3,
        entry_prefix_len: 1,
    };

    pub const BIGF: TocLayout = TocLayout {
        reserved_len: 4,
        entry_prefix_len: 0,
    };
}

/// Fixed 12-byte archive header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// Raw variant byte, validated by [`ArchiveHeader::variant`]
    pub tag: u8,
    /// Total archive size as written by the packer (little-endian on disk).
    ///
    /// Informational only; reads are bounded by the real source length.
    pub declared_size: u32,
    /// Number of table entries (big-endian on disk)
    pub entry_count: u32,
}

impl ArchiveHeader {
    /// Read the header from the start of `r`, consuming exactly
    /// [`HEADER_SIZE`] bytes on success.
    ///
    /// The signature is checked as soon as the first four bytes are in, so
    /// a foreign file is reported as such even when it is very short.
    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic).map_err(truncated_header)?;
        if &magic[..3] != SIGNATURE {
            return Err(BigError::InvalidSignature([magic[0], magic[1], magic[2]]));
        }

        let declared_size = r.read_u32::<LittleEndian>().map_err(truncated_header)?;
        let entry_count = r.read_u32::<BigEndian>().map_err(truncated_header)?;

        Ok(Self {
            tag: magic[3],
            declared_size,
            entry_count,
        })
    }

    pub fn variant(&self) -> Result<Variant> {
        Variant::from_tag(self.tag)
    }
}

fn truncated_header(e: io::Error) -> BigError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        BigError::TruncatedHeader
    } else {
        BigError::Io(e)
    }
}

/// One table-of-contents record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigEntry {
    /// Absolute offset of the payload within the archive
    pub offset: u32,
    /// Payload length in bytes
    pub size: u32,
    /// Relative output path, `/` separated
    pub path: String,
}

impl BigEntry {
    /// First byte past the payload.
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }
}

/// Entry paths are written with `/`, but `\` shows up in some archives.
pub(crate) fn is_path_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Decoded header and table of a BIG archive
#[derive(Debug, Clone)]
pub struct BigArchive {
    pub header: ArchiveHeader,
    pub variant: Variant,
    /// Entries in table order
    pub entries: Vec<BigEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_fields_and_endianness() {
        let data = [
            b'B', b'I', b'G', b'5', // signature + tag
            0x10, 0x00, 0x00, 0x00, // declared size, LE
            0x00, 0x00, 0x00, 0x02, // entry count, BE
            0xAA, // first byte after the header
        ];
        let mut cursor = Cursor::new(&data[..]);
        let header = ArchiveHeader::read(&mut cursor).unwrap();

        assert_eq!(header.declared_size, 16);
        assert_eq!(header.entry_count, 2);
        assert_eq!(header.variant().unwrap(), Variant::Big5);
        assert_eq!(cursor.position(), HEADER_SIZE as u64);
    }

    #[test]
    fn test_bad_signature_wins_over_tag() {
        for tag in [b'5', b'4', b'F', b'9', 0] {
            let mut data = b"XIG?\0\0\0\0\0\0\0\0".to_vec();
            data[3] = tag;
            let err = ArchiveHeader::read(&mut Cursor::new(data)).unwrap_err();
            assert!(matches!(err, BigError::InvalidSignature([b'X', b'I', b'G'])));
        }
    }

    #[test]
    fn test_bad_signature_on_short_input() {
        let err = ArchiveHeader::read(&mut Cursor::new(b"PK\x03\x04")).unwrap_err();
        assert!(matches!(err, BigError::InvalidSignature(_)));
    }

    #[test]
    fn test_truncated_header() {
        for len in [0, 3, 4, 8, 11] {
            let data = &b"BIGF\x00\x00\x00\x00\x00\x00\x00\x01"[..len];
            let err = ArchiveHeader::read(&mut Cursor::new(data)).unwrap_err();
            assert!(matches!(err, BigError::TruncatedHeader), "len {len}: {err}");
        }
    }

    #[test]
    fn test_variant_dispatch() {
        assert_eq!(Variant::from_tag(b'5').unwrap().layout(), TocLayout::BIG5);
        assert_eq!(Variant::from_tag(b'4').unwrap().layout(), TocLayout::BIGF);
        assert_eq!(Variant::from_tag(b'F').unwrap().layout(), TocLayout::BIGF);
        assert!(matches!(
            Variant::from_tag(b'9'),
            Err(BigError::UnsupportedVariant(b'9'))
        ));
        assert!(matches!(
            Variant::from_tag(b'f'),
            Err(BigError::UnsupportedVariant(b'f'))
        ));
    }

    #[test]
    fn test_variant_display() {
        assert_eq!(Variant::Big5.to_string(), "BIG5");
        assert_eq!(Variant::BigF.to_string(), "BIGF");
    }

    #[test]
    fn test_entry_end() {
        let entry = BigEntry {
            offset: u32::MAX,
            size: 2,
            path: "big.bin".to_string(),
        };
        assert_eq!(entry.end(), u64::from(u32::MAX) + 2);
    }
}
