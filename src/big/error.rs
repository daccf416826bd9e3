//! Error types for BIG archive parsing and extraction

use thiserror::Error;

/// Result type for BIG archive operations
pub type Result<T> = std::result::Result<T, BigError>;

/// BIG archive error types
#[derive(Error, Debug)]
pub enum BigError {
    /// The first three bytes are not `BIG`
    #[error("Invalid signature: expected 'BIG', got {0:02x?}")]
    InvalidSignature([u8; 3]),

    /// The variant tag is not one of `5`, `4` or `F`
    #[error("Unsupported variant: {0:#04x}")]
    UnsupportedVariant(u8),

    /// Fewer than 12 header bytes available
    #[error("Truncated header: archive is shorter than 12 bytes")]
    TruncatedHeader,

    /// Entry fields or path ran past the end of the stream
    #[error("Truncated entry {index}: table of contents ends early")]
    TruncatedEntry { index: u32 },

    /// A path had no terminator within the length limit
    #[error("Path of entry {index} exceeds {limit} bytes without a terminator")]
    PathTooLong { index: u32, limit: usize },

    /// A path contained a non-ASCII byte
    #[error("Path of entry {index} is not ASCII")]
    InvalidPath { index: u32 },

    /// A path would resolve outside the extraction root
    #[error("Unsafe entry path: {0}")]
    UnsafePath(String),

    /// A payload lies outside the archive, or could not be read in full
    #[error(
        "Payload read error for {path}: {size} bytes at offset {offset} not readable from {archive_len}-byte archive"
    )]
    PayloadReadError {
        path: String,
        offset: u32,
        size: u32,
        archive_len: u64,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BigError {
    /// Whether the error came from running out of table-of-contents bytes.
    ///
    /// These are the only errors a larger read window can cure.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            BigError::TruncatedHeader | BigError::TruncatedEntry { .. }
        )
    }
}
