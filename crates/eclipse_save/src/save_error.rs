// ---------------------------------------------------------------------------
// SaveError: typed errors for every encode/decode/bundle operation
// ---------------------------------------------------------------------------

use thiserror::Error;

/// Errors that can occur while encoding, decoding or probing a save.
///
/// Decode errors carry the byte offset and the name of the field being read
/// so a corrupt save can be diagnosed without a hex editor.
#[derive(Debug, Error)]
pub enum SaveError {
    /// A length or count prefix is negative or above the sanity bound.
    #[error("malformed length {length} for `{field}` at offset {offset}")]
    MalformedLength {
        field: &'static str,
        offset: usize,
        length: i64,
    },
    /// A value-kind discriminant byte is not one of the known kinds.
    #[error("unknown value kind {kind} at offset {offset}")]
    UnknownValueKind { offset: usize, kind: u8 },
    /// A closed enumeration (object type, script event, save kind) held an
    /// unknown discriminant.
    #[error("unknown discriminant {value} for `{field}` at offset {offset}")]
    UnknownDiscriminant {
        field: &'static str,
        offset: usize,
        value: u32,
    },
    /// A presence flag or 4-byte boolean was neither 0 nor 1.
    #[error("invalid flag value {value} for `{field}` at offset {offset}")]
    InvalidFlag {
        field: &'static str,
        offset: usize,
        value: i32,
    },
    /// Text bytes were not valid UTF-8.
    #[error("invalid UTF-8 text for `{field}` at offset {offset}")]
    InvalidText { field: &'static str, offset: usize },
    /// A keyed entry (inventory slot, local name) appeared twice.
    #[error("duplicate key `{key}` for `{field}` at offset {offset}")]
    DuplicateKey {
        field: &'static str,
        offset: usize,
        key: String,
    },
    /// The stream ended before a field could be fully read.
    #[error("truncated stream reading `{field}` at offset {offset}: need {needed} bytes, {remaining} left")]
    TruncatedStream {
        field: &'static str,
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    /// The 4-byte signature is not in the known set for this engine family.
    #[error("unknown save signature {found:?}")]
    UnknownSignature { found: [u8; 4] },
    /// The save was written by a newer tool; migration/upgrade is required.
    #[error("save is format v{found}, but this codec only supports up to v{max}")]
    VersionTooNew { found: u32, max: u32 },
    /// The version is below the supported range.
    #[error("save format v{found} is not supported (supported: v{min}..=v{max})")]
    VersionUnsupported { found: u32, min: u32, max: u32 },
    /// The engine id names a different, non-compatible engine family.
    #[error("save was written by engine `{found}`, which is not compatible with `{expected}`")]
    EngineMismatch { found: String, expected: String },
    /// A skippable blob declared a length that runs past the end of stream.
    #[error("invalid blob length {length} for `{field}` at offset {offset} ({remaining} bytes left)")]
    InvalidBlobLength {
        field: &'static str,
        offset: usize,
        length: i64,
        remaining: usize,
    },
    /// Payload archive checksum did not match its body.
    #[error("payload is corrupted: checksum mismatch (expected {expected:#010X}, got {computed:#010X})")]
    ChecksumMismatch { expected: u32, computed: u32 },
    /// LZ4 decompression of the payload body failed.
    #[error("payload decompression failed: {0}")]
    Decompress(String),
    /// Filesystem error (not found, permission denied, disk full, ...).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// An engine profile could not be parsed.
    #[error("invalid engine profile: {0}")]
    Config(String),
    /// A path that exists in the public surface but has no implementation.
    /// Callers must treat this as a hard stop.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Config(e.to_string())
    }
}

impl From<lz4_flex::block::DecompressError> for SaveError {
    fn from(e: lz4_flex::block::DecompressError) -> Self {
        SaveError::Decompress(e.to_string())
    }
}

pub type SaveResult<T> = Result<T, SaveError>;
