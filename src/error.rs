//! Error taxonomy shared by every stage of the compressor.
//!
//! I/O class errors (`Io`, `EmptyInput`, `InvalidInput`) abort the current compress or
//! decompress call. `Format`, `VarIntOverrun` and `Oversize` describe archives that cannot
//! be written or read back. `EncodingGap` is raised when a byte has no huffman code, which
//! can only happen if a code table is used on data it was not built from.

use std::io;

/// Everything that can go wrong while building or reading an archive.
#[derive(Debug, thiserror::Error)]
pub enum HufError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("nothing to compress: {0}")]
    EmptyInput(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("archive format error: {0}")]
    Format(String),

    #[error("byte 0x{byte:02x} has no huffman code in this table")]
    EncodingGap { byte: u8 },

    #[error("varint continuation chain exceeds 5 bytes or 32 bits")]
    VarIntOverrun,

    #[error("{what} needs {bits} bits, more than the archive can record")]
    Oversize { what: &'static str, bits: u64 },
}

impl HufError {
    /// Shorthand used by the readers, which report most problems as format errors.
    pub fn format<S: Into<String>>(msg: S) -> Self {
        HufError::Format(msg.into())
    }

    /// Process exit code for this error. There is no partial-success code.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// True when the archive itself is damaged rather than the environment.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            HufError::Format(_) | HufError::VarIntOverrun | HufError::Oversize { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, HufError>;
