//! The tools module provides the helpers the huffman compressor is built from.
//!
//! The tools are:
//! - cli: Command line options and log level setup.
//! - freq_count: Byte frequency tables.
//! - fs: The file system capability (listing, reading, writing, creating folders).
//! - report: Compression and decompression statistics.
//! - varint: Variable length unsigned 32 bit integers.
//!
pub mod cli;
pub mod freq_count;
pub mod fs;
pub mod report;
pub mod varint;
