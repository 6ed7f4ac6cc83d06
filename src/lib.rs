//! A huffman coding compressor for single files and whole folders.
//!
//! Version 0.1.0
//!
//! Each input gets a frequency count, a huffman tree, and a compact pre-order serialization
//! of that tree ahead of the bit packed data. Folders are stored either with one shared tree
//! or with one tree per file, whichever produces the smaller archive.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> hufzip -c test.txt`
//!
//! This will create the archive test.txt.huf next to the original, which is left in place.
//! `$> hufzip -d test.txt.huf` restores it.
//!
pub mod bitstream;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use error::{HufError, Result};
