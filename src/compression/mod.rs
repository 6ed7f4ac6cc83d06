//! The compression module manages both directions of the huffman archiver.
//!
//! Compression happens in the following steps:
//! - Read the input: one file, or every regular file below a folder in a stable order.
//! - Count byte frequencies and build a huffman tree from them.
//! - Write the archive tag, the serialized tree(s), and the bit packed encodings.
//!
//! Folders can be stored two ways. The global layout shares one tree across every path
//! and every file content. The separate layout gives each file its own tree. When asked to,
//! both are built in memory and the smaller one is written.
//!
//! Decompression reads the tag byte and hands the rest of the archive to the matching reader.
//! Folder files are written as they are decoded.
//!

pub mod archive;
pub mod compress;
pub mod decompress;
pub mod strategy;
