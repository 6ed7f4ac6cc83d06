//! The bitstream module forms the bit level I/O subsystem of the huffman compressor.
//!
//! Everything is packed most-significant-bit first. A partial final byte is padded with
//! zero bits in its low positions, so any consumer that needs the exact number of bits
//! must carry that count separately.
//!
//! - bitwriter: Streams single bits (and whole bytes as 8 bits) onto any `io::Write`.
//! - bitreader: Pulls single bits (and bytes) back off any `io::Read`.
//! - bitpacker: An in-memory bit sequence with its exact length, used for huffman encoded data.
//!
//! All three are strictly sequential. Nothing here seeks or rewinds.
//!
pub mod bitpacker;
pub mod bitreader;
pub mod bitwriter;
