//! The huffman module builds prefix trees from byte frequencies and uses them to encode and
//! decode byte sequences.
//!
//! A tree is built fresh for every encoding unit (one file, one file's path and content, or
//! a whole folder), used, written out with tree_codec, and dropped. Trees are arenas of
//! nodes addressed by index, so there is no shared ownership and no recursive teardown.
//!
//! The process of encoding each unit is inherently sequential.
//!

pub mod huffman;
pub mod tree_codec;
