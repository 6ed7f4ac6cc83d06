//! Serialise a huffman tree's shape and leaf bytes (never its weights).
//!
//! Pre-order: a leaf is the bit 0 followed by its byte as 8 bits; an internal node is the
//! bit 1 followed by its left subtree and then its right subtree.

use std::io::{self, Read, Write};

use log::trace;

use super::huffman::{HuffmanTree, Node};
use crate::bitstream::bitreader::BitReader;
use crate::bitstream::bitwriter::BitWriter;
use crate::error::{HufError, Result};

/// No tree over 256 symbols nests internal nodes deeper than this.
pub const MAX_TREE_DEPTH: usize = 255;
const MAX_LEAVES: usize = 256;

/// Write the tree onto an open bitstream.
pub fn serialize<W: Write>(tree: &HuffmanTree, bw: &mut BitWriter<W>) -> io::Result<()> {
    serialize_node(tree, tree.root(), bw)
}

fn serialize_node<W: Write>(
    tree: &HuffmanTree,
    index: usize,
    bw: &mut BitWriter<W>,
) -> io::Result<()> {
    match tree.node(index) {
        Node::Leaf(byte) => {
            bw.out_bit(false)?;
            bw.out8(byte)
        }
        Node::Internal { left, right } => {
            bw.out_bit(true)?;
            serialize_node(tree, left, bw)?;
            serialize_node(tree, right, bw)
        }
    }
}

/// Read a tree back from an open bitstream.
pub fn deserialize<R: Read>(br: &mut BitReader<R>) -> Result<HuffmanTree> {
    let mut nodes = Vec::new();
    let mut leaves = 0;
    let root = read_node(br, &mut nodes, &mut leaves, 0)?;
    Ok(HuffmanTree::from_arena(nodes, root))
}

/// Recursively read one subtree. Children land in the arena before their parent.
fn read_node<R: Read>(
    br: &mut BitReader<R>,
    nodes: &mut Vec<Node>,
    leaves: &mut usize,
    depth: usize,
) -> Result<usize> {
    let marker = br
        .bit()?
        .ok_or_else(|| HufError::format(format!("tree ends early at {}", br.loc())))?;

    let node = if marker {
        if depth >= MAX_TREE_DEPTH {
            return Err(HufError::format(format!(
                "tree nests deeper than {} levels",
                MAX_TREE_DEPTH
            )));
        }
        let left = read_node(br, nodes, leaves, depth + 1)?;
        let right = read_node(br, nodes, leaves, depth + 1)?;
        Node::Internal { left, right }
    } else {
        let byte = br
            .byte()?
            .ok_or_else(|| HufError::format("tree ends inside a leaf byte"))?;
        *leaves += 1;
        if *leaves > MAX_LEAVES {
            return Err(HufError::format("tree holds more than 256 leaves"));
        }
        Node::Leaf(byte)
    };
    nodes.push(node);
    Ok(nodes.len() - 1)
}

/// Write the tree as a byte aligned block (the final byte zero padded). Returns the
/// number of bytes written.
pub fn write_tree<W: Write>(tree: &HuffmanTree, out: &mut W) -> io::Result<usize> {
    let mut bw = BitWriter::new(out);
    serialize(tree, &mut bw)?;
    bw.flush()?;
    trace!("Wrote huffman tree in {} bytes.", bw.bytes_written());
    Ok(bw.bytes_written())
}

/// Read a byte aligned tree block written by write_tree(). The stream is left at the
/// first byte after the block.
pub fn read_tree<R: Read>(input: &mut R) -> Result<HuffmanTree> {
    let mut br = BitReader::new(input);
    deserialize(&mut br)
}
