use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::trace;

use crate::bitstream::bitpacker::PackedBits;
use crate::error::{HufError, Result};
use crate::tools::freq_count::ByteFrequencies;

/// One node of a huffman tree. Children are indexes into the arena of the tree that owns
/// the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node {
    Leaf(u8),
    Internal { left: usize, right: usize },
}

/// Byte value -> bit code. Only bytes present in the tree have an entry, and no code is
/// a prefix of another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<Vec<bool>>>,
}

impl CodeTable {
    /// The code for a byte, or None if the byte is not in the tree.
    pub fn get(&self, byte: u8) -> Option<&[bool]> {
        self.codes[byte as usize].as_deref()
    }

    /// Number of bytes with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (byte, code) pairs in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[bool])> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(byte, code)| code.as_deref().map(|c| (byte as u8, c)))
    }

    /// Exact number of bits encode() will produce for these frequencies.
    pub fn encoded_bits(&self, freqs: &ByteFrequencies) -> Option<u64> {
        freqs.iter().try_fold(0_u64, |sum, (byte, count)| {
            self.get(byte).map(|code| sum + code.len() as u64 * count)
        })
    }
}

/// A huffman tree stored as an arena of nodes, with the code table derived from it.
/// Trees never change after construction, so the table always matches the tree.
#[derive(Clone, Debug)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
    codes: CodeTable,
}

impl HuffmanTree {
    /// Build the optimal prefix tree for the frequency table.
    ///
    /// The two lowest weight nodes are merged until one remains; the first one taken
    /// becomes the left child. Ties are broken by creation order: leaves are created in
    /// ascending byte order, and merged nodes after every leaf in the order they are made.
    /// The same table therefore always yields the same tree, on every platform.
    pub fn from_frequencies(freqs: &ByteFrequencies) -> Result<Self> {
        if freqs.is_empty() {
            return Err(HufError::EmptyInput(
                "no bytes to build a huffman tree from".to_string(),
            ));
        }

        let leaves = freqs.distinct();
        let mut nodes = Vec::with_capacity(2 * leaves - 1);
        // Min-heap on (weight, creation order, node index)
        let mut heap = BinaryHeap::with_capacity(leaves);
        for (byte, count) in freqs.iter() {
            heap.push(Reverse((count, nodes.len())));
            nodes.push(Node::Leaf(byte));
        }

        // A single symbol falls straight through: the leaf is the root.
        while heap.len() > 1 {
            if let (Some(Reverse((left_weight, left))), Some(Reverse((right_weight, right)))) =
                (heap.pop(), heap.pop())
            {
                heap.push(Reverse((left_weight + right_weight, nodes.len())));
                nodes.push(Node::Internal { left, right });
            }
        }
        let root = heap
            .pop()
            .map(|Reverse((_, index))| index)
            .ok_or_else(|| HufError::EmptyInput("huffman heap drained".to_string()))?;

        let tree = Self::from_arena(nodes, root);
        trace!(
            "Built huffman tree with {} leaves and {} nodes.",
            leaves,
            tree.nodes.len()
        );
        Ok(tree)
    }

    /// Build the tree for a byte sequence from its own frequencies.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_frequencies(&ByteFrequencies::from_bytes(data))
    }

    /// Wrap an arena (already checked to be a proper tree) and derive its code table.
    pub(crate) fn from_arena(nodes: Vec<Node>, root: usize) -> Self {
        let mut codes = vec![None; 256];
        let mut path = Vec::new();
        assign_codes(&nodes, root, &mut path, &mut codes);
        Self {
            nodes,
            root,
            codes: CodeTable { codes },
        }
    }

    /// Index of the root node.
    pub fn root(&self) -> usize {
        self.root
    }

    /// The node at an arena index.
    pub fn node(&self, index: usize) -> Node {
        self.nodes[index]
    }

    pub fn codes(&self) -> &CodeTable {
        &self.codes
    }

    /// Encode bytes into a bit sequence. Every byte must have a code in this tree.
    pub fn encode(&self, data: &[u8]) -> Result<PackedBits> {
        let mut bits = PackedBits::with_capacity(data.len() * 2);
        for &byte in data {
            let code = self.codes.get(byte).ok_or(HufError::EncodingGap { byte })?;
            bits.extend_from_code(code);
        }
        Ok(bits)
    }

    /// Decode exactly `bits.len()` bits. The walk must end on the root: running out of bits
    /// in the middle of a code is a format error, as is a bit that leads nowhere.
    pub fn decode(&self, bits: &PackedBits) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(bits.len() / 2);

        // A single leaf tree has the one code "0".
        if let Node::Leaf(byte) = self.nodes[self.root] {
            for (i, bit) in bits.iter().enumerate() {
                if bit {
                    return Err(HufError::format(format!(
                        "bit {} is 1 but the tree only holds the code 0",
                        i
                    )));
                }
                out.push(byte);
            }
            return Ok(out);
        }

        let mut current = self.root;
        for (i, bit) in bits.iter().enumerate() {
            current = match self.nodes[current] {
                Node::Internal { left, right } => {
                    if bit {
                        right
                    } else {
                        left
                    }
                }
                Node::Leaf(_) => {
                    return Err(HufError::format(format!("bit {} walks past a leaf", i)));
                }
            };
            if let Node::Leaf(byte) = self.nodes[current] {
                out.push(byte);
                current = self.root;
            }
        }
        if current != self.root {
            return Err(HufError::format(
                "encoded data ends in the middle of a code",
            ));
        }
        Ok(out)
    }
}

/// Walk the tree depth first, 0 for left and 1 for right, and record each leaf's path.
fn assign_codes(
    nodes: &[Node],
    index: usize,
    path: &mut Vec<bool>,
    codes: &mut [Option<Vec<bool>>],
) {
    match nodes[index] {
        Node::Leaf(byte) => {
            // The lone leaf of a one-symbol tree still needs a one bit code.
            codes[byte as usize] = Some(if path.is_empty() {
                vec![false]
            } else {
                path.clone()
            });
        }
        Node::Internal { left, right } => {
            path.push(false);
            assign_codes(nodes, left, path, codes);
            path.pop();
            path.push(true);
            assign_codes(nodes, right, path, codes);
            path.pop();
        }
    }
}
