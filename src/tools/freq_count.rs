/// Byte frequency table for one encoding unit: a file, a path, or a whole folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteFrequencies {
    counts: [u64; 256],
}

impl ByteFrequencies {
    /// An empty table.
    pub fn new() -> Self {
        Self { counts: [0; 256] }
    }

    /// Returns a frequency count of the input data.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut freqs = Self::new();
        freqs.add(data);
        freqs
    }

    /// Add more data to the count.
    pub fn add(&mut self, data: &[u8]) {
        data.iter().for_each(|&el| self.counts[el as usize] += 1);
    }

    /// How often a byte value was seen.
    pub fn count(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    /// Number of distinct byte values seen.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// True when no bytes were counted. No huffman tree can be built from an empty table.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// (byte, count) pairs for every byte seen, in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(byte, &count)| (byte as u8, count))
    }
}

impl Default for ByteFrequencies {
    fn default() -> Self {
        Self::new()
    }
}
