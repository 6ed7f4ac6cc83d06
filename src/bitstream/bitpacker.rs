use std::io::{self, Read, Write};

use crate::error::{HufError, Result};

/// Largest bit count the 4-byte length header can carry (it is a signed 32 bit field).
pub const MAX_PREFIXED_BITS: usize = i32::MAX as usize;

/// Upfront buffer reservation for reads whose length comes from the archive.
const READ_CHUNK: usize = 64 * 1024;

/// A packed sequence of bits with its exact length. Bits are stored most significant bit
/// first; unused low bits of the final byte are always zero and are not part of the
/// sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackedBits {
    bytes: Vec<u8>,
    len: usize,
}

impl PackedBits {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sequence with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity((bits + 7) / 8),
            len: 0,
        }
    }

    /// Rebuild a sequence from packed bytes and its bit length. The byte count must be
    /// exactly what the bit length needs.
    pub fn from_parts(bytes: Vec<u8>, len: usize) -> Result<Self> {
        if bytes.len() != (len + 7) / 8 {
            return Err(HufError::format(format!(
                "{} packed bytes cannot hold exactly {} bits",
                bytes.len(),
                len
            )));
        }
        let mut bits = Self { bytes, len };
        // Padding bits are not part of the sequence; zero them so equal sequences compare equal.
        if len % 8 != 0 {
            if let Some(last) = bits.bytes.last_mut() {
                *last &= 0xff << (8 - len % 8);
            }
        }
        Ok(bits)
    }

    /// Append one bit.
    pub fn push(&mut self, bit: bool) {
        let bit_offset = self.len % 8;
        if bit_offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> bit_offset;
            }
        }
        self.len += 1;
    }

    /// Append a huffman code.
    pub fn extend_from_code(&mut self, code: &[bool]) {
        code.iter().for_each(|&bit| self.push(bit));
    }

    /// Number of bits in the sequence.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The packed bytes, including the zero padded final byte.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Iterate over the bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bytes[i / 8] & (0x80 >> (i % 8)) != 0)
    }

    /// Bit length as the 32 bit value stored in varint length fields.
    pub fn bit_len_u32(&self, what: &'static str) -> Result<u32> {
        u32::try_from(self.len).map_err(|_| HufError::Oversize {
            what,
            bits: self.len as u64,
        })
    }

    /// Write only the packed bytes. The reader must learn the bit length elsewhere.
    pub fn write_raw<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.bytes)
    }

    /// Read exactly the bytes needed for `len` bits.
    /// The buffer grows with the data actually read, so a bogus length on a short input
    /// fails without allocating for it.
    pub fn read_raw<R: Read>(input: &mut R, len: usize) -> Result<Self> {
        let needed = (len + 7) / 8;
        let mut bytes = Vec::with_capacity(needed.min(READ_CHUNK));
        (&mut *input).take(needed as u64).read_to_end(&mut bytes)?;
        if bytes.len() < needed {
            return Err(truncated(io::Error::from(io::ErrorKind::UnexpectedEof), len));
        }
        Self::from_parts(bytes, len)
    }

    /// Write a 4-byte little endian bit count followed by the packed bytes.
    pub fn write_length_prefixed<W: Write>(&self, out: &mut W, what: &'static str) -> Result<()> {
        if self.len > MAX_PREFIXED_BITS {
            return Err(HufError::Oversize {
                what,
                bits: self.len as u64,
            });
        }
        out.write_all(&(self.len as i32).to_le_bytes())?;
        self.write_raw(out)?;
        Ok(())
    }

    /// Read a sequence written by write_length_prefixed().
    pub fn read_length_prefixed<R: Read>(input: &mut R) -> Result<Self> {
        let mut header = [0_u8; 4];
        input
            .read_exact(&mut header)
            .map_err(|e| truncated(e, 32))?;
        let len = i32::from_le_bytes(header);
        if len < 0 {
            return Err(HufError::format(format!("negative bit count {}", len)));
        }
        Self::read_raw(input, len as usize)
    }
}

/// Translate a short read into a format error; pass other I/O failures through.
fn truncated(e: io::Error, bits: usize) -> HufError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        HufError::format(format!("archive ends before {} declared bits", bits))
    } else {
        HufError::Io(e)
    }
}

impl FromIterator<bool> for PackedBits {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut bits = PackedBits::new();
        iter.into_iter().for_each(|bit| bits.push(bit));
        bits
    }
}

#[cfg(test)]
mod test {
    use super::PackedBits;
    use crate::error::HufError;

    fn from_str(s: &str) -> PackedBits {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn push_packs_msb_first_test() {
        let bits = from_str("1011");
        assert_eq!(bits.len(), 4);
        assert_eq!(bits.as_bytes(), &[0b1011_0000]);
        assert_eq!(bits.iter().nth(2), Some(true));
        assert_eq!(bits.iter().nth(4), None);
    }

    #[test]
    fn crosses_byte_boundary_test() {
        let bits = from_str("1111111101");
        assert_eq!(bits.as_bytes(), &[0xff, 0b0100_0000]);
        let back: String = bits.iter().map(|b| if b { '1' } else { '0' }).collect();
        assert_eq!(back, "1111111101");
    }

    #[test]
    fn from_parts_clears_padding_test() {
        let bits = PackedBits::from_parts(vec![0b1011_1111], 4).unwrap();
        assert_eq!(bits, from_str("1011"));
        assert!(PackedBits::from_parts(vec![0, 0], 8).is_err());
    }

    #[test]
    fn length_prefixed_layout_test() {
        let bits = from_str("101");
        let mut out = Vec::new();
        bits.write_length_prefixed(&mut out, "test").unwrap();
        assert_eq!(out, vec![3, 0, 0, 0, 0b1010_0000]);
        let back = PackedBits::read_length_prefixed(&mut out.as_slice()).unwrap();
        assert_eq!(back, bits);
    }

    #[test]
    fn empty_length_prefixed_test() {
        let mut out = Vec::new();
        PackedBits::new()
            .write_length_prefixed(&mut out, "test")
            .unwrap();
        assert_eq!(out, vec![0, 0, 0, 0]);
        let back = PackedBits::read_length_prefixed(&mut out.as_slice()).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn truncated_data_is_format_error_test() {
        // Header claims 17 bits (3 bytes) but only one byte follows
        let data = [17_u8, 0, 0, 0, 0xff];
        let err = PackedBits::read_length_prefixed(&mut data.as_slice()).unwrap_err();
        assert!(matches!(err, HufError::Format(_)));

        let data = [0xff_u8, 0xff, 0xff, 0xff];
        let err = PackedBits::read_length_prefixed(&mut data.as_slice()).unwrap_err();
        assert!(matches!(err, HufError::Format(_)));
    }

    #[test]
    fn huge_declared_length_on_short_input_test() {
        // i32::MAX bits declared, two bytes present
        let data = [0xff_u8, 0xff, 0xff, 0x7f, 0xaa, 0xbb];
        let err = PackedBits::read_length_prefixed(&mut data.as_slice()).unwrap_err();
        assert!(matches!(err, HufError::Format(_)));

        let err = PackedBits::read_raw(&mut [0x55_u8].as_slice(), u32::MAX as usize).unwrap_err();
        assert!(matches!(err, HufError::Format(_)));
    }

    #[test]
    fn read_raw_leaves_rest_of_stream_test() {
        let data = [0b1100_0000_u8, 0x42];
        let mut input = data.as_slice();
        let bits = PackedBits::read_raw(&mut input, 2).unwrap();
        assert_eq!(bits, from_str("11"));
        assert_eq!(input, &[0x42]);
    }
}
