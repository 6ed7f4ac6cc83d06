//! BitReader: reads a packed bitstream one bit at a time.
//!
//! Bits come out most significant first. The reader pulls exactly one byte from its
//! source when it runs out of bits, so after a tree has been read the source is left
//! positioned at the next byte boundary and can be used directly again. Hand it a
//! `BufReader` (or a slice) when reading from a file.
//!

use std::io::{self, Read};

/// Reads single bits from any I/O source that supports the read() call.
#[derive(Debug)]
pub struct BitReader<R> {
    source: R,
    /// Byte currently being consumed, already shifted so the next bit is the MSB.
    current: u8,
    /// Bits still unread in `current`.
    bits_left: u8,
    /// Whole bytes pulled from the source so far.
    consumed: usize,
}

impl<R: Read> BitReader<R> {
    /// Creates a new BitReader. Pass `&mut source` to keep the source afterwards.
    pub fn new(source: R) -> Self {
        Self {
            source,
            current: 0,
            bits_left: 0,
            consumed: 0,
        }
    }

    /// Fetch the next byte from the source. Returns false if there is no more data.
    fn have_data(&mut self) -> io::Result<bool> {
        let mut byte = [0_u8; 1];
        loop {
            match self.source.read(&mut byte) {
                Ok(0) => return Ok(false),
                Ok(_) => {
                    self.current = byte[0];
                    self.bits_left = 8;
                    self.consumed += 1;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Return the next bit (*true* for 1), or None if there is no more data to read.
    pub fn bit(&mut self) -> io::Result<Option<bool>> {
        if self.bits_left == 0 && !self.have_data()? {
            return Ok(None);
        }
        let bit = self.current & 0x80 != 0;
        self.current <<= 1;
        self.bits_left -= 1;
        Ok(Some(bit))
    }

    /// Returns the next 8 bits as a byte, or None if the data ran out part way through.
    /// A partial byte is never returned.
    pub fn byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0_u8;
        for _ in 0..8 {
            match self.bit()? {
                Some(bit) => byte = (byte << 1) | bit as u8,
                None => return Ok(None),
            }
        }
        Ok(Some(byte))
    }

    /// Debugging function. Report current position as bytes.bits consumed.
    pub fn loc(&self) -> String {
        match self.bits_left {
            0 => format!("[{}.0]", self.consumed),
            left => format!("[{}.{}]", self.consumed - 1, 8 - left),
        }
    }
}
