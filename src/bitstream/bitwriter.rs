use std::io::{self, Write};

/// Writes a bitstream for output, one bit at a time. Every eight bits become one output
/// byte, most significant bit first. Dropping the writer flushes any partial byte.
pub struct BitWriter<W: Write> {
    /// Handle to the output stream
    writer: W,
    /// Private queue holding bits that are waiting to become a byte.
    queue: u8,
    /// Count of valid bits in the queue (0-7).
    q_bits: u8,
    /// Count of bytes handed to the writer so far.
    written: usize,
}

impl<W: Write> BitWriter<W> {
    /// Create a new BitWriter on top of the writer. Pass `&mut writer` to keep using the
    /// stream after the bits are done.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            queue: 0,
            q_bits: 0,
            written: 0,
        }
    }

    /// Append one bit to the stream.
    pub fn out_bit(&mut self, bit: bool) -> io::Result<()> {
        self.queue = (self.queue << 1) | bit as u8;
        self.q_bits += 1;
        if self.q_bits == 8 {
            self.push_queue()?;
        }
        Ok(())
    }

    /// Put a byte on the stream as 8 bits, most significant bit first.
    pub fn out8(&mut self, data: u8) -> io::Result<()> {
        for shift in (0..8).rev() {
            self.out_bit((data >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    /// Flushes the remaining bits (1-7) from the queue, padding with 0s in the least
    /// significant bits. Does nothing when the stream is already byte aligned.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.q_bits > 0 {
            self.queue <<= 8 - self.q_bits;
            self.push_queue()?;
        }
        Ok(())
    }

    /// Number of whole bytes written so far (a pending partial byte is not counted).
    pub fn bytes_written(&self) -> usize {
        self.written
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.written, self.q_bits)
    }

    /// Internal function to move the queued byte to the output stream.
    fn push_queue(&mut self) -> io::Result<()> {
        self.writer.write_all(&[self.queue])?;
        self.written += 1;
        self.queue = 0;
        self.q_bits = 0;
        Ok(())
    }
}

impl<W: Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        // Errors cannot be reported from drop. Callers that care call flush() first.
        let _ = self.flush();
    }
}

#[cfg(test)]
mod test {
    use super::BitWriter;

    #[test]
    fn out8_test() {
        let mut out = Vec::new();
        {
            let mut bw = BitWriter::new(&mut out);
            bw.out8(b'x').unwrap();
            bw.flush().unwrap();
        }
        assert_eq!(out, "x".as_bytes());
    }

    #[test]
    fn msb_first_test() {
        let mut out = Vec::new();
        {
            let mut bw = BitWriter::new(&mut out);
            for bit in [true, false, false, false, false, false, false, true] {
                bw.out_bit(bit).unwrap();
            }
            assert_eq!(bw.bytes_written(), 1);
        }
        assert_eq!(out, vec![0b1000_0001]);
    }

    #[test]
    fn last_bits_padding_test() {
        let mut out = Vec::new();
        {
            let mut bw = BitWriter::new(&mut out);
            bw.out8(255).unwrap();
            bw.out_bit(true).unwrap();
            bw.out_bit(true).unwrap();
            bw.out_bit(false).unwrap();
            bw.out_bit(true).unwrap();
            assert_eq!(bw.loc(), "[1.4]");
            bw.flush().unwrap();
            assert_eq!(bw.bytes_written(), 2);
            // A second flush on an aligned stream adds nothing
            bw.flush().unwrap();
            assert_eq!(bw.bytes_written(), 2);
        }
        assert_eq!(out, vec![0b1111_1111, 0b1101_0000]);
    }

    #[test]
    fn drop_flushes_test() {
        let mut out = Vec::new();
        {
            let mut bw = BitWriter::new(&mut out);
            bw.out_bit(true).unwrap();
        }
        assert_eq!(out, vec![0b1000_0000]);
    }

    #[test]
    fn unaligned_byte_test() {
        let mut out = Vec::new();
        {
            let mut bw = BitWriter::new(&mut out);
            bw.out_bit(false).unwrap();
            bw.out8(0xff).unwrap();
        }
        assert_eq!(out, vec![0b0111_1111, 0b1000_0000]);
    }
}
