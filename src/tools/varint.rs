//! Unsigned 32 bit base-128 integers, used for file counts and bit lengths.
//!
//! Each byte carries the low 7 bits of what is left of the value, least significant group
//! first. The high bit is set on every byte except the last.

use std::io::{self, Read, Write};

use crate::error::{HufError, Result};

/// A 32 bit value never needs more than 5 bytes (5 * 7 = 35 bits).
pub const MAX_VARINT_LEN: usize = 5;

const CONTINUE: u8 = 0x80;
const GROUP_MASK: u8 = 0x7f;

/// Encode a value as a varint byte sequence.
pub fn encode(mut value: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(encoded_size(value));
    while value >= CONTINUE as u32 {
        bytes.push((value as u8 & GROUP_MASK) | CONTINUE);
        value >>= 7;
    }
    bytes.push(value as u8);
    bytes
}

/// Write a varint to the stream. Returns the number of bytes written.
pub fn write<W: Write>(out: &mut W, value: u32) -> io::Result<usize> {
    let bytes = encode(value);
    out.write_all(&bytes)?;
    Ok(bytes.len())
}

/// Number of bytes encode() produces for this value, computed without allocating.
pub fn encoded_size(mut value: u32) -> usize {
    let mut size = 1;
    while value >= CONTINUE as u32 {
        size += 1;
        value >>= 7;
    }
    size
}

/// Read one varint from the stream. The chain is bounded to 5 bytes; a longer chain, a
/// fifth byte carrying more than the 4 remaining value bits, or input that ends while a
/// continuation bit is set is a VarIntOverrun.
pub fn read<R: Read>(input: &mut R) -> Result<u32> {
    let mut result = 0_u32;
    for i in 0..MAX_VARINT_LEN {
        let mut byte = [0_u8; 1];
        if let Err(e) = input.read_exact(&mut byte) {
            return Err(match e.kind() {
                io::ErrorKind::UnexpectedEof if i == 0 => {
                    HufError::format("archive ends where a varint was expected")
                }
                io::ErrorKind::UnexpectedEof => HufError::VarIntOverrun,
                _ => HufError::Io(e),
            });
        }
        let group = byte[0] & GROUP_MASK;
        // The fifth group only has room for the top 4 bits of a u32
        if i == MAX_VARINT_LEN - 1 && group > 0x0f {
            return Err(HufError::VarIntOverrun);
        }
        result |= (group as u32) << (7 * i);
        if byte[0] & CONTINUE == 0 {
            return Ok(result);
        }
    }
    Err(HufError::VarIntOverrun)
}
