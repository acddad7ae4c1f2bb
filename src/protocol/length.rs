//! Variable-length word length prefix.
//!
//! Every word on the wire is preceded by its byte length, encoded big-endian in one to five
//! bytes. The leading bits of the first byte tell the reader how many bytes follow:
//!
//! ```text
//!  length range              encoded bytes   first byte
//! +-------------------------+---------------+-----------+
//! | 0x00       .. 0x7F      | 1             | 0xxxxxxx  |
//! | 0x80       .. 0x3FFF    | 2             | 10xxxxxx  |
//! | 0x4000     .. 0x1FFFFF  | 3             | 110xxxxx  |
//! | 0x200000   .. 0xFFFFFFF | 4             | 1110xxxx  |
//! | 0x10000000 .. u32::MAX  | 5             | 11110000  |
//! +-------------------------+---------------+-----------+
//! ```
use std::io::Read;

use super::transport::TransportError;

const ONE_BYTE_LIMIT: u32 = 0x80;
const TWO_BYTE_LIMIT: u32 = 0x4000;
const THREE_BYTE_LIMIT: u32 = 0x20_0000;
const FOUR_BYTE_LIMIT: u32 = 0x1000_0000;

const TWO_BYTE_TAG: u32 = 0x8000;
const THREE_BYTE_TAG: u32 = 0xC0_0000;
const FOUR_BYTE_TAG: u32 = 0xE000_0000;
const FIVE_BYTE_MARKER: u8 = 0xF0;

/// Encodes a word length into its wire prefix.
pub fn encode_length(length: u32) -> Vec<u8> {
    match length {
        n if n < ONE_BYTE_LIMIT => vec![n as u8],
        n if n < TWO_BYTE_LIMIT => ((n | TWO_BYTE_TAG) as u16).to_be_bytes().to_vec(),
        n if n < THREE_BYTE_LIMIT => (n | THREE_BYTE_TAG).to_be_bytes()[1..].to_vec(),
        n if n < FOUR_BYTE_LIMIT => (n | FOUR_BYTE_TAG).to_be_bytes().to_vec(),
        n => {
            let mut out = Vec::with_capacity(5);
            out.push(FIVE_BYTE_MARKER);
            out.extend_from_slice(&n.to_be_bytes());
            out
        }
    }
}

/// Reads one length prefix from `reader`, consuming exactly the bytes
/// [`encode_length`] would have produced for it.
pub fn decode_length<R: Read>(reader: &mut R) -> Result<u32, TransportError> {
    let mut first = [0u8; 1];
    reader.read_exact(&mut first)?;
    let c = first[0];

    if c & 0x80 == 0x00 {
        Ok(c as u32)
    } else if c & 0xC0 == 0x80 {
        let rest = read_bytes::<_, 1>(reader)?;
        Ok(u16::from_be_bytes([c, rest[0]]) as u32 & !TWO_BYTE_TAG)
    } else if c & 0xE0 == 0xC0 {
        let rest = read_bytes::<_, 2>(reader)?;
        Ok(u32::from_be_bytes([0, c, rest[0], rest[1]]) & !THREE_BYTE_TAG)
    } else if c & 0xF0 == 0xE0 {
        let rest = read_bytes::<_, 3>(reader)?;
        Ok(u32::from_be_bytes([c, rest[0], rest[1], rest[2]]) & !FOUR_BYTE_TAG)
    } else if c & 0xF8 == 0xF0 {
        Ok(u32::from_be_bytes(read_bytes::<_, 4>(reader)?))
    } else {
        Err(TransportError::InvalidLengthPrefix(c))
    }
}

fn read_bytes<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N], TransportError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
