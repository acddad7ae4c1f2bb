use std::io::{self, Read, Write};

use log::{trace, warn};
use thiserror::Error;

use super::length::{decode_length, encode_length};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport IO Error: {0}")]
    Io(#[from] io::Error),
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),
    #[error("invalid server name '{0}'")]
    InvalidServerName(String),
    #[error("invalid word length prefix byte {0:#04x}")]
    InvalidLengthPrefix(u8),
    #[error("word of {0} bytes exceeds the maximum encodable length")]
    WordTooLong(usize),
}

/// Reads and writes words and sentences over a byte stream.
///
/// A zero-length word always terminates a sentence, so an empty string can
/// never be carried as a word value.
pub struct ProtocolTransport<T: Read + Write> {
    stream: T,
}

impl<T: Read + Write> ProtocolTransport<T> {
    pub fn new(stream: T) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> T {
        self.stream
    }

    /// Writes the length prefix and UTF-8 bytes of `word` in one buffer.
    pub fn write_word(&mut self, word: &str) -> Result<(), TransportError> {
        let bytes = word.as_bytes();
        let length =
            u32::try_from(bytes.len()).map_err(|_| TransportError::WordTooLong(bytes.len()))?;

        let mut buf = encode_length(length);
        buf.extend_from_slice(bytes);
        self.stream.write_all(&buf)?;
        Ok(())
    }

    /// Reads one word. Returns an empty string for the end-of-sentence marker.
    ///
    /// If the peer closes the stream partway through a word, the bytes received
    /// so far are returned. Invalid UTF-8 is replaced rather than rejected.
    pub fn read_word(&mut self) -> Result<String, TransportError> {
        let length = decode_length(&mut self.stream)? as usize;
        if length == 0 {
            return Ok(String::new());
        }

        let mut buf = vec![0u8; length];
        let mut filled = 0;
        while filled < length {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => {
                    warn!("stream closed after {filled} of {length} word bytes");
                    buf.truncate(filled);
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Writes every word in order followed by the terminating empty word.
    pub fn write_sentence<S: AsRef<str>>(&mut self, words: &[S]) -> Result<(), TransportError> {
        for word in words {
            self.write_word(word.as_ref())?;
        }
        self.write_word("")?;
        self.stream.flush()?;
        Ok(())
    }

    /// Reads words up to, but not including, the terminating empty word.
    pub fn read_sentence(&mut self) -> Result<Vec<String>, TransportError> {
        let mut sentence = Vec::new();
        loop {
            let word = self.read_word()?;
            if word.is_empty() {
                break;
            }
            sentence.push(word);
        }
        trace!("read sentence: {sentence:?}");
        Ok(sentence)
    }
}
