//! Growable byte buffer that feeds the tokenizer.
//!
//! The tokenizer works on whatever bytes are currently buffered. When it runs
//! out in the middle of a token it reports how much it consumed, and
//! [`BufferedTokenReader::fill`] shifts the unconsumed tail to the front,
//! doubles the buffer if that tail already occupies all of it, and tops the
//! buffer up from the source.

use super::traits::ParseError;
use std::io::{ErrorKind, Read};

/// Default initial buffer size.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Smallest buffer accepted; a BOM must fit in the first read.
pub const MIN_BUFFER_SIZE: usize = 4;

/// Default ceiling on buffer growth.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 256 * 1024 * 1024;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Byte reader that preserves a partially scanned token across refills.
pub struct BufferedTokenReader<R> {
    source: R,
    buffer: Vec<u8>,
    /// Number of valid bytes at the front of `buffer`
    len: usize,
    /// Absolute stream offset of `buffer[0]`
    offset: u64,
    eof: bool,
    bom_checked: bool,
    max_size: usize,
}

impl<R: Read> BufferedTokenReader<R> {
    /// Create a reader with the default initial buffer size.
    pub fn new(source: R) -> Self {
        Self::with_capacity(source, DEFAULT_BUFFER_SIZE)
    }

    /// Create a reader with a specific initial buffer size.
    pub fn with_capacity(source: R, initial_size: usize) -> Self {
        Self {
            source,
            buffer: vec![0; initial_size.max(MIN_BUFFER_SIZE)],
            len: 0,
            offset: 0,
            eof: false,
            bom_checked: false,
            max_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }

    /// Cap how far the buffer may grow.
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size.max(self.buffer.len());
        self
    }

    /// Currently buffered bytes.
    pub fn data(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Absolute stream offset of the first buffered byte.
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Whether the source has reported end-of-stream.
    pub const fn is_eof(&self) -> bool {
        self.eof
    }

    /// Current buffer capacity.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Discard `consumed` bytes and refill from the source.
    ///
    /// Returns the number of new bytes read. Zero means the source is
    /// exhausted and the buffered bytes are all that remain.
    pub fn fill(&mut self, consumed: usize) -> Result<usize, ParseError> {
        let consumed = consumed.min(self.len);
        if consumed > 0 {
            self.buffer.copy_within(consumed..self.len, 0);
            self.len -= consumed;
            self.offset += consumed as u64;
        }

        if self.len == self.buffer.len() {
            self.grow()?;
        }

        let mut read_total = 0;
        while self.len < self.buffer.len() && !self.eof {
            match self.source.read(&mut self.buffer[self.len..]) {
                Ok(0) => self.eof = true,
                Ok(n) => {
                    self.len += n;
                    read_total += n;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        if !self.bom_checked {
            self.skip_bom();
        }

        Ok(read_total)
    }

    fn grow(&mut self) -> Result<(), ParseError> {
        let current = self.buffer.len();
        let doubled = current.saturating_mul(2);
        if current >= self.max_size {
            return Err(ParseError::BufferLimitExceeded {
                offset: self.offset,
                limit: self.max_size,
            });
        }
        let new_size = doubled.min(self.max_size);
        tracing::debug!(from = current, to = new_size, "growing token buffer");
        self.buffer.resize(new_size, 0);
        Ok(())
    }

    fn skip_bom(&mut self) {
        if self.len < UTF8_BOM.len() && !self.eof {
            return;
        }
        self.bom_checked = true;
        if self.data().starts_with(&UTF8_BOM) {
            tracing::debug!("skipping UTF-8 byte order mark");
            self.buffer.copy_within(UTF8_BOM.len()..self.len, 0);
            self.len -= UTF8_BOM.len();
            self.offset += UTF8_BOM.len() as u64;
        }
    }
}
