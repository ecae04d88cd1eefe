pub mod error;
mod wire;

pub use error::ParseError;

use std::io::{ErrorKind as IoErrorKind, Read};

use log::debug;

use crate::Job;
use crate::digits::{DigitSequence, StoreConfig};
use crate::parser::wire::WireScanner;
use crate::symbol;

/// Bytes requested per read unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Streaming parser for `[digits]base1=base2`.
pub struct Parser<R> {
    reader: R,
    chunk_size: usize,
    store: StoreConfig,
    drain_trailing: bool,
}

impl<R: Read> Parser<R> {
    pub fn new(reader: R) -> Self {
        Parser {
            reader,
            chunk_size: DEFAULT_CHUNK_SIZE,
            store: StoreConfig::default(),
            drain_trailing: true,
        }
    }

    /// Bytes requested per read (at least 1).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Layout of the digit sequence the parser fills.
    pub fn with_store_config(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Whether input left after the base pair (or after a structural error) is read and
    /// discarded. On by default.
    pub fn drain_trailing(mut self, drain: bool) -> Self {
        self.drain_trailing = drain;
        self
    }

    /// Read the whole request and return it validated and in canonical form.
    ///
    /// Checks run in order: structure, input base range, output base range,
    /// digit legality; leading zeros are stripped last.
    pub fn parse(mut self) -> Result<Job, ParseError> {
        let mut digits = DigitSequence::with_config(self.store);
        let mut scanner = WireScanner::new();
        let mut buf = vec![0u8; self.chunk_size];

        loop {
            let n = match self.reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
                Err(e) => return Err(ParseError::Read(e)),
            };
            if let Err(error) = scanner.feed(&buf[..n], &mut digits) {
                digits.destroy();
                if error.kind() == crate::ErrorKind::MalformedInput {
                    self.discard_rest(&mut buf);
                }
                return Err(error);
            }
            if scanner.is_complete() {
                self.discard_rest(&mut buf);
                break;
            }
        }

        let (base_in, base_out) = scanner.finish()?;
        if !symbol::is_valid_base(base_in) {
            return Err(ParseError::InputBaseOutOfRange(base_in));
        }
        if !symbol::is_valid_base(base_out) {
            return Err(ParseError::OutputBaseOutOfRange(base_out));
        }
        if let Some((position, digit)) = digits
            .iter()
            .enumerate()
            .find(|&(_, digit)| u32::from(digit) >= base_in)
        {
            return Err(ParseError::InvalidDigitForBase {
                symbol: symbol::symbol_of(digit) as char,
                position: position as u64,
                base: base_in,
            });
        }

        digits.strip_leading_zeros()?;
        debug!(
            "parsed {} significant digits in {} blocks from {} bytes, base {} -> {}",
            digits.len(),
            digits.live_blocks(),
            scanner.offset(),
            base_in,
            base_out
        );

        Ok(Job {
            base_in: base_in as u8,
            base_out: base_out as u8,
            digits,
        })
    }

    /// Read and drop whatever input is left, so it does not leak into a caller's stream.
    fn discard_rest(&mut self, buf: &mut [u8]) {
        if !self.drain_trailing {
            return;
        }
        let mut discarded = 0u64;
        loop {
            match self.reader.read(buf) {
                Ok(0) => break,
                Ok(n) => discarded += n as u64,
                Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("stopped draining input: {}", e);
                    break;
                }
            }
        }
        if discarded > 0 {
            debug!("discarded {} trailing bytes", discarded);
        }
    }
}
