use std::io::{self, Write};

use log::debug;
use nsc::symbol;
use rand::Rng;
use thiserror::Error;

/// Symbols buffered before each write.
const WRITE_CHUNK: usize = 4096;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("base {0} is outside 2-36")]
    BaseOutOfRange(u32),

    #[error("digit count must be at least 1")]
    EmptyNumber,

    #[error("cannot write output: {0}")]
    Write(#[from] io::Error),
}

impl GenerateError {
    /// Exit status: 1 for bad parameters, 2 for anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            GenerateError::BaseOutOfRange(_) | GenerateError::EmptyNumber => 1,
            GenerateError::Write(_) => 2,
        }
    }

    pub fn message(&self) -> &'static str {
        match self.exit_code() {
            1 => "ERROR! Bad parameters.",
            _ => "ERROR! Unknown error.",
        }
    }
}

/// Produces random, well-formed conversion requests for load and round-trip testing.
#[derive(Debug, Clone, Copy)]
pub struct Generator {
    base_in: u32,
    base_out: u32,
    count: u64,
}

impl Generator {
    pub fn new(base_in: u32, base_out: u32, count: u64) -> Result<Self, GenerateError> {
        for base in [base_in, base_out] {
            if !symbol::is_valid_base(base) {
                return Err(GenerateError::BaseOutOfRange(base));
            }
        }
        if count == 0 {
            return Err(GenerateError::EmptyNumber);
        }
        Ok(Generator {
            base_in,
            base_out,
            count,
        })
    }

    /// Write `[digits]base_in=base_out\n` with `count` uniformly drawn digits.
    /// The leading digit is never zero.
    pub fn write_to<W: Write, G: Rng>(&self, writer: &mut W, rng: &mut G) -> io::Result<()> {
        debug!(
            "generating {} digits in base {} for base {}",
            self.count, self.base_in, self.base_out
        );
        let mut chunk = Vec::with_capacity(WRITE_CHUNK);
        chunk.push(b'[');
        chunk.push(symbol::symbol_of(rng.gen_range(1..self.base_in) as u8));

        for _ in 1..self.count {
            if chunk.len() == WRITE_CHUNK {
                writer.write_all(&chunk)?;
                chunk.clear();
            }
            chunk.push(symbol::symbol_of(rng.gen_range(0..self.base_in) as u8));
        }
        writer.write_all(&chunk)?;
        writeln!(writer, "]{}={}", self.base_in, self.base_out)?;
        writer.flush()
    }
}
