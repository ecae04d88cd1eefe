use std::io::{self, Write};

use log::trace;
use nsc::Job;
use nsc::digits::DigitSequence;
use nsc::symbol;

/// Writes a digit sequence as `[symbols]base\n`, releasing each block as soon as
/// its symbols are written.
///
/// Working memory is one block-sized symbol buffer; the printer holds at most one
/// detached block at a time.
pub struct Printer<W: Write> {
    writer: W,
    scratch: Vec<u8>,
    opened: bool,
}

impl<W: Write> Printer<W> {
    pub fn new(writer: W) -> Self {
        Printer {
            writer,
            scratch: Vec::new(),
            opened: false,
        }
    }

    /// Symbol buffer capacity currently held by the printer.
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.capacity()
    }

    /// Write the head block of `digits` and release it.
    /// Returns `false` once the sequence is drained.
    pub fn emit_block(&mut self, digits: &mut DigitSequence) -> io::Result<bool> {
        if !self.opened {
            self.writer.write_all(b"[")?;
            self.opened = true;
        }
        let Some(block) = digits.pop_front_block() else {
            return Ok(false);
        };

        self.scratch.clear();
        self.scratch.reserve_exact(block.len());
        self.scratch
            .extend(block.digits().iter().map(|&digit| symbol::symbol_of(digit)));
        self.writer.write_all(&self.scratch)?;
        trace!("printed block of {} digits, {} left", block.len(), digits.live_blocks());
        drop(block);
        Ok(true)
    }

    /// Close the digit list, append the base, and hand the writer back.
    pub fn finish(mut self, base_out: u8) -> io::Result<W> {
        if !self.opened {
            self.writer.write_all(b"[")?;
        }
        writeln!(self.writer, "]{}", base_out)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Print a converted job, consuming it.
pub fn print<W: Write>(job: Job, writer: W) -> io::Result<W> {
    let Job {
        base_out,
        mut digits,
        ..
    } = job;
    let mut printer = Printer::new(writer);
    while printer.emit_block(&mut digits)? {}
    printer.finish(base_out)
}
