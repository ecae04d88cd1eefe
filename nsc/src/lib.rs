pub mod digits;
pub mod error;
pub mod parser;
pub mod symbol;

use crate::digits::DigitSequence;

pub use error::ErrorKind;

/// A conversion request: the number and the bases to convert between.
#[derive(Debug, Clone)]
pub struct Job {
    /// Base the digits are currently expressed in (2-36).
    pub base_in: u8,
    /// Base requested on output (2-36).
    pub base_out: u8,
    /// The number, most-significant digit first, in canonical form.
    pub digits: DigitSequence,
}
