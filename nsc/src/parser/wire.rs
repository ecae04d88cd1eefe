use crate::digits::DigitSequence;
use crate::parser::error::ParseError;
use crate::symbol;

/// Widest accepted base field, in decimal digits.
const BASE_FIELD_WIDTH: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting the opening `[`.
    Open,
    /// Inside the digit list, up to `]`.
    Digits,
    /// Reading the input base, up to `=`.
    InputBase,
    /// Reading the output base, up to the first non-decimal byte or end of input.
    OutputBase,
    /// Base pair complete; everything else is ignored.
    Trailing,
}

/// A decimal field of at most `BASE_FIELD_WIDTH` digits.
#[derive(Debug, Default, Clone, Copy)]
struct BaseField {
    value: u32,
    width: u8,
}

impl BaseField {
    fn push(&mut self, byte: u8) -> bool {
        if self.width == BASE_FIELD_WIDTH {
            return false;
        }
        self.value = self.value * 10 + u32::from(byte - b'0');
        self.width += 1;
        true
    }

    fn is_empty(&self) -> bool {
        self.width == 0
    }
}

/// Incremental scanner for `[digits]base1=base2`.
///
/// All state lives in the scanner, so a chunk may end anywhere, including in
/// the middle of the `]base1=base2` marker.
#[derive(Debug)]
pub(crate) struct WireScanner {
    state: State,
    offset: u64,
    digit_count: u64,
    input_base: BaseField,
    output_base: BaseField,
}

impl WireScanner {
    pub(crate) fn new() -> Self {
        WireScanner {
            state: State::Open,
            offset: 0,
            digit_count: 0,
            input_base: BaseField::default(),
            output_base: BaseField::default(),
        }
    }

    /// True once the base pair has been terminated and only trailing bytes remain.
    pub(crate) fn is_complete(&self) -> bool {
        self.state == State::Trailing
    }

    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    /// Consume one chunk, appending digit values to `digits`.
    pub(crate) fn feed(
        &mut self,
        chunk: &[u8],
        digits: &mut DigitSequence,
    ) -> Result<(), ParseError> {
        for &byte in chunk {
            if self.state == State::Trailing {
                return Ok(());
            }
            self.step(byte, digits)?;
            self.offset += 1;
        }
        Ok(())
    }

    fn step(&mut self, byte: u8, digits: &mut DigitSequence) -> Result<(), ParseError> {
        match self.state {
            State::Open => {
                if byte != b'[' {
                    return Err(self.unexpected(byte, "expected '[' at start of input"));
                }
                self.state = State::Digits;
            }

            State::Digits => match byte {
                b']' if self.digit_count == 0 => {
                    return Err(ParseError::malformed(self.offset, "empty digit list"));
                }
                b']' => self.state = State::InputBase,
                _ => {
                    let Some(value) = symbol::value_of(byte) else {
                        return Err(self.unexpected(byte, "expected a digit symbol 0-9 or A-Z"));
                    };
                    digits.push_back(value)?;
                    self.digit_count += 1;
                }
            },

            State::InputBase => match byte {
                b'0'..=b'9' => {
                    if !self.input_base.push(byte) {
                        return Err(ParseError::malformed(
                            self.offset,
                            "input base has more than two digits",
                        ));
                    }
                }
                b'=' if self.input_base.is_empty() => {
                    return Err(ParseError::malformed(self.offset, "missing input base"));
                }
                b'=' => self.state = State::OutputBase,
                _ => return Err(self.unexpected(byte, "expected input base followed by '='")),
            },

            State::OutputBase => match byte {
                b'0'..=b'9' => {
                    if !self.output_base.push(byte) {
                        return Err(ParseError::malformed(
                            self.offset,
                            "output base has more than two digits",
                        ));
                    }
                }
                _ if self.output_base.is_empty() => {
                    return Err(self.unexpected(byte, "expected output base"));
                }
                _ => self.state = State::Trailing,
            },

            State::Trailing => {}
        }
        Ok(())
    }

    /// Called at end of input: yields the raw (unvalidated) base pair.
    pub(crate) fn finish(&self) -> Result<(u32, u32), ParseError> {
        let reason = match self.state {
            State::Open => "empty input",
            State::Digits => "input ended inside the digit list",
            State::InputBase => "input ended before '='",
            State::OutputBase if self.output_base.is_empty() => {
                "input ended before the output base"
            }
            State::OutputBase | State::Trailing => {
                return Ok((self.input_base.value, self.output_base.value));
            }
        };
        Err(ParseError::malformed(self.offset, reason))
    }

    fn unexpected(&self, byte: u8, expectation: &str) -> ParseError {
        ParseError::malformed(
            self.offset,
            format!(
                "unexpected byte '{}', {}",
                byte.escape_ascii(),
                expectation
            ),
        )
    }
}
