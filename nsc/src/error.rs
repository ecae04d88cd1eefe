use std::fmt;

/// Outcome categories of a conversion.
///
/// The ordinal is meaningful: it is the process exit status and the index
/// into the message table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    Ok = 0,
    OutOfMemory,
    ReadError,
    MalformedInput,
    InputBaseOutOfRange,
    OutputBaseOutOfRange,
    InvalidDigitForBase,
    Unknown,
}

/// Human-readable messages, indexed by `ErrorKind` ordinal.
const MESSAGES: [&str; 8] = [
    "OK.",
    "ERROR! Not enough memory.",
    "ERROR! Cannot read input.",
    "ERROR! Malformed input.",
    "ERROR! Input base is out of range 2-36.",
    "ERROR! Output base is out of range 2-36.",
    "ERROR! Digit is not valid in the input base.",
    "ERROR! Unknown error.",
];

impl ErrorKind {
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::Ok,
        ErrorKind::OutOfMemory,
        ErrorKind::ReadError,
        ErrorKind::MalformedInput,
        ErrorKind::InputBaseOutOfRange,
        ErrorKind::OutputBaseOutOfRange,
        ErrorKind::InvalidDigitForBase,
        ErrorKind::Unknown,
    ];

    pub fn ordinal(self) -> i32 {
        self as i32
    }

    pub fn message(self) -> &'static str {
        MESSAGES[self as usize]
    }

    /// The variant name, as used in case files (`expect_error = "MalformedInput"`).
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Ok => "Ok",
            ErrorKind::OutOfMemory => "OutOfMemory",
            ErrorKind::ReadError => "ReadError",
            ErrorKind::MalformedInput => "MalformedInput",
            ErrorKind::InputBaseOutOfRange => "InputBaseOutOfRange",
            ErrorKind::OutputBaseOutOfRange => "OutputBaseOutOfRange",
            ErrorKind::InvalidDigitForBase => "InvalidDigitForBase",
            ErrorKind::Unknown => "Unknown",
        }
    }

    pub fn from_name(name: &str) -> Option<ErrorKind> {
        ErrorKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
