use core::fmt;

/// Why a framed telegram could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// No complete telegram is buffered.
    NoTelegram,
    MissingChecksum,
    MalformedChecksum(String),
    ChecksumMismatch { expected: u16, computed: u16 },
    MissingHeader,
    /// A line ended without `\r\n`.
    UnterminatedLine(String),
    MalformedLine(String),
    DuplicateField(&'static str),
    InvalidValue { field: &'static str, value: String },
    InvalidUnit { field: &'static str, unit: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::NoTelegram => write!(f, "No complete telegram available"),
            DecodeError::MissingChecksum => write!(f, "Missing checksum"),
            DecodeError::MalformedChecksum(text) => {
                write!(f, "Incomplete or malformed checksum: '{}'", text)
            }
            DecodeError::ChecksumMismatch { expected, computed } => write!(
                f,
                "Checksum mismatch: telegram says {:04X}, computed {:04X}",
                expected, computed
            ),
            DecodeError::MissingHeader => write!(f, "Telegram does not start with '/'"),
            DecodeError::UnterminatedLine(line) => {
                write!(f, "Line not CRLF terminated: '{}'", line)
            }
            DecodeError::MalformedLine(line) => write!(f, "Malformed line: '{}'", line),
            DecodeError::DuplicateField(name) => write!(f, "Duplicate field: {}", name),
            DecodeError::InvalidValue { field, value } => {
                write!(f, "Invalid value for {}: '{}'", field, value)
            }
            DecodeError::InvalidUnit { field, unit } => {
                write!(f, "Invalid unit for {}: '{}'", field, unit)
            }
        }
    }
}

impl std::error::Error for DecodeError {}
