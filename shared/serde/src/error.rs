use thiserror::Error;

/// Errors that can occur while reading a serialized state stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The stream ended before the named field could be read
    #[error("Unexpected end of stream while reading '{name}' (needed {needed} bytes, {remaining} remaining)")]
    UnexpectedEnd {
        name: String,
        needed: usize,
        remaining: usize,
    },

    /// A numeric field was outside the range the reader accepts
    #[error("Value {value} of '{name}' is out of bounds [{lower}, {upper}]")]
    OutOfBounds {
        name: String,
        value: String,
        lower: String,
        upper: String,
    },

    /// A string field's length was outside the accepted bounds
    #[error("String '{name}' has length {length}, expected between {min_length} and {max_length}")]
    InvalidStringLength {
        name: String,
        length: usize,
        min_length: usize,
        max_length: usize,
    },

    /// A string field was not valid UTF-8
    #[error("String '{name}' is not valid UTF-8")]
    InvalidUtf8 { name: String },

    /// A string declared as ASCII contained non-ASCII bytes
    #[error("String '{name}' contains non-ASCII characters")]
    NonAsciiString { name: String },

    /// A bool field held something other than 0 or 1
    #[error("Bool '{name}' has invalid encoding {value}")]
    InvalidBool { name: String, value: u8 },

    /// A tagged value carried an unknown tag
    #[error("Unknown tag {tag} while reading '{name}'")]
    InvalidTag { name: String, tag: u8 },

    /// Bytes were left over after the stream was expected to end
    #[error("Deserialization didn't reach the end of the stream: {remaining} bytes left over")]
    TrailingBytes { remaining: usize },
}
