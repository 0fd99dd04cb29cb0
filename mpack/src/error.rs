use crate::format::Format;
use std::fmt::{Display, Formatter, self};

/// A `DecodeError` together with the number of bytes that had been consumed from the source when it occurred.
#[derive(Debug)]
pub struct DecoderError {
    inner: DecodeError,
    at: usize,
}

impl DecoderError {
    pub fn into_inner(self) -> DecodeError {
        self.inner
    }

    pub fn position(&self) -> usize {
        self.at
    }
}

impl std::error::Error for DecoderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
       Some(&self.inner)
    }
}

impl Display for DecoderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{} at input position {}", self.inner, self.at)
    }
}

/// Errors raised while reading MessagePack. After any of these the position of the decoder within the stream is
/// unspecified and decoding must not continue on the same source.
#[derive(Debug)]
pub enum DecodeError {
    /// The source ran dry before the current value was complete
    Eof,
    /// The source failed for a reason other than running dry
    Io(std::io::Error),
    /// The tag byte does not belong to the requested family
    Format { expected: &'static str, byte: u8, format: Format },
    /// The integer was decoded correctly but does not fit the requested type. Carries the true value.
    IntegerOverflow(i128),
    /// A 32-bit length field had its most significant bit set
    Size(u64),
    /// A string payload was not valid UTF-8
    Utf8(std::string::FromUtf8Error),
    /// A payload is longer than the configured maximum
    Limit { len: u32, max: u32 },
    /// Containers are nested deeper than the configured maximum
    Depth(usize),
}

impl DecodeError {
    pub fn at(self, at: usize) -> DecoderError {
        DecoderError { inner: self, at }
    }

    pub(crate) fn unexpected(expected: &'static str, byte: u8) -> DecodeError {
        DecodeError::Format { expected, byte, format: Format::from_byte(byte) }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(e: std::io::Error) -> DecodeError {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => DecodeError::Eof,
            _ => DecodeError::Io(e),
        }
    }
}

impl From<std::string::FromUtf8Error> for DecodeError {
    fn from(e: std::string::FromUtf8Error) -> DecodeError {
        DecodeError::Utf8(e)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Io(e) => Some(e),
            DecodeError::Utf8(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DecodeError::Eof => f.write_str("Unexpected end of input while decoding"),
            DecodeError::Io(e) => write!(f, "IO error {}", e),
            DecodeError::Format { expected, byte, format } => write!(f, "Expected {}, but got {} (the code type is {:02x})", expected, format, byte),
            DecodeError::IntegerOverflow(value) => write!(f, "Integer {} does not fit into the requested type", value),
            DecodeError::Size(value) => write!(f, "Length {} exceeds maximum {}", value, i32::MAX),
            DecodeError::Utf8(e) => write!(f, "String payload was not valid Utf-8: {}", e),
            DecodeError::Limit { len, max } => write!(f, "Payload of length {} exceeds configured maximum {}", len, max),
            DecodeError::Depth(max) => write!(f, "Containers nested deeper than {}", max),
        }
    }
}

#[derive(Debug)]
pub enum EncodeError {
    Io(std::io::Error),
    /// The wire format can not carry a length or count this large
    Length(usize),
    /// The integer lies outside of `i64::MIN..=u64::MAX`
    NotRepresentable(i128),
}

impl From<std::io::Error> for EncodeError {
    fn from(e: std::io::Error) -> EncodeError {
        EncodeError::Io(e)
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            EncodeError::Io(e) => write!(f, "IO error {}", e),
            EncodeError::Length(value) => write!(f, "Length {} exceeds maximum {}", value, i32::MAX),
            EncodeError::NotRepresentable(value) => write!(f, "MessagePack cannot represent the integer {}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeError, EncodeError};
    use crate::format::Format;

    #[test]
    fn unexpected_eof_is_truncation() {
        let e = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short");
        assert!(matches!(DecodeError::from(e), DecodeError::Eof));
        let e = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        assert!(matches!(DecodeError::from(e), DecodeError::Io(_)));
    }

    #[test]
    fn format_message() {
        let e = DecodeError::unexpected("Map", 0xa3);
        assert!(matches!(e, DecodeError::Format { expected: "Map", byte: 0xa3, format: Format::FixStr }));
        assert_eq!("Expected Map, but got FixStr (the code type is a3)", e.to_string());
        assert_eq!("Expected Map, but got FixStr (the code type is a3) at input position 7", e.at(7).to_string());
    }

    #[test]
    fn encode_message() {
        assert_eq!("MessagePack cannot represent the integer -9223372036854775809",
            EncodeError::NotRepresentable(i128::from(i64::MIN) - 1).to_string());
    }

}
