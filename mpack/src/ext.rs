//! MessagePack's extension family stores a tuple of an application defined type and an opaque byte array. Types
//! `0..=127` belong to applications, `-128..=-1` are reserved for future extensions of the format itself.

use std::fmt;

/// Header of an extension value: its type and the length of the data that follows.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct ExtensionHeader {
    ext_type: i8,
    len: u32,
}

impl ExtensionHeader {

    pub fn new(ext_type: i8, len: u32) -> Self {
        Self { ext_type, len }
    }

    /// Builds a header from wider integers as they often arrive from configuration or foreign interfaces. Fails if
    /// the type does not fit into a byte or the length is negative or too large for the wire format.
    pub fn checked(ext_type: i64, len: i64) -> Option<Self> {
        let ext_type = i8::try_from(ext_type).ok()?;
        let len = u32::try_from(len).ok()?;
        Some(Self { ext_type, len })
    }

    pub fn ext_type(&self) -> i8 {
        self.ext_type
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Negative types are reserved for the format itself
    pub fn is_reserved(&self) -> bool {
        self.ext_type < 0
    }

}

impl fmt::Display for ExtensionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtensionHeader(type:{}, length:{})", self.ext_type, self.len)
    }
}
