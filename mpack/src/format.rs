//! Every MessagePack value starts with a tag byte. The tag alone determines the `Format` of the value and thereby how
//! many bytes follow it: some formats embed their value or length in the low bits of the tag (fixint, fixmap,
//! fixarray, fixstr), others are followed by a big-endian length field of one, two or four bytes, and the numeric
//! formats are followed by a payload of fixed width.
//!
//! Formats are grouped into families. A reader asking for a map header accepts `FixMap`, `Map16` and `Map32` alike,
//! since they only differ in how many pairs they can announce.

/// Tag bytes and tag prefixes as they appear on wire.
pub mod code {
    pub const POSFIXINT_MASK: u8 = 0x80;
    pub const FIXMAP_PREFIX: u8 = 0x80;
    pub const FIXARRAY_PREFIX: u8 = 0x90;
    pub const FIXSTR_PREFIX: u8 = 0xa0;

    pub const NIL: u8 = 0xc0;
    pub const NEVER_USED: u8 = 0xc1;
    pub const FALSE: u8 = 0xc2;
    pub const TRUE: u8 = 0xc3;
    pub const BIN8: u8 = 0xc4;
    pub const BIN16: u8 = 0xc5;
    pub const BIN32: u8 = 0xc6;
    pub const EXT8: u8 = 0xc7;
    pub const EXT16: u8 = 0xc8;
    pub const EXT32: u8 = 0xc9;
    pub const FLOAT32: u8 = 0xca;
    pub const FLOAT64: u8 = 0xcb;
    pub const UINT8: u8 = 0xcc;
    pub const UINT16: u8 = 0xcd;
    pub const UINT32: u8 = 0xce;
    pub const UINT64: u8 = 0xcf;
    pub const INT8: u8 = 0xd0;
    pub const INT16: u8 = 0xd1;
    pub const INT32: u8 = 0xd2;
    pub const INT64: u8 = 0xd3;
    pub const FIXEXT1: u8 = 0xd4;
    pub const FIXEXT2: u8 = 0xd5;
    pub const FIXEXT4: u8 = 0xd6;
    pub const FIXEXT8: u8 = 0xd7;
    pub const FIXEXT16: u8 = 0xd8;
    pub const STR8: u8 = 0xd9;
    pub const STR16: u8 = 0xda;
    pub const STR32: u8 = 0xdb;
    pub const ARRAY16: u8 = 0xdc;
    pub const ARRAY32: u8 = 0xdd;
    pub const MAP16: u8 = 0xde;
    pub const MAP32: u8 = 0xdf;

    pub const NEGFIXINT_PREFIX: u8 = 0xe0;

    /// Both positive and negative fixints carry their value in the tag itself
    #[inline]
    pub const fn is_fix_int(b: u8) -> bool {
        b & POSFIXINT_MASK == 0 || b >= NEGFIXINT_PREFIX
    }
}

/// The coarse semantic category shared by several formats.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum FamilyType {
    Nil,
    Boolean,
    Integer,
    Float,
    String,
    Binary,
    Array,
    Map,
    Extension,
    /// Only the reserved tag 0xc1 belongs here
    Undefined,
}

impl FamilyType {

    /// Returns the mnemonic of the family. This is useful for error messages.
    pub fn name(&self) -> &'static str {
        match *self {
            FamilyType::Nil       => "Nil",
            FamilyType::Boolean   => "Boolean",
            FamilyType::Integer   => "Integer",
            FamilyType::Float     => "Float",
            FamilyType::String    => "String",
            FamilyType::Binary    => "Binary",
            FamilyType::Array     => "Array",
            FamilyType::Map       => "Map",
            FamilyType::Extension => "Extension",
            FamilyType::Undefined => "Undefined",
        }
    }

}

/// The concrete wire encoding selected by a tag byte.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Format {
    /// 0x00 - 0x7f, the tag is the value
    PosFixInt,
    /// 0x80 - 0x8f, the low nibble is the number of pairs
    FixMap,
    /// 0x90 - 0x9f, the low nibble is the number of elements
    FixArray,
    /// 0xa0 - 0xbf, the low five bits are the length in bytes
    FixStr,
    Nil,
    /// 0xc1 is reserved and never valid on wire
    NeverUsed,
    False,
    True,
    Bin8,
    Bin16,
    Bin32,
    Ext8,
    Ext16,
    Ext32,
    Float32,
    Float64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    /// The tag is followed by the type byte and exactly one byte of data
    FixExt1,
    FixExt2,
    FixExt4,
    FixExt8,
    FixExt16,
    Str8,
    Str16,
    Str32,
    Array16,
    Array32,
    Map16,
    Map32,
    /// 0xe0 - 0xff, the tag reinterpreted as `i8` is the value (-32 to -1)
    NegFixInt,
}

/// Describes what follows a tag byte on wire, which is all that is needed to step over a value without
/// understanding it.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Layout {
    /// A payload of known size follows the tag, possibly none at all
    Scalar(u32),
    /// A length field of `width` bytes follows, then that many payload bytes plus `extra` bytes
    Sized { width: usize, extra: u32 },
    /// The tag announces this many child values, which follow immediately
    Nested(u64),
    /// A count field of `width` bytes follows, announcing `per_entry` child values per entry
    Counted { width: usize, per_entry: u64 },
    /// The tag is not valid
    Invalid,
}

static FORMAT_TABLE: [Format; 256] = build_table();

const fn build_table() -> [Format; 256] {
    let mut table = [Format::NeverUsed; 256];
    let mut b = 0;
    while b < table.len() {
        table[b] = classify_byte(b as u8);
        b += 1;
    }
    table
}

const fn classify_byte(b: u8) -> Format {
    use code::*;
    match b {
        0x00..=0x7f => Format::PosFixInt,
        0x80..=0x8f => Format::FixMap,
        0x90..=0x9f => Format::FixArray,
        0xa0..=0xbf => Format::FixStr,
        NIL         => Format::Nil,
        NEVER_USED  => Format::NeverUsed,
        FALSE       => Format::False,
        TRUE        => Format::True,
        BIN8        => Format::Bin8,
        BIN16       => Format::Bin16,
        BIN32       => Format::Bin32,
        EXT8        => Format::Ext8,
        EXT16       => Format::Ext16,
        EXT32       => Format::Ext32,
        FLOAT32     => Format::Float32,
        FLOAT64     => Format::Float64,
        UINT8       => Format::UInt8,
        UINT16      => Format::UInt16,
        UINT32      => Format::UInt32,
        UINT64      => Format::UInt64,
        INT8        => Format::Int8,
        INT16       => Format::Int16,
        INT32       => Format::Int32,
        INT64       => Format::Int64,
        FIXEXT1     => Format::FixExt1,
        FIXEXT2     => Format::FixExt2,
        FIXEXT4     => Format::FixExt4,
        FIXEXT8     => Format::FixExt8,
        FIXEXT16    => Format::FixExt16,
        STR8        => Format::Str8,
        STR16       => Format::Str16,
        STR32       => Format::Str32,
        ARRAY16     => Format::Array16,
        ARRAY32     => Format::Array32,
        MAP16       => Format::Map16,
        MAP32       => Format::Map32,
        0xe0..=0xff => Format::NegFixInt,
    }
}

impl Format {

    /// Looks up the format of a tag byte. Every byte maps to exactly one format, so this never fails.
    #[inline]
    pub fn from_byte(b: u8) -> Format {
        FORMAT_TABLE[b as usize]
    }

    /// Looks up both the format and the family of a tag byte.
    #[inline]
    pub fn classify(b: u8) -> (Format, FamilyType) {
        let format = Self::from_byte(b);
        (format, format.family())
    }

    pub const fn family(&self) -> FamilyType {
        match *self {
            Format::PosFixInt | Format::NegFixInt
                | Format::UInt8 | Format::UInt16 | Format::UInt32 | Format::UInt64
                | Format::Int8 | Format::Int16 | Format::Int32 | Format::Int64 => FamilyType::Integer,
            Format::FixMap | Format::Map16 | Format::Map32                   => FamilyType::Map,
            Format::FixArray | Format::Array16 | Format::Array32             => FamilyType::Array,
            Format::FixStr | Format::Str8 | Format::Str16 | Format::Str32    => FamilyType::String,
            Format::Nil                                                      => FamilyType::Nil,
            Format::NeverUsed                                                => FamilyType::Undefined,
            Format::False | Format::True                                     => FamilyType::Boolean,
            Format::Bin8 | Format::Bin16 | Format::Bin32                     => FamilyType::Binary,
            Format::Float32 | Format::Float64                                => FamilyType::Float,
            Format::Ext8 | Format::Ext16 | Format::Ext32
                | Format::FixExt1 | Format::FixExt2 | Format::FixExt4
                | Format::FixExt8 | Format::FixExt16                         => FamilyType::Extension,
        }
    }

    /// Returns the mnemonic of the format. This is useful for error messages.
    pub fn name(&self) -> &'static str {
        match *self {
            Format::PosFixInt => "PosFixInt",
            Format::FixMap    => "FixMap",
            Format::FixArray  => "FixArray",
            Format::FixStr    => "FixStr",
            Format::Nil       => "Nil",
            Format::NeverUsed => "NeverUsed",
            Format::False     => "False",
            Format::True      => "True",
            Format::Bin8      => "Bin8",
            Format::Bin16     => "Bin16",
            Format::Bin32     => "Bin32",
            Format::Ext8      => "Ext8",
            Format::Ext16     => "Ext16",
            Format::Ext32     => "Ext32",
            Format::Float32   => "Float32",
            Format::Float64   => "Float64",
            Format::UInt8     => "UInt8",
            Format::UInt16    => "UInt16",
            Format::UInt32    => "UInt32",
            Format::UInt64    => "UInt64",
            Format::Int8      => "Int8",
            Format::Int16     => "Int16",
            Format::Int32     => "Int32",
            Format::Int64     => "Int64",
            Format::FixExt1   => "FixExt1",
            Format::FixExt2   => "FixExt2",
            Format::FixExt4   => "FixExt4",
            Format::FixExt8   => "FixExt8",
            Format::FixExt16  => "FixExt16",
            Format::Str8      => "Str8",
            Format::Str16     => "Str16",
            Format::Str32     => "Str32",
            Format::Array16   => "Array16",
            Format::Array32   => "Array32",
            Format::Map16     => "Map16",
            Format::Map32     => "Map32",
            Format::NegFixInt => "NegFixInt",
        }
    }

    /// The data length implied by a `FixExt` tag
    pub const fn fix_ext_len(&self) -> Option<u32> {
        match *self {
            Format::FixExt1  => Some(1),
            Format::FixExt2  => Some(2),
            Format::FixExt4  => Some(4),
            Format::FixExt8  => Some(8),
            Format::FixExt16 => Some(16),
            _                => None,
        }
    }

    /// The width in bytes of the explicit length or count field following the tag, if there is one
    pub const fn length_width(&self) -> Option<usize> {
        match *self {
            Format::Bin8 | Format::Ext8 | Format::Str8                                       => Some(1),
            Format::Bin16 | Format::Ext16 | Format::Str16 | Format::Array16 | Format::Map16  => Some(2),
            Format::Bin32 | Format::Ext32 | Format::Str32 | Format::Array32 | Format::Map32  => Some(4),
            _                                                                                => None,
        }
    }

    pub(crate) fn layout(&self, tag: u8) -> Layout {
        match *self {
            Format::PosFixInt | Format::NegFixInt | Format::Nil | Format::False | Format::True => Layout::Scalar(0),
            Format::FixStr    => Layout::Scalar(u32::from(tag & 0x1f)),
            Format::FixArray  => Layout::Nested(u64::from(tag & 0x0f)),
            Format::FixMap    => Layout::Nested(u64::from(tag & 0x0f) * 2),
            Format::Int8 | Format::UInt8                        => Layout::Scalar(1),
            Format::Int16 | Format::UInt16                      => Layout::Scalar(2),
            Format::Int32 | Format::UInt32 | Format::Float32    => Layout::Scalar(4),
            Format::Int64 | Format::UInt64 | Format::Float64    => Layout::Scalar(8),
            Format::FixExt1 | Format::FixExt2 | Format::FixExt4
                | Format::FixExt8 | Format::FixExt16            => Layout::Scalar(self.fix_ext_len().unwrap_or(0) + 1),
            Format::Bin8 | Format::Bin16 | Format::Bin32
                | Format::Str8 | Format::Str16 | Format::Str32  => Layout::Sized { width: self.width(), extra: 0 },
            Format::Ext8 | Format::Ext16 | Format::Ext32        => Layout::Sized { width: self.width(), extra: 1 },
            Format::Array16 | Format::Array32                   => Layout::Counted { width: self.width(), per_entry: 1 },
            Format::Map16 | Format::Map32                       => Layout::Counted { width: self.width(), per_entry: 2 },
            Format::NeverUsed                                   => Layout::Invalid,
        }
    }

    #[inline]
    fn width(&self) -> usize {
        self.length_width().unwrap_or(0)
    }

}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
