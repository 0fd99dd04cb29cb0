//! Reads MessagePack from any `std::io::Read`. The decoder offers three levels of access:
//!
//! * header readers (`unpack_map_header`, `unpack_str_header`, ...) which only consume the tag and the length field,
//!   leaving the payload to `read_payload` or `skip_bytes`,
//! * `skip_value` and `read_value` which step over whole values without materializing them, the latter relaying
//!   every consumed byte to a writer,
//! * `unpack` which materializes the next value as a `Value`.
//!
//! The decoder keeps one byte of lookahead so that `peek_format` can inspect the next tag without consuming it.

use crate::error::{DecodeError, DecoderError};
use crate::ext::ExtensionHeader;
use crate::format::{code, FamilyType, Format, Layout};
use crate::value::Value;
use std::io::{self, Read, Write};

/// Containers announcing more entries than this don't get their full capacity up front
const PREALLOC_LIMIT: usize = 1024;

/// Local materialization policy for `unpack`. None of these change how the wire format is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Binary payloads become `Value::Str`, invalid UTF-8 sequences are replaced
    pub bin_as_str: bool,
    /// String payloads become `Value::Bin` without being validated
    pub str_as_bin: bool,
    /// Longest string payload that will be read
    pub max_str_len: u32,
    /// Longest binary or extension payload that will be read
    pub max_bin_len: u32,
    /// Deepest nesting of arrays and maps that will be read
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            bin_as_str: false,
            str_as_bin: false,
            max_str_len: i32::MAX as u32,
            max_bin_len: i32::MAX as u32,
            max_depth: 512,
        }
    }
}

pub struct Decoder<R: Read> {
    reader: R,
    /// A byte that has been read from `reader` but not yet consumed
    pending: Option<u8>,
    /// Holds the widest length or number field, the tag byte never passes through here
    scratch: [u8; 8],
    pos: usize,
    options: DecodeOptions,
}

impl<'a> Decoder<&'a [u8]> {

    /// Decode a single value from the beginning of a byte buffer. Returns the value and the number of bytes it
    /// occupied.
    pub fn decode(buf: &'a [u8]) -> Result<(Value, usize), DecoderError> {
        let mut decoder = Decoder::new(buf);
        match decoder.unpack() {
            Ok(value) => Ok((value, decoder.position())),
            Err(e) => Err(e.at(decoder.position())),
        }
    }

}

impl<R: Read> Decoder<R> {

    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecodeOptions::default())
    }

    pub fn with_options(reader: R, options: DecodeOptions) -> Self {
        Self { reader, pending: None, scratch: [0; 8], pos: 0, options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// The number of bytes consumed so far. A byte held for lookahead does not count as consumed.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the underlying reader. A byte held for lookahead is lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Whether at least one more byte can be read. This fills the lookahead cell, blocking if the source does.
    pub fn has_next(&mut self) -> Result<bool, DecodeError> {
        Ok(self.fill()?.is_some())
    }

    /// Returns the next byte without consuming it.
    pub fn peek_byte(&mut self) -> Result<u8, DecodeError> {
        self.fill()?.ok_or(DecodeError::Eof)
    }

    /// Returns the format of the next value without consuming its tag.
    pub fn peek_format(&mut self) -> Result<Format, DecodeError> {
        Ok(Format::from_byte(self.peek_byte()?))
    }

    pub fn unpack_nil(&mut self) -> Result<(), DecodeError> {
        match self.read_byte()? {
            code::NIL => Ok(()),
            tag       => Err(DecodeError::unexpected("Nil", tag)),
        }
    }

    pub fn unpack_bool(&mut self) -> Result<bool, DecodeError> {
        match self.read_byte()? {
            code::FALSE => Ok(false),
            code::TRUE  => Ok(true),
            tag         => Err(DecodeError::unexpected("Boolean", tag)),
        }
    }

    pub fn unpack_i8(&mut self) -> Result<i8, DecodeError> {
        let v = self.read_integer()?;
        Self::narrow(v)
    }

    pub fn unpack_i16(&mut self) -> Result<i16, DecodeError> {
        let v = self.read_integer()?;
        Self::narrow(v)
    }

    pub fn unpack_i32(&mut self) -> Result<i32, DecodeError> {
        let v = self.read_integer()?;
        Self::narrow(v)
    }

    pub fn unpack_i64(&mut self) -> Result<i64, DecodeError> {
        let v = self.read_integer()?;
        Self::narrow(v)
    }

    pub fn unpack_u8(&mut self) -> Result<u8, DecodeError> {
        let v = self.read_integer()?;
        Self::narrow(v)
    }

    pub fn unpack_u16(&mut self) -> Result<u16, DecodeError> {
        let v = self.read_integer()?;
        Self::narrow(v)
    }

    pub fn unpack_u32(&mut self) -> Result<u32, DecodeError> {
        let v = self.read_integer()?;
        Self::narrow(v)
    }

    pub fn unpack_u64(&mut self) -> Result<u64, DecodeError> {
        let v = self.read_integer()?;
        Self::narrow(v)
    }

    /// Reads any integer format without loss.
    pub fn unpack_big_integer(&mut self) -> Result<i128, DecodeError> {
        self.read_integer()
    }

    /// Reads a float. Float64 values are rounded to the nearest `f32`.
    pub fn unpack_f32(&mut self) -> Result<f32, DecodeError> {
        match self.read_byte()? {
            code::FLOAT32 => Ok(f32::from_bits(self.read_be(4)? as u32)),
            code::FLOAT64 => Ok(f64::from_bits(self.read_be(8)?) as f32),
            tag           => Err(DecodeError::unexpected("Float", tag)),
        }
    }

    pub fn unpack_f64(&mut self) -> Result<f64, DecodeError> {
        match self.read_byte()? {
            code::FLOAT32 => Ok(f64::from(f32::from_bits(self.read_be(4)? as u32))),
            code::FLOAT64 => Ok(f64::from_bits(self.read_be(8)?)),
            tag           => Err(DecodeError::unexpected("Float", tag)),
        }
    }

    /// Reads the header of a map and returns the number of pairs that follow.
    pub fn unpack_map_header(&mut self) -> Result<u32, DecodeError> {
        let tag = self.read_byte()?;
        match Format::from_byte(tag) {
            Format::FixMap => Ok(u32::from(tag & 0x0f)),
            Format::Map16  => self.read_length(2),
            Format::Map32  => self.read_length(4),
            _              => Err(DecodeError::unexpected("Map", tag)),
        }
    }

    /// Reads the header of an array and returns the number of elements that follow.
    pub fn unpack_array_header(&mut self) -> Result<u32, DecodeError> {
        let tag = self.read_byte()?;
        match Format::from_byte(tag) {
            Format::FixArray => Ok(u32::from(tag & 0x0f)),
            Format::Array16  => self.read_length(2),
            Format::Array32  => self.read_length(4),
            _                => Err(DecodeError::unexpected("Array", tag)),
        }
    }

    /// Reads the header of a binary and returns the length of its payload.
    pub fn unpack_bin_header(&mut self) -> Result<u32, DecodeError> {
        match self.read_byte()? {
            code::BIN8  => self.read_length(1),
            code::BIN16 => self.read_length(2),
            code::BIN32 => self.read_length(4),
            tag         => Err(DecodeError::unexpected("Binary", tag)),
        }
    }

    /// Reads the header of a string and returns the length of its payload in bytes.
    pub fn unpack_str_header(&mut self) -> Result<u32, DecodeError> {
        let tag = self.read_byte()?;
        match Format::from_byte(tag) {
            Format::FixStr => Ok(u32::from(tag & 0x1f)),
            Format::Str8   => self.read_length(1),
            Format::Str16  => self.read_length(2),
            Format::Str32  => self.read_length(4),
            _              => Err(DecodeError::unexpected("String", tag)),
        }
    }

    pub fn unpack_ext_header(&mut self) -> Result<ExtensionHeader, DecodeError> {
        let tag = self.read_byte()?;
        let format = Format::from_byte(tag);
        let len = match format {
            Format::Ext8  => self.read_length(1)?,
            Format::Ext16 => self.read_length(2)?,
            Format::Ext32 => self.read_length(4)?,
            _ => match format.fix_ext_len() {
                Some(len) => len,
                None => return Err(DecodeError::unexpected("Extension", tag)),
            },
        };
        let ext_type = self.read_byte()? as i8;
        Ok(ExtensionHeader::new(ext_type, len))
    }

    /// Reads `len` raw bytes, usually the payload announced by the last header.
    pub fn read_payload(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        let mut buf = Vec::new();
        let mut remaining = len as u64;
        if remaining > 0 {
            if let Some(b) = self.pending.take() {
                buf.push(b);
                self.pos += 1;
                remaining -= 1;
            }
        }
        // grows with the data actually present instead of trusting the announced length
        let read = self.reader.by_ref().take(remaining).read_to_end(&mut buf)?;
        self.pos += read;
        if (read as u64) < remaining {
            return Err(DecodeError::Eof);
        }
        Ok(buf)
    }

    /// Fills the whole buffer with raw bytes.
    pub fn read_payload_into(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        Self::read_exact(&mut self.reader, &mut self.pending, buf)?;
        self.pos += buf.len();
        Ok(())
    }

    /// Discards `n` raw bytes.
    pub fn skip_bytes(&mut self, n: u64) -> Result<(), DecodeError> {
        self.relay(n, &mut io::sink())?;
        Ok(())
    }

    /// Reads a string header and its payload.
    pub fn unpack_string(&mut self) -> Result<String, DecodeError> {
        let len = self.unpack_str_header()?;
        let payload = self.read_bounded(len, self.options.max_str_len)?;
        Ok(String::from_utf8(payload)?)
    }

    /// Reads a binary header and its payload.
    pub fn unpack_bin(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.unpack_bin_header()?;
        self.read_bounded(len, self.options.max_bin_len)
    }

    /// Reads an extension header and its payload.
    pub fn unpack_ext(&mut self) -> Result<(ExtensionHeader, Vec<u8>), DecodeError> {
        let header = self.unpack_ext_header()?;
        let data = self.read_bounded(header.len(), self.options.max_bin_len)?;
        Ok((header, data))
    }

    /// Reads an array header and all of its elements.
    pub fn unpack_array(&mut self) -> Result<Vec<Value>, DecodeError> {
        self.array(0)
    }

    /// Reads a map header and all of its pairs.
    pub fn unpack_map(&mut self) -> Result<Vec<(Value, Value)>, DecodeError> {
        self.map(0)
    }

    /// Reads the next value including all of its elements.
    pub fn unpack(&mut self) -> Result<Value, DecodeError> {
        self.value(0)
    }

    /// Steps over the next `n` values without materializing them.
    pub fn skip_value(&mut self, n: u64) -> Result<(), DecodeError> {
        self.walk(n, &mut io::sink())?;
        Ok(())
    }

    /// Steps over the next `n` values and writes every byte they occupy to `sink` unchanged. Returns the number of
    /// relayed bytes.
    pub fn read_value<W: Write + ?Sized>(&mut self, n: u64, sink: &mut W) -> Result<u64, DecodeError> {
        self.walk(n, sink)
    }

    /// Tracks the number of values still to be passed instead of recursing into containers: every tag settles one
    /// value and containers add their entries.
    fn walk<W: Write + ?Sized>(&mut self, n: u64, sink: &mut W) -> Result<u64, DecodeError> {
        let mut remaining = n;
        let mut relayed = 0;
        while remaining > 0 {
            let tag = self.read_byte()?;
            sink.write_all(&[tag])?;
            relayed += 1;
            match Format::from_byte(tag).layout(tag) {
                Layout::Scalar(len) => {
                    relayed += self.relay(u64::from(len), sink)?;
                },
                Layout::Sized { width, extra } => {
                    let len = self.read_length(width)?;
                    sink.write_all(&self.scratch[..width])?;
                    relayed += width as u64;
                    relayed += self.relay(u64::from(len) + u64::from(extra), sink)?;
                },
                Layout::Nested(entries) => {
                    remaining = remaining.saturating_add(entries);
                },
                Layout::Counted { width, per_entry } => {
                    let count = self.read_length(width)?;
                    sink.write_all(&self.scratch[..width])?;
                    relayed += width as u64;
                    remaining = remaining.saturating_add(u64::from(count) * per_entry);
                },
                Layout::Invalid => return Err(DecodeError::unexpected("a value", tag)),
            }
            remaining -= 1;
        }
        Ok(relayed)
    }

    fn value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        let tag = self.peek_byte()?;
        match Format::from_byte(tag).family() {
            FamilyType::Nil => {
                self.unpack_nil()?;
                Ok(Value::Nil)
            },
            FamilyType::Boolean => Ok(Value::Bool(self.unpack_bool()?)),
            FamilyType::Integer => {
                let v = self.read_integer()?;
                match i64::try_from(v) {
                    Ok(v) => Ok(Value::Int(v)),
                    Err(_) => u64::try_from(v).map(Value::UInt).map_err(|_| DecodeError::IntegerOverflow(v)),
                }
            },
            FamilyType::Float => Ok(Value::Float(self.unpack_f64()?)),
            FamilyType::String => {
                let len = self.unpack_str_header()?;
                let payload = self.read_bounded(len, self.options.max_str_len)?;
                if self.options.str_as_bin {
                    Ok(Value::Bin(payload))
                } else {
                    Ok(Value::Str(String::from_utf8(payload)?))
                }
            },
            FamilyType::Binary => {
                let payload = self.unpack_bin()?;
                if self.options.bin_as_str {
                    Ok(Value::Str(String::from_utf8_lossy(&payload).into_owned()))
                } else {
                    Ok(Value::Bin(payload))
                }
            },
            FamilyType::Array => Ok(Value::Array(self.array(depth)?)),
            FamilyType::Map => Ok(Value::Map(self.map(depth)?)),
            FamilyType::Extension => {
                let (header, data) = self.unpack_ext()?;
                Ok(Value::Extension(header.ext_type(), data))
            },
            FamilyType::Undefined => {
                self.read_byte()?;
                Err(DecodeError::unexpected("a value", tag))
            },
        }
    }

    fn array(&mut self, depth: usize) -> Result<Vec<Value>, DecodeError> {
        self.enter(depth)?;
        let len = self.unpack_array_header()? as usize;
        let mut inner = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            inner.push(self.value(depth + 1)?);
        }
        Ok(inner)
    }

    fn map(&mut self, depth: usize) -> Result<Vec<(Value, Value)>, DecodeError> {
        self.enter(depth)?;
        let len = self.unpack_map_header()? as usize;
        let mut inner = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            let key = self.value(depth + 1)?;
            let val = self.value(depth + 1)?;
            inner.push((key, val));
        }
        Ok(inner)
    }

    #[inline]
    fn enter(&self, depth: usize) -> Result<(), DecodeError> {
        if depth >= self.options.max_depth {
            Err(DecodeError::Depth(self.options.max_depth))
        } else {
            Ok(())
        }
    }

    fn read_bounded(&mut self, len: u32, max: u32) -> Result<Vec<u8>, DecodeError> {
        if len > max {
            return Err(DecodeError::Limit { len, max });
        }
        self.read_payload(len as usize)
    }

    /// Reads an integer tag and its payload, respecting the signedness of the format.
    fn read_integer(&mut self) -> Result<i128, DecodeError> {
        let tag = self.read_byte()?;
        if code::is_fix_int(tag) {
            return Ok(i128::from(tag as i8));
        }
        let v = match Format::from_byte(tag) {
            Format::UInt8  => i128::from(self.read_be(1)?),
            Format::UInt16 => i128::from(self.read_be(2)?),
            Format::UInt32 => i128::from(self.read_be(4)?),
            Format::UInt64 => i128::from(self.read_be(8)?),
            Format::Int8   => i128::from(self.read_be(1)? as u8 as i8),
            Format::Int16  => i128::from(self.read_be(2)? as u16 as i16),
            Format::Int32  => i128::from(self.read_be(4)? as u32 as i32),
            Format::Int64  => i128::from(self.read_be(8)? as i64),
            _              => return Err(DecodeError::unexpected("Integer", tag)),
        };
        Ok(v)
    }

    #[inline]
    fn narrow<T: TryFrom<i128>>(v: i128) -> Result<T, DecodeError> {
        T::try_from(v).map_err(|_| DecodeError::IntegerOverflow(v))
    }

    /// Reads a length or count field of the given width. 32 bit fields with the most significant bit set are
    /// rejected.
    fn read_length(&mut self, width: usize) -> Result<u32, DecodeError> {
        let len = self.read_be(width)?;
        if len > i32::MAX as u64 {
            return Err(DecodeError::Size(len));
        }
        Ok(len as u32)
    }

    /// Reads a big-endian unsigned integer of up to eight bytes. The raw bytes stay in the scratch buffer.
    fn read_be(&mut self, width: usize) -> Result<u64, DecodeError> {
        let buf = &mut self.scratch[..width];
        Self::read_exact(&mut self.reader, &mut self.pending, buf)?;
        self.pos += width;
        Ok(self.scratch[..width].iter().fold(0, |acc, &b| acc << 8 | u64::from(b)))
    }

    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let b = match self.pending.take() {
            Some(b) => b,
            None => {
                let mut b = [0; 1];
                self.reader.read_exact(&mut b)?;
                b[0]
            },
        };
        self.pos += 1;
        Ok(b)
    }

    /// Puts the next byte into the lookahead cell unless it is already occupied. Returns `None` at the end of input.
    fn fill(&mut self) -> Result<Option<u8>, DecodeError> {
        if self.pending.is_none() {
            let mut b = [0; 1];
            loop {
                match self.reader.read(&mut b) {
                    Ok(0) => return Ok(None),
                    Ok(_) => {
                        self.pending = Some(b[0]);
                        break;
                    },
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(self.pending)
    }

    /// Fills `buf` completely, starting with the byte in the lookahead cell if there is one.
    fn read_exact(reader: &mut R, pending: &mut Option<u8>, buf: &mut [u8]) -> Result<(), DecodeError> {
        let start = match (buf.first_mut(), pending.take()) {
            (Some(first), Some(b)) => {
                *first = b;
                1
            },
            (None, b) => {
                *pending = b;
                0
            },
            (Some(_), None) => 0,
        };
        reader.read_exact(&mut buf[start..])?;
        Ok(())
    }

    /// Copies `n` raw bytes to `sink`.
    fn relay<W: Write + ?Sized>(&mut self, n: u64, sink: &mut W) -> Result<u64, DecodeError> {
        let mut remaining = n;
        if remaining > 0 {
            if let Some(b) = self.pending.take() {
                sink.write_all(&[b])?;
                self.pos += 1;
                remaining -= 1;
            }
        }
        let copied = io::copy(&mut self.reader.by_ref().take(remaining), sink)?;
        self.pos += copied as usize;
        if copied < remaining {
            return Err(DecodeError::Eof);
        }
        Ok(n)
    }

}

#[cfg(test)]
mod tests {
    use super::{DecodeOptions, Decoder};
    use crate::encoder::Encoder;
    use crate::error::DecodeError;
    use crate::ext::ExtensionHeader;
    use crate::format::{code, Format};
    use crate::value::Value;

    fn decoder(bytes: &[u8]) -> Decoder<&[u8]> {
        Decoder::new(bytes)
    }

    #[test]
    fn peeking_keeps_the_byte() {
        let mut d = decoder(&[code::UINT16, 0x01, 0x02, 0x05]);
        assert!(d.has_next().unwrap());
        assert_eq!(Format::UInt16, d.peek_format().unwrap());
        assert_eq!(code::UINT16, d.peek_byte().unwrap());
        assert_eq!(0, d.position());
        assert_eq!(0x0102, d.unpack_u16().unwrap());
        assert_eq!(3, d.position());
        assert_eq!(5, d.peek_byte().unwrap());
        assert_eq!(vec![5], d.read_payload(1).unwrap());
        assert!(!d.has_next().unwrap());
        assert!(matches!(d.peek_byte(), Err(DecodeError::Eof)));
    }

    #[test]
    fn raw_reads_drain_the_lookahead() {
        let mut d = decoder(&[1, 2, 3, 4, 5]);
        d.peek_byte().unwrap();
        let mut buf = [0; 2];
        d.read_payload_into(&mut buf).unwrap();
        assert_eq!([1, 2], buf);
        d.peek_byte().unwrap();
        d.skip_bytes(2).unwrap();
        assert_eq!(4, d.position());
        d.peek_byte().unwrap();
        let mut empty = [0; 0];
        d.read_payload_into(&mut empty).unwrap();
        assert_eq!(5, d.unpack_i8().unwrap());
    }

    #[test]
    fn fix_ints() {
        let mut d = decoder(&[0x00, 0x7f, 0xe0, 0xff]);
        assert_eq!(0, d.unpack_i64().unwrap());
        assert_eq!(127, d.unpack_i8().unwrap());
        assert_eq!(-32, d.unpack_i16().unwrap());
        assert_eq!(-1, d.unpack_i32().unwrap());
        assert_eq!(4, d.position());
    }

    #[test]
    fn signedness() {
        let uint32 = [code::UINT32, 0xff, 0xff, 0xff, 0xff];
        assert!(matches!(decoder(&uint32).unpack_i32(), Err(DecodeError::IntegerOverflow(v)) if v == 4294967295));
        assert_eq!(4294967295, decoder(&uint32).unpack_i64().unwrap());
        assert_eq!(u32::MAX, decoder(&uint32).unpack_u32().unwrap());
        let int32 = [code::INT32, 0xff, 0xff, 0xff, 0xff];
        assert_eq!(-1, decoder(&int32).unpack_i32().unwrap());
        assert!(matches!(decoder(&int32).unpack_u64(), Err(DecodeError::IntegerOverflow(-1))));
        let uint64 = [code::UINT64, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        assert!(matches!(decoder(&uint64).unpack_i64(), Err(DecodeError::IntegerOverflow(v)) if v == i128::from(u64::MAX)));
        assert_eq!(i128::from(u64::MAX), decoder(&uint64).unpack_big_integer().unwrap());
        assert_eq!(u64::MAX, decoder(&uint64).unpack_u64().unwrap());
    }

    #[test]
    fn narrowing() {
        assert!(matches!(decoder(&[code::UINT8, 200]).unpack_i8(), Err(DecodeError::IntegerOverflow(200))));
        assert_eq!(200, decoder(&[code::UINT8, 200]).unpack_u8().unwrap());
        assert!(matches!(decoder(&[code::INT16, 0xff, 0x7f]).unpack_i8(), Err(DecodeError::IntegerOverflow(-129))));
        assert!(matches!(decoder(&[code::UINT32, 0x00, 0x01, 0x00, 0x00]).unpack_u16(), Err(DecodeError::IntegerOverflow(65536))));
        assert!(matches!(decoder(&[0xa1, b'a']).unpack_i64(), Err(DecodeError::Format { expected: "Integer", .. })));
    }

    #[test]
    fn floats() {
        let mut buf = Vec::new();
        let mut e = Encoder::new(&mut buf);
        e.pack_f32(1.5).unwrap();
        e.pack_f64(-0.25).unwrap();
        let mut d = decoder(&buf);
        assert_eq!(1.5, d.unpack_f64().unwrap());
        assert_eq!(-0.25, d.unpack_f32().unwrap());
        assert!(matches!(decoder(&[0x01]).unpack_f64(), Err(DecodeError::Format { expected: "Float", byte: 0x01, .. })));
    }

    #[test]
    fn headers() {
        assert_eq!(3, decoder(&[0x83]).unpack_map_header().unwrap());
        assert_eq!(0x1234, decoder(&[code::MAP16, 0x12, 0x34]).unpack_map_header().unwrap());
        assert_eq!(15, decoder(&[0x9f]).unpack_array_header().unwrap());
        assert_eq!(65536, decoder(&[code::ARRAY32, 0x00, 0x01, 0x00, 0x00]).unpack_array_header().unwrap());
        assert_eq!(31, decoder(&[0xbf]).unpack_str_header().unwrap());
        assert_eq!(200, decoder(&[code::STR8, 200]).unpack_str_header().unwrap());
        assert_eq!(7, decoder(&[code::BIN8, 7]).unpack_bin_header().unwrap());
        assert!(decoder(&[code::NIL]).unpack_nil().is_ok());
        assert!(decoder(&[code::TRUE]).unpack_bool().unwrap());
        assert!(!decoder(&[code::FALSE]).unpack_bool().unwrap());
        assert!(matches!(decoder(&[0xa3]).unpack_bin_header(), Err(DecodeError::Format { expected: "Binary", format: Format::FixStr, .. })));
        assert!(matches!(decoder(&[0x93]).unpack_map_header(), Err(DecodeError::Format { expected: "Map", format: Format::FixArray, .. })));
    }

    #[test]
    fn extension_headers() {
        assert_eq!(ExtensionHeader::new(-1, 4), decoder(&[code::FIXEXT4, 0xff]).unpack_ext_header().unwrap());
        assert_eq!(ExtensionHeader::new(5, 3), decoder(&[code::EXT8, 3, 5]).unpack_ext_header().unwrap());
        assert_eq!(ExtensionHeader::new(5, 4), decoder(&[code::EXT8, 4, 5]).unpack_ext_header().unwrap());
        assert_eq!(ExtensionHeader::new(1, 256), decoder(&[code::EXT16, 0x01, 0x00, 1]).unpack_ext_header().unwrap());
        let (header, data) = decoder(&[code::FIXEXT2, 7, 0xaa, 0xbb]).unpack_ext().unwrap();
        assert_eq!(ExtensionHeader::new(7, 2), header);
        assert_eq!(vec![0xaa, 0xbb], data);
    }

    #[test]
    fn never_used() {
        let tag = [code::NEVER_USED];
        assert!(matches!(decoder(&tag).unpack_nil(), Err(DecodeError::Format { format: Format::NeverUsed, .. })));
        assert!(matches!(decoder(&tag).unpack_bool(), Err(DecodeError::Format { .. })));
        assert!(matches!(decoder(&tag).unpack_i64(), Err(DecodeError::Format { .. })));
        assert!(matches!(decoder(&tag).unpack_f64(), Err(DecodeError::Format { .. })));
        assert!(matches!(decoder(&tag).unpack_map_header(), Err(DecodeError::Format { .. })));
        assert!(matches!(decoder(&tag).unpack_array_header(), Err(DecodeError::Format { .. })));
        assert!(matches!(decoder(&tag).unpack_str_header(), Err(DecodeError::Format { .. })));
        assert!(matches!(decoder(&tag).unpack_bin_header(), Err(DecodeError::Format { .. })));
        assert!(matches!(decoder(&tag).unpack_ext_header(), Err(DecodeError::Format { .. })));
        assert!(matches!(decoder(&tag).unpack(), Err(DecodeError::Format { .. })));
        assert!(matches!(decoder(&tag).skip_value(1), Err(DecodeError::Format { .. })));
    }

    #[test]
    fn sign_bit_lengths() {
        assert!(matches!(decoder(&[code::STR32, 0x80, 0, 0, 0]).unpack_str_header(), Err(DecodeError::Size(0x80000000))));
        assert!(matches!(decoder(&[code::MAP32, 0xff, 0xff, 0xff, 0xff]).unpack_map_header(), Err(DecodeError::Size(0xffffffff))));
        assert_eq!(i32::MAX as u32, decoder(&[code::BIN32, 0x7f, 0xff, 0xff, 0xff]).unpack_bin_header().unwrap());
    }

    #[test]
    fn truncation() {
        assert!(matches!(decoder(&[code::INT32]).unpack_i32(), Err(DecodeError::Eof)));
        assert!(matches!(decoder(&[code::INT32, 0, 0]).unpack(), Err(DecodeError::Eof)));
        assert!(matches!(decoder(&[]).unpack(), Err(DecodeError::Eof)));
        assert!(matches!(decoder(&[0xa5, b'a']).unpack_string(), Err(DecodeError::Eof)));
        assert!(matches!(decoder(&[0x92, 0x01]).skip_value(1), Err(DecodeError::Eof)));
        // a huge announced payload does not get allocated before the source runs dry
        assert!(matches!(decoder(&[code::BIN32, 0x7f, 0xff, 0xff, 0xff, 1, 2, 3]).unpack(), Err(DecodeError::Eof)));
        assert!(matches!(decoder(&[code::ARRAY32, 0x7f, 0xff, 0xff, 0xff, 1]).unpack(), Err(DecodeError::Eof)));
    }

    #[test]
    fn skip() {
        let stream = [0x93, 0x01, 0x81, 0xa1, b'a', 0x02, 0xa5, b't', b'h', b'r', b'e', b'e'];
        let mut d = decoder(&stream);
        d.skip_value(1).unwrap();
        assert_eq!(stream.len(), d.position());
        assert!(!d.has_next().unwrap());

        let mut d = decoder(&[code::EXT8, 2, 9, 1, 2, code::FIXEXT1, 3, 0xee, code::FLOAT32, 0, 0, 0, 0, 0x07]);
        d.skip_value(3).unwrap();
        assert_eq!(7, d.unpack_i8().unwrap());
    }

    #[test]
    fn skip_past_the_end() {
        // a saturated counter runs into the end of input instead of wrapping
        let mut d = decoder(&[0x91, 0x01]);
        assert!(matches!(d.skip_value(u64::MAX), Err(DecodeError::Eof)));
        let mut d = decoder(&[code::MAP16, 0x00, 0x02, 0x01, 0x02, 0x03, 0x04]);
        let mut sink = Vec::new();
        assert!(matches!(d.read_value(u64::MAX - 1, &mut sink), Err(DecodeError::Eof)));
        assert_eq!(7, sink.len());
    }

    #[test]
    fn copy_through() {
        let stream = [0x82, 0xa1, b'k', code::MAP16, 0x00, 0x01, 0xc0, 0x90, 0x01, code::STR8, 2, b'h', b'i', 0x2a];
        let mut d = decoder(&stream);
        let mut sink = Vec::new();
        assert_eq!(13, d.read_value(1, &mut sink).unwrap());
        assert_eq!(&stream[..13], &sink[..]);
        assert_eq!(42, d.unpack_u8().unwrap());

        // the relayed bytes decode to the same value as the input
        let expected = Decoder::decode(&stream).unwrap().0;
        assert_eq!(expected, Decoder::decode(&sink).unwrap().0);
    }

    #[test]
    fn values() {
        let stream = [0x93, 0x01, 0x81, 0xa1, b'a', 0x02, 0xa5, b't', b'h', b'r', b'e', b'e'];
        let (value, len) = Decoder::decode(&stream).unwrap();
        assert_eq!(stream.len(), len);
        assert_eq!(Value::Array(vec![
            Value::Int(1),
            Value::Map(vec![(Value::from("a"), Value::Int(2))]),
            Value::from("three"),
        ]), value);
        let (value, _) = Decoder::decode(&[code::UINT64, 0x80, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(Value::UInt(1 << 63), value);
        let (value, _) = Decoder::decode(&[code::UINT64, 0, 0, 0, 0, 0, 0, 0, 1]).unwrap();
        assert_eq!(Value::Int(1), value);
        let (value, _) = Decoder::decode(&[code::FIXEXT1, 0x80, 0x01]).unwrap();
        assert_eq!(Value::Extension(-128, vec![1]), value);
    }

    #[test]
    fn materialization_policy() {
        let stream = [code::BIN8, 2, b'h', 0xff, 0xa2, b'o', b'k'];
        let options = DecodeOptions { bin_as_str: true, str_as_bin: true, ..DecodeOptions::default() };
        let mut d = Decoder::with_options(&stream[..], options);
        assert_eq!(Value::from("h\u{fffd}"), d.unpack().unwrap());
        assert_eq!(Value::Bin(b"ok".to_vec()), d.unpack().unwrap());

        let mut d = decoder(&stream);
        assert_eq!(Value::Bin(vec![b'h', 0xff]), d.unpack().unwrap());
        assert_eq!(Value::from("ok"), d.unpack().unwrap());

        assert!(matches!(decoder(&[0xa2, b'h', 0xff]).unpack(), Err(DecodeError::Utf8(_))));
        let options = DecodeOptions { str_as_bin: true, ..DecodeOptions::default() };
        assert_eq!(Value::Bin(vec![b'h', 0xff]), Decoder::with_options(&[0xa2, b'h', 0xff][..], options).unpack().unwrap());
    }

    #[test]
    fn limits() {
        let options = DecodeOptions { max_str_len: 3, max_bin_len: 1, ..DecodeOptions::default() };
        let mut d = Decoder::with_options(&[0xa4, b'a', b'b', b'c', b'd'][..], options);
        assert!(matches!(d.unpack(), Err(DecodeError::Limit { len: 4, max: 3 })));
        let mut d = Decoder::with_options(&[code::FIXEXT2, 1, 0, 0][..], options);
        assert!(matches!(d.unpack_ext(), Err(DecodeError::Limit { len: 2, max: 1 })));

        let mut nested = vec![0x91; 600];
        nested.push(code::NIL);
        assert!(matches!(decoder(&nested).unpack(), Err(DecodeError::Depth(512))));
        let options = DecodeOptions { max_depth: 600, ..DecodeOptions::default() };
        assert!(Decoder::with_options(&nested[..], options).unpack().is_ok());
        // skipping is iterative and needs no limit
        decoder(&nested).skip_value(1).unwrap();
    }

    #[test]
    fn typed_containers() {
        let mut d = decoder(&[0x92, 0x01, 0xc3, 0x81, 0x01, 0xa1, b'x']);
        assert_eq!(vec![Value::Int(1), Value::Bool(true)], d.unpack_array().unwrap());
        assert_eq!(vec![(Value::Int(1), Value::from("x"))], d.unpack_map().unwrap());
        assert_eq!(Ok("ü".to_owned()), decoder(&[0xa2, 0xc3, 0xbc]).unpack_string().map_err(|e| e.to_string()));
        assert_eq!(vec![1, 2], decoder(&[code::BIN8, 2, 1, 2]).unpack_bin().unwrap());
    }

    #[test]
    fn error_position() {
        let e = Decoder::decode(&[0x92, 0x01, code::NEVER_USED]).unwrap_err();
        assert_eq!(3, e.position());
        assert!(matches!(e.into_inner(), DecodeError::Format { byte: code::NEVER_USED, .. }));
    }

}
