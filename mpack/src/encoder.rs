//! Writes MessagePack into any `std::io::Write`. Every value is written with the smallest header able to
//! represent it. All functions return the amount of written bytes.
//!
//! Strings, binaries and extensions can either be written in one go (`pack_str`, `pack_bin`, `pack_ext`) or as a
//! header followed by one or more calls to `write_payload`, which allows streaming large payloads. Arrays and maps
//! are always written as a header followed by their elements.

use crate::error::EncodeError;
use crate::ext::ExtensionHeader;
use crate::format::code;
use crate::value::Value;
use std::io::Write;

/// The longest header with a fixed width is a tag followed by eight bytes
const SCRATCH_LEN: usize = 10;

/// Lengths and counts are limited to what a signed 32 bit field can carry so that the decoder accepts them
const MAX_LEN: usize = i32::MAX as usize;

pub struct Encoder<W: Write> {
    writer: W,
    scratch: [u8; SCRATCH_LEN],
    /// Number of completed top level values
    values: usize,
    /// Number of values still owed to open arrays and maps
    open: u64,
}

impl<W: Write> Encoder<W> {

    pub fn new(writer: W) -> Self {
        Self { writer, scratch: [0; SCRATCH_LEN], values: 0, open: 0 }
    }

    /// Encode a value to the given writer. The resulting `usize` is the amount of bytes that got written.
    pub fn encode(value: &Value, writer: W) -> Result<usize, EncodeError> {
        Self::new(writer).pack_value(value)
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn flush(&mut self) -> Result<(), EncodeError> {
        self.writer.flush()?;
        Ok(())
    }

    /// The number of top level values whose headers and elements have been written completely. For instance,
    /// packing `22, ["a", {"b": 1}, 66], 88` yields three.
    pub fn value_count(&self) -> usize {
        self.values
    }

    pub fn pack_nil(&mut self) -> Result<usize, EncodeError> {
        self.tag(code::NIL, 0)
    }

    pub fn pack_bool(&mut self, v: bool) -> Result<usize, EncodeError> {
        self.tag(if v { code::TRUE } else { code::FALSE }, 0)
    }

    pub fn pack_i8(&mut self, v: i8) -> Result<usize, EncodeError> {
        self.pack_i64(i64::from(v))
    }

    pub fn pack_i16(&mut self, v: i16) -> Result<usize, EncodeError> {
        self.pack_i64(i64::from(v))
    }

    pub fn pack_i32(&mut self, v: i32) -> Result<usize, EncodeError> {
        self.pack_i64(i64::from(v))
    }

    /// Writes a signed integer with the narrowest format able to hold it. Non-negative values always use the
    /// unsigned formats.
    pub fn pack_i64(&mut self, v: i64) -> Result<usize, EncodeError> {
        let c = if v < -(1 << 5) {
            if v < -(1 << 15) {
                if v < -(1 << 31) {
                    self.tag_u64(code::INT64, v as u64)?
                } else {
                    self.tag_u32(code::INT32, v as i32 as u32)?
                }
            } else if v < -(1 << 7) {
                self.tag_u16(code::INT16, v as i16 as u16)?
            } else {
                self.tag_u8(code::INT8, v as i8 as u8)?
            }
        } else if v < (1 << 7) {
            // positive and negative fixint share the two's complement representation of the value
            self.byte(v as i8 as u8)?
        } else if v < (1 << 8) {
            self.tag_u8(code::UINT8, v as u8)?
        } else if v < (1 << 16) {
            self.tag_u16(code::UINT16, v as u16)?
        } else if v < (1 << 32) {
            self.tag_u32(code::UINT32, v as u32)?
        } else {
            self.tag_u64(code::UINT64, v as u64)?
        };
        self.count(0);
        Ok(c)
    }

    pub fn pack_u8(&mut self, v: u8) -> Result<usize, EncodeError> {
        self.pack_i64(i64::from(v))
    }

    pub fn pack_u16(&mut self, v: u16) -> Result<usize, EncodeError> {
        self.pack_i64(i64::from(v))
    }

    pub fn pack_u32(&mut self, v: u32) -> Result<usize, EncodeError> {
        self.pack_i64(i64::from(v))
    }

    /// Magnitudes beyond `i64::MAX` are written as UInt64, everything else like `pack_i64` would
    pub fn pack_u64(&mut self, v: u64) -> Result<usize, EncodeError> {
        match i64::try_from(v) {
            Ok(i) => self.pack_i64(i),
            Err(_) => {
                let c = self.tag_u64(code::UINT64, v)?;
                self.count(0);
                Ok(c)
            }
        }
    }

    /// Writes any integer within `i64::MIN..=u64::MAX`.
    pub fn pack_big_integer(&mut self, v: i128) -> Result<usize, EncodeError> {
        if let Ok(i) = i64::try_from(v) {
            self.pack_i64(i)
        } else if let Ok(u) = u64::try_from(v) {
            self.pack_u64(u)
        } else {
            Err(EncodeError::NotRepresentable(v))
        }
    }

    pub fn pack_f32(&mut self, v: f32) -> Result<usize, EncodeError> {
        let c = self.tag_u32(code::FLOAT32, v.to_bits())?;
        self.count(0);
        Ok(c)
    }

    pub fn pack_f64(&mut self, v: f64) -> Result<usize, EncodeError> {
        let c = self.tag_u64(code::FLOAT64, v.to_bits())?;
        self.count(0);
        Ok(c)
    }

    /// Writes the header of a string whose UTF-8 encoding is `len` bytes long. The payload has to follow by means of
    /// `write_payload`.
    pub fn pack_str_header(&mut self, len: usize) -> Result<usize, EncodeError> {
        let len = Self::check_len(len)?;
        let c = if len < (1 << 5) {
            self.byte(code::FIXSTR_PREFIX | len as u8)?
        } else if len < (1 << 8) {
            self.tag_u8(code::STR8, len as u8)?
        } else if len < (1 << 16) {
            self.tag_u16(code::STR16, len as u16)?
        } else {
            self.tag_u32(code::STR32, len)?
        };
        self.count(0);
        Ok(c)
    }

    pub fn pack_str(&mut self, v: &str) -> Result<usize, EncodeError> {
        let c = self.pack_str_header(v.len())?;
        Ok(c + self.write_payload(v.as_bytes())?)
    }

    pub fn pack_str_or_nil(&mut self, v: Option<&str>) -> Result<usize, EncodeError> {
        match v {
            Some(v) => self.pack_str(v),
            None => self.pack_nil(),
        }
    }

    /// Writes the header of a binary of `len` bytes. The payload has to follow by means of `write_payload`.
    pub fn pack_bin_header(&mut self, len: usize) -> Result<usize, EncodeError> {
        let len = Self::check_len(len)?;
        let c = if len < (1 << 8) {
            self.tag_u8(code::BIN8, len as u8)?
        } else if len < (1 << 16) {
            self.tag_u16(code::BIN16, len as u16)?
        } else {
            self.tag_u32(code::BIN32, len)?
        };
        self.count(0);
        Ok(c)
    }

    pub fn pack_bin(&mut self, v: &[u8]) -> Result<usize, EncodeError> {
        let c = self.pack_bin_header(v.len())?;
        Ok(c + self.write_payload(v)?)
    }

    pub fn pack_bin_or_nil(&mut self, v: Option<&[u8]>) -> Result<usize, EncodeError> {
        match v {
            Some(v) => self.pack_bin(v),
            None => self.pack_nil(),
        }
    }

    /// Writes the header of an array. Exactly `len` values have to follow.
    pub fn pack_array_header(&mut self, len: usize) -> Result<usize, EncodeError> {
        let len = Self::check_len(len)?;
        let c = if len < (1 << 4) {
            self.byte(code::FIXARRAY_PREFIX | len as u8)?
        } else if len < (1 << 16) {
            self.tag_u16(code::ARRAY16, len as u16)?
        } else {
            self.tag_u32(code::ARRAY32, len)?
        };
        self.count(u64::from(len));
        Ok(c)
    }

    /// Writes the header of a map. Exactly `len` key value pairs have to follow, keys first.
    pub fn pack_map_header(&mut self, len: usize) -> Result<usize, EncodeError> {
        let len = Self::check_len(len)?;
        let c = if len < (1 << 4) {
            self.byte(code::FIXMAP_PREFIX | len as u8)?
        } else if len < (1 << 16) {
            self.tag_u16(code::MAP16, len as u16)?
        } else {
            self.tag_u32(code::MAP32, len)?
        };
        self.count(u64::from(len) * 2);
        Ok(c)
    }

    /// Writes the header of an extension. Data lengths of 1, 2, 4, 8 and 16 bytes use the FixExt formats which
    /// leave out the length field.
    pub fn pack_ext_header(&mut self, header: &ExtensionHeader) -> Result<usize, EncodeError> {
        self.ext_header(header, true)
    }

    /// Like `pack_ext_header` but always writes an explicit length field.
    pub fn pack_ext_header_unfixed(&mut self, header: &ExtensionHeader) -> Result<usize, EncodeError> {
        self.ext_header(header, false)
    }

    pub fn pack_ext(&mut self, ext_type: i8, data: &[u8]) -> Result<usize, EncodeError> {
        let len = Self::check_len(data.len())?;
        let c = self.pack_ext_header(&ExtensionHeader::new(ext_type, len))?;
        Ok(c + self.write_payload(data)?)
    }

    /// Writes raw bytes, usually the payload announced by the last string, binary or extension header.
    pub fn write_payload(&mut self, payload: &[u8]) -> Result<usize, EncodeError> {
        self.writer.write_all(payload)?;
        Ok(payload.len())
    }

    /// Writes a whole value including all of its elements.
    pub fn pack_value(&mut self, value: &Value) -> Result<usize, EncodeError> {
        match value {
            Value::Nil               => self.pack_nil(),
            Value::Bool(v)           => self.pack_bool(*v),
            Value::Int(v)            => self.pack_i64(*v),
            Value::UInt(v)           => self.pack_u64(*v),
            Value::Float(v)          => self.pack_f64(*v),
            Value::Str(v)            => self.pack_str(v),
            Value::Bin(v)            => self.pack_bin(v),
            Value::Extension(t, v)   => self.pack_ext(*t, v),
            Value::Array(inner) => {
                let mut c = self.pack_array_header(inner.len())?;
                for value in inner.iter() {
                    c += self.pack_value(value)?;
                }
                Ok(c)
            },
            Value::Map(inner) => {
                let mut c = self.pack_map_header(inner.len())?;
                for (key, val) in inner.iter() {
                    c += self.pack_value(key)?;
                    c += self.pack_value(val)?;
                }
                Ok(c)
            },
        }
    }

    fn ext_header(&mut self, header: &ExtensionHeader, fixed: bool) -> Result<usize, EncodeError> {
        let len = Self::check_len(header.len() as usize)?;
        let ext_type = header.ext_type() as u8;
        let fix_code = match len {
            1  => Some(code::FIXEXT1),
            2  => Some(code::FIXEXT2),
            4  => Some(code::FIXEXT4),
            8  => Some(code::FIXEXT8),
            16 => Some(code::FIXEXT16),
            _  => None,
        };
        let c = match fix_code {
            Some(tag) if fixed => self.tag_u8(tag, ext_type)?,
            _ => {
                let width = if len < (1 << 8) {
                    self.scratch[0] = code::EXT8;
                    self.scratch[1] = len as u8;
                    1
                } else if len < (1 << 16) {
                    self.scratch[0] = code::EXT16;
                    self.scratch[1..3].copy_from_slice(&(len as u16).to_be_bytes());
                    2
                } else {
                    self.scratch[0] = code::EXT32;
                    self.scratch[1..5].copy_from_slice(&len.to_be_bytes());
                    4
                };
                self.scratch[1 + width] = ext_type;
                self.writer.write_all(&self.scratch[..2 + width])?;
                2 + width
            }
        };
        self.count(0);
        Ok(c)
    }

    #[inline]
    fn check_len(len: usize) -> Result<u32, EncodeError> {
        if len > MAX_LEN {
            Err(EncodeError::Length(len))
        } else {
            Ok(len as u32)
        }
    }

    /// Keeps track of completed top level values. `children` is the number of values the last header announced.
    fn count(&mut self, children: u64) {
        if self.open == 0 {
            if children == 0 {
                self.values += 1;
            } else {
                self.open = children;
            }
        } else {
            self.open = self.open + children - 1;
            if self.open == 0 {
                self.values += 1;
            }
        }
    }

    /// Writes a single tag byte and counts it as a complete value
    fn tag(&mut self, b: u8, children: u64) -> Result<usize, EncodeError> {
        let c = self.byte(b)?;
        self.count(children);
        Ok(c)
    }

    #[inline]
    fn byte(&mut self, b: u8) -> Result<usize, EncodeError> {
        self.writer.write_all(&[b])?;
        Ok(1)
    }

    #[inline]
    fn tag_u8(&mut self, tag: u8, v: u8) -> Result<usize, EncodeError> {
        self.scratch[0] = tag;
        self.scratch[1] = v;
        self.writer.write_all(&self.scratch[..2])?;
        Ok(2)
    }

    #[inline]
    fn tag_u16(&mut self, tag: u8, v: u16) -> Result<usize, EncodeError> {
        self.scratch[0] = tag;
        self.scratch[1..3].copy_from_slice(&v.to_be_bytes());
        self.writer.write_all(&self.scratch[..3])?;
        Ok(3)
    }

    #[inline]
    fn tag_u32(&mut self, tag: u8, v: u32) -> Result<usize, EncodeError> {
        self.scratch[0] = tag;
        self.scratch[1..5].copy_from_slice(&v.to_be_bytes());
        self.writer.write_all(&self.scratch[..5])?;
        Ok(5)
    }

    #[inline]
    fn tag_u64(&mut self, tag: u8, v: u64) -> Result<usize, EncodeError> {
        self.scratch[0] = tag;
        self.scratch[1..9].copy_from_slice(&v.to_be_bytes());
        self.writer.write_all(&self.scratch[..9])?;
        Ok(9)
    }

}

#[cfg(test)]
mod tests {
    use super::Encoder;
    use crate::error::EncodeError;
    use crate::ext::ExtensionHeader;
    use crate::format::{code, Format};
    use crate::value::Value;

    fn packed<F: FnOnce(&mut Encoder<&mut Vec<u8>>) -> Result<usize, EncodeError>>(f: F) -> Vec<u8> {
        let mut buf = Vec::new();
        let c = f(&mut Encoder::new(&mut buf)).unwrap();
        assert_eq!(c, buf.len());
        buf
    }

    #[test]
    fn integer_ladder() {
        let cases: &[(i64, Format, usize)] = &[
            (i64::MIN, Format::Int64, 9),
            (-(1 << 31) - 1, Format::Int64, 9),
            (-(1 << 31), Format::Int32, 5),
            (-(1 << 15) - 1, Format::Int32, 5),
            (-(1 << 15), Format::Int16, 3),
            (-129, Format::Int16, 3),
            (-128, Format::Int8, 2),
            (-33, Format::Int8, 2),
            (-32, Format::NegFixInt, 1),
            (-1, Format::NegFixInt, 1),
            (0, Format::PosFixInt, 1),
            (127, Format::PosFixInt, 1),
            (128, Format::UInt8, 2),
            (255, Format::UInt8, 2),
            (256, Format::UInt16, 3),
            (65535, Format::UInt16, 3),
            (65536, Format::UInt32, 5),
            (4294967295, Format::UInt32, 5),
            (4294967296, Format::UInt64, 9),
            (i64::MAX, Format::UInt64, 9),
        ];
        for &(v, format, len) in cases {
            let buf = packed(|e| e.pack_i64(v));
            assert_eq!(format, Format::from_byte(buf[0]), "{}", v);
            assert_eq!(len, buf.len(), "{}", v);
        }
    }

    #[test]
    fn narrow_entry_points() {
        assert_eq!(vec![0xd0, 0x80], packed(|e| e.pack_i8(-128)));
        assert_eq!(vec![0xe0], packed(|e| e.pack_i8(-32)));
        assert_eq!(vec![0x7f], packed(|e| e.pack_i8(127)));
        assert_eq!(vec![0xcd, 0x7f, 0xff], packed(|e| e.pack_i16(i16::MAX)));
        assert_eq!(vec![0xd1, 0x80, 0x00], packed(|e| e.pack_i16(i16::MIN)));
        assert_eq!(vec![0xd2, 0x80, 0x00, 0x00, 0x00], packed(|e| e.pack_i32(i32::MIN)));
        assert_eq!(vec![0xce, 0xff, 0xff, 0xff, 0xff], packed(|e| e.pack_u32(u32::MAX)));
        assert_eq!(vec![0xcc, 0xff], packed(|e| e.pack_u8(u8::MAX)));
    }

    #[test]
    fn unsigned_64() {
        assert_eq!(vec![0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff], packed(|e| e.pack_u64(u64::MAX)));
        assert_eq!(vec![0xcf, 0x80, 0, 0, 0, 0, 0, 0, 0], packed(|e| e.pack_u64(1 << 63)));
        assert_eq!(vec![0x05], packed(|e| e.pack_u64(5)));
    }

    #[test]
    fn big_integer() {
        assert_eq!(vec![0xd3, 0x80, 0, 0, 0, 0, 0, 0, 0], packed(|e| e.pack_big_integer(i128::from(i64::MIN))));
        assert_eq!(vec![0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff], packed(|e| e.pack_big_integer(i128::from(u64::MAX))));
        let mut buf = Vec::new();
        let too_big = i128::from(u64::MAX) + 1;
        assert!(matches!(Encoder::new(&mut buf).pack_big_integer(too_big), Err(EncodeError::NotRepresentable(v)) if v == too_big));
        let too_small = i128::from(i64::MIN) - 1;
        assert!(matches!(Encoder::new(&mut buf).pack_big_integer(too_small), Err(EncodeError::NotRepresentable(_))));
        assert!(buf.is_empty());
    }

    #[test]
    fn floats() {
        assert_eq!(vec![0xca, 0x40, 0x49, 0x0f, 0xdb], packed(|e| e.pack_f32(std::f32::consts::PI)));
        assert_eq!(vec![0xcb, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0], packed(|e| e.pack_f64(1.0)));
    }

    #[test]
    fn string_tiers() {
        for &(len, format, header) in &[
            (0usize, Format::FixStr, 1usize),
            (31, Format::FixStr, 1),
            (32, Format::Str8, 2),
            (255, Format::Str8, 2),
            (256, Format::Str16, 3),
            (65535, Format::Str16, 3),
            (65536, Format::Str32, 5),
        ] {
            let s = "x".repeat(len);
            let buf = packed(|e| e.pack_str(&s));
            assert_eq!(format, Format::from_byte(buf[0]), "{}", len);
            assert_eq!(header + len, buf.len());
            assert_eq!(s.as_bytes(), &buf[header..]);
        }
        assert_eq!(vec![0xa0], packed(|e| e.pack_str("")));
        assert_eq!(vec![0xa2, 0xc3, 0xbc], packed(|e| e.pack_str("ü")));
    }

    #[test]
    fn binary_tiers() {
        assert_eq!(vec![code::BIN8, 0], packed(|e| e.pack_bin(&[])));
        assert_eq!(vec![code::BIN8, 3, 1, 2, 3], packed(|e| e.pack_bin(&[1, 2, 3])));
        assert_eq!(vec![code::BIN16, 0x01, 0x00], packed(|e| e.pack_bin_header(256)));
        assert_eq!(vec![code::BIN32, 0x00, 0x01, 0x00, 0x00], packed(|e| e.pack_bin_header(65536)));
    }

    #[test]
    fn container_tiers() {
        assert_eq!(vec![0x90], packed(|e| e.pack_array_header(0)));
        assert_eq!(vec![0x9f], packed(|e| e.pack_array_header(15)));
        assert_eq!(vec![code::ARRAY16, 0x00, 0x10], packed(|e| e.pack_array_header(16)));
        assert_eq!(vec![code::ARRAY32, 0x00, 0x01, 0x00, 0x00], packed(|e| e.pack_array_header(65536)));
        assert_eq!(vec![0x8f], packed(|e| e.pack_map_header(15)));
        assert_eq!(vec![code::MAP16, 0xff, 0xff], packed(|e| e.pack_map_header(65535)));
        assert_eq!(vec![code::MAP32, 0x00, 0x01, 0x00, 0x00], packed(|e| e.pack_map_header(65536)));
    }

    #[test]
    fn oversized_lengths() {
        let mut buf = Vec::new();
        let mut encoder = Encoder::new(&mut buf);
        let len = i32::MAX as usize + 1;
        assert!(matches!(encoder.pack_array_header(len), Err(EncodeError::Length(l)) if l == len));
        assert!(matches!(encoder.pack_map_header(len), Err(EncodeError::Length(_))));
        assert!(matches!(encoder.pack_str_header(len), Err(EncodeError::Length(_))));
        assert!(matches!(encoder.pack_bin_header(len), Err(EncodeError::Length(_))));
        assert!(matches!(encoder.pack_ext_header(&ExtensionHeader::new(1, u32::MAX)), Err(EncodeError::Length(_))));
        assert!(matches!(encoder.pack_array_header(i32::MAX as usize), Ok(5)));
    }

    #[test]
    fn extension_shortcut() {
        assert_eq!(vec![code::FIXEXT1, 0x05], packed(|e| e.pack_ext_header(&ExtensionHeader::new(5, 1))));
        assert_eq!(vec![code::FIXEXT4, 0x05], packed(|e| e.pack_ext_header(&ExtensionHeader::new(5, 4))));
        assert_eq!(vec![code::FIXEXT16, 0xff], packed(|e| e.pack_ext_header(&ExtensionHeader::new(-1, 16))));
        assert_eq!(vec![code::EXT8, 0x03, 0x05], packed(|e| e.pack_ext_header(&ExtensionHeader::new(5, 3))));
        assert_eq!(vec![code::EXT8, 0x00, 0x05], packed(|e| e.pack_ext_header(&ExtensionHeader::new(5, 0))));
        assert_eq!(vec![code::EXT8, 0x04, 0x05], packed(|e| e.pack_ext_header_unfixed(&ExtensionHeader::new(5, 4))));
        assert_eq!(vec![code::EXT16, 0x01, 0x00, 0x05], packed(|e| e.pack_ext_header(&ExtensionHeader::new(5, 256))));
        assert_eq!(vec![code::EXT32, 0x00, 0x01, 0x00, 0x00, 0x05], packed(|e| e.pack_ext_header(&ExtensionHeader::new(5, 65536))));
        assert_eq!(vec![code::FIXEXT2, 0x07, 0xaa, 0xbb], packed(|e| e.pack_ext(7, &[0xaa, 0xbb])));
    }

    #[test]
    fn or_nil() {
        assert_eq!(vec![code::NIL], packed(|e| e.pack_str_or_nil(None)));
        assert_eq!(vec![0xa1, b'a'], packed(|e| e.pack_str_or_nil(Some("a"))));
        assert_eq!(vec![code::NIL], packed(|e| e.pack_bin_or_nil(None)));
        assert_eq!(vec![code::BIN8, 1, 9], packed(|e| e.pack_bin_or_nil(Some(&[9]))));
    }

    #[test]
    fn values() {
        let value = Value::Array(vec![
            Value::Int(1),
            Value::Map(vec![(Value::from("a"), Value::Int(2))]),
            Value::from("three"),
        ]);
        let buf = packed(|e| e.pack_value(&value));
        assert_eq!(vec![0x93, 0x01, 0x81, 0xa1, b'a', 0x02, 0xa5, b't', b'h', b'r', b'e', b'e'], buf);
        let mut other = Vec::new();
        assert_eq!(buf.len(), Encoder::encode(&value, &mut other).unwrap());
        assert_eq!(buf, other);
    }

    #[test]
    fn counts_top_level_values() {
        let mut buf = Vec::new();
        let mut encoder = Encoder::new(&mut buf);
        encoder.pack_i32(22).unwrap();
        assert_eq!(1, encoder.value_count());
        encoder.pack_array_header(3).unwrap();
        encoder.pack_str("fang").unwrap();
        encoder.pack_map_header(1).unwrap();
        encoder.pack_str("ss").unwrap();
        assert_eq!(1, encoder.value_count());
        encoder.pack_i32(22).unwrap();
        encoder.pack_i32(66).unwrap();
        assert_eq!(2, encoder.value_count());
        encoder.pack_array_header(0).unwrap();
        assert_eq!(3, encoder.value_count());
        encoder.pack_value(&Value::Array(vec![Value::Int(6), Value::Int(8)])).unwrap();
        assert_eq!(4, encoder.value_count());
    }

}
