use serde::de::{self, DeserializeOwned, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess, Visitor};
use mpack::{code, DecodeOptions, Decoder, FamilyType, Format};
use std::io::Read;

use crate::error::{DeserializationError, Error, Result};

/// Reads Rust data structures from MessagePack. The format is self-describing, so `deserialize_any` works and
/// untagged enums or `serde_json::Value`-like targets can be used.
pub struct Deserializer<R: Read> {
    decoder: Decoder<R>,
}

impl<R: Read> Deserializer<R> {
    pub fn new(reader: R) -> Self {
        Self { decoder: Decoder::new(reader) }
    }

    pub fn with_options(reader: R, options: DecodeOptions) -> Self {
        Self { decoder: Decoder::with_options(reader, options) }
    }

    /// The number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.decoder.position()
    }

    pub fn into_inner(self) -> R {
        self.decoder.into_inner()
    }
}

/// Deserializes a single value which has to occupy the whole buffer.
pub fn from_bytes<T: DeserializeOwned>(s: &[u8]) -> std::result::Result<T, DeserializationError> {
    let mut deserializer = Deserializer::new(s);
    let t = T::deserialize(&mut deserializer).map_err(|e| e.at(deserializer.position()))?;
    match deserializer.decoder.has_next() {
        Ok(false) => Ok(t),
        Ok(true) => Err(Error::Trailing.at(deserializer.position())),
        Err(e) => Err(Error::Decode(e).at(deserializer.position())),
    }
}

/// Deserializes the next value from a reader. Anything after it is left unread, so this can be called repeatedly to
/// consume a stream of values.
pub fn from_reader<R: Read, T: DeserializeOwned>(reader: R) -> std::result::Result<T, DeserializationError> {
    let mut deserializer = Deserializer::new(reader);
    T::deserialize(&mut deserializer).map_err(|e| e.at(deserializer.position()))
}

impl<R: Read> Deserializer<R> {

    #[inline]
    fn decode_int<T: TryFrom<i128>>(&mut self) -> Result<T> {
        let v = self.decoder.unpack_big_integer()?;
        T::try_from(v).map_err(|_| Error::Int(v))
    }

    #[inline]
    fn peek(&mut self) -> Result<Format> {
        Ok(self.decoder.peek_format()?)
    }

    /// Hands `len` array elements to the visitor, which has to take all of them.
    fn seq<'de, V: Visitor<'de>>(&mut self, len: u32, visitor: V) -> Result<V::Value> {
        let mut seq = SeqDeserializer::new(self, len);
        let value = visitor.visit_seq(&mut seq)?;
        if seq.remaining == 0 {
            Ok(value)
        } else {
            Err(de::Error::invalid_length(len as usize, &"fewer elements in array"))
        }
    }

    fn extension(&mut self) -> Error {
        match self.decoder.unpack_ext_header() {
            Ok(header) => Error::Extension(header.ext_type()),
            Err(e) => Error::Decode(e),
        }
    }

}

impl<'de, 'a, R: Read> de::Deserializer<'de> for &'a mut Deserializer<R> {
    type Error = Error;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let format = self.peek()?;
        match format.family() {
            FamilyType::Nil => {
                self.decoder.unpack_nil()?;
                visitor.visit_unit()
            },
            FamilyType::Boolean => visitor.visit_bool(self.decoder.unpack_bool()?),
            FamilyType::Integer => {
                let v = self.decoder.unpack_big_integer()?;
                if let Ok(i) = i64::try_from(v) {
                    visitor.visit_i64(i)
                } else if let Ok(u) = u64::try_from(v) {
                    visitor.visit_u64(u)
                } else {
                    Err(Error::Int(v))
                }
            },
            FamilyType::Float => match format {
                Format::Float32 => visitor.visit_f32(self.decoder.unpack_f32()?),
                _               => visitor.visit_f64(self.decoder.unpack_f64()?),
            },
            FamilyType::String => visitor.visit_string(self.decoder.unpack_string()?),
            FamilyType::Binary => visitor.visit_byte_buf(self.decoder.unpack_bin()?),
            FamilyType::Array => {
                let len = self.decoder.unpack_array_header()?;
                self.seq(len, visitor)
            },
            FamilyType::Map => {
                let len = self.decoder.unpack_map_header()?;
                visitor.visit_map(MapDeserializer::new(self, len))
            },
            FamilyType::Extension => Err(self.extension()),
            FamilyType::Undefined => Err(Error::UnexpectedFormat(&["any value"], format)),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_bool(self.decoder.unpack_bool()?)
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i8(self.decode_int()?)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i16(self.decode_int()?)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i32(self.decode_int()?)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i64(self.decode_int()?)
    }

    fn deserialize_i128<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i128(self.decode_int()?)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u8(self.decode_int()?)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u16(self.decode_int()?)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u32(self.decode_int()?)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u64(self.decode_int()?)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f32(self.decoder.unpack_f32()?)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f64(self.decoder.unpack_f64()?)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let v = self.decoder.unpack_string()?;
        let mut chars = v.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(de::Error::invalid_length(v.chars().count(), &"a single character")),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.decoder.unpack_string()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let format = self.peek()?;
        match format.family() {
            FamilyType::Binary => visitor.visit_byte_buf(self.decoder.unpack_bin()?),
            FamilyType::Array => {
                let len = self.decoder.unpack_array_header()?;
                let mut bytes = Vec::with_capacity((len as usize).min(4096));
                for _ in 0..len {
                    bytes.push(self.decode_int()?);
                }
                visitor.visit_byte_buf(bytes)
            },
            _ => Err(Error::UnexpectedFormat(&["Binary", "Array"], format)),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.decoder.peek_byte()? == code::NIL {
            self.decoder.unpack_nil()?;
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.decoder.unpack_nil()?;
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let len = self.decoder.unpack_array_header()?;
        self.seq(len, visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(self, _name: &'static str, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let len = self.decoder.unpack_map_header()?;
        visitor.visit_map(MapDeserializer::new(self, len))
    }

    /// Structs are written as maps but other encoders commonly write them as arrays of their fields, so both are
    /// accepted.
    fn deserialize_struct<V: Visitor<'de>>(self, _name: &'static str, _fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        let format = self.peek()?;
        match format.family() {
            FamilyType::Map => self.deserialize_map(visitor),
            FamilyType::Array => self.deserialize_seq(visitor),
            _ => Err(Error::UnexpectedFormat(&["Map", "Array"], format)),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(self, _name: &'static str, _variants: &'static [&'static str],  visitor: V) -> Result<V::Value> {
        let format = self.peek()?;
        match format.family() {
            FamilyType::String => visitor.visit_enum(self.decoder.unpack_string()?.into_deserializer()),
            FamilyType::Map => match self.decoder.unpack_map_header()? {
                1 => visitor.visit_enum(EnumDeserializer::new(self)),
                len => Err(de::Error::invalid_length(len as usize, &"a map with a single pair")),
            },
            _ => Err(Error::UnexpectedFormat(&["String", "Map"], format)),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let format = self.peek()?;
        match format.family() {
            FamilyType::Integer => visitor.visit_u64(self.decode_int()?),
            _ => self.deserialize_str(visitor),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.decoder.skip_value(1)?;
        visitor.visit_unit()
    }

}

struct MapDeserializer<'a, R: Read> {
    de: &'a mut Deserializer<R>,
    remaining: u32,
}

impl<'a, R: Read> MapDeserializer<'a, R> {
    fn new(de: &'a mut Deserializer<R>, remaining: u32) -> Self {
        Self { de, remaining }
    }
}

impl<'de, 'a, R: Read> MapAccess<'de> for MapDeserializer<'a, R> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        if self.remaining == 0 {
            Ok(None)
        } else {
            self.remaining -= 1;
            seed.deserialize(&mut *self.de).map(Some)
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(&mut *self.de)
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining as usize)
    }
}

struct EnumDeserializer<'a, R: Read> {
    de: &'a mut Deserializer<R>,
}

impl<'a, R: Read> EnumDeserializer<'a, R> {
    fn new(de: &'a mut Deserializer<R>) -> Self {
        Self { de }
    }
}

impl<'de, 'a, R: Read> EnumAccess<'de> for EnumDeserializer<'a, R> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let variant = seed.deserialize(&mut *self.de)?;
        Ok((variant, self))
    }
}

impl<'de, 'a, R: Read> VariantAccess<'de> for EnumDeserializer<'a, R> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        self.de.decoder.unpack_nil()?;
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_seq(self.de, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_struct(self.de, "", fields, visitor)
    }

}

struct SeqDeserializer<'a, R: Read> {
    de: &'a mut Deserializer<R>,
    remaining: u32,
}

impl<'a, R: Read> SeqDeserializer<'a, R> {
    fn new(de: &'a mut Deserializer<R>, remaining: u32) -> Self {
        Self { de, remaining }
    }
}

impl<'de, 'a, R: Read> SeqAccess<'de> for SeqDeserializer<'a, R> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        if self.remaining == 0 {
            Ok(None)
        } else {
            self.remaining -= 1;
            seed.deserialize(&mut *self.de).map(Some)
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining as usize)
    }

}
