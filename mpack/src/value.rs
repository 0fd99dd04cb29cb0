//! The atom of MessagePack is the `Value`. Every value on wire is a header, possibly followed by a payload or by
//! further values in the case of arrays and maps.

use crate::format::FamilyType;

/// The possible values according to the MessagePack data model.
///
/// Unsigned integers only use `Value::UInt` if they exceed `i64::MAX`, everything else is a `Value::Int`. The
/// conversions from Rust's integer types and the decoder both follow this rule, so that a value compares equal to
/// itself after a round trip regardless of the wire format it took.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bin(Vec<u8>),
    Array(Vec<Value>),
    /// Pairs in wire order. Duplicate keys are kept as they are.
    Map(Vec<(Value, Value)>),
    Extension(i8, Vec<u8>),
}

impl Value {

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil          => "nil",
            Self::Bool(_)      => "boolean",
            Self::Int(_)       => "integer",
            Self::UInt(_)      => "integer",
            Self::Float(_)     => "float",
            Self::Str(_)       => "string",
            Self::Bin(_)       => "binary",
            Self::Array(_)     => "array",
            Self::Map(_)       => "map",
            Self::Extension(..) => "extension",
        }
    }

    pub fn family(&self) -> FamilyType {
        match self {
            Self::Nil          => FamilyType::Nil,
            Self::Bool(_)      => FamilyType::Boolean,
            Self::Int(_)       => FamilyType::Integer,
            Self::UInt(_)      => FamilyType::Integer,
            Self::Float(_)     => FamilyType::Float,
            Self::Str(_)       => FamilyType::String,
            Self::Bin(_)       => FamilyType::Binary,
            Self::Array(_)     => FamilyType::Array,
            Self::Map(_)       => FamilyType::Map,
            Self::Extension(..) => FamilyType::Extension,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::Int(v) if v >= 0 => Some(v as u64),
            Self::UInt(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bin(v) => Some(v),
            Self::Str(v) => Some(v.as_bytes()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Looks up the last pair whose key is the given string
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.iter().rev().find(|(k, _)| k.as_str() == Some(key)).map(|(_, v)| v)
    }

    fn escape(v: &str) -> String {
        v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
    }

    fn hex(f: &mut std::fmt::Formatter<'_>, bytes: &[u8]) -> std::fmt::Result {
        for b in bytes {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }

}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil          => f.write_str("nil"),
            Value::Bool(true)   => f.write_str("true"),
            Value::Bool(false)  => f.write_str("false"),
            Value::Int(v)       => write!(f, "{}", v),
            Value::UInt(v)      => write!(f, "{}", v),
            Value::Float(v)     => write!(f, "{:?}", v),
            Value::Str(v)       => write!(f, "\"{}\"", Self::escape(v)),
            Value::Bin(v)       => {
                f.write_str("bin(")?;
                Self::hex(f, v)?;
                f.write_str(")")
            },
            Value::Array(v)     => {
                f.write_str("[")?;
                for (i, e) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                f.write_str("]")
            },
            Value::Map(v)       => {
                f.write_str("{")?;
                for (i, (k, e)) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, e)?;
                }
                f.write_str("}")
            },
            Value::Extension(t, v) => {
                write!(f, "ext({}, ", t)?;
                Self::hex(f, v)?;
                f.write_str(")")
            },
        }
    }
}

macro_rules! from_lossless {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

from_lossless!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::UInt(v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bin(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bin(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Vec<(Value, Value)>> for Value {
    fn from(v: Vec<(Value, Value)>) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Nil,
        }
    }
}
