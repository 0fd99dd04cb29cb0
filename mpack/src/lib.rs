//! An implementation of the MessagePack wire format.
//!
//! All encoding functions take `&mut self` and return the amount of written bytes. The decoder keeps track of the
//! number of consumed bytes, which `Decoder::decode` returns alongside the value.
//!
//! # A note on lengths
//!
//! MessagePack nominally allows lengths and counts of up to `2^32 - 1`. This crate caps them at `2^31 - 1`: the
//! decoder rejects 32 bit length fields with the most significant bit set with a `DecodeError::Size`, and the encoder
//! refuses to write such lengths with an `EncodeError::Length`, so that it never produces a stream it would not
//! accept itself.
//!
//! # A note on integers
//!
//! The decoder reads every integer format into an `i128` first and only then narrows it to the requested type, so a
//! UInt32 of `0xffffffff` is `4294967295` and never `-1`. Narrowing never truncates: values that do not fit raise a
//! `DecodeError::IntegerOverflow` carrying the value that was actually on the wire.
//!
//! # A note on Maps
//!
//! The variant `Value::Map` uses a `Vec` of key-value pairs because MessagePack maps may contain keys of any type,
//! including floats, and may even contain duplicate keys. Both are preserved as they are.
//!
//! # Examples
//!
//! ```
//! use mpack::*;
//!
//! let mut buf = Vec::new();
//! let value = Value::Map(vec![(Value::from("key"), Value::from("value"))]);
//! Encoder::encode(&value, &mut buf).unwrap();
//! assert_eq!(buf, [
//!     0x81, // FixMap with one pair
//!     0xa3, // FixStr of length 3
//!     0x6b, // 'k'
//!     0x65, // 'e'
//!     0x79, // 'y'
//!     0xa5, // FixStr of length 5
//!     0x76, // 'v'
//!     0x61, // 'a'
//!     0x6c, // 'l'
//!     0x75, // 'u',
//!     0x65, // 'e'
//! ]);
//! let decoded = Decoder::decode(&buf).unwrap();
//! assert_eq!(value, decoded.0);
//! assert_eq!(11, decoded.1);
//! ```
//!
//! Large documents can be streamed with the header functions:
//!
//! ```
//! use mpack::*;
//!
//! let mut encoder = Encoder::new(Vec::new());
//! encoder.pack_array_header(2).unwrap();
//! encoder.pack_bin_header(6).unwrap();
//! encoder.write_payload(b"abc").unwrap();
//! encoder.write_payload(b"def").unwrap();
//! encoder.pack_ext(1, &[0xff; 4]).unwrap();
//! let buf = encoder.into_inner();
//!
//! let mut decoder = Decoder::new(&buf[..]);
//! assert_eq!(2, decoder.unpack_array_header().unwrap());
//! assert_eq!(Format::Bin8, decoder.peek_format().unwrap());
//! decoder.skip_value(1).unwrap();
//! assert_eq!(ExtensionHeader::new(1, 4), decoder.unpack_ext_header().unwrap());
//! assert_eq!(vec![0xff; 4], decoder.read_payload(4).unwrap());
//! assert!(!decoder.has_next().unwrap());
//! ```

mod decoder;
mod encoder;
mod error;
mod ext;
mod format;
mod value;

pub use decoder::*;
pub use encoder::*;
pub use error::*;
pub use ext::*;
pub use format::{code, FamilyType, Format};
pub use value::*;
