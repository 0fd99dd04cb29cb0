//! Conveniently serialize and deserialize your Rust data structures into the MessagePack wire format.
//!
//! # Data model
//!
//! MessagePack has no notion of structs or enums, so they are mapped onto its maps and strings:
//!
//! * structs become maps keyed by their field names,
//! * unit variants become the name of the variant as a string,
//! * newtype, tuple and struct variants become a map with a single pair, the name of the variant being the key and
//!   its payload the value.
//!
//! Byte slices are written as MessagePack binaries when serialized with the help of `serde_bytes`, otherwise serde
//! treats them as sequences of integers. Extension values have no counterpart in serde's data model and are rejected
//! during deserialization.
//!
//! # Examples
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! pub enum Species {
//!     PrionailurusViverrinus,
//!     Domestic(bool),
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! pub struct Cat {
//!     name: String,
//!     species: Species,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Message {
//!     version: u32,
//!     cats: Vec<Cat>,
//! }
//!
//! let msg = Message {
//!     version: 1,
//!     cats: vec![
//!         Cat { name: "Jessica".to_string(), species: Species::PrionailurusViverrinus },
//!         Cat { name: "Wantan".to_string(), species: Species::Domestic(true) },
//!     ],
//! };
//!
//! let bytes = mpack_serde::to_bytes(&msg).unwrap();
//! assert_eq!(bytes.len(), 93);
//! assert_eq!(bytes, [
//!   0x82,                                                   // FixMap with 2 pairs
//!     0xa7,                                                 // FixStr of length 7
//!       0x76, 0x65, 0x72, 0x73, 0x69, 0x6f, 0x6e,           // 'version'
//!     0x01,                                                 // positive fixint 1
//!     0xa4,                                                 // FixStr of length 4
//!       0x63, 0x61, 0x74, 0x73,                             // 'cats'
//!     0x92,                                                 // FixArray with 2 elements
//!       0x82,                                               // FixMap with 2 pairs - this is the first cat
//!         0xa4,                                             // FixStr of length 4
//!           0x6e, 0x61, 0x6d, 0x65,                         // 'name'
//!         0xa7,                                             // FixStr of length 7
//!           0x4a, 0x65, 0x73, 0x73, 0x69, 0x63, 0x61,       // 'Jessica'
//!         0xa7,                                             // FixStr of length 7
//!           0x73, 0x70, 0x65, 0x63, 0x69, 0x65, 0x73,       // 'species'
//!         0xb6,                                             // FixStr of length 22, a unit variant
//!           0x50, 0x72, 0x69, 0x6f, 0x6e, 0x61, 0x69, 0x6c, // 'PrionailurusViverrinus'
//!           0x75, 0x72, 0x75, 0x73, 0x56, 0x69, 0x76, 0x65,
//!           0x72, 0x72, 0x69, 0x6e, 0x75, 0x73,
//!       0x82,                                               // FixMap with 2 pairs - this is the second cat
//!         0xa4,                                             // FixStr of length 4
//!           0x6e, 0x61, 0x6d, 0x65,                         // 'name'
//!         0xa6,                                             // FixStr of length 6
//!           0x57, 0x61, 0x6e, 0x74, 0x61, 0x6e,             // 'Wantan'
//!         0xa7,                                             // FixStr of length 7
//!           0x73, 0x70, 0x65, 0x63, 0x69, 0x65, 0x73,       // 'species'
//!         0x81,                                             // FixMap with 1 pair, a newtype variant
//!           0xa8,                                           // FixStr of length 8
//!             0x44, 0x6f, 0x6d, 0x65, 0x73, 0x74, 0x69, 0x63, // 'Domestic'
//!           0xc3,                                           // true
//! ]);
//!
//! let deserialized: Message = mpack_serde::from_bytes(&bytes).unwrap();
//! assert_eq!(msg, deserialized);
//! ```

mod de;
mod error;
mod ser;

pub use de::{from_bytes, from_reader, Deserializer};
pub use error::{DeserializationError, Error, Result};
pub use ser::{to_bytes, to_writer, Serializer};
