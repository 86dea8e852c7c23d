//! Runtime support for types generated from Signet schemas.
//!
//! Every value on the wire starts with a one byte [`Kind`] tag, so a payload
//! can always be walked (and skipped) without knowing the schema it was
//! written with.
//!
//! ```
//! use signet_codec::{Decoder, Encoder, Kind};
//!
//! let mut buf = Vec::new();
//! Encoder::new(&mut buf)
//!     .encode_string("hello")
//!     .encode_slice(2, Kind::I32)
//!     .encode_i32(-1)
//!     .encode_i32(300);
//!
//! let mut decoder = Decoder::new(&buf);
//! assert_eq!(decoder.decode_string().unwrap(), "hello");
//! assert_eq!(decoder.decode_slice(Kind::I32).unwrap(), 2);
//! assert_eq!(decoder.decode_i32().unwrap(), -1);
//! assert_eq!(decoder.decode_i32().unwrap(), 300);
//! assert!(decoder.is_empty());
//! ```

pub mod buffer;
pub mod error;
pub mod kind;
pub mod map;
pub mod message;
pub mod validation;
pub mod value;

pub use buffer::{Decoder, Encoder};
pub use error::{DecodeError, ValidationError};
pub use kind::Kind;
pub use map::{Map, MapKey};
pub use message::{
    decode_message, decode_nested, decode_optional, encode_nested, encode_optional, Message,
};
pub use value::Value;
