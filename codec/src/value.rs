use std::fmt;

use crate::{
    buffer::{Decoder, Encoder, MAX_DEPTH},
    error::DecodeError,
    kind::Kind,
};

/// A dynamically decoded wire value.
///
/// Payloads are self-describing, so any buffer written by generated code can
/// be read back into a list of `Value`s without the schema that produced it.
/// Nested models show up as `Bytes` holding their own encoding.
#[derive(Clone, PartialEq)]
pub enum Value {
    Nil,
    Slice {
        kind:  Kind,
        items: Vec<Value>,
    },
    Map {
        key:     Kind,
        value:   Kind,
        entries: Vec<(Value, Value)>,
    },
    Bytes(Vec<u8>),
    String(String),
    Error(String),
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil         => Kind::Nil,
            Value::Slice { .. } => Kind::Slice,
            Value::Map { .. }  => Kind::Map,
            Value::Bytes(_)    => Kind::Bytes,
            Value::String(_)   => Kind::String,
            Value::Error(_)    => Kind::Error,
            Value::Bool(_)     => Kind::Bool,
            Value::U8(_)       => Kind::U8,
            Value::U16(_)      => Kind::U16,
            Value::U32(_)      => Kind::U32,
            Value::U64(_)      => Kind::U64,
            Value::I32(_)      => Kind::I32,
            Value::I64(_)      => Kind::I64,
            Value::F32(_)      => Kind::F32,
            Value::F64(_)      => Kind::F64,
        }
    }

    /// Reads one value of whatever kind comes next.
    pub fn decode(decoder: &mut Decoder<'_>) -> Result<Value, DecodeError> {
        Value::decode_at(decoder, 0)
    }

    /// Reads every value in `data`.
    pub fn decode_all(data: &[u8]) -> Result<Vec<Value>, DecodeError> {
        let mut decoder = Decoder::new(data);
        let mut values = Vec::new();
        while !decoder.is_empty() {
            values.push(Value::decode(&mut decoder)?);
        }
        Ok(values)
    }

    fn decode_at(decoder: &mut Decoder<'_>, depth: usize) -> Result<Value, DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::TooDeep(MAX_DEPTH));
        }

        let tag = decoder.peek_tag().ok_or(DecodeError::UnexpectedEof)?;
        let kind = Kind::from_u8(tag).ok_or(DecodeError::UnknownKind(tag))?;

        Ok(match kind {
            Kind::Nil => {
                decoder.decode_nil();
                Value::Nil
            }
            Kind::Slice => {
                let element = element_kind(decoder, 1)?;
                let len = decoder.decode_slice(element)?;
                let mut items = Vec::with_capacity(len.min(decoder.remaining()));
                for _ in 0..len {
                    items.push(Value::decode_at(decoder, depth + 1)?);
                }
                Value::Slice { kind: element, items }
            }
            Kind::Map => {
                let key = element_kind(decoder, 1)?;
                let value = element_kind(decoder, 2)?;
                let len = decoder.decode_map(key, value)?;
                let mut entries = Vec::with_capacity(len.min(decoder.remaining()));
                for _ in 0..len {
                    let k = Value::decode_at(decoder, depth + 1)?;
                    let v = Value::decode_at(decoder, depth + 1)?;
                    entries.push((k, v));
                }
                Value::Map { key, value, entries }
            }
            Kind::Any => return Err(DecodeError::Unskippable(Kind::Any)),
            Kind::Bytes  => Value::Bytes(decoder.decode_bytes()?),
            Kind::String => Value::String(decoder.decode_string()?),
            Kind::Error  => Value::Error(decoder.decode_error()?),
            Kind::Bool   => Value::Bool(decoder.decode_bool()?),
            Kind::U8     => Value::U8(decoder.decode_u8()?),
            Kind::U16    => Value::U16(decoder.decode_u16()?),
            Kind::U32    => Value::U32(decoder.decode_u32()?),
            Kind::U64    => Value::U64(decoder.decode_u64()?),
            Kind::I32    => Value::I32(decoder.decode_i32()?),
            Kind::I64    => Value::I64(decoder.decode_i64()?),
            Kind::F32    => Value::F32(decoder.decode_f32()?),
            Kind::F64    => Value::F64(decoder.decode_f64()?),
        })
    }

    pub fn encode(&self, encoder: &mut Encoder<'_>) {
        match self {
            Value::Nil => {
                encoder.encode_nil();
            }
            Value::Slice { kind, items } => {
                encoder.encode_slice(items.len(), *kind);
                for item in items {
                    item.encode(encoder);
                }
            }
            Value::Map { key, value, entries } => {
                encoder.encode_map(entries.len(), *key, *value);
                for (k, v) in entries {
                    k.encode(encoder);
                    v.encode(encoder);
                }
            }
            Value::Bytes(v)  => { encoder.encode_bytes(v); }
            Value::String(v) => { encoder.encode_string(v); }
            Value::Error(v)  => { encoder.encode_error(v); }
            Value::Bool(v)   => { encoder.encode_bool(*v); }
            Value::U8(v)     => { encoder.encode_u8(*v); }
            Value::U16(v)    => { encoder.encode_u16(*v); }
            Value::U32(v)    => { encoder.encode_u32(*v); }
            Value::U64(v)    => { encoder.encode_u64(*v); }
            Value::I32(v)    => { encoder.encode_i32(*v); }
            Value::I64(v)    => { encoder.encode_i64(*v); }
            Value::F32(v)    => { encoder.encode_f32(*v); }
            Value::F64(v)    => { encoder.encode_f64(*v); }
        }
    }
}

/// Reads the header kind byte `offset` bytes past the current tag.
fn element_kind(decoder: &Decoder<'_>, offset: usize) -> Result<Kind, DecodeError> {
    let tag = *decoder
        .data()
        .get(decoder.index() + offset)
        .ok_or(DecodeError::UnexpectedEof)?;
    Kind::from_u8(tag).ok_or(DecodeError::UnknownKind(tag))
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Slice { items, .. } => f.debug_list().entries(items).finish(),
            Value::Map { entries, .. } => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k, v)))
                .finish(),
            Value::Bytes(v)  => write!(f, "bytes{:?}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::Error(v)  => write!(f, "error({:?})", v),
            Value::Bool(v)   => write!(f, "{}", v),
            Value::U8(v)     => write!(f, "{}u8", v),
            Value::U16(v)    => write!(f, "{}u16", v),
            Value::U32(v)    => write!(f, "{}u32", v),
            Value::U64(v)    => write!(f, "{}u64", v),
            Value::I32(v)    => write!(f, "{}i32", v),
            Value::I64(v)    => write!(f, "{}i64", v),
            Value::F32(v)    => write!(f, "{:?}f32", v),
            Value::F64(v)    => write!(f, "{:?}f64", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_all_reads_every_value() {
        let mut buf = Vec::new();
        Encoder::new(&mut buf)
            .encode_string("hello world")
            .encode_map(1, Kind::String, Kind::I32)
            .encode_string("answer")
            .encode_i32(42)
            .encode_nil()
            .encode_f32(0.5);

        let values = Value::decode_all(&buf).unwrap();
        assert_eq!(format!("{:?}", values), r#"["hello world", {"answer": 42i32}, nil, 0.5f32]"#);
    }

    #[test]
    fn encode_matches_decode() {
        let value = Value::Slice {
            kind:  Kind::Bytes,
            items: vec![Value::Bytes(vec![1, 2]), Value::Bytes(vec![])],
        };
        let mut buf = Vec::new();
        value.encode(&mut Encoder::new(&mut buf));
        assert_eq!(Value::decode_all(&buf).unwrap(), vec![value]);
    }

    #[test]
    fn unknown_tags_are_errors() {
        assert_eq!(Value::decode_all(&[99]), Err(DecodeError::UnknownKind(99)));
        assert_eq!(Value::decode_all(&[3]), Err(DecodeError::Unskippable(Kind::Any)));
    }
}
