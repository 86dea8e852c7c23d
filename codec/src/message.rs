use crate::{
    buffer::{Decoder, Encoder},
    error::DecodeError,
};

/// Implemented by every model type generated from a schema.
///
/// `encode_fields` and `decode_fields` walk the model's fields in schema
/// declaration order; that order is the wire contract shared by every
/// backend.
pub trait Message {
    fn encode_fields(&self, encoder: &mut Encoder<'_>);

    fn decode_fields(&mut self, decoder: &mut Decoder<'_>) -> Result<(), DecodeError>;

    /// Appends the encoded model to `buf`.
    fn encode(&self, buf: &mut Vec<u8>) {
        self.encode_fields(&mut Encoder::new(buf));
    }

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }

    /// Decodes `data` into `self`. Values written after the last known field
    /// (by a newer schema) are skipped rather than treated as errors.
    fn decode(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        self.decode_from(Decoder::new(data))
    }

    /// Like [`Message::decode`], reading the whole of `decoder`.
    fn decode_from(&mut self, mut decoder: Decoder<'_>) -> Result<(), DecodeError> {
        self.decode_fields(&mut decoder)?;
        decoder.skip_remaining();
        Ok(())
    }
}

/// Writes a nested model as a bytes value so readers can skip fields they
/// do not know about without losing their place in the outer model.
pub fn encode_nested<M: Message>(encoder: &mut Encoder<'_>, message: &M) {
    let mut inner = Vec::new();
    message.encode(&mut inner);
    encoder.encode_bytes(&inner);
}

pub fn decode_nested<M: Message>(decoder: &mut Decoder<'_>, message: &mut M) -> Result<(), DecodeError> {
    let inner = decoder.decode_bytes_ref()?;
    message.decode_from(decoder.nested(inner)?)
}

/// Decodes a nested model into a fresh default instance.
pub fn decode_message<M: Message + Default>(decoder: &mut Decoder<'_>) -> Result<M, DecodeError> {
    let mut message = M::default();
    decode_nested(decoder, &mut message)?;
    Ok(message)
}

pub fn encode_optional<M: Message>(encoder: &mut Encoder<'_>, message: &Option<Box<M>>) {
    match message {
        Some(message) => encode_nested(encoder, message.as_ref()),
        None => {
            encoder.encode_nil();
        }
    }
}

pub fn decode_optional<M: Message + Default>(
    decoder: &mut Decoder<'_>,
) -> Result<Option<Box<M>>, DecodeError> {
    if decoder.decode_nil() {
        return Ok(None);
    }
    decode_message(decoder).map(|message| Some(Box::new(message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{buffer::MAX_DEPTH, kind::Kind};

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl Message for Point {
        fn encode_fields(&self, encoder: &mut Encoder<'_>) {
            encoder.encode_i32(self.x).encode_i32(self.y);
        }

        fn decode_fields(&mut self, decoder: &mut Decoder<'_>) -> Result<(), DecodeError> {
            if decoder.is_empty() {
                return Ok(());
            }
            self.x = decoder.decode_i32()?;
            if decoder.is_empty() {
                return Ok(());
            }
            self.y = decoder.decode_i32()?;
            Ok(())
        }
    }

    #[test]
    fn decode_skips_trailing_fields() {
        let mut buf = Point { x: 3, y: -4 }.encode_to_vec();
        Encoder::new(&mut buf).encode_string("from the future").encode_slice(0, Kind::Any);

        let mut point = Point::default();
        point.decode(&buf).unwrap();
        assert_eq!(point, Point { x: 3, y: -4 });
    }

    #[test]
    fn decode_keeps_defaults_for_missing_fields() {
        let mut buf = Vec::new();
        Encoder::new(&mut buf).encode_i32(9);

        let mut point = Point { x: 0, y: 5 };
        point.decode(&buf).unwrap();
        assert_eq!(point, Point { x: 9, y: 5 });
    }

    #[derive(Debug, Default, PartialEq)]
    struct Chain {
        next: Option<Box<Chain>>,
    }

    impl Message for Chain {
        fn encode_fields(&self, encoder: &mut Encoder<'_>) {
            encode_optional(encoder, &self.next);
        }

        fn decode_fields(&mut self, decoder: &mut Decoder<'_>) -> Result<(), DecodeError> {
            if decoder.is_empty() {
                return Ok(());
            }
            self.next = decode_optional(decoder)?;
            Ok(())
        }
    }

    fn chain(len: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        Encoder::new(&mut buf).encode_nil();
        for _ in 0..len {
            let mut outer = Vec::new();
            Encoder::new(&mut outer).encode_bytes(&buf);
            buf = outer;
        }
        buf
    }

    #[test]
    fn nested_models_respect_depth_limit() {
        let mut shallow = Chain::default();
        shallow.decode(&chain(MAX_DEPTH)).unwrap();

        let mut deep = Chain::default();
        assert_eq!(deep.decode(&chain(1_000)), Err(DecodeError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn optional_nested_round_trip() {
        let mut buf = Vec::new();
        {
            let mut encoder = Encoder::new(&mut buf);
            encode_optional(&mut encoder, &Some(Box::new(Point { x: 1, y: 2 })));
            encode_optional::<Point>(&mut encoder, &None);
        }

        let mut decoder = Decoder::new(&buf);
        let first: Option<Box<Point>> = decode_optional(&mut decoder).unwrap();
        let second: Option<Box<Point>> = decode_optional(&mut decoder).unwrap();
        assert_eq!(first, Some(Box::new(Point { x: 1, y: 2 })));
        assert_eq!(second, None);
        assert!(decoder.is_empty());
    }
}
