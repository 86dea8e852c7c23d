use crate::{error::DecodeError, kind::Kind};

/// Upper bound on slice/map nesting followed by [`Decoder::skip_value`].
pub const MAX_DEPTH: usize = 64;

/// A byte buffer meant for writing tagged values.
///
/// Example usage:
///
/// ```
/// let mut buf = Vec::new();
/// signet_codec::Encoder::new(&mut buf).encode_bool(true).encode_u32(300);
/// assert_eq!(buf, [7, 1, 10, 172, 2]);
/// ```
///
pub struct Encoder<'a> {
    data: &'a mut Vec<u8>,
}

impl<'a> Encoder<'a> {
    /// Creates an encoder appending to `data`.
    pub fn new(data: &'a mut Vec<u8>) -> Encoder<'a> {
        Encoder { data }
    }

    /// Returns the number of bytes in the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn write_kind(&mut self, kind: Kind) {
        self.data.push(kind as u8);
    }

    fn write_var_uint(&mut self, mut value: u64) {
        loop {
            let byte = value as u8 & 127;
            value >>= 7;

            if value == 0 {
                self.data.push(byte);
                return;
            }

            self.data.push(byte | 128);
        }
    }

    pub fn encode_nil(&mut self) -> &mut Self {
        self.write_kind(Kind::Nil);
        self
    }

    /// Writes a slice header. The `len` elements must follow, each encoded
    /// with its own tag.
    pub fn encode_slice(&mut self, len: usize, kind: Kind) -> &mut Self {
        self.write_kind(Kind::Slice);
        self.write_kind(kind);
        self.encode_u32(len as u32)
    }

    /// Writes a map header. `len` key/value pairs must follow, alternating
    /// key then value.
    pub fn encode_map(&mut self, len: usize, key: Kind, value: Kind) -> &mut Self {
        self.write_kind(Kind::Map);
        self.write_kind(key);
        self.write_kind(value);
        self.encode_u32(len as u32)
    }

    pub fn encode_bytes(&mut self, value: &[u8]) -> &mut Self {
        self.write_kind(Kind::Bytes);
        self.encode_u32(value.len() as u32);
        self.data.extend_from_slice(value);
        self
    }

    pub fn encode_string(&mut self, value: &str) -> &mut Self {
        self.write_kind(Kind::String);
        self.encode_u32(value.len() as u32);
        self.data.extend_from_slice(value.as_bytes());
        self
    }

    pub fn encode_error(&mut self, message: &str) -> &mut Self {
        self.write_kind(Kind::Error);
        self.encode_string(message)
    }

    pub fn encode_bool(&mut self, value: bool) -> &mut Self {
        self.write_kind(Kind::Bool);
        self.data.push(if value { 1 } else { 0 });
        self
    }

    pub fn encode_u8(&mut self, value: u8) -> &mut Self {
        self.write_kind(Kind::U8);
        self.data.push(value);
        self
    }

    pub fn encode_u16(&mut self, value: u16) -> &mut Self {
        self.write_kind(Kind::U16);
        self.write_var_uint(value as u64);
        self
    }

    pub fn encode_u32(&mut self, value: u32) -> &mut Self {
        self.write_kind(Kind::U32);
        self.write_var_uint(value as u64);
        self
    }

    pub fn encode_u64(&mut self, value: u64) -> &mut Self {
        self.write_kind(Kind::U64);
        self.write_var_uint(value);
        self
    }

    /// Signed integers are zig-zag encoded so small negative numbers stay short.
    pub fn encode_i32(&mut self, value: i32) -> &mut Self {
        self.write_kind(Kind::I32);
        self.write_var_uint(((value << 1) ^ (value >> 31)) as u32 as u64);
        self
    }

    pub fn encode_i64(&mut self, value: i64) -> &mut Self {
        self.write_kind(Kind::I64);
        self.write_var_uint(((value << 1) ^ (value >> 63)) as u64);
        self
    }

    pub fn encode_f32(&mut self, value: f32) -> &mut Self {
        self.write_kind(Kind::F32);
        self.data.extend_from_slice(&value.to_bits().to_be_bytes());
        self
    }

    pub fn encode_f64(&mut self, value: f64) -> &mut Self {
        self.write_kind(Kind::F64);
        self.data.extend_from_slice(&value.to_bits().to_be_bytes());
        self
    }
}

/// A byte buffer meant for reading tagged values.
///
/// Example usage:
///
/// ```
/// let mut decoder = signet_codec::Decoder::new(&[5, 10, 2, 104, 105, 0]);
/// assert_eq!(decoder.decode_string(), Ok("hi".to_string()));
/// assert!(decoder.decode_nil());
/// assert!(decoder.is_empty());
/// ```
///
pub struct Decoder<'a> {
    data:  &'a [u8],
    index: usize,
    depth: usize,
}

impl<'a> Decoder<'a> {
    /// Create a new Decoder that wraps the provided byte slice.
    pub fn new(data: &'a [u8]) -> Decoder<'a> {
        Decoder { data, index: 0, depth: 0 }
    }

    /// Opens a decoder over the payload of a nested value, one level deeper
    /// than `self`.
    pub fn nested(&self, data: &'a [u8]) -> Result<Decoder<'a>, DecodeError> {
        if self.depth >= MAX_DEPTH {
            return Err(DecodeError::TooDeep(MAX_DEPTH));
        }
        Ok(Decoder {
            data,
            index: 0,
            depth: self.depth + 1,
        })
    }

    /// Nesting level of this decoder; zero for a top-level payload.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Retrieves the underlying byte slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Retrieves the current index into the underlying byte slice.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    pub fn is_empty(&self) -> bool {
        self.index >= self.data.len()
    }

    /// Returns the tag of the next value without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.index).copied()
    }

    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let value = self.peek_tag().ok_or(DecodeError::UnexpectedEof)?;
        self.index += 1;
        Ok(value)
    }

    fn read_raw(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::UnexpectedEof);
        }
        let value = &self.data[self.index..self.index + len];
        self.index += len;
        Ok(value)
    }

    fn expect_kind(&mut self, expected: Kind) -> Result<(), DecodeError> {
        let found = self.read_byte()?;
        if found != expected as u8 {
            return Err(DecodeError::InvalidKind { expected, found });
        }
        Ok(())
    }

    fn read_kind(&mut self) -> Result<Kind, DecodeError> {
        let tag = self.read_byte()?;
        Kind::from_u8(tag).ok_or(DecodeError::UnknownKind(tag))
    }

    /// Reads a LEB128 varint and checks that it fits in `bits` bits.
    fn read_var_uint(&mut self, bits: u8) -> Result<u64, DecodeError> {
        let mut result: u64 = 0;
        let mut shift: u32 = 0;

        loop {
            if shift >= 64 {
                return Err(DecodeError::VarintOverflow(bits));
            }
            let byte = self.read_byte()?;
            result |= ((byte & 127) as u64) << shift;
            if (byte & 128) == 0 {
                break;
            }
            shift += 7;
        }

        if bits < 64 && (result >> bits) != 0 {
            return Err(DecodeError::VarintOverflow(bits));
        }
        Ok(result)
    }

    /// Consumes a nil marker if one is next. Never fails.
    pub fn decode_nil(&mut self) -> bool {
        if self.peek_tag() == Some(Kind::Nil as u8) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Reads a slice header for elements of `kind` and returns the element count.
    pub fn decode_slice(&mut self, kind: Kind) -> Result<usize, DecodeError> {
        self.expect_kind(Kind::Slice)?;
        self.expect_kind(kind)?;
        Ok(self.decode_u32()? as usize)
    }

    /// Reads a map header and returns the number of entries.
    pub fn decode_map(&mut self, key: Kind, value: Kind) -> Result<usize, DecodeError> {
        self.expect_kind(Kind::Map)?;
        self.expect_kind(key)?;
        self.expect_kind(value)?;
        Ok(self.decode_u32()? as usize)
    }

    /// Reads a bytes value without copying it out of the buffer.
    pub fn decode_bytes_ref(&mut self) -> Result<&'a [u8], DecodeError> {
        self.expect_kind(Kind::Bytes)?;
        let len = self.decode_u32()? as usize;
        self.read_raw(len)
    }

    pub fn decode_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        self.decode_bytes_ref().map(|b| b.to_vec())
    }

    pub fn decode_string(&mut self) -> Result<String, DecodeError> {
        self.expect_kind(Kind::String)?;
        let len = self.decode_u32()? as usize;
        let raw = self.read_raw(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
    }

    pub fn decode_error(&mut self) -> Result<String, DecodeError> {
        self.expect_kind(Kind::Error)?;
        self.decode_string()
    }

    pub fn decode_bool(&mut self) -> Result<bool, DecodeError> {
        self.expect_kind(Kind::Bool)?;
        match self.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidBool(other)),
        }
    }

    pub fn decode_u8(&mut self) -> Result<u8, DecodeError> {
        self.expect_kind(Kind::U8)?;
        self.read_byte()
    }

    pub fn decode_u16(&mut self) -> Result<u16, DecodeError> {
        self.expect_kind(Kind::U16)?;
        Ok(self.read_var_uint(16)? as u16)
    }

    pub fn decode_u32(&mut self) -> Result<u32, DecodeError> {
        self.expect_kind(Kind::U32)?;
        Ok(self.read_var_uint(32)? as u32)
    }

    pub fn decode_u64(&mut self) -> Result<u64, DecodeError> {
        self.expect_kind(Kind::U64)?;
        self.read_var_uint(64)
    }

    pub fn decode_i32(&mut self) -> Result<i32, DecodeError> {
        self.expect_kind(Kind::I32)?;
        let value = self.read_var_uint(32)? as u32;
        Ok(((value >> 1) as i32) ^ -((value & 1) as i32))
    }

    pub fn decode_i64(&mut self) -> Result<i64, DecodeError> {
        self.expect_kind(Kind::I64)?;
        let value = self.read_var_uint(64)?;
        Ok(((value >> 1) as i64) ^ -((value & 1) as i64))
    }

    pub fn decode_f32(&mut self) -> Result<f32, DecodeError> {
        self.expect_kind(Kind::F32)?;
        let raw = self.read_raw(4)?;
        Ok(f32::from_bits(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]])))
    }

    pub fn decode_f64(&mut self) -> Result<f64, DecodeError> {
        self.expect_kind(Kind::F64)?;
        let raw = self.read_raw(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(raw);
        Ok(f64::from_bits(u64::from_be_bytes(bytes)))
    }

    /// Consumes exactly one complete value of any known kind, including
    /// every element of a slice or map.
    pub fn skip_value(&mut self) -> Result<(), DecodeError> {
        self.skip_value_at(self.depth)
    }

    fn skip_value_at(&mut self, depth: usize) -> Result<(), DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::TooDeep(MAX_DEPTH));
        }

        match self.read_kind()? {
            Kind::Nil => Ok(()),
            Kind::Slice => {
                self.read_kind()?;
                let len = self.decode_u32()?;
                for _ in 0..len {
                    self.skip_value_at(depth + 1)?;
                }
                Ok(())
            }
            Kind::Map => {
                self.read_kind()?;
                self.read_kind()?;
                let len = self.decode_u32()?;
                for _ in 0..len {
                    self.skip_value_at(depth + 1)?;
                    self.skip_value_at(depth + 1)?;
                }
                Ok(())
            }
            Kind::Any => Err(DecodeError::Unskippable(Kind::Any)),
            Kind::Bytes | Kind::String => {
                let len = self.decode_u32()? as usize;
                self.read_raw(len).map(|_| ())
            }
            Kind::Error => self.decode_string().map(|_| ()),
            Kind::Bool | Kind::U8 => self.read_byte().map(|_| ()),
            Kind::U16 | Kind::U32 | Kind::U64 | Kind::I32 | Kind::I64 => {
                self.read_var_uint(64).map(|_| ())
            }
            Kind::F32 => self.read_raw(4).map(|_| ()),
            Kind::F64 => self.read_raw(8).map(|_| ()),
        }
    }

    /// Skips every value left in the buffer and returns how many were
    /// skipped. Once a value cannot be skipped (an unknown tag, or a
    /// truncated value) the rest of the buffer is discarded.
    pub fn skip_remaining(&mut self) -> usize {
        let mut skipped = 0;
        while !self.is_empty() {
            if self.skip_value().is_err() {
                self.index = self.data.len();
                break;
            }
            skipped += 1;
        }
        skipped
    }
}

#[cfg(test)]
fn encode_once(cb: fn(&mut Encoder)) -> Vec<u8> {
    let mut buf = Vec::new();
    cb(&mut Encoder::new(&mut buf));
    buf
}

#[test]
fn encode_scalars() {
    assert_eq!(encode_once(|e| { e.encode_nil(); }), [0]);
    assert_eq!(encode_once(|e| { e.encode_bool(false); }), [7, 0]);
    assert_eq!(encode_once(|e| { e.encode_bool(true); }), [7, 1]);
    assert_eq!(encode_once(|e| { e.encode_u8(255); }), [8, 255]);
    assert_eq!(encode_once(|e| { e.encode_u32(0); }), [10, 0]);
    assert_eq!(encode_once(|e| { e.encode_u32(127); }), [10, 127]);
    assert_eq!(encode_once(|e| { e.encode_u32(128); }), [10, 128, 1]);
    assert_eq!(encode_once(|e| { e.encode_u32(u32::MAX); }), [10, 255, 255, 255, 255, 15]);
    assert_eq!(encode_once(|e| { e.encode_i32(0); }), [12, 0]);
    assert_eq!(encode_once(|e| { e.encode_i32(-1); }), [12, 1]);
    assert_eq!(encode_once(|e| { e.encode_i32(1); }), [12, 2]);
    assert_eq!(encode_once(|e| { e.encode_i32(-64); }), [12, 127]);
    assert_eq!(encode_once(|e| { e.encode_i32(i32::MIN); }), [12, 255, 255, 255, 255, 15]);
    assert_eq!(encode_once(|e| { e.encode_f32(1.0); }), [14, 0x3f, 0x80, 0, 0]);
    assert_eq!(encode_once(|e| { e.encode_f64(-2.0); }), [15, 0xc0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn encode_containers() {
    assert_eq!(
        encode_once(|e| { e.encode_string("hi"); }),
        [5, 10, 2, b'h', b'i']
    );
    assert_eq!(encode_once(|e| { e.encode_bytes(&[]); }), [4, 10, 0]);
    assert_eq!(
        encode_once(|e| { e.encode_slice(1, Kind::Bool).encode_bool(true); }),
        [1, 7, 10, 1, 7, 1]
    );
    assert_eq!(
        encode_once(|e| { e.encode_map(1, Kind::String, Kind::U32).encode_string("a").encode_u32(1); }),
        [2, 5, 10, 10, 1, 5, 10, 1, b'a', 10, 1]
    );
    assert_eq!(
        encode_once(|e| { e.encode_error("x"); }),
        [6, 5, 10, 1, b'x']
    );
}

#[test]
fn decode_scalars() {
    let read = |bytes: &[u8]| Decoder::new(bytes).decode_i32();
    assert_eq!(read(&[]), Err(DecodeError::UnexpectedEof));
    assert_eq!(read(&[12, 1]), Ok(-1));
    assert_eq!(read(&[12, 254, 255, 255, 255, 15]), Ok(i32::MAX));
    assert_eq!(read(&[12, 255, 255, 255, 255, 15]), Ok(i32::MIN));
    assert_eq!(
        read(&[10, 1]),
        Err(DecodeError::InvalidKind { expected: Kind::I32, found: 10 })
    );

    let read = |bytes: &[u8]| Decoder::new(bytes).decode_u32();
    assert_eq!(read(&[10, 128, 1]), Ok(128));
    assert_eq!(read(&[10, 128, 128, 128, 128, 16]), Err(DecodeError::VarintOverflow(32)));
    assert_eq!(read(&[10, 128]), Err(DecodeError::UnexpectedEof));

    let read = |bytes: &[u8]| Decoder::new(bytes).decode_bool();
    assert_eq!(read(&[7, 0]), Ok(false));
    assert_eq!(read(&[7, 1]), Ok(true));
    assert_eq!(read(&[7, 2]), Err(DecodeError::InvalidBool(2)));

    let read = |bytes: &[u8]| Decoder::new(bytes).decode_string();
    assert_eq!(read(&[5, 10, 0]), Ok(String::new()));
    assert_eq!(read(&[5, 10, 3, b'a']), Err(DecodeError::UnexpectedEof));
    assert_eq!(read(&[5, 10, 1, 0xff]), Err(DecodeError::InvalidUtf8));
}

#[test]
fn decode_headers() {
    let mut decoder = Decoder::new(&[1, 12, 10, 2, 12, 2, 12, 4]);
    assert_eq!(decoder.decode_slice(Kind::I32), Ok(2));
    assert_eq!(decoder.decode_i32(), Ok(1));
    assert_eq!(decoder.decode_i32(), Ok(2));
    assert!(decoder.is_empty());

    let mut decoder = Decoder::new(&[1, 12, 10, 2]);
    assert_eq!(
        decoder.decode_slice(Kind::String),
        Err(DecodeError::InvalidKind { expected: Kind::String, found: 12 })
    );

    let mut decoder = Decoder::new(&[2, 5, 3, 10, 0]);
    assert_eq!(decoder.decode_map(Kind::String, Kind::Any), Ok(0));
}

#[test]
fn decode_nil_only_consumes_nil() {
    let mut decoder = Decoder::new(&[0, 7, 1]);
    assert!(decoder.decode_nil());
    assert!(!decoder.decode_nil());
    assert_eq!(decoder.decode_bool(), Ok(true));
    assert!(!decoder.decode_nil());
}

#[test]
fn skip_nested_values() {
    let mut buf = Vec::new();
    Encoder::new(&mut buf)
        .encode_map(2, Kind::String, Kind::Any)
        .encode_string("a")
        .encode_slice(2, Kind::F64)
        .encode_f64(1.5)
        .encode_f64(2.5)
        .encode_string("b")
        .encode_nil()
        .encode_i64(-7);

    let mut decoder = Decoder::new(&buf);
    assert_eq!(decoder.skip_value(), Ok(()));
    assert_eq!(decoder.decode_i64(), Ok(-7));
    assert!(decoder.is_empty());
}

#[test]
fn skip_remaining_stops_at_unknown_tag() {
    let mut buf = Vec::new();
    Encoder::new(&mut buf).encode_u64(9).encode_error("boom");
    buf.extend_from_slice(&[42, 1, 2, 3]);

    let mut decoder = Decoder::new(&buf);
    assert_eq!(decoder.skip_remaining(), 2);
    assert!(decoder.is_empty());
}

#[test]
fn skip_rejects_runaway_nesting() {
    let mut buf = Vec::new();
    for _ in 0..(MAX_DEPTH + 2) {
        Encoder::new(&mut buf).encode_slice(1, Kind::Slice);
    }
    let mut decoder = Decoder::new(&buf);
    assert_eq!(decoder.skip_value(), Err(DecodeError::TooDeep(MAX_DEPTH)));
}

#[test]
fn nested_decoders_track_depth() {
    let mut decoder = Decoder::new(&[]);
    for level in 1..=MAX_DEPTH {
        decoder = decoder.nested(&[]).unwrap();
        assert_eq!(decoder.depth(), level);
    }
    assert_eq!(decoder.nested(&[]).err(), Some(DecodeError::TooDeep(MAX_DEPTH)));
}
