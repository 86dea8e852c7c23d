use std::fmt;

/// Type tag written in front of every encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    Nil     = 0,
    Slice   = 1,
    Map     = 2,
    Any     = 3,
    Bytes   = 4,
    String  = 5,
    Error   = 6,
    Bool    = 7,
    U8      = 8,
    U16     = 9,
    U32     = 10,
    U64     = 11,
    I32     = 12,
    I64     = 13,
    F32     = 14,
    F64     = 15,
}

impl Kind {
    pub const ALL: [Kind; 16] = [
        Kind::Nil, Kind::Slice, Kind::Map, Kind::Any,
        Kind::Bytes, Kind::String, Kind::Error, Kind::Bool,
        Kind::U8, Kind::U16, Kind::U32, Kind::U64,
        Kind::I32, Kind::I64, Kind::F32, Kind::F64,
    ];

    /// Maps a tag byte back to its kind, or `None` for tags this version
    /// does not know about.
    pub fn from_u8(tag: u8) -> Option<Kind> {
        Kind::ALL.get(tag as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Nil    => "nil",
            Kind::Slice  => "slice",
            Kind::Map    => "map",
            Kind::Any    => "any",
            Kind::Bytes  => "bytes",
            Kind::String => "string",
            Kind::Error  => "error",
            Kind::Bool   => "bool",
            Kind::U8     => "u8",
            Kind::U16    => "u16",
            Kind::U32    => "u32",
            Kind::U64    => "u64",
            Kind::I32    => "i32",
            Kind::I64    => "i64",
            Kind::F32    => "f32",
            Kind::F64    => "f64",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for kind in Kind::ALL {
            assert_eq!(Kind::from_u8(kind as u8), Some(kind));
        }
        assert_eq!(Kind::from_u8(16), None);
        assert_eq!(Kind::from_u8(255), None);
    }
}
