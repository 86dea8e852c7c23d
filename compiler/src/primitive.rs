use serde::Serialize;
use std::fmt;

/// The nine built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Bool,
    Bytes,
}

pub const PRIMITIVES: [Primitive; 9] = [
    Primitive::String,
    Primitive::Int32,
    Primitive::Int64,
    Primitive::Uint32,
    Primitive::Uint64,
    Primitive::Float32,
    Primitive::Float64,
    Primitive::Bool,
    Primitive::Bytes,
];

/// Which validator and modifier blocks a primitive accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorFamily {
    /// `regex_validator`, `length_validator` and `case_modifier`.
    Text,
    /// `limit_validator`.
    Limit,
    None,
}

impl ValidatorFamily {
    pub fn blocks(self) -> &'static [&'static str] {
        match self {
            ValidatorFamily::Text => &["regex_validator", "length_validator", "case_modifier"],
            ValidatorFamily::Limit => &["limit_validator"],
            ValidatorFamily::None => &[],
        }
    }

    pub fn allows(self, block: &str) -> bool {
        self.blocks().contains(&block)
    }
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::Uint32 => "uint32",
            Primitive::Uint64 => "uint64",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::Bool => "bool",
            Primitive::Bytes => "bytes",
        }
    }

    /// Looks up a primitive by its exact, lower-case name.
    pub fn from_name(name: &str) -> Option<Primitive> {
        PRIMITIVES.iter().copied().find(|p| p.name() == name)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Primitive::Int32 | Primitive::Int64 | Primitive::Uint32 | Primitive::Uint64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Primitive::Float32 | Primitive::Float64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn validator_family(self) -> ValidatorFamily {
        match self {
            Primitive::String => ValidatorFamily::Text,
            Primitive::Bool | Primitive::Bytes => ValidatorFamily::None,
            _ => ValidatorFamily::Limit,
        }
    }

    /// `bool_map` is not part of the vocabulary.
    pub fn supports_map(self) -> bool {
        self != Primitive::Bool
    }

    /// Single `bytes` fields carry no default.
    pub fn supports_default(self) -> bool {
        self != Primitive::Bytes
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether `name` is one of the built-in scalar kinds.
pub fn is_primitive(name: &str) -> bool {
    Primitive::from_name(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_lookup() {
        for primitive in PRIMITIVES {
            assert_eq!(Primitive::from_name(primitive.name()), Some(primitive));
        }
        assert_eq!(Primitive::from_name("String"), None);
        assert_eq!(Primitive::from_name("int"), None);
    }

    #[test]
    fn test_validator_families() {
        assert_eq!(Primitive::String.validator_family(), ValidatorFamily::Text);
        assert_eq!(Primitive::Float64.validator_family(), ValidatorFamily::Limit);
        assert_eq!(Primitive::Uint32.validator_family(), ValidatorFamily::Limit);
        assert_eq!(Primitive::Bool.validator_family(), ValidatorFamily::None);
        assert_eq!(Primitive::Bytes.validator_family(), ValidatorFamily::None);

        assert!(ValidatorFamily::Text.allows("case_modifier"));
        assert!(!ValidatorFamily::Text.allows("limit_validator"));
        assert!(!ValidatorFamily::None.allows("regex_validator"));
    }

    #[test]
    fn test_serializes_as_lowercase_name() {
        assert_eq!(serde_json::to_string(&Primitive::Uint64).unwrap(), "\"uint64\"");
    }
}
