use crate::primitive::Primitive;
use serde::Serialize;
use std::fmt;

pub const VERSION_V1ALPHA: &str = "v1alpha";

/// Dialect tags this compiler understands.
pub const KNOWN_VERSIONS: [&str; 1] = [VERSION_V1ALPHA];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub version: String,
    pub name:    String,
    pub tag:     String,
    pub enums:   Vec<Enum>,
    pub models:  Vec<Model>,
}

impl Schema {
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&Enum> {
        self.enums.iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enum {
    pub name:    String,
    #[serde(skip)]
    pub line:    usize,
    #[serde(skip)]
    pub column:  usize,
    pub default: String,
    pub values:  Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    pub name:        String,
    #[serde(skip)]
    pub line:        usize,
    #[serde(skip)]
    pub column:      usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields in source declaration order. Duplicate detection, the
    /// generator plan and every backend walk this order.
    pub fields:      Vec<Field>,
}

impl Model {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields of one shape and type family, in declaration order.
    pub fn fields_of(&self, shape: Shape, family: TypeFamily) -> impl Iterator<Item = &Field> + '_ {
        self.fields
            .iter()
            .filter(move |f| f.shape == shape && f.ty.family() == family)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Single,
    Array,
    Map,
}

impl Shape {
    pub fn suffix(self) -> &'static str {
        match self {
            Shape::Single => "",
            Shape::Array => "_array",
            Shape::Map => "_map",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum FieldType {
    Primitive(Primitive),
    /// Reference to an enum by name.
    Enum(String),
    /// Reference to a model by name.
    Model(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    Primitive(Primitive),
    Enum,
    Model,
}

impl FieldType {
    pub fn family(&self) -> TypeFamily {
        match self {
            FieldType::Primitive(p) => TypeFamily::Primitive(*p),
            FieldType::Enum(_) => TypeFamily::Enum,
            FieldType::Model(_) => TypeFamily::Model,
        }
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            FieldType::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn reference(&self) -> Option<&str> {
        match self {
            FieldType::Enum(name) | FieldType::Model(name) => Some(name),
            FieldType::Primitive(_) => None,
        }
    }
}

/// Tri-state accessor flag. `Unset` resolves during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessor {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl Accessor {
    pub fn from_flag(flag: bool) -> Accessor {
        if flag {
            Accessor::Enabled
        } else {
            Accessor::Disabled
        }
    }

    pub fn is_enabled(self) -> bool {
        self == Accessor::Enabled
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name:         String,
    #[serde(skip)]
    pub line:         usize,
    #[serde(skip)]
    pub column:       usize,
    pub shape:        Shape,
    #[serde(rename = "type")]
    pub ty:           FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default:      Option<Literal>,
    /// Value type of a map: a primitive name or a model name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value:        Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_size: Option<u32>,
    pub accessor:     Accessor,
    #[serde(skip_serializing_if = "Validators::is_empty")]
    pub validators:   Validators,
}

impl Field {
    pub fn new(name: &str, shape: Shape, ty: FieldType) -> Field {
        Field {
            name: name.to_string(),
            line: 0,
            column: 0,
            shape,
            ty,
            default: None,
            value: None,
            initial_size: None,
            accessor: Accessor::Unset,
            validators: Validators::default(),
        }
    }

    /// The IDL block keyword that declares this field, e.g. `string_array`.
    pub fn keyword(&self) -> String {
        let base = match &self.ty {
            FieldType::Primitive(p) => p.name(),
            FieldType::Enum(_) => "enum",
            FieldType::Model(_) => "model",
        };
        format!("{}{}", base, self.shape.suffix())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Validators {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex:  Option<RegexValidator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<LengthValidator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit:  Option<LimitValidator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case:   Option<CaseModifier>,
}

impl Validators {
    pub fn is_empty(&self) -> bool {
        self.regex.is_none() && self.length.is_none() && self.limit.is_none() && self.case.is_none()
    }

    /// IDL block names of the attached validators and modifiers.
    pub fn block_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.regex.is_some() {
            names.push("regex_validator");
        }
        if self.length.is_some() {
            names.push("length_validator");
        }
        if self.case.is_some() {
            names.push("case_modifier");
        }
        if self.limit.is_some() {
            names.push("limit_validator");
        }
        names
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegexValidator {
    pub expression: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LengthValidator {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LimitValidator {
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseModifier {
    pub kind: String,
}

impl CaseModifier {
    pub fn case_kind(&self) -> Option<CaseKind> {
        match self.kind.as_str() {
            "upper" => Some(CaseKind::Upper),
            "lower" => Some(CaseKind::Lower),
            "none" => Some(CaseKind::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseKind {
    Upper,
    Lower,
    None,
}

impl CaseKind {
    pub fn apply(self, value: &str) -> String {
        match self {
            CaseKind::Upper => value.to_uppercase(),
            CaseKind::Lower => value.to_lowercase(),
            CaseKind::None => value.to_string(),
        }
    }
}

/// A numeric literal already converted to its field's primitive type.
/// Comparisons are only meaningful between numbers of the same variant.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
}

impl Number {
    pub fn primitive(self) -> Primitive {
        match self {
            Number::Int32(_) => Primitive::Int32,
            Number::Int64(_) => Primitive::Int64,
            Number::Uint32(_) => Primitive::Uint32,
            Number::Uint64(_) => Primitive::Uint64,
            Number::Float32(_) => Primitive::Float32,
            Number::Float64(_) => Primitive::Float64,
        }
    }

    /// Source spelling for generated code. Floats always carry a decimal
    /// point or exponent so they never read as integer literals.
    pub fn literal(self) -> String {
        match self {
            Number::Float32(v) => format!("{:?}", v),
            Number::Float64(v) => format!("{:?}", v),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int32(v) => write!(f, "{}", v),
            Number::Int64(v) => write!(f, "{}", v),
            Number::Uint32(v) => write!(f, "{}", v),
            Number::Uint64(v) => write!(f, "{}", v),
            Number::Float32(v) => write!(f, "{}", v),
            Number::Float64(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    String(String),
    Bool(bool),
    Number(Number),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keyword() {
        let field = Field::new("a", Shape::Array, FieldType::Primitive(Primitive::Int64));
        assert_eq!(field.keyword(), "int64_array");
        let field = Field::new("b", Shape::Map, FieldType::Enum("Color".into()));
        assert_eq!(field.keyword(), "enum_map");
        let field = Field::new("c", Shape::Single, FieldType::Model("Other".into()));
        assert_eq!(field.keyword(), "model");
    }

    #[test]
    fn test_fields_of_keeps_declaration_order() {
        let model = Model {
            name: "M".into(),
            line: 0,
            column: 0,
            description: None,
            fields: vec![
                Field::new("B", Shape::Single, FieldType::Primitive(Primitive::String)),
                Field::new("A", Shape::Single, FieldType::Primitive(Primitive::Int32)),
                Field::new("C", Shape::Single, FieldType::Primitive(Primitive::String)),
            ],
        };
        let names: Vec<&str> = model
            .fields_of(Shape::Single, TypeFamily::Primitive(Primitive::String))
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["B", "C"]);
    }

    #[test]
    fn test_number_literal_spelling() {
        assert_eq!(Number::Float32(1.0).literal(), "1.0");
        assert_eq!(Number::Float64(-0.5).literal(), "-0.5");
        assert_eq!(Number::Int64(-5).literal(), "-5");
        assert_eq!(Number::Float32(1.0).to_string(), "1");
    }

    #[test]
    fn test_case_kind() {
        let modifier = CaseModifier { kind: "upper".into() };
        assert_eq!(modifier.case_kind(), Some(CaseKind::Upper));
        assert_eq!(CaseKind::Upper.apply("hello"), "HELLO");
        // Full Unicode mapping, which can change the length.
        assert_eq!(CaseKind::Upper.apply("straße"), "STRASSE");
        assert_eq!(CaseModifier { kind: "title".into() }.case_kind(), None);
    }
}
