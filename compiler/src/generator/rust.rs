//! Rust backend. The output is a single `pub mod <package>` that depends on
//! the `signet_codec` and `regex` crates and carries no inner attributes, so
//! it can be pulled in with `include!`.

use super::{
    plan::{Check, Element, EnumPlan, FieldPlan, ModelPlan, Plan},
    Backend, Formatter, GenerateOptions, TypeMapping,
};
use crate::{
    error::CompileError,
    primitive::Primitive,
    types::{CaseKind, Literal, Shape},
    utils::{escape_leading_digit, escape_rust_keyword, quote, to_snake_case},
};
use std::collections::HashMap;

/// Type names the generated module uses unqualified.
const RESERVED_NAMES: [&str; 14] = [
    "Box",
    "DecodeError",
    "Decoder",
    "Default",
    "Encoder",
    "Kind",
    "Map",
    "MapKey",
    "Message",
    "Option",
    "Result",
    "String",
    "ValidationError",
    "Vec",
];

const ANY: TypeMapping = TypeMapping {
    native: "",
    kind:   "Kind::Any",
    encode: "",
    decode: "",
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl Backend for RustBackend {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn file_name(&self) -> &'static str {
        "generated.rs"
    }

    fn mapping(&self, kind: &str) -> TypeMapping {
        match Primitive::from_name(kind) {
            Some(p) => primitive_mapping(p),
            None => ANY,
        }
    }

    fn formatter(&self) -> Formatter {
        Formatter::rustfmt()
    }

    fn render(&self, plan: &Plan<'_>, options: &GenerateOptions) -> Result<String, CompileError> {
        let package = escape_rust_keyword(options.package_name()?);
        check_reserved(plan)?;

        let mut out: Vec<String> = Vec::new();
        out.push(format!(
            "// Code generated by signet {} from schema {} (tag {}). DO NOT EDIT.",
            options.version,
            quote(plan.name),
            quote(plan.tag)
        ));
        out.push(String::new());
        out.push("#[allow(dead_code, unused_imports, unused_mut, unused_variables, non_camel_case_types, non_snake_case, clippy::all)]".to_string());
        out.push(format!("pub mod {} {{", package));
        push(&mut out, 1, "use signet_codec::{DecodeError, Decoder, Encoder, Kind, Map, MapKey, Message, ValidationError};");
        out.push(String::new());
        push(&mut out, 1, format!("pub const SCHEMA_NAME: &str = {:?};", plan.name));
        push(&mut out, 1, format!("pub const SCHEMA_TAG: &str = {:?};", plan.tag));
        push(&mut out, 1, format!("pub const GENERATOR_VERSION: &str = {:?};", options.version));

        for e in &plan.enums {
            out.push(String::new());
            render_enum(&mut out, e);
        }
        for model in &plan.models {
            out.push(String::new());
            render_model(&mut out, model);
        }

        out.push("}".to_string());
        Ok(out.join("\n") + "\n")
    }
}

fn primitive_mapping(p: Primitive) -> TypeMapping {
    let (native, kind, encode, decode) = match p {
        Primitive::String => ("String", "Kind::String", "encode_string", "decode_string"),
        Primitive::Int32 => ("i32", "Kind::I32", "encode_i32", "decode_i32"),
        Primitive::Int64 => ("i64", "Kind::I64", "encode_i64", "decode_i64"),
        Primitive::Uint32 => ("u32", "Kind::U32", "encode_u32", "decode_u32"),
        Primitive::Uint64 => ("u64", "Kind::U64", "encode_u64", "decode_u64"),
        Primitive::Float32 => ("f32", "Kind::F32", "encode_f32", "decode_f32"),
        Primitive::Float64 => ("f64", "Kind::F64", "encode_f64", "decode_f64"),
        Primitive::Bool => ("bool", "Kind::Bool", "encode_bool", "decode_bool"),
        Primitive::Bytes => ("Vec<u8>", "Kind::Bytes", "encode_bytes", "decode_bytes"),
    };
    TypeMapping {
        native,
        kind,
        encode,
        decode,
    }
}

fn push(out: &mut Vec<String>, depth: usize, line: impl AsRef<str>) {
    out.push(format!("{}{}", "    ".repeat(depth), line.as_ref()));
}

fn type_name(name: &str) -> String {
    escape_rust_keyword(&escape_leading_digit(name))
}

fn field_ident(name: &str) -> String {
    escape_rust_keyword(&escape_leading_digit(&to_snake_case(name)))
}

fn check_reserved(plan: &Plan<'_>) -> Result<(), CompileError> {
    let names = plan
        .enums
        .iter()
        .map(|e| e.name)
        .chain(plan.models.iter().map(|m| m.name));
    for name in names {
        if RESERVED_NAMES.contains(&name) {
            return Err(CompileError::Generation(format!(
                "the type name {} is reserved by the rust backend",
                quote(name)
            )));
        }
    }

    for model in &plan.models {
        let mut idents: HashMap<String, &str> = HashMap::new();
        for field in &model.fields {
            if let Some(other) = idents.insert(field_ident(field.name), field.name) {
                return Err(CompileError::Generation(format!(
                    "fields {} and {} of {} map to the same rust identifier",
                    quote(other),
                    quote(field.name),
                    model.name
                )));
            }
        }
    }
    Ok(())
}

fn element_type(element: Element<'_>) -> String {
    match element {
        Element::Primitive(p) => primitive_mapping(p).native.to_string(),
        Element::Enum(name) | Element::Model(name) => type_name(name),
    }
}

fn wire_kind(element: Element<'_>) -> &'static str {
    match element {
        Element::Primitive(p) => primitive_mapping(p).kind,
        Element::Enum(_) => "Kind::U32",
        Element::Model(_) => ANY.kind,
    }
}

fn field_type(field: &FieldPlan<'_>) -> String {
    let element = element_type(field.element);
    match (field.shape, field.value) {
        (Shape::Single, _) => match field.element {
            Element::Model(_) => format!("Option<Box<{}>>", element),
            _ => element,
        },
        (Shape::Array, _) => format!("Vec<{}>", element),
        (Shape::Map, Some(value)) => format!("Map<{}, {}>", element, element_type(value)),
        (Shape::Map, None) => format!("Map<{}, ()>", element),
    }
}

/// Writes one value. `expr` is a place expression, or a reference when
/// `by_ref` is set.
fn encode_stmt(element: Element<'_>, expr: &str, by_ref: bool) -> String {
    let (borrowed, copied) = if by_ref {
        (expr.to_string(), format!("*{}", expr))
    } else {
        (format!("&{}", expr), expr.to_string())
    };
    match element {
        Element::Primitive(p @ (Primitive::String | Primitive::Bytes)) => {
            format!("encoder.{}({});", primitive_mapping(p).encode, borrowed)
        }
        Element::Primitive(p) => format!("encoder.{}({});", primitive_mapping(p).encode, copied),
        Element::Enum(_) => format!("encoder.encode_u32({}.as_u32());", expr),
        Element::Model(_) => format!("signet_codec::encode_nested(encoder, {});", borrowed),
    }
}

fn decode_expr(element: Element<'_>) -> String {
    match element {
        Element::Primitive(p) => format!("decoder.{}()?", primitive_mapping(p).decode),
        Element::Enum(name) => format!("{}::from_u32(decoder.decode_u32()?)", type_name(name)),
        Element::Model(name) => format!("signet_codec::decode_message::<{}>(decoder)?", type_name(name)),
    }
}

fn render_enum(out: &mut Vec<String>, e: &EnumPlan<'_>) {
    let name = type_name(e.name);
    let variants: Vec<String> = e.values.iter().map(|v| type_name(v)).collect();
    let default = type_name(e.default);

    push(out, 1, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
    push(out, 1, format!("pub enum {} {{", name));
    for variant in &variants {
        push(out, 2, format!("{},", variant));
    }
    push(out, 1, "}");
    out.push(String::new());

    push(out, 1, format!("impl {} {{", name));
    let all: Vec<String> = variants.iter().map(|v| format!("{}::{}", name, v)).collect();
    push(out, 2, format!("pub const VALUES: [{}; {}] = [{}];", name, all.len(), all.join(", ")));
    out.push(String::new());
    push(out, 2, "pub fn as_u32(self) -> u32 {");
    push(out, 3, "self as u32");
    push(out, 2, "}");
    out.push(String::new());
    push(out, 2, "/// Unknown indexes decode to the default value.");
    push(out, 2, format!("pub fn from_u32(value: u32) -> {} {{", name));
    push(out, 3, "match value {");
    for (index, variant) in variants.iter().enumerate().skip(1) {
        push(out, 4, format!("{} => {}::{},", index, name, variant));
    }
    push(out, 4, format!("_ => {}::{},", name, default));
    push(out, 3, "}");
    push(out, 2, "}");
    out.push(String::new());
    push(out, 2, "pub fn name(self) -> &'static str {");
    push(out, 3, "match self {");
    for (variant, value) in variants.iter().zip(e.values.iter()) {
        push(out, 4, format!("{}::{} => {:?},", name, variant, value));
    }
    push(out, 3, "}");
    push(out, 2, "}");
    push(out, 1, "}");
    out.push(String::new());

    push(out, 1, format!("impl Default for {} {{", name));
    push(out, 2, format!("fn default() -> {} {{", name));
    push(out, 3, format!("{}::{}", name, default));
    push(out, 2, "}");
    push(out, 1, "}");
    out.push(String::new());

    push(out, 1, format!("impl MapKey for {} {{", name));
    push(out, 2, "fn hash_key<H: std::hash::Hasher>(&self, state: &mut H) {");
    push(out, 3, "std::hash::Hash::hash(self, state);");
    push(out, 2, "}");
    push(out, 1, "}");
}

fn render_model(out: &mut Vec<String>, model: &ModelPlan<'_>) {
    let name = type_name(model.name);

    if let Some(description) = model.description {
        for line in description.lines() {
            push(out, 1, format!("/// {}", line).trim_end());
        }
    }
    push(out, 1, "#[derive(Debug, Clone, PartialEq)]");
    push(out, 1, format!("pub struct {} {{", name));
    for field in &model.fields {
        let visibility = if field.accessor { "" } else { "pub " };
        push(out, 2, format!("{}{}: {},", visibility, field_ident(field.name), field_type(field)));
    }
    push(out, 1, "}");
    out.push(String::new());

    push(out, 1, format!("impl {} {{", name));
    push(out, 2, format!("pub fn new() -> {} {{", name));
    push(out, 3, format!("{} {{", name));
    for field in &model.fields {
        push(out, 4, format!("{}: {},", field_ident(field.name), initial_value(field)));
    }
    push(out, 3, "}");
    push(out, 2, "}");
    for field in model.fields.iter().filter(|f| f.accessor) {
        out.push(String::new());
        render_accessors(out, field);
    }
    push(out, 1, "}");
    out.push(String::new());

    push(out, 1, format!("impl Default for {} {{", name));
    push(out, 2, format!("fn default() -> {} {{", name));
    push(out, 3, format!("{}::new()", name));
    push(out, 2, "}");
    push(out, 1, "}");
    out.push(String::new());

    push(out, 1, format!("impl Message for {} {{", name));
    push(out, 2, "fn encode_fields(&self, encoder: &mut Encoder<'_>) {");
    for field in &model.fields {
        render_encode(out, field);
    }
    push(out, 2, "}");
    out.push(String::new());
    push(out, 2, "fn decode_fields(&mut self, decoder: &mut Decoder<'_>) -> Result<(), DecodeError> {");
    for field in &model.fields {
        render_decode(out, field);
    }
    push(out, 3, "Ok(())");
    push(out, 2, "}");
    push(out, 1, "}");
    out.push(String::new());

    // Collections and nested models are left out of the hash.
    push(out, 1, format!("impl MapKey for {} {{", name));
    push(out, 2, "fn hash_key<H: std::hash::Hasher>(&self, state: &mut H) {");
    for field in &model.fields {
        if field.shape == Shape::Single && !matches!(field.element, Element::Model(_)) {
            push(out, 3, format!("self.{}.hash_key(state);", field_ident(field.name)));
        }
    }
    push(out, 2, "}");
    push(out, 1, "}");
}

fn initial_value(field: &FieldPlan<'_>) -> String {
    match field.shape {
        Shape::Array => match field.initial_size {
            Some(size) => format!("Vec::with_capacity({})", size),
            None => "Vec::new()".to_string(),
        },
        Shape::Map => match field.initial_size {
            Some(size) => format!("Map::with_capacity({})", size),
            None => "Map::new()".to_string(),
        },
        Shape::Single => match field.element {
            Element::Model(name) if field.eager => format!("Some(Box::new({}::new()))", type_name(name)),
            Element::Model(_) => "None".to_string(),
            Element::Enum(name) => format!("{}::default()", type_name(name)),
            Element::Primitive(p) => default_literal(p, field.default),
        },
    }
}

fn default_literal(p: Primitive, default: Option<&Literal>) -> String {
    match (p, default) {
        (Primitive::String, Some(Literal::String(s))) => format!("String::from({:?})", s),
        (Primitive::String, _) => "String::new()".to_string(),
        (Primitive::Bool, Some(Literal::Bool(b))) => b.to_string(),
        (Primitive::Bool, _) => "false".to_string(),
        (Primitive::Bytes, _) => "Vec::new()".to_string(),
        (_, Some(Literal::Number(n))) => n.literal(),
        (p, _) if p.is_float() => "0.0".to_string(),
        _ => "0".to_string(),
    }
}

fn bound<T: ToString>(value: Option<T>) -> String {
    match value {
        Some(v) => format!("Some({})", v.to_string()),
        None => "None".to_string(),
    }
}

/// Validator and modifier statements applied to the owned variable `var`.
fn check_stmts(out: &mut Vec<String>, depth: usize, field: &FieldPlan<'_>, var: &str) {
    for check in &field.checks {
        match check {
            Check::Regex(expression) => {
                push(out, depth, format!("if !pattern.is_match(&{}) {{", var));
                push(out, depth + 1, format!("return Err(signet_codec::validation::mismatch({:?}));", expression));
                push(out, depth, "}");
            }
            Check::Length { min, max } => push(
                out,
                depth,
                format!(
                    "signet_codec::validation::check_length({}.len(), {}, {})?;",
                    var,
                    bound(*min),
                    bound(*max)
                ),
            ),
            Check::Case(CaseKind::Upper) => push(out, depth, format!("{} = {}.to_uppercase();", var, var)),
            Check::Case(CaseKind::Lower) => push(out, depth, format!("{} = {}.to_lowercase();", var, var)),
            Check::Case(CaseKind::None) => {}
            Check::Limit { minimum, maximum } => push(
                out,
                depth,
                format!(
                    "signet_codec::validation::check_limit({}, {}, {})?;",
                    var,
                    bound(minimum.map(|n| n.literal())),
                    bound(maximum.map(|n| n.literal()))
                ),
            ),
        }
    }
}

fn render_accessors(out: &mut Vec<String>, field: &FieldPlan<'_>) {
    let ident = field_ident(field.name);
    let method = to_snake_case(field.name);
    let ty = field_type(field);
    let modifies = field.has_check(|c| matches!(c, Check::Case(_)));
    let binding = if modifies { "mut " } else { "" };

    push(out, 2, format!("pub fn get_{}(&self) -> &{} {{", method, ty));
    push(out, 3, format!("&self.{}", ident));
    push(out, 2, "}");
    out.push(String::new());

    let param = if field.shape == Shape::Single { binding } else { "" };
    push(out, 2, format!("pub fn set_{}(&mut self, {}value: {}) -> Result<(), ValidationError> {{", method, param, ty));

    if let Some(Check::Regex(expression)) = field.checks.iter().find(|c| matches!(c, Check::Regex(_))) {
        push(out, 3, "static PATTERN: ::std::sync::OnceLock<Result<regex::Regex, regex::Error>> = ::std::sync::OnceLock::new();");
        push(out, 3, "let pattern = PATTERN");
        push(out, 4, format!(".get_or_init(|| regex::Regex::new({:?}))", expression));
        push(out, 4, ".as_ref()");
        push(out, 4, ".map_err(|err| ValidationError::new(err.to_string()))?;");
    }

    match field.shape {
        Shape::Single => check_stmts(out, 3, field, "value"),
        Shape::Array if field.is_guarded() => {
            push(out, 3, "let mut checked = Vec::with_capacity(value.len());");
            push(out, 3, format!("for {}item in value {{", binding));
            check_stmts(out, 4, field, "item");
            push(out, 4, "checked.push(item);");
            push(out, 3, "}");
            push(out, 3, "let value = checked;");
        }
        Shape::Map if field.is_guarded() => {
            push(out, 3, "let mut checked = Vec::with_capacity(value.len());");
            push(out, 3, format!("for ({}key, item) in value {{", binding));
            check_stmts(out, 4, field, "key");
            push(out, 4, "checked.push((key, item));");
            push(out, 3, "}");
            push(out, 3, "let value = Map::from_entries(checked);");
        }
        _ => {}
    }

    push(out, 3, format!("self.{} = value;", ident));
    push(out, 3, "Ok(())");
    push(out, 2, "}");
}

fn render_encode(out: &mut Vec<String>, field: &FieldPlan<'_>) {
    let place = format!("self.{}", field_ident(field.name));
    match field.shape {
        Shape::Single => match field.element {
            Element::Model(_) => push(out, 3, format!("signet_codec::encode_optional(encoder, &{});", place)),
            element => push(out, 3, encode_stmt(element, &place, false)),
        },
        Shape::Array => {
            push(out, 3, format!("encoder.encode_slice({}.len(), {});", place, wire_kind(field.element)));
            push(out, 3, format!("for item in &{} {{", place));
            push(out, 4, encode_stmt(field.element, "item", true));
            push(out, 3, "}");
        }
        Shape::Map => {
            let value = field.value.unwrap_or(Element::Primitive(Primitive::Bool));
            push(
                out,
                3,
                format!(
                    "encoder.encode_map({}.len(), {}, {});",
                    place,
                    wire_kind(field.element),
                    wire_kind(value)
                ),
            );
            push(out, 3, format!("for (key, item) in &{} {{", place));
            push(out, 4, encode_stmt(field.element, "key", true));
            push(out, 4, encode_stmt(value, "item", true));
            push(out, 3, "}");
        }
    }
}

fn render_decode(out: &mut Vec<String>, field: &FieldPlan<'_>) {
    let place = format!("self.{}", field_ident(field.name));
    push(out, 3, "if decoder.is_empty() {");
    push(out, 4, "return Ok(());");
    push(out, 3, "}");
    match field.shape {
        Shape::Single => match field.element {
            Element::Model(_) => push(out, 3, format!("{} = signet_codec::decode_optional(decoder)?;", place)),
            element => push(out, 3, format!("{} = {};", place, decode_expr(element))),
        },
        Shape::Array => {
            push(out, 3, format!("let len = decoder.decode_slice({})?;", wire_kind(field.element)));
            push(out, 3, "let mut items = Vec::with_capacity(len.min(decoder.remaining()));");
            push(out, 3, "for _ in 0..len {");
            push(out, 4, format!("items.push({});", decode_expr(field.element)));
            push(out, 3, "}");
            push(out, 3, format!("{} = items;", place));
        }
        Shape::Map => {
            let value = field.value.unwrap_or(Element::Primitive(Primitive::Bool));
            push(
                out,
                3,
                format!(
                    "let len = decoder.decode_map({}, {})?;",
                    wire_kind(field.element),
                    wire_kind(value)
                ),
            );
            push(out, 3, "let mut entries = Vec::with_capacity(len.min(decoder.remaining()));");
            push(out, 3, "for _ in 0..len {");
            push(out, 4, format!("let key = {};", decode_expr(field.element)));
            push(out, 4, format!("let item = {};", decode_expr(value)));
            push(out, 4, "entries.push((key, item));");
            push(out, 3, "}");
            push(out, 3, format!("{} = Map::from_entries(entries);", place));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_schema;

    fn render(text: &str) -> String {
        let valid = compile_schema(text).unwrap();
        RustBackend
            .render(&Plan::new(&valid), &GenerateOptions::new("types", "v0.0.1"))
            .unwrap()
    }

    const ACCESSOR_SCHEMA: &str = r#"
        version = "v1alpha"
        name = "N"
        tag = "T"
        model M {
            string S {
                default = "DefaultValue"
                accessor = true
                regex_validator { expression = "^[a-zA-Z0-9]*$" }
                length_validator {
                    min = 1
                    max = 20
                }
                case_modifier { kind = "upper" }
            }
            int32 Count {
                default = 32
                limit_validator {
                    minimum = 0
                    maximum = 100
                }
            }
        }
    "#;

    #[test]
    fn test_header_and_module() {
        let source = render(ACCESSOR_SCHEMA);
        assert!(source.starts_with("// Code generated by signet v0.0.1 from schema \"N\" (tag \"T\"). DO NOT EDIT."));
        assert!(source.contains("pub mod types {"));
        assert!(!source.contains("#!["));
    }

    #[test]
    fn test_accessor_fields_are_private() {
        let source = render(ACCESSOR_SCHEMA);
        assert!(source.contains("        s: String,\n"));
        assert!(source.contains("        count: i32,\n"));
        assert!(source.contains("s: String::from(\"DEFAULTVALUE\"),"));
        assert!(source.contains("count: 32,"));
        assert!(source.contains("pub fn get_s(&self) -> &String {"));
        assert!(source.contains("pub fn set_s(&mut self, mut value: String) -> Result<(), ValidationError> {"));
        assert!(source.contains("pub fn set_count(&mut self, value: i32) -> Result<(), ValidationError> {"));
    }

    #[test]
    fn test_setter_check_order() {
        let source = render(ACCESSOR_SCHEMA);
        let regex = source.find("pattern.is_match(&value)").unwrap();
        let length = source.find("check_length(value.len(), Some(1), Some(20))").unwrap();
        let case = source.find("value = value.to_uppercase();").unwrap();
        assert!(regex < length && length < case);
        assert!(source.contains("check_limit(value, Some(0), Some(100))?;"));
    }

    #[test]
    fn test_encode_follows_declaration_order() {
        let source = render(
            r#"
            version = "v1alpha"
            name = "N"
            tag = "T"
            model M {
                int64 Zed { }
                string_array Alpha { }
                float32_map Mid { value = "Other" }
                model Other { reference = "Other" }
            }
            model Other { }
            "#,
        );
        let zed = source.find("encoder.encode_i64(self.zed);").unwrap();
        let alpha = source.find("encoder.encode_slice(self.alpha.len(), Kind::String);").unwrap();
        let mid = source.find("encoder.encode_map(self.mid.len(), Kind::F32, Kind::Any);").unwrap();
        let other = source.find("signet_codec::encode_optional(encoder, &self.other);").unwrap();
        assert!(zed < alpha && alpha < mid && mid < other);

        let zed = source.find("self.zed = decoder.decode_i64()?;").unwrap();
        let alpha = source.find("let len = decoder.decode_slice(Kind::String)?;").unwrap();
        let mid = source.find("let len = decoder.decode_map(Kind::F32, Kind::Any)?;").unwrap();
        let other = source.find("self.other = signet_codec::decode_optional(decoder)?;").unwrap();
        assert!(zed < alpha && alpha < mid && mid < other);

        assert!(source.contains("pub mid: Map<f32, Other>,"));
        assert!(source.contains("other: Some(Box::new(Other::new())),"));
    }

    #[test]
    fn test_map_decoding_collects_entries() {
        let source = render(
            r#"
            version = "v1alpha"
            name = "N"
            tag = "T"
            model M {
                int64 Zed { }
                string_array Alpha { }
                float32_map Mid { value = "Other" }
            }
            model Other { }
            "#,
        );
        assert!(source.contains("entries.push((key, item));"));
        assert!(source.contains("self.mid = Map::from_entries(entries);"));
        assert!(!source.contains("entries.insert"));

        let hash = source.find("impl MapKey for M {").unwrap();
        let body = &source[hash..source[hash..].find("\n    }\n").unwrap() + hash];
        assert!(body.contains("self.zed.hash_key(state);"));
        assert!(!body.contains("self.alpha"));
        assert!(source.contains("impl MapKey for Other {"));
    }

    #[test]
    fn test_enum_rendering() {
        let source = render(
            r#"
            version = "v1alpha"
            name = "N"
            tag = "T"
            enum Level {
                default = "Medium"
                values = ["Low", "Medium", "High"]
            }
            model M {
                enum_array Levels {
                    reference = "Level"
                    initial_size = 8
                }
            }
            "#,
        );
        assert!(source.contains("pub const VALUES: [Level; 3] = [Level::Medium, Level::Low, Level::High];"));
        assert!(source.contains("1 => Level::Low,"));
        assert!(source.contains("_ => Level::Medium,"));
        assert!(source.contains("levels: Vec::with_capacity(8),"));
        assert!(source.contains("encoder.encode_u32(item.as_u32());"));
        assert!(source.contains("items.push(Level::from_u32(decoder.decode_u32()?));"));
    }

    #[test]
    fn test_self_reference_starts_empty() {
        let source = render(
            r#"
            version = "v1alpha"
            name = "N"
            tag = "T"
            model Node {
                model Next { reference = "Node" }
            }
            "#,
        );
        assert!(source.contains("next: None,"));
    }

    #[test]
    fn test_reserved_names() {
        let valid = compile_schema("version = \"v1alpha\"\nname = \"N\"\ntag = \"T\"\nmodel Map { }").unwrap();
        let err = RustBackend
            .render(&Plan::new(&valid), &GenerateOptions::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::Generation(_)));
    }

    #[test]
    fn test_keywords_are_escaped() {
        let source = render(
            r#"
            version = "v1alpha"
            name = "N"
            tag = "T"
            model Self {
                string Type { }
            }
            "#,
        );
        assert!(source.contains("pub struct Self_ {"));
        assert!(source.contains("pub type_: String,"));
    }
}
