//! Go backend. The output is one file in `package <package>` built on the
//! polyglot runtime (`polyglot.Buffer`, `polyglot.Encoder`,
//! `polyglot.GetDecoder`). The decoder exposes no unread length, so a failed
//! first read of a field marks the end of an older writer's output and the
//! remaining fields keep their defaults.
//!
//! Validation messages are rendered at generation time with the same wording
//! the Rust runtime produces, so both targets reject a value with identical
//! errors.

use super::{
    plan::{Check, Element, EnumPlan, FieldPlan, ModelPlan, Plan},
    Backend, Formatter, GenerateOptions, TypeMapping,
};
use crate::{
    error::CompileError,
    primitive::Primitive,
    types::{CaseKind, Literal, Shape},
    utils::{escape_leading_digit, quote, to_lower_first},
    verifier::range_message,
};
use std::collections::HashMap;

const POLYGLOT_IMPORT: &str = "github.com/loopholelabs/polyglot-go";

const GO_KEYWORDS: [&str; 25] = [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Methods every generated model carries.
const MODEL_METHODS: [&str; 4] = ["Encode", "encodeBytes", "Decode", "decode"];

const ANY: TypeMapping = TypeMapping {
    native: "",
    kind:   "polyglot.AnyKind",
    encode: "",
    decode: "",
};

#[derive(Debug, Clone, Copy, Default)]
pub struct GoBackend;

impl Backend for GoBackend {
    fn name(&self) -> &'static str {
        "go"
    }

    fn file_name(&self) -> &'static str {
        "generated.go"
    }

    fn mapping(&self, kind: &str) -> TypeMapping {
        match Primitive::from_name(kind) {
            Some(p) => primitive_mapping(p),
            None => ANY,
        }
    }

    fn formatter(&self) -> Formatter {
        Formatter::gofmt()
    }

    fn render(&self, plan: &Plan<'_>, options: &GenerateOptions) -> Result<String, CompileError> {
        let package = options.package_name()?;
        if GO_KEYWORDS.contains(&package) {
            return Err(CompileError::Generation(format!(
                "{} is not a valid go package name",
                quote(package)
            )));
        }
        check_names(plan)?;

        let patterns: Vec<(String, &str)> = plan
            .models
            .iter()
            .flat_map(|model| {
                model.fields.iter().filter(|f| f.accessor).filter_map(move |f| {
                    f.checks.iter().find_map(|c| match c {
                        Check::Regex(expression) => Some((pattern_var(model.name, f.name), *expression)),
                        _ => None,
                    })
                })
            })
            .collect();
        let uses_strings = plan.models.iter().any(|m| {
            m.fields
                .iter()
                .any(|f| f.accessor && f.has_check(|c| matches!(c, Check::Case(_))))
        });

        let mut out: Vec<String> = Vec::new();
        out.push(format!(
            "// Code generated by signet {} from schema {} (tag {}). DO NOT EDIT.",
            options.version,
            quote(plan.name),
            quote(plan.tag)
        ));
        out.push(String::new());
        out.push(format!("package {}", package));
        out.push(String::new());
        out.push("import (".to_string());
        push(&mut out, 1, quote("errors"));
        if !patterns.is_empty() {
            push(&mut out, 1, quote("regexp"));
        }
        if uses_strings {
            push(&mut out, 1, quote("strings"));
        }
        if !plan.models.is_empty() {
            out.push(String::new());
            push(&mut out, 1, quote(POLYGLOT_IMPORT));
        }
        out.push(")".to_string());
        out.push(String::new());

        out.push("const (".to_string());
        push(&mut out, 1, format!("SchemaName = {}", quote(plan.name)));
        push(&mut out, 1, format!("SchemaTag = {}", quote(plan.tag)));
        push(&mut out, 1, format!("GeneratorVersion = {}", quote(&options.version)));
        out.push(")".to_string());
        out.push(String::new());

        out.push("var (".to_string());
        push(&mut out, 1, "ErrNilDecode = errors.New(\"cannot decode into a nil root struct\")");
        for (var, expression) in &patterns {
            push(&mut out, 1, format!("{} = regexp.MustCompile({})", var, quote(expression)));
        }
        out.push(")".to_string());

        for e in &plan.enums {
            out.push(String::new());
            render_enum(&mut out, e);
        }
        for model in &plan.models {
            out.push(String::new());
            render_model(&mut out, model);
        }
        Ok(out.join("\n") + "\n")
    }
}

fn primitive_mapping(p: Primitive) -> TypeMapping {
    let (native, kind, method) = match p {
        Primitive::String => ("string", "polyglot.StringKind", "String"),
        Primitive::Int32 => ("int32", "polyglot.Int32Kind", "Int32"),
        Primitive::Int64 => ("int64", "polyglot.Int64Kind", "Int64"),
        Primitive::Uint32 => ("uint32", "polyglot.Uint32Kind", "Uint32"),
        Primitive::Uint64 => ("uint64", "polyglot.Uint64Kind", "Uint64"),
        Primitive::Float32 => ("float32", "polyglot.Float32Kind", "Float32"),
        Primitive::Float64 => ("float64", "polyglot.Float64Kind", "Float64"),
        Primitive::Bool => ("bool", "polyglot.BoolKind", "Bool"),
        Primitive::Bytes => ("[]byte", "polyglot.BytesKind", "Bytes"),
    };
    TypeMapping {
        native,
        kind,
        encode: method,
        decode: method,
    }
}

fn push(out: &mut Vec<String>, depth: usize, line: impl AsRef<str>) {
    out.push(format!("{}{}", "\t".repeat(depth), line.as_ref()));
}

fn type_name(name: &str) -> String {
    escape_leading_digit(name)
}

/// Struct field identifier. Accessor-guarded fields are unexported.
fn field_ident(field: &FieldPlan<'_>) -> String {
    if !field.accessor {
        return escape_leading_digit(field.name);
    }
    let ident = escape_leading_digit(&to_lower_first(field.name));
    if GO_KEYWORDS.contains(&ident.as_str()) {
        format!("{}_", ident)
    } else {
        ident
    }
}

fn pattern_var(model: &str, field: &str) -> String {
    format!("{}{}Pattern", to_lower_first(&type_name(model)), field)
}

fn enum_const(e: &str, value: &str) -> String {
    format!("{}{}", type_name(e), value)
}

fn check_names(plan: &Plan<'_>) -> Result<(), CompileError> {
    let mut globals: HashMap<String, String> = HashMap::new();
    let mut claim = |name: String, what: String| -> Result<(), CompileError> {
        match globals.insert(name.clone(), what.clone()) {
            Some(other) => Err(CompileError::Generation(format!(
                "{} and {} both map to the go identifier {}",
                other, what, name
            ))),
            None => Ok(()),
        }
    };

    for name in ["SchemaName", "SchemaTag", "GeneratorVersion", "ErrNilDecode"] {
        claim(name.to_string(), format!("constant {}", name))?;
    }
    for e in &plan.enums {
        claim(type_name(e.name), format!("enum {}", e.name))?;
        claim(format!("{}Values", type_name(e.name)), format!("enum {}", e.name))?;
        claim(format!("decode{}", type_name(e.name)), format!("enum {}", e.name))?;
        claim(format!("{}Names", to_lower_first(&type_name(e.name))), format!("enum {}", e.name))?;
        for value in e.values {
            claim(enum_const(e.name, value), format!("value {}.{}", e.name, value))?;
        }
    }
    for model in &plan.models {
        claim(type_name(model.name), format!("model {}", model.name))?;
        claim(format!("New{}", type_name(model.name)), format!("model {}", model.name))?;
        for field in model.fields.iter().filter(|f| f.accessor) {
            if field.has_check(|c| matches!(c, Check::Regex(_))) {
                claim(
                    pattern_var(model.name, field.name),
                    format!("field {}.{}", model.name, field.name),
                )?;
            }
        }
    }

    for model in &plan.models {
        let mut members: HashMap<String, String> = MODEL_METHODS
            .iter()
            .map(|m| (m.to_string(), format!("method {}", m)))
            .collect();
        for field in &model.fields {
            let mut idents = vec![field_ident(field)];
            if field.accessor {
                idents.push(format!("Get{}", field.name));
                idents.push(format!("Set{}", field.name));
            }
            for ident in idents {
                let what = format!("field {}", quote(field.name));
                if let Some(other) = members.insert(ident.clone(), what.clone()) {
                    return Err(CompileError::Generation(format!(
                        "{} and {} of {} both map to the go identifier {}",
                        other, what, model.name, ident
                    )));
                }
            }
        }
    }
    Ok(())
}

fn element_type(element: Element<'_>, key: bool) -> String {
    match element {
        Element::Primitive(Primitive::Bytes) if key => "string".to_string(),
        Element::Primitive(p) => primitive_mapping(p).native.to_string(),
        Element::Enum(name) => type_name(name),
        Element::Model(name) => format!("*{}", type_name(name)),
    }
}

fn wire_kind(element: Element<'_>) -> &'static str {
    match element {
        Element::Primitive(p) => primitive_mapping(p).kind,
        Element::Enum(_) => "polyglot.Uint32Kind",
        Element::Model(_) => ANY.kind,
    }
}

fn map_value(field: &FieldPlan<'_>) -> Element<'static> {
    match field.value {
        Some(Element::Primitive(p)) => Element::Primitive(p),
        _ => Element::Primitive(Primitive::Bool),
    }
}

fn field_type(field: &FieldPlan<'_>) -> String {
    match field.shape {
        Shape::Single => match field.element {
            Element::Model(name) => format!("*{}", type_name(name)),
            element => element_type(element, false),
        },
        Shape::Array => format!("[]{}", element_type(field.element, false)),
        Shape::Map => {
            let value = match field.value {
                Some(value) => element_type(value, false),
                None => element_type(map_value(field), false),
            };
            format!("map[{}]{}", element_type(field.element, true), value)
        }
    }
}

fn encode_stmt(element: Element<'_>, expr: &str, key: bool) -> String {
    match element {
        Element::Primitive(Primitive::Bytes) if key => format!("e.Bytes([]byte({}))", expr),
        Element::Primitive(p) => format!("e.{}({})", primitive_mapping(p).encode, expr),
        Element::Enum(_) => format!("e.Uint32(uint32({}))", expr),
        Element::Model(_) => format!("e.Bytes({}.encodeBytes())", expr),
    }
}

/// How a failed read returns from `decode`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum OnError {
    Fail,
    /// The first read of a field: the payload ended, keep the defaults.
    Stop,
}

/// Declares `var` from the next value. Model elements become pointers.
fn decode_stmts(
    out: &mut Vec<String>,
    depth: usize,
    element: Element<'_>,
    var: &str,
    key: bool,
    first: OnError,
) {
    let raw = format!("{}Raw", var);
    match element {
        Element::Primitive(Primitive::Bytes) if key => {
            push(out, depth, format!("{}, err := d.Bytes(nil)", raw));
            return_on_err(out, depth, first);
            push(out, depth, format!("{} := string({})", var, raw));
        }
        Element::Primitive(Primitive::Bytes) => {
            push(out, depth, format!("{}, err := d.Bytes(nil)", var));
            return_on_err(out, depth, first);
        }
        Element::Primitive(p) => {
            push(out, depth, format!("{}, err := d.{}()", var, primitive_mapping(p).decode));
            return_on_err(out, depth, first);
        }
        Element::Enum(name) => {
            push(out, depth, format!("{}, err := d.Uint32()", raw));
            return_on_err(out, depth, first);
            push(out, depth, format!("{} := decode{}({})", var, type_name(name), raw));
        }
        Element::Model(name) => {
            let nested = format!("{}Decoder", var);
            push(out, depth, format!("{}, err := d.Bytes(nil)", raw));
            return_on_err(out, depth, first);
            push(out, depth, format!("{} := New{}()", var, type_name(name)));
            push(out, depth, format!("{} := polyglot.GetDecoder({})", nested, raw));
            push(out, depth, format!("err = {}.decode({})", var, nested));
            push(out, depth, format!("{}.Return()", nested));
            return_on_err(out, depth, OnError::Fail);
        }
    }
}

fn return_on_err(out: &mut Vec<String>, depth: usize, on_error: OnError) {
    push(out, depth, "if err != nil {");
    match on_error {
        OnError::Fail => push(out, depth + 1, "return err"),
        OnError::Stop => push(out, depth + 1, "return nil"),
    }
    push(out, depth, "}");
}

fn render_enum(out: &mut Vec<String>, e: &EnumPlan<'_>) {
    let name = type_name(e.name);
    let consts: Vec<String> = e.values.iter().map(|v| enum_const(e.name, v)).collect();

    push(out, 0, format!("type {} uint32", name));
    out.push(String::new());
    push(out, 0, "const (");
    for (index, constant) in consts.iter().enumerate() {
        push(out, 1, format!("{} {} = {}", constant, name, index));
    }
    push(out, 0, ")");
    out.push(String::new());
    push(out, 0, format!("var {}Values = []{}{{{}}}", name, name, consts.join(", ")));
    out.push(String::new());
    let names: Vec<String> = e.values.iter().map(|v| quote(v)).collect();
    push(out, 0, format!("var {}Names = []string{{{}}}", to_lower_first(&name), names.join(", ")));
    out.push(String::new());
    push(out, 0, format!("func (x {}) String() string {{", name));
    push(out, 1, format!("if int(x) < len({}Names) {{", to_lower_first(&name)));
    push(out, 2, format!("return {}Names[x]", to_lower_first(&name)));
    push(out, 1, "}");
    push(out, 1, format!("return {}Names[0]", to_lower_first(&name)));
    push(out, 0, "}");
    out.push(String::new());
    push(out, 0, format!("// decode{} maps unknown indexes to {}.", name, consts[0]));
    push(out, 0, format!("func decode{}(v uint32) {} {{", name, name));
    push(out, 1, format!("if v < uint32(len({}Values)) {{", name));
    push(out, 2, format!("return {}(v)", name));
    push(out, 1, "}");
    push(out, 1, format!("return {}", consts[0]));
    push(out, 0, "}");
}

fn render_model(out: &mut Vec<String>, model: &ModelPlan<'_>) {
    let name = type_name(model.name);

    if let Some(description) = model.description {
        for line in description.lines() {
            push(out, 0, format!("// {}", line).trim_end());
        }
    }
    push(out, 0, format!("type {} struct {{", name));
    for field in &model.fields {
        push(out, 1, format!("{} {}", field_ident(field), field_type(field)));
    }
    push(out, 0, "}");
    out.push(String::new());

    push(out, 0, format!("func New{}() *{} {{", name, name));
    push(out, 1, format!("return &{}{{", name));
    for field in &model.fields {
        push(out, 2, format!("{}: {},", field_ident(field), initial_value(field)));
    }
    push(out, 1, "}");
    push(out, 0, "}");

    for field in model.fields.iter().filter(|f| f.accessor) {
        out.push(String::new());
        render_accessors(out, &name, field);
    }
    out.push(String::new());

    push(out, 0, format!("func (x *{}) Encode(b *polyglot.Buffer) {{", name));
    if !model.fields.is_empty() {
        push(out, 1, "e := polyglot.Encoder(b)");
    }
    for field in &model.fields {
        render_encode(out, field);
    }
    push(out, 0, "}");
    out.push(String::new());
    push(out, 0, format!("func (x *{}) encodeBytes() []byte {{", name));
    push(out, 1, "if x == nil {");
    push(out, 2, format!("x = New{}()", name));
    push(out, 1, "}");
    push(out, 1, "b := polyglot.NewBuffer()");
    push(out, 1, "x.Encode(b)");
    push(out, 1, "return b.Bytes()");
    push(out, 0, "}");
    out.push(String::new());

    push(out, 0, format!("func (x *{}) Decode(data []byte) error {{", name));
    push(out, 1, "if x == nil {");
    push(out, 2, "return ErrNilDecode");
    push(out, 1, "}");
    push(out, 1, "d := polyglot.GetDecoder(data)");
    push(out, 1, "defer d.Return()");
    push(out, 1, "return x.decode(d)");
    push(out, 0, "}");
    out.push(String::new());
    push(out, 0, format!("func (x *{}) decode(d *polyglot.Decoder) error {{", name));
    for field in &model.fields {
        render_decode(out, field);
    }
    push(out, 1, "return nil");
    push(out, 0, "}");
}

fn initial_value(field: &FieldPlan<'_>) -> String {
    match field.shape {
        Shape::Array => format!("make({}, 0, {})", field_type(field), field.initial_size.unwrap_or(0)),
        Shape::Map => match field.initial_size {
            Some(size) => format!("make({}, {})", field_type(field), size),
            None => format!("make({})", field_type(field)),
        },
        Shape::Single => match field.element {
            Element::Model(name) if field.eager => format!("New{}()", type_name(name)),
            Element::Model(_) => "nil".to_string(),
            Element::Enum(name) => format!("{}(0)", type_name(name)),
            Element::Primitive(p) => default_literal(p, field.default),
        },
    }
}

fn default_literal(p: Primitive, default: Option<&Literal>) -> String {
    match (p, default) {
        (Primitive::String, Some(Literal::String(s))) => quote(s),
        (Primitive::String, _) => "\"\"".to_string(),
        (Primitive::Bool, Some(Literal::Bool(b))) => b.to_string(),
        (Primitive::Bool, _) => "false".to_string(),
        (Primitive::Bytes, _) => "make([]byte, 0)".to_string(),
        (_, Some(Literal::Number(n))) => n.literal(),
        _ => "0".to_string(),
    }
}

fn check_stmts(out: &mut Vec<String>, depth: usize, pattern: &str, field: &FieldPlan<'_>, var: &str) {
    for check in &field.checks {
        match check {
            Check::Regex(expression) => {
                push(out, depth, format!("if !{}.MatchString({}) {{", pattern, var));
                push(
                    out,
                    depth + 1,
                    format!("return errors.New({})", quote(&format!("value must match {}", expression))),
                );
                push(out, depth, "}");
            }
            Check::Length { min, max } => {
                let mut conditions = Vec::new();
                if let Some(min) = min {
                    conditions.push(format!("len({}) < {}", var, min));
                }
                if let Some(max) = max {
                    conditions.push(format!("len({}) > {}", var, max));
                }
                if conditions.is_empty() {
                    continue;
                }
                let message = range_message("length", min.map(|n| n.to_string()), max.map(|n| n.to_string()));
                push(out, depth, format!("if {} {{", conditions.join(" || ")));
                push(out, depth + 1, format!("return errors.New({})", quote(&message)));
                push(out, depth, "}");
            }
            // Full Unicode folding; differs from Rust's for a few letters such as 'ß'.
            Check::Case(CaseKind::Upper) => push(out, depth, format!("{} = strings.ToUpper({})", var, var)),
            Check::Case(CaseKind::Lower) => push(out, depth, format!("{} = strings.ToLower({})", var, var)),
            Check::Case(CaseKind::None) => {}
            Check::Limit { minimum, maximum } => {
                let mut conditions = Vec::new();
                if let Some(minimum) = minimum {
                    conditions.push(format!("{} < {}", var, minimum.literal()));
                }
                if let Some(maximum) = maximum {
                    conditions.push(format!("{} > {}", var, maximum.literal()));
                }
                if conditions.is_empty() {
                    continue;
                }
                let message = range_message(
                    "value",
                    minimum.map(|n| n.to_string()),
                    maximum.map(|n| n.to_string()),
                );
                push(out, depth, format!("if {} {{", conditions.join(" || ")));
                push(out, depth + 1, format!("return errors.New({})", quote(&message)));
                push(out, depth, "}");
            }
        }
    }
}

fn render_accessors(out: &mut Vec<String>, model: &str, field: &FieldPlan<'_>) {
    let ident = field_ident(field);
    let ty = field_type(field);
    let pattern = pattern_var(model, field.name);

    push(out, 0, format!("func (x *{}) Get{}() ({}, error) {{", model, field.name, ty));
    push(out, 1, format!("return x.{}, nil", ident));
    push(out, 0, "}");
    out.push(String::new());

    push(out, 0, format!("func (x *{}) Set{}(v {}) error {{", model, field.name, ty));
    match field.shape {
        Shape::Single => check_stmts(out, 1, &pattern, field, "v"),
        Shape::Array if field.is_guarded() => {
            push(out, 1, format!("checked := make({}, 0, len(v))", ty));
            push(out, 1, "for _, item := range v {");
            check_stmts(out, 2, &pattern, field, "item");
            push(out, 2, "checked = append(checked, item)");
            push(out, 1, "}");
            push(out, 1, "v = checked");
        }
        Shape::Map if field.is_guarded() => {
            push(out, 1, format!("checked := make({}, len(v))", ty));
            push(out, 1, "for key, item := range v {");
            check_stmts(out, 2, &pattern, field, "key");
            push(out, 2, "checked[key] = item");
            push(out, 1, "}");
            push(out, 1, "v = checked");
        }
        _ => {}
    }
    push(out, 1, format!("x.{} = v", ident));
    push(out, 1, "return nil");
    push(out, 0, "}");
}

fn render_encode(out: &mut Vec<String>, field: &FieldPlan<'_>) {
    let place = format!("x.{}", field_ident(field));
    match field.shape {
        Shape::Single => match field.element {
            Element::Model(_) => {
                push(out, 1, format!("if {} == nil {{", place));
                push(out, 2, "e.Nil()");
                push(out, 1, "} else {");
                push(out, 2, encode_stmt(field.element, &place, false));
                push(out, 1, "}");
            }
            element => push(out, 1, encode_stmt(element, &place, false)),
        },
        Shape::Array => {
            push(out, 1, format!("e.Slice(uint32(len({})), {})", place, wire_kind(field.element)));
            push(out, 1, format!("for _, v := range {} {{", place));
            push(out, 2, encode_stmt(field.element, "v", false));
            push(out, 1, "}");
        }
        Shape::Map => {
            let value = field.value.unwrap_or(map_value(field));
            push(
                out,
                1,
                format!(
                    "e.Map(uint32(len({})), {}, {})",
                    place,
                    wire_kind(field.element),
                    wire_kind(value)
                ),
            );
            push(out, 1, format!("for k, v := range {} {{", place));
            push(out, 2, encode_stmt(field.element, "k", true));
            push(out, 2, encode_stmt(value, "v", false));
            push(out, 1, "}");
        }
    }
}

fn render_decode(out: &mut Vec<String>, field: &FieldPlan<'_>) {
    let place = format!("x.{}", field_ident(field));
    match field.shape {
        Shape::Single => match field.element {
            Element::Model(_) => {
                push(out, 1, "if d.Nil() {");
                push(out, 2, format!("{} = nil", place));
                push(out, 1, "} else {");
                decode_stmts(out, 2, field.element, "v", false, OnError::Stop);
                push(out, 2, format!("{} = v", place));
                push(out, 1, "}");
            }
            element => {
                push(out, 1, "{");
                decode_stmts(out, 2, element, "v", false, OnError::Stop);
                push(out, 2, format!("{} = v", place));
                push(out, 1, "}");
            }
        },
        Shape::Array => {
            push(out, 1, "{");
            push(out, 2, format!("n, err := d.Slice({})", wire_kind(field.element)));
            return_on_err(out, 2, OnError::Stop);
            push(out, 2, format!("items := make({}, 0, n)", field_type(field)));
            push(out, 2, "for i := uint32(0); i < n; i++ {");
            decode_stmts(out, 3, field.element, "v", false, OnError::Fail);
            push(out, 3, "items = append(items, v)");
            push(out, 2, "}");
            push(out, 2, format!("{} = items", place));
            push(out, 1, "}");
        }
        Shape::Map => {
            let value = field.value.unwrap_or(map_value(field));
            push(out, 1, "{");
            push(
                out,
                2,
                format!("n, err := d.Map({}, {})", wire_kind(field.element), wire_kind(value)),
            );
            return_on_err(out, 2, OnError::Stop);
            push(out, 2, format!("entries := make({}, n)", field_type(field)));
            push(out, 2, "for i := uint32(0); i < n; i++ {");
            decode_stmts(out, 3, field.element, "k", true, OnError::Fail);
            decode_stmts(out, 3, value, "v", false, OnError::Fail);
            push(out, 3, "entries[k] = v");
            push(out, 2, "}");
            push(out, 2, format!("{} = entries", place));
            push(out, 1, "}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_schema;

    fn render(text: &str) -> String {
        let valid = compile_schema(text).unwrap();
        GoBackend
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
            float64 Ratio {
                default = 0.5
                limit_validator { minimum = 0.25 }
            }
        }
    "#;

    #[test]
    fn test_header_and_imports() {
        let source = render(ACCESSOR_SCHEMA);
        assert!(source.starts_with("// Code generated by signet v0.0.1 from schema \"N\" (tag \"T\"). DO NOT EDIT.\n\npackage types\n"));
        assert!(source.contains("\t\"regexp\"\n"));
        assert!(source.contains("\t\"strings\"\n"));
        assert!(source.contains("\t\"github.com/loopholelabs/polyglot-go\"\n"));
        assert!(source.contains("\tmSPattern = regexp.MustCompile(\"^[a-zA-Z0-9]*$\")"));
    }

    #[test]
    fn test_unused_imports_are_left_out() {
        let source = render("version = \"v1alpha\"\nname = \"N\"\ntag = \"T\"\nmodel Empty { }");
        assert!(!source.contains("\"regexp\""));
        assert!(!source.contains("\"strings\""));
        assert!(source.contains("\t\"github.com/loopholelabs/polyglot-go\"\n"));
        assert!(source.contains("func (x *Empty) Encode(b *polyglot.Buffer) {\n}"));
    }

    #[test]
    fn test_accessors() {
        let source = render(ACCESSOR_SCHEMA);
        assert!(source.contains("\ts string\n"));
        assert!(source.contains("\t\ts: \"DEFAULTVALUE\",\n"));
        assert!(source.contains("\t\tratio: 0.5,\n"));
        assert!(source.contains("if v < 0.25 {"));
        assert!(source.contains("return errors.New(\"value must be at least 0.25\")"));
        assert!(source.contains("func (x *M) GetS() (string, error) {"));
        assert!(source.contains("\treturn x.s, nil\n"));
        assert!(source.contains("func (x *M) SetS(v string) error {"));

        let regex = source.find("if !mSPattern.MatchString(v) {").unwrap();
        let length = source.find("if len(v) < 1 || len(v) > 20 {").unwrap();
        let case = source.find("v = strings.ToUpper(v)").unwrap();
        assert!(regex < length && length < case);
        assert!(source.contains("return errors.New(\"length must be between 1 and 20\")"));
        assert!(source.contains("return errors.New(\"value must match ^[a-zA-Z0-9]*$\")"));
    }

    #[test]
    fn test_collections_and_models() {
        let source = render(
            r#"
            version = "v1alpha"
            name = "N"
            tag = "T"
            enum Level {
                default = "Low"
                values = ["Low", "High"]
            }
            model M {
                bytes_map Blobs { value = "int32" }
                model_array Others {
                    reference = "Other"
                    initial_size = 4
                }
                enum Level { reference = "Level" }
                model Next { reference = "M" }
            }
            model Other { }
            "#,
        );
        assert!(source.contains("\tBlobs map[string]int32\n"));
        assert!(source.contains("\tOthers []*Other\n"));
        assert!(source.contains("\tNext *M\n"));
        assert!(source.contains("\t\tOthers: make([]*Other, 0, 4),\n"));
        assert!(source.contains("\t\tNext: nil,\n"));
        assert!(source.contains("\t\tLevel: Level(0),\n"));
        assert!(source.contains("e.Map(uint32(len(x.Blobs)), polyglot.BytesKind, polyglot.Int32Kind)"));
        assert!(source.contains("e.Bytes([]byte(k))"));
        assert!(source.contains("e.Slice(uint32(len(x.Others)), polyglot.AnyKind)"));
        assert!(source.contains("e.Bytes(v.encodeBytes())"));
        assert!(source.contains("e.Uint32(uint32(x.Level))"));
        assert!(source.contains("items = append(items, v)"));
        assert!(source.contains("\tif x == nil {\n\t\tx = NewOther()\n\t}\n\tb := polyglot.NewBuffer()\n"));
        assert!(source.contains("v := decodeLevel(vRaw)"));
        assert!(source.contains("func decodeLevel(v uint32) Level {"));
        assert!(source.contains("\tLevelLow Level = 0\n"));

        let blobs = source.find("e.Map(uint32(len(x.Blobs))").unwrap();
        let others = source.find("e.Slice(uint32(len(x.Others))").unwrap();
        let level = source.find("e.Uint32(uint32(x.Level))").unwrap();
        let next = source.find("if x.Next == nil {").unwrap();
        assert!(blobs < others && others < level && level < next);
    }

    #[test]
    fn test_decode_stops_at_end_of_payload() {
        let source = render(
            "version = \"v1alpha\"\nname = \"N\"\ntag = \"T\"\nmodel M {\n string S { }\n int32_array L { }\n}",
        );
        assert!(source.contains("\t\tv, err := d.String()\n\t\tif err != nil {\n\t\t\treturn nil\n\t\t}\n"));
        assert!(source.contains("\t\tn, err := d.Slice(polyglot.Int32Kind)\n\t\tif err != nil {\n\t\t\treturn nil\n\t\t}\n"));
        assert!(source.contains("\t\t\tv, err := d.Int32()\n\t\t\tif err != nil {\n\t\t\t\treturn err\n\t\t\t}\n"));
        assert!(!source.contains("Len()"));
    }

    #[test]
    fn test_name_collisions() {
        let valid = compile_schema(
            "version = \"v1alpha\"\nname = \"N\"\ntag = \"T\"\nmodel M {\n string Encode { }\n}",
        )
        .unwrap();
        let err = GoBackend
            .render(&Plan::new(&valid), &GenerateOptions::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::Generation(_)));

        let valid = compile_schema(
            r#"
            version = "v1alpha"
            name = "N"
            tag = "T"
            enum A {
                default = "BC"
                values = ["BC"]
            }
            enum AB {
                default = "C"
                values = ["C"]
            }
            "#,
        )
        .unwrap();
        let err = GoBackend
            .render(&Plan::new(&valid), &GenerateOptions::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Generation error: value A.BC and value AB.C both map to the go identifier ABC"
        );
    }

    #[test]
    fn test_keyword_package_is_rejected() {
        let valid = compile_schema("version = \"v1alpha\"\nname = \"N\"\ntag = \"T\"").unwrap();
        let err = GoBackend
            .render(&Plan::new(&valid), &GenerateOptions::new("func", ""))
            .unwrap_err();
        assert!(matches!(err, CompileError::Generation(_)));
    }
}
