//! Maps a parsed [`Body`] onto typed schema structures: the vocabulary of
//! attributes and blocks, required attributes, label counts and literal
//! types are all enforced here and reported as syntax errors.

use crate::{
    error::CompileError,
    parser::{Attribute, Block, Body, Expr},
    primitive::Primitive,
    types::{
        Accessor, CaseModifier, Enum, Field, FieldType, LengthValidator, LimitValidator, Literal,
        Model, Number, RegexValidator, Schema, Shape, TypeFamily, Validators,
    },
    utils::{error, quote},
};
use std::collections::HashSet;

const SCHEMA_ATTRIBUTES: [&str; 3] = ["version", "name", "tag"];
const SCHEMA_BLOCKS: [&str; 2] = ["enum", "model"];
const ENUM_ATTRIBUTES: [&str; 2] = ["default", "values"];
const MODEL_ATTRIBUTES: [&str; 1] = ["description"];

pub fn decode_schema(body: &Body) -> Result<Schema, CompileError> {
    check_attributes(body, "schema", &SCHEMA_ATTRIBUTES)?;

    let version = required(string_attr(body, "version")?, "version", "schema", 1, 1)?;
    let name = required(string_attr(body, "name")?, "name", "schema", 1, 1)?;
    let tag = required(string_attr(body, "tag")?, "tag", "schema", 1, 1)?;

    let mut enums = Vec::new();
    let mut models = Vec::new();
    for block in &body.blocks {
        match block.kind.as_str() {
            "enum" => enums.push(decode_enum(block)?),
            "model" => models.push(decode_model(block)?),
            other => {
                return Err(error(
                    &format!(
                        "Unsupported block {} in schema, expected one of {}",
                        quote(other),
                        SCHEMA_BLOCKS.join(", ")
                    ),
                    block.line,
                    block.column,
                ))
            }
        }
    }

    Ok(Schema {
        version,
        name,
        tag,
        enums,
        models,
    })
}

fn decode_enum(block: &Block) -> Result<Enum, CompileError> {
    let name = single_label(block)?;
    let context = format!("enum {}", quote(&name));
    check_attributes(&block.body, &context, &ENUM_ATTRIBUTES)?;
    check_no_blocks(&block.body, &context)?;

    let default = required(
        string_attr(&block.body, "default")?,
        "default",
        &context,
        block.line,
        block.column,
    )?;
    let values = required(
        string_list_attr(&block.body, "values")?,
        "values",
        &context,
        block.line,
        block.column,
    )?;

    Ok(Enum {
        name,
        line: block.line,
        column: block.column,
        default,
        values,
    })
}

fn decode_model(block: &Block) -> Result<Model, CompileError> {
    let name = single_label(block)?;
    let context = format!("model {}", quote(&name));
    check_attributes(&block.body, &context, &MODEL_ATTRIBUTES)?;

    let description = string_attr(&block.body, "description")?;
    let mut fields = Vec::with_capacity(block.body.blocks.len());
    for inner in &block.body.blocks {
        let (shape, family) = parse_keyword(&inner.kind).ok_or_else(|| {
            error(
                &format!("Unsupported block {} in {}", quote(&inner.kind), context),
                inner.line,
                inner.column,
            )
        })?;
        fields.push(decode_field(inner, shape, family)?);
    }

    Ok(Model {
        name,
        line: block.line,
        column: block.column,
        description,
        fields,
    })
}

/// Splits a field keyword such as `uint64_map` into its shape and type family.
pub fn parse_keyword(keyword: &str) -> Option<(Shape, TypeFamily)> {
    let (base, shape) = if let Some(base) = keyword.strip_suffix("_array") {
        (base, Shape::Array)
    } else if let Some(base) = keyword.strip_suffix("_map") {
        (base, Shape::Map)
    } else {
        (keyword, Shape::Single)
    };

    let family = match base {
        "enum" => TypeFamily::Enum,
        "model" => TypeFamily::Model,
        other => {
            let primitive = Primitive::from_name(other)?;
            if shape == Shape::Map && !primitive.supports_map() {
                return None;
            }
            TypeFamily::Primitive(primitive)
        }
    };
    Some((shape, family))
}

fn decode_field(block: &Block, shape: Shape, family: TypeFamily) -> Result<Field, CompileError> {
    let name = single_label(block)?;
    let context = format!("{} {}", block.kind, quote(&name));
    let body = &block.body;

    let mut allowed = vec!["accessor"];
    match family {
        TypeFamily::Primitive(p) if shape == Shape::Single && p.supports_default() => {
            allowed.push("default")
        }
        TypeFamily::Primitive(_) => {}
        TypeFamily::Enum | TypeFamily::Model => allowed.push("reference"),
    }
    if shape != Shape::Single {
        allowed.push("initial_size");
    }
    if shape == Shape::Map {
        allowed.push("value");
    }
    check_attributes(body, &context, &allowed)?;

    let ty = match family {
        TypeFamily::Primitive(p) => FieldType::Primitive(p),
        TypeFamily::Enum => FieldType::Enum(required(
            string_attr(body, "reference")?,
            "reference",
            &context,
            block.line,
            block.column,
        )?),
        TypeFamily::Model => FieldType::Model(required(
            string_attr(body, "reference")?,
            "reference",
            &context,
            block.line,
            block.column,
        )?),
    };

    let default = match body.attribute("default") {
        Some(attr) => match family {
            TypeFamily::Primitive(p) => Some(literal_for(attr, p)?),
            _ => None,
        },
        None => None,
    };

    let value = if shape == Shape::Map {
        Some(required(
            string_attr(body, "value")?,
            "value",
            &context,
            block.line,
            block.column,
        )?)
    } else {
        None
    };

    let initial_size = match body.attribute("initial_size") {
        Some(attr) => Some(unsigned_for::<u32>(attr)?),
        None => None,
    };

    let accessor = match bool_attr(body, "accessor")? {
        Some(flag) => Accessor::from_flag(flag),
        None => Accessor::Unset,
    };

    let validators = match family {
        TypeFamily::Primitive(p) => decode_validators(block, p, &context)?,
        _ => {
            check_no_blocks(body, &context)?;
            Validators::default()
        }
    };

    Ok(Field {
        name,
        line: block.line,
        column: block.column,
        shape,
        ty,
        default,
        value,
        initial_size,
        accessor,
        validators,
    })
}

fn decode_validators(block: &Block, primitive: Primitive, context: &str) -> Result<Validators, CompileError> {
    let family = primitive.validator_family();
    let mut validators = Validators::default();
    let mut seen = HashSet::new();

    for inner in &block.body.blocks {
        let kind = inner.kind.as_str();
        if !family.allows(kind) {
            return Err(error(
                &format!("Block {} is not supported on {} fields", quote(kind), block.kind),
                inner.line,
                inner.column,
            ));
        }
        if !seen.insert(kind) {
            return Err(error(
                &format!("Duplicate block {} in {}", quote(kind), context),
                inner.line,
                inner.column,
            ));
        }
        if !inner.labels.is_empty() {
            return Err(error(
                &format!("Block {} does not take labels", quote(kind)),
                inner.line,
                inner.column,
            ));
        }
        check_no_blocks(&inner.body, kind)?;

        let body = &inner.body;
        match kind {
            "regex_validator" => {
                check_attributes(body, kind, &["expression"])?;
                let expression = required(
                    string_attr(body, "expression")?,
                    "expression",
                    kind,
                    inner.line,
                    inner.column,
                )?;
                validators.regex = Some(RegexValidator { expression });
            }
            "length_validator" => {
                check_attributes(body, kind, &["min", "max"])?;
                let min = body.attribute("min").map(unsigned_for::<u64>).transpose()?;
                let max = body.attribute("max").map(unsigned_for::<u64>).transpose()?;
                validators.length = Some(LengthValidator { min, max });
            }
            "limit_validator" => {
                check_attributes(body, kind, &["minimum", "maximum"])?;
                let minimum = body
                    .attribute("minimum")
                    .map(|attr| number_for(attr, primitive))
                    .transpose()?;
                let maximum = body
                    .attribute("maximum")
                    .map(|attr| number_for(attr, primitive))
                    .transpose()?;
                validators.limit = Some(LimitValidator { minimum, maximum });
            }
            "case_modifier" => {
                check_attributes(body, kind, &["kind"])?;
                let kind = required(string_attr(body, "kind")?, "kind", kind, inner.line, inner.column)?;
                validators.case = Some(CaseModifier { kind });
            }
            _ => {}
        }
    }
    Ok(validators)
}

fn single_label(block: &Block) -> Result<String, CompileError> {
    match block.labels.as_slice() {
        [label] => Ok(label.clone()),
        labels => Err(error(
            &format!(
                "Block {} expects exactly one label, found {}",
                quote(&block.kind),
                labels.len()
            ),
            block.line,
            block.column,
        )),
    }
}

fn check_attributes(body: &Body, context: &str, allowed: &[&str]) -> Result<(), CompileError> {
    let mut seen = HashSet::new();
    for attr in &body.attributes {
        if !allowed.contains(&attr.name.as_str()) {
            return Err(error(
                &format!("Unsupported attribute {} in {}", quote(&attr.name), context),
                attr.line,
                attr.column,
            ));
        }
        if !seen.insert(attr.name.as_str()) {
            return Err(error(
                &format!("Duplicate attribute {} in {}", quote(&attr.name), context),
                attr.line,
                attr.column,
            ));
        }
    }
    Ok(())
}

fn check_no_blocks(body: &Body, context: &str) -> Result<(), CompileError> {
    match body.blocks.first() {
        Some(block) => Err(error(
            &format!("Unsupported block {} in {}", quote(&block.kind), context),
            block.line,
            block.column,
        )),
        None => Ok(()),
    }
}

fn required<T>(value: Option<T>, name: &str, context: &str, line: usize, column: usize) -> Result<T, CompileError> {
    value.ok_or_else(|| {
        error(
            &format!("Missing required attribute {} in {}", quote(name), context),
            line,
            column,
        )
    })
}

fn type_error(attr: &Attribute, expected: &str) -> CompileError {
    error(
        &format!(
            "Attribute {} must be a {}, found {}",
            quote(&attr.name),
            expected,
            attr.value.type_name()
        ),
        attr.line,
        attr.column,
    )
}

fn string_attr(body: &Body, name: &str) -> Result<Option<String>, CompileError> {
    match body.attribute(name) {
        Some(attr) => match &attr.value {
            Expr::String(s) => Ok(Some(s.clone())),
            _ => Err(type_error(attr, "string")),
        },
        None => Ok(None),
    }
}

fn bool_attr(body: &Body, name: &str) -> Result<Option<bool>, CompileError> {
    match body.attribute(name) {
        Some(attr) => match &attr.value {
            Expr::Bool(b) => Ok(Some(*b)),
            _ => Err(type_error(attr, "bool")),
        },
        None => Ok(None),
    }
}

fn string_list_attr(body: &Body, name: &str) -> Result<Option<Vec<String>>, CompileError> {
    let attr = match body.attribute(name) {
        Some(attr) => attr,
        None => return Ok(None),
    };
    match &attr.value {
        Expr::List(items) => items
            .iter()
            .map(|item| match item {
                Expr::String(s) => Ok(s.clone()),
                _ => Err(type_error(attr, "list of strings")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        _ => Err(type_error(attr, "list of strings")),
    }
}

fn unsigned_for<T: std::str::FromStr>(attr: &Attribute) -> Result<T, CompileError> {
    match &attr.value {
        Expr::Number(raw) => raw.parse::<T>().map_err(|_| {
            error(
                &format!("{} is not a valid value for {}", raw, quote(&attr.name)),
                attr.line,
                attr.column,
            )
        }),
        _ => Err(type_error(attr, "non-negative integer")),
    }
}

fn literal_for(attr: &Attribute, primitive: Primitive) -> Result<Literal, CompileError> {
    match primitive {
        Primitive::String => match &attr.value {
            Expr::String(s) => Ok(Literal::String(s.clone())),
            _ => Err(type_error(attr, "string")),
        },
        Primitive::Bool => match &attr.value {
            Expr::Bool(b) => Ok(Literal::Bool(*b)),
            _ => Err(type_error(attr, "bool")),
        },
        _ => number_for(attr, primitive).map(Literal::Number),
    }
}

/// Converts a numeric literal to `primitive`. Integers are accepted for
/// float kinds; anything that does not fit the target type is rejected.
fn number_for(attr: &Attribute, primitive: Primitive) -> Result<Number, CompileError> {
    let raw = match &attr.value {
        Expr::Number(raw) => raw,
        _ => return Err(type_error(attr, "number")),
    };
    let invalid = || {
        error(
            &format!("{} is not a valid {} value", raw, primitive),
            attr.line,
            attr.column,
        )
    };

    let number = match primitive {
        Primitive::Int32 => Number::Int32(raw.parse().map_err(|_| invalid())?),
        Primitive::Int64 => Number::Int64(raw.parse().map_err(|_| invalid())?),
        Primitive::Uint32 => Number::Uint32(raw.parse().map_err(|_| invalid())?),
        Primitive::Uint64 => Number::Uint64(raw.parse().map_err(|_| invalid())?),
        Primitive::Float32 => {
            let value: f32 = raw.parse().map_err(|_| invalid())?;
            if !value.is_finite() {
                return Err(invalid());
            }
            Number::Float32(value)
        }
        Primitive::Float64 => {
            let value: f64 = raw.parse().map_err(|_| invalid())?;
            if !value.is_finite() {
                return Err(invalid());
            }
            Number::Float64(value)
        }
        _ => return Err(invalid()),
    };
    Ok(number)
}
