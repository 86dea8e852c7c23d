use super::{is_valid_label, range_message};
use crate::{
    error::CompileError,
    primitive::{Primitive, ValidatorFamily},
    types::{Accessor, Field, FieldType, Literal, Number, Shape},
    utils::quote,
};
use regex::Regex;

/// Validates one field of `model`, stopping at the first violated rule.
/// A string default is case-folded by its modifier, and an unset accessor is
/// resolved once every other rule has passed.
pub fn verify_field(field: &mut Field, model: &str) -> Result<(), CompileError> {
    if !is_valid_label(&field.name) {
        return Err(CompileError::Name(format!(
            "invalid {} name in {}: {}",
            field.keyword(),
            model,
            quote(&field.name)
        )));
    }
    let path = format!("{}.{}", model, field.name);

    if let Some(reference) = field.ty.reference() {
        if !is_valid_label(reference) {
            return Err(CompileError::Name(format!("invalid {}.reference: {}", path, reference)));
        }
    }
    match (&field.value, field.shape) {
        (Some(value), Shape::Map) if !is_valid_label(value) => {
            return Err(CompileError::Name(format!("invalid {}.value: {}", path, value)));
        }
        (None, Shape::Map) => {
            return Err(CompileError::Name(format!("invalid {}.value: missing value type", path)));
        }
        _ => {}
    }

    let family = match field.ty {
        FieldType::Primitive(p) => p.validator_family(),
        _ => ValidatorFamily::None,
    };
    if let Some(block) = field
        .validators
        .block_names()
        .into_iter()
        .find(|block| !family.allows(block))
    {
        return Err(CompileError::Constraint(format!(
            "invalid {}: {} is not supported on {} fields",
            path,
            block,
            field.keyword()
        )));
    }

    check_default_kind(field, &path)?;
    match family {
        ValidatorFamily::Text => verify_text(field, &path)?,
        ValidatorFamily::Limit => verify_limit(field, &path)?,
        ValidatorFamily::None => {}
    }

    resolve_accessor(field, &path)
}

fn check_default_kind(field: &Field, path: &str) -> Result<(), CompileError> {
    let default = match &field.default {
        Some(default) => default,
        None => return Ok(()),
    };
    let primitive = match field.ty {
        FieldType::Primitive(p) if field.shape == Shape::Single && p.supports_default() => p,
        _ => {
            return Err(CompileError::Constraint(format!(
                "invalid {}.default: defaults are not supported on {} fields",
                path,
                field.keyword()
            )))
        }
    };
    let matches = match (default, primitive) {
        (Literal::String(_), Primitive::String) | (Literal::Bool(_), Primitive::Bool) => true,
        (Literal::Number(n), p) => n.primitive() == p,
        _ => false,
    };
    if !matches {
        return Err(CompileError::Constraint(format!(
            "invalid {}.default: {:?} is not a valid {} value",
            path, default, primitive
        )));
    }
    Ok(())
}

/// Regex, length and case rules, in that order. Only single fields carry a
/// default to check them against.
fn verify_text(field: &mut Field, path: &str) -> Result<(), CompileError> {
    let validators = &field.validators;

    if let Some(regex) = &validators.regex {
        let compiled = Regex::new(&regex.expression).map_err(|err| {
            CompileError::Constraint(format!("invalid {}.regex_validator: {}", path, err))
        })?;
        if let Some(Literal::String(default)) = &field.default {
            if !compiled.is_match(default) {
                return Err(CompileError::Constraint(format!(
                    "invalid {}.default: value must match {}",
                    path, regex.expression
                )));
            }
        }
    }

    if let Some(length) = &validators.length {
        if length.max == Some(0) {
            return Err(CompileError::Constraint(format!(
                "invalid {}.length_validator: maximum must be greater than 0",
                path
            )));
        }
        if let (Some(min), Some(max)) = (length.min, length.max) {
            if min > max {
                return Err(CompileError::Constraint(format!(
                    "invalid {}.length_validator: minimum cannot be greater than maximum",
                    path
                )));
            }
        }
        if let Some(Literal::String(default)) = &field.default {
            let len = default.len() as u64;
            let too_short = length.min.map_or(false, |min| len < min);
            let too_long = length.max.map_or(false, |max| len > max);
            if too_short || too_long {
                return Err(CompileError::Constraint(format!(
                    "invalid {}.default: {}",
                    path,
                    range_message(
                        "length",
                        length.min.map(|v| v.to_string()),
                        length.max.map(|v| v.to_string())
                    )
                )));
            }
        }
    }

    if let Some(case) = &validators.case {
        let kind = case.case_kind().ok_or_else(|| {
            CompileError::Constraint(format!(
                "invalid {}.case_modifier: unknown kind {}",
                path,
                quote(&case.kind)
            ))
        })?;
        if let Some(Literal::String(default)) = &mut field.default {
            *default = kind.apply(default);
        }
    }

    Ok(())
}

/// Only checks that the bounds are ordered. A default outside the bounds is
/// accepted for numeric kinds.
fn verify_limit(field: &Field, path: &str) -> Result<(), CompileError> {
    let limit = match &field.validators.limit {
        Some(limit) => limit,
        None => return Ok(()),
    };
    let primitive = field.ty.primitive();

    for bound in [limit.minimum, limit.maximum].into_iter().flatten() {
        if Some(bound.primitive()) != primitive {
            return Err(CompileError::Constraint(format!(
                "invalid {}.limit_validator: {} is not a valid {} value",
                path,
                bound,
                field.keyword()
            )));
        }
    }

    if let (Some(min), Some(max)) = (limit.minimum, limit.maximum) {
        if exceeds(min, max) {
            return Err(CompileError::Constraint(format!(
                "invalid {}.limit_validator: minimum cannot be greater than maximum",
                path
            )));
        }
    }
    Ok(())
}

fn exceeds(min: Number, max: Number) -> bool {
    matches!(min.partial_cmp(&max), Some(std::cmp::Ordering::Greater))
}

fn resolve_accessor(field: &mut Field, path: &str) -> Result<(), CompileError> {
    let guarded = !field.validators.is_empty();
    match field.accessor {
        Accessor::Disabled if guarded => Err(CompileError::AccessorPolicy(format!(
            "invalid {}.accessor: cannot be false while using validators or modifiers",
            path
        ))),
        Accessor::Unset => {
            field.accessor = Accessor::from_flag(guarded);
            Ok(())
        }
        _ => Ok(()),
    }
}
