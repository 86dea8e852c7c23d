use super::is_valid_label;
use crate::{error::CompileError, types::Enum, utils::quote};
use std::collections::HashSet;

/// Rejects illegal or duplicate values and a default that is not one of
/// them, then moves the default to index 0. The other values keep their
/// relative order; index 0 is the wire default.
pub fn verify_enum(e: &mut Enum) -> Result<(), CompileError> {
    if !is_valid_label(&e.name) {
        return Err(CompileError::Name(format!("invalid enum name: {}", quote(&e.name))));
    }

    let mut seen = HashSet::with_capacity(e.values.len());
    for value in &e.values {
        if !is_valid_label(value) {
            return Err(CompileError::Name(format!("invalid {} value: {}", e.name, quote(value))));
        }
        if !seen.insert(value.as_str()) {
            return Err(CompileError::Name(format!("duplicate value in {}: {}", e.name, value)));
        }
    }

    let index = e.values.iter().position(|v| *v == e.default).ok_or_else(|| {
        CompileError::Constraint(format!(
            "invalid {}.default: {} is not a valid value",
            e.name, e.default
        ))
    })?;
    let default = e.values.remove(index);
    e.values.insert(0, default);
    Ok(())
}
