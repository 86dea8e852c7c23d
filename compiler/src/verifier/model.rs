use super::{is_valid_label, verify_field};
use crate::{error::CompileError, types::Model, utils::quote};
use std::collections::HashSet;

/// Validates a model's name and every field in declaration order. Field
/// names share one namespace across all shapes and kinds. References are
/// only checked for legality here; they resolve in phase 2.
pub fn verify_model(model: &mut Model) -> Result<(), CompileError> {
    if !is_valid_label(&model.name) {
        return Err(CompileError::Name(format!("invalid model name: {}", quote(&model.name))));
    }

    let Model { name, fields, .. } = model;
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields.iter_mut() {
        verify_field(field, name)?;
        if !seen.insert(field.name.clone()) {
            return Err(CompileError::Name(format!(
                "duplicate field name in {}: {}",
                name, field.name
            )));
        }
    }
    Ok(())
}
