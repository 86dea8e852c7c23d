//! Two-phase schema validation.
//!
//! Phase 1 validates every enum and model on its own and registers its
//! name. Phase 2 resolves every model, enum and map value reference against
//! those registries, so definitions may refer to names declared later.

mod enums;
mod field;
mod model;

pub use enums::verify_enum;
pub use field::verify_field;
pub use model::verify_model;

use crate::{
    error::CompileError,
    primitive::is_primitive,
    types::{FieldType, Schema, Shape, KNOWN_VERSIONS},
    utils::quote,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

lazy_static! {
    pub static ref VALID_LABEL: Regex = Regex::new(r"^[A-Za-z0-9]*$").expect("label regex is valid");
    pub static ref INVALID_TAG: Regex = Regex::new(r"[^A-Za-z0-9\-.]").expect("tag regex is valid");
}

/// Names registered during phase 1, consumed read-only by phase 2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownNames {
    pub models: HashSet<String>,
    pub enums:  HashSet<String>,
}

/// A legal identifier is non-empty and alphanumeric.
pub fn is_valid_label(name: &str) -> bool {
    !name.is_empty() && VALID_LABEL.is_match(name)
}

/// Validates a normalized schema in place. Enum defaults are moved to the
/// front of their value lists and unset accessors are resolved.
pub fn verify_schema(schema: &mut Schema) -> Result<KnownNames, CompileError> {
    if !KNOWN_VERSIONS.contains(&schema.version.as_str()) {
        return Err(CompileError::Version(schema.version.clone()));
    }
    if !VALID_LABEL.is_match(&schema.name) {
        return Err(CompileError::Name(format!("invalid schema name: {}", quote(&schema.name))));
    }
    if INVALID_TAG.is_match(&schema.tag) {
        return Err(CompileError::Name(format!("invalid schema tag: {}", quote(&schema.tag))));
    }

    let known = register(schema)?;
    debug!(
        enums = known.enums.len(),
        models = known.models.len(),
        "registered schema definitions"
    );

    resolve_references(schema, &known)?;
    debug!(schema = %schema.name, "resolved schema references");
    Ok(known)
}

fn register(schema: &mut Schema) -> Result<KnownNames, CompileError> {
    let mut known = KnownNames::default();

    for e in &mut schema.enums {
        verify_enum(e)?;
        if !known.enums.insert(e.name.clone()) {
            return Err(CompileError::Name(format!("duplicate enum name: {}", e.name)));
        }
    }

    for model in &mut schema.models {
        verify_model(model)?;
        if known.enums.contains(&model.name) {
            return Err(CompileError::Name(format!(
                "model name {} is already used by an enum",
                model.name
            )));
        }
        if !known.models.insert(model.name.clone()) {
            return Err(CompileError::Name(format!("duplicate model name: {}", model.name)));
        }
    }

    Ok(known)
}

/// Model references must name a known model and enum references a known
/// enum. A map value that is not a primitive must name a known model, for
/// enum maps as well.
pub fn resolve_references(schema: &Schema, known: &KnownNames) -> Result<(), CompileError> {
    for model in &schema.models {
        for field in &model.fields {
            let resolved = match &field.ty {
                FieldType::Model(reference) => Some((reference, known.models.contains(reference))),
                FieldType::Enum(reference) => Some((reference, known.enums.contains(reference))),
                FieldType::Primitive(_) => None,
            };
            if let Some((reference, false)) = resolved {
                return Err(CompileError::Reference(format!(
                    "unknown {}.{}.reference: {}",
                    model.name, field.name, reference
                )));
            }

            if field.shape == Shape::Map {
                if let Some(value) = &field.value {
                    if !is_primitive(value) && !known.models.contains(value) {
                        return Err(CompileError::Reference(format!(
                            "unknown {}.{}.value: {}",
                            model.name, field.name, value
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Human-readable range phrasing shared with the generated accessors.
pub(crate) fn range_message(subject: &str, min: Option<String>, max: Option<String>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{} must be between {} and {}", subject, min, max),
        (Some(min), None) => format!("{} must be at least {}", subject, min),
        (None, Some(max)) => format!("{} must be at most {}", subject, max),
        (None, None) => format!("{} is out of range", subject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        primitive::Primitive,
        types::{Enum, Field, Model},
    };

    fn schema(models: Vec<Model>, enums: Vec<Enum>) -> Schema {
        Schema {
            version: "v1alpha".into(),
            name: "Types".into(),
            tag: "1.0-beta".into(),
            enums,
            models,
        }
    }

    fn model(name: &str, fields: Vec<Field>) -> Model {
        Model {
            name: name.into(),
            line: 0,
            column: 0,
            description: None,
            fields,
        }
    }

    fn model_map(name: &str, reference: &str, value: &str) -> Field {
        let mut field = Field::new(name, Shape::Map, FieldType::Model(reference.into()));
        field.value = Some(value.into());
        field
    }

    #[test]
    fn test_header_checks() {
        let mut s = schema(vec![], vec![]);
        s.version = "v2".into();
        assert!(matches!(verify_schema(&mut s), Err(CompileError::Version(v)) if v == "v2"));

        let mut s = schema(vec![], vec![]);
        s.name = "bad name".into();
        assert!(matches!(verify_schema(&mut s), Err(CompileError::Name(_))));

        let mut s = schema(vec![], vec![]);
        s.tag = "v1/latest".into();
        assert!(matches!(verify_schema(&mut s), Err(CompileError::Name(_))));

        let mut s = schema(vec![], vec![]);
        s.tag = String::new();
        assert!(verify_schema(&mut s).is_ok());
    }

    #[test]
    fn test_forward_references_resolve() {
        let mut s = schema(
            vec![
                model("A", vec![Field::new("B", Shape::Single, FieldType::Model("B".into()))]),
                model("B", vec![Field::new("C", Shape::Array, FieldType::Enum("C".into()))]),
            ],
            vec![Enum {
                name: "C".into(),
                line: 0,
                column: 0,
                default: "X".into(),
                values: vec!["X".into()],
            }],
        );
        let known = verify_schema(&mut s).unwrap();
        assert!(known.models.contains("A") && known.models.contains("B"));
        assert!(known.enums.contains("C"));
    }

    #[test]
    fn test_unknown_references() {
        let mut s = schema(
            vec![model("A", vec![Field::new("B", Shape::Single, FieldType::Model("Missing".into()))])],
            vec![],
        );
        let err = verify_schema(&mut s).unwrap_err();
        assert_eq!(err.to_string(), "unknown A.B.reference: Missing");

        let mut s = schema(
            vec![model("A", vec![Field::new("E", Shape::Single, FieldType::Enum("A".into()))])],
            vec![],
        );
        assert!(matches!(verify_schema(&mut s), Err(CompileError::Reference(_))));
    }

    #[test]
    fn test_map_value_must_be_primitive_or_model() {
        let mut s = schema(vec![model("A", vec![model_map("M", "A", "Other")])], vec![]);
        let err = verify_schema(&mut s).unwrap_err();
        assert_eq!(err.to_string(), "unknown A.M.value: Other");

        let mut s = schema(
            vec![model("A", vec![model_map("M", "A", "Other")]), model("Other", vec![])],
            vec![],
        );
        assert!(verify_schema(&mut s).is_ok());

        let mut s = schema(vec![model("A", vec![model_map("M", "A", "uint64")])], vec![]);
        assert!(verify_schema(&mut s).is_ok());
    }

    #[test]
    fn test_enum_map_value_checks_models() {
        let color = Enum {
            name: "Color".into(),
            line: 0,
            column: 0,
            default: "Red".into(),
            values: vec!["Red".into()],
        };
        let mut field = Field::new("M", Shape::Map, FieldType::Enum("Color".into()));
        field.value = Some("Color".into());
        let mut s = schema(vec![model("A", vec![field])], vec![color]);
        let err = verify_schema(&mut s).unwrap_err();
        assert_eq!(err.to_string(), "unknown A.M.value: Color");
    }

    #[test]
    fn test_name_clashes() {
        let e = Enum {
            name: "Thing".into(),
            line: 0,
            column: 0,
            default: "A".into(),
            values: vec!["A".into()],
        };
        let mut s = schema(vec![model("Thing", vec![])], vec![e]);
        assert!(matches!(verify_schema(&mut s), Err(CompileError::Name(_))));

        let mut s = schema(vec![model("A", vec![]), model("A", vec![])], vec![]);
        let err = verify_schema(&mut s).unwrap_err();
        assert_eq!(err.to_string(), "duplicate model name: A");
    }

    #[test]
    fn test_phase_one_failure_skips_resolution() {
        let mut bad = Field::new("S", Shape::Single, FieldType::Primitive(Primitive::String));
        bad.accessor = crate::types::Accessor::Disabled;
        bad.validators.case = Some(crate::types::CaseModifier { kind: "upper".into() });
        let mut s = schema(
            vec![model("A", vec![bad, Field::new("R", Shape::Single, FieldType::Model("Missing".into()))])],
            vec![],
        );
        assert!(matches!(verify_schema(&mut s), Err(CompileError::AccessorPolicy(_))));
    }
}
