use crate::{
    decode::decode_schema,
    error::CompileError,
    normalize::normalize_schema,
    parser::parse_schema,
    tokenizer::tokenize_schema,
    types::Schema,
    verifier::verify_schema,
};
use std::{ops::Deref, path::Path};
use tracing::debug;

/// A schema that has been normalized and passed both validation phases.
/// Only [`validate_schema`] constructs one, so generators can rely on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSchema(Schema);

impl ValidSchema {
    pub fn schema(&self) -> &Schema {
        &self.0
    }

    pub fn into_inner(self) -> Schema {
        self.0
    }
}

impl Deref for ValidSchema {
    type Target = Schema;

    fn deref(&self) -> &Schema {
        &self.0
    }
}

/// Tokenizes, parses and decodes schema text without validating it.
pub fn parse_schema_text(text: &str) -> Result<Schema, CompileError> {
    let tokens = tokenize_schema(text)?;
    debug!(tokens = tokens.len(), "tokenized schema");
    let body = parse_schema(&tokens)?;
    let schema = decode_schema(&body)?;
    debug!(
        enums = schema.enums.len(),
        models = schema.models.len(),
        "decoded schema"
    );
    Ok(schema)
}

/// Normalizes and validates a decoded schema.
pub fn validate_schema(mut schema: Schema) -> Result<ValidSchema, CompileError> {
    normalize_schema(&mut schema);
    debug!(schema = %schema.name, "normalized schema");
    verify_schema(&mut schema)?;
    Ok(ValidSchema(schema))
}

/// Compile schema text into a validated schema.
/// Returns the first syntax or validation error encountered.
pub fn compile_schema(text: &str) -> Result<ValidSchema, CompileError> {
    validate_schema(parse_schema_text(text)?)
}

/// Reads and compiles the schema file at `path`.
pub fn read_schema(path: impl AsRef<Path>) -> Result<ValidSchema, CompileError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading schema");
    let text = std::fs::read_to_string(path)?;
    compile_schema(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Accessor, Literal};

    #[test]
    fn test_compile_normalizes_before_validating() {
        let valid = compile_schema(
            r#"
            version = "v1alpha"
            name = "types"
            tag = "latest"

            model person {
                model parent {
                    reference = "person"
                }
                string nickname {
                    default = "bob"
                    case_modifier {
                        kind = "upper"
                    }
                }
            }
            "#,
        )
        .unwrap();

        let person = valid.model("Person").unwrap();
        let nickname = person.field("Nickname").unwrap();
        assert_eq!(nickname.default, Some(Literal::String("BOB".into())));
        assert_eq!(nickname.accessor, Accessor::Enabled);
        assert_eq!(person.field("Parent").unwrap().accessor, Accessor::Disabled);
    }

    #[test]
    fn test_syntax_errors_abort_before_validation() {
        let err = compile_schema("version = \"v9\"\nname = \"x\"\ntag = \"y\"\nmodel {").unwrap_err();
        assert!(matches!(err, CompileError::Syntax { .. }), "{:?}", err);
    }

    #[test]
    fn test_unknown_version() {
        let err = compile_schema("version = \"v2\"\nname = \"x\"\ntag = \"y\"").unwrap_err();
        assert!(matches!(err, CompileError::Version(ref v) if v == "v2"));
    }
}
