//! signet
//!
//! Facade over the Signet schema compiler and its runtime codec.
//!
//! - `generate` compiles schema text and renders it for one target
//! - `schema_to_json` dumps the normalized, validated schema
//! - `decode_to_json` reads any self-describing payload without its schema
//! - `SchemaRef` splits an `organization/name@tag` schema reference

use serde_json::{json, Map as JsonMap, Number, Value as Json};
use std::fmt;
use thiserror::Error;

pub use signet_codec::{DecodeError, Decoder, Encoder, Kind, Map, MapKey, Message, ValidationError, Value};
pub use signet_compiler::{
    compile_schema, read_schema, CompileError, GenerateOptions, Target, ValidSchema, DEFAULT_PACKAGE,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Compiles `text` and renders it for `target`. The output is not passed
/// through the target's formatter; use [`Target::generate`] for that.
pub fn generate(text: &str, target: Target, options: &GenerateOptions) -> Result<String, Error> {
    let schema = compile_schema(text)?;
    Ok(target.generate(&schema, options, false)?)
}

/// The validated schema as pretty-printed JSON.
pub fn schema_to_json(schema: &ValidSchema) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(schema.schema())?)
}

/// Decode a payload into a pretty-printed JSON array, one entry per
/// top-level value.
pub fn decode_to_json(buffer: &[u8]) -> Result<String, Error> {
    let values = Value::decode_all(buffer)?;
    let json: Vec<Json> = values.iter().map(value_to_json).collect();
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Maps a wire value onto JSON. Map entries become `{"key", "value"}`
/// objects since keys need not be strings; non-finite floats become null.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Nil => Json::Null,
        Value::Slice { items, .. } => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Map { entries, .. } => Json::Array(
            entries
                .iter()
                .map(|(k, v)| json!({ "key": value_to_json(k), "value": value_to_json(v) }))
                .collect(),
        ),
        Value::Bytes(bytes) => Json::Array(bytes.iter().map(|b| Json::from(*b)).collect()),
        Value::String(s) => Json::String(s.clone()),
        Value::Error(msg) => {
            let mut object = JsonMap::new();
            object.insert("error".to_string(), Json::String(msg.clone()));
            Json::Object(object)
        }
        Value::Bool(b) => Json::Bool(*b),
        Value::U8(v) => Json::from(*v),
        Value::U16(v) => Json::from(*v),
        Value::U32(v) => Json::from(*v),
        Value::U64(v) => Json::from(*v),
        Value::I32(v) => Json::from(*v),
        Value::I64(v) => Json::from(*v),
        Value::F32(v) => float(f64::from(*v)),
        Value::F64(v) => float(*v),
    }
}

fn float(v: f64) -> Json {
    Number::from_f64(v).map_or(Json::Null, Json::Number)
}

/// A published schema reference of the form `[organization/]name[@tag]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRef {
    pub organization: String,
    pub name: String,
    pub tag: String,
}

impl SchemaRef {
    /// Missing parts are left empty. Anything after a second `/` or `@` is
    /// dropped.
    pub fn parse(reference: &str) -> SchemaRef {
        let mut parts = reference.split('/');
        let first = parts.next().unwrap_or_default();
        let (organization, rest) = match parts.next() {
            Some(rest) => (first, rest),
            None => ("", first),
        };

        let mut parts = rest.split('@');
        SchemaRef {
            organization: organization.to_string(),
            name: parts.next().unwrap_or_default().to_string(),
            tag: parts.next().unwrap_or_default().to_string(),
        }
    }

    pub fn to_json(&self) -> Json {
        json!({ "organization": self.organization, "name": self.name, "tag": self.tag })
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.organization.is_empty() {
            write!(f, "{}/", self.organization)?;
        }
        f.write_str(&self.name)?;
        if !self.tag.is_empty() {
            write!(f, "@{}", self.tag)?;
        }
        Ok(())
    }
}

pub mod codec {
    pub use signet_codec::*;
}

pub mod compiler {
    pub use signet_compiler::*;
}
